use async_trait::async_trait;
use milton_catalog::{CatalogRepository, City, SearchPattern, Tour};
use milton_core::CoreResult;
use rust_decimal::Decimal;
use crate::database::DbClient;

pub struct PgCatalogRepository {
    db: DbClient,
}

impl PgCatalogRepository {
    pub fn new(db: DbClient) -> Self {
        Self { db }
    }
}

// Internal structs for type-safe querying
#[derive(sqlx::FromRow)]
struct CityRow {
    id: i64,
    name: String,
    description: String,
    image: String,
}

#[derive(sqlx::FromRow)]
pub(crate) struct TourRow {
    pub(crate) id: i64,
    pub(crate) city_id: i64,
    pub(crate) name: String,
    pub(crate) description: String,
    pub(crate) image: String,
    pub(crate) price: Decimal,
}

impl From<CityRow> for City {
    fn from(row: CityRow) -> Self {
        City {
            id: row.id,
            name: row.name,
            description: row.description,
            image: row.image,
        }
    }
}

impl From<TourRow> for Tour {
    fn from(row: TourRow) -> Self {
        Tour {
            id: row.id,
            city_id: row.city_id,
            name: row.name,
            description: row.description,
            image: row.image,
            price: row.price,
        }
    }
}

const TOUR_COLUMNS: &str = "id, city_id, name, description, image, price";

#[async_trait]
impl CatalogRepository for PgCatalogRepository {
    async fn list_cities(&self) -> CoreResult<Vec<City>> {
        let rows = self
            .db
            .bounded(
                "list_cities",
                sqlx::query_as::<_, CityRow>(
                    "SELECT id, name, description, image FROM cities ORDER BY id",
                )
                .fetch_all(&self.db.pool),
            )
            .await?;

        Ok(rows.into_iter().map(City::from).collect())
    }

    async fn list_tours_by_city(&self, city_id: i64) -> CoreResult<Vec<Tour>> {
        let sql = format!("SELECT {} FROM tours WHERE city_id = $1 ORDER BY id", TOUR_COLUMNS);
        let rows = self
            .db
            .bounded(
                "list_tours_by_city",
                sqlx::query_as::<_, TourRow>(&sql)
                    .bind(city_id)
                    .fetch_all(&self.db.pool),
            )
            .await?;

        Ok(rows.into_iter().map(Tour::from).collect())
    }

    async fn search_tours(&self, query: Option<&str>) -> CoreResult<Vec<Tour>> {
        let pattern = SearchPattern::from_query(query);
        let sql = format!(
            "SELECT {} FROM tours WHERE description ILIKE $1 ESCAPE '' ORDER BY id",
            TOUR_COLUMNS
        );
        let rows = self
            .db
            .bounded(
                "search_tours",
                sqlx::query_as::<_, TourRow>(&sql)
                    .bind(pattern.as_str())
                    .fetch_all(&self.db.pool),
            )
            .await?;

        Ok(rows.into_iter().map(Tour::from).collect())
    }

    async fn get_tour(&self, tour_id: i64) -> CoreResult<Option<Tour>> {
        let sql = format!("SELECT {} FROM tours WHERE id = $1", TOUR_COLUMNS);
        let row = self
            .db
            .bounded(
                "get_tour",
                sqlx::query_as::<_, TourRow>(&sql)
                    .bind(tour_id)
                    .fetch_optional(&self.db.pool),
            )
            .await?;

        Ok(row.map(Tour::from))
    }
}
