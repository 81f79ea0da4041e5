use std::collections::BTreeMap;
use async_trait::async_trait;
use milton_core::CoreResult;
use tokio::sync::RwLock;
use crate::models::{City, Tour};
use crate::repository::CatalogRepository;
use crate::search::SearchPattern;

/// In-memory catalog, seeded by hand in tests
#[derive(Default)]
pub struct InMemoryCatalog {
    cities: RwLock<BTreeMap<i64, City>>,
    tours: RwLock<BTreeMap<i64, Tour>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_city(&self, city: City) {
        self.cities.write().await.insert(city.id, city);
    }

    pub async fn insert_tour(&self, tour: Tour) {
        self.tours.write().await.insert(tour.id, tour);
    }

    /// Replace a tour's price, e.g. to show that baskets read live prices.
    pub async fn set_price(&self, tour_id: i64, price: rust_decimal::Decimal) -> bool {
        match self.tours.write().await.get_mut(&tour_id) {
            Some(tour) => {
                tour.price = price;
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl CatalogRepository for InMemoryCatalog {
    async fn list_cities(&self) -> CoreResult<Vec<City>> {
        Ok(self.cities.read().await.values().cloned().collect())
    }

    async fn list_tours_by_city(&self, city_id: i64) -> CoreResult<Vec<Tour>> {
        Ok(self
            .tours
            .read()
            .await
            .values()
            .filter(|tour| tour.city_id == city_id)
            .cloned()
            .collect())
    }

    async fn search_tours(&self, query: Option<&str>) -> CoreResult<Vec<Tour>> {
        let pattern = SearchPattern::from_query(query);
        Ok(self
            .tours
            .read()
            .await
            .values()
            .filter(|tour| pattern.matches(&tour.description))
            .cloned()
            .collect())
    }

    async fn get_tour(&self, tour_id: i64) -> CoreResult<Option<Tour>> {
        Ok(self.tours.read().await.get(&tour_id).cloned())
    }
}
