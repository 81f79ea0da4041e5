use async_trait::async_trait;
use milton_core::CoreResult;
use crate::models::{City, Tour};

/// Read-only access to cities and tours.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// All cities, ordered by id ascending.
    async fn list_cities(&self) -> CoreResult<Vec<City>>;

    /// Tours belonging to `city_id`. An unknown city yields an empty list.
    async fn list_tours_by_city(&self, city_id: i64) -> CoreResult<Vec<Tour>>;

    /// Tours whose description matches `%query%`. See [`crate::SearchPattern`].
    async fn search_tours(&self, query: Option<&str>) -> CoreResult<Vec<Tour>>;

    async fn get_tour(&self, tour_id: i64) -> CoreResult<Option<Tour>>;
}
