use std::sync::Arc;
use milton_catalog::CatalogRepository;
use milton_core::SessionStore;
use milton_order::{BasketService, CheckoutService, OrderRepository};

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn CatalogRepository>,
    pub sessions: Arc<dyn SessionStore>,
    pub basket: BasketService,
    pub checkout: CheckoutService,
    pub cookie_name: String,
}

impl AppState {
    pub fn new(
        catalog: Arc<dyn CatalogRepository>,
        orders: Arc<dyn OrderRepository>,
        sessions: Arc<dyn SessionStore>,
        cookie_name: impl Into<String>,
    ) -> Self {
        Self {
            catalog,
            sessions,
            basket: BasketService::new(orders.clone()),
            checkout: CheckoutService::new(orders),
            cookie_name: cookie_name.into(),
        }
    }
}
