use axum::{http::StatusCode, routing::get, Router};
use tower_http::trace::TraceLayer;

pub mod basket;
pub mod catalog;
pub mod checkout;
pub mod error;
pub mod session;
pub mod state;
pub mod views;

pub use error::AppError;
pub use state::AppState;

pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(catalog::routes())
        .merge(basket::routes())
        .merge(checkout::routes())
        .route("/health", get(health))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn not_found() -> AppError {
    AppError::NotFoundError("Page not found".to_string())
}
