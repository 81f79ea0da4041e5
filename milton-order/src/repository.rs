use async_trait::async_trait;
use chrono::{DateTime, Utc};
use milton_core::{ContactDetails, CoreResult};
use rust_decimal::Decimal;
use crate::models::Order;

/// Persistence port for orders and their lines.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn get(&self, order_id: i64) -> CoreResult<Option<Order>>;

    /// Inserts an empty open order and returns its id.
    async fn create(&self) -> CoreResult<i64>;

    /// Appends one line for `tour_id`. `NotFound` if the open order or the tour is missing.
    async fn add_tour(&self, order_id: i64, tour_id: i64) -> CoreResult<()>;

    /// Removes the oldest line for `tour_id`. `NotFound` if the order has none.
    async fn remove_tour(&self, order_id: i64, tour_id: i64) -> CoreResult<()>;

    /// Sets the quantity of the oldest line for `tour_id`.
    async fn set_quantity(&self, order_id: i64, tour_id: i64, qty: i32) -> CoreResult<()>;

    async fn update_total(&self, order_id: i64, total_cost: Decimal) -> CoreResult<()>;

    /// Returns `false` when there was nothing to delete.
    async fn delete(&self, order_id: i64) -> CoreResult<bool>;

    /// Marks the order submitted with the given contact, total and timestamp.
    /// Either every field is written or none is.
    async fn finalize(
        &self,
        order_id: i64,
        contact: &ContactDetails,
        total_cost: Decimal,
        timestamp: DateTime<Utc>,
    ) -> CoreResult<()>;
}
