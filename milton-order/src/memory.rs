use std::collections::HashMap;
use std::sync::Arc;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use milton_catalog::CatalogRepository;
use milton_core::{ContactDetails, CoreError, CoreResult, FieldErrors};
use rust_decimal::Decimal;
use tokio::sync::RwLock;
use crate::models::{Order, OrderLine, OrderStatus, DEFAULT_LINE_QTY};
use crate::repository::OrderRepository;

#[derive(Debug, Clone)]
struct StoredLine {
    id: i64,
    tour_id: i64,
    qty: i32,
}

#[derive(Debug, Clone)]
struct StoredOrder {
    status: OrderStatus,
    contact: ContactDetails,
    total_cost: Decimal,
    date: DateTime<Utc>,
    lines: Vec<StoredLine>,
}

#[derive(Default)]
struct State {
    orders: HashMap<i64, StoredOrder>,
    last_order_id: i64,
    last_line_id: i64,
}

/// Keeps orders in a HashMap; tours are resolved through the catalog on
/// every read so line prices stay live.
pub struct InMemoryOrderRepository {
    catalog: Arc<dyn CatalogRepository>,
    state: RwLock<State>,
}

impl InMemoryOrderRepository {
    pub fn new(catalog: Arc<dyn CatalogRepository>) -> Self {
        Self {
            catalog,
            state: RwLock::new(State::default()),
        }
    }

    pub async fn order_count(&self) -> usize {
        self.state.read().await.orders.len()
    }
}

fn order_not_found(order_id: i64) -> CoreError {
    CoreError::not_found(format!("order {}", order_id))
}

fn line_not_found(order_id: i64, tour_id: i64) -> CoreError {
    CoreError::not_found(format!("tour {} in order {}", tour_id, order_id))
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn get(&self, order_id: i64) -> CoreResult<Option<Order>> {
        let stored = match self.state.read().await.orders.get(&order_id) {
            Some(stored) => stored.clone(),
            None => return Ok(None),
        };

        let mut lines = Vec::with_capacity(stored.lines.len());
        for line in &stored.lines {
            // Tours deleted from the catalog drop out of the order, like a cascade.
            if let Some(tour) = self.catalog.get_tour(line.tour_id).await? {
                lines.push(OrderLine { id: line.id, tour, qty: line.qty });
            }
        }

        Ok(Some(Order {
            id: order_id,
            status: stored.status,
            contact: stored.contact,
            total_cost: stored.total_cost,
            date: stored.date,
            lines,
        }))
    }

    async fn create(&self) -> CoreResult<i64> {
        let mut state = self.state.write().await;
        state.last_order_id += 1;
        let id = state.last_order_id;
        let order = Order::new(id);
        state.orders.insert(id, StoredOrder {
            status: order.status,
            contact: order.contact,
            total_cost: order.total_cost,
            date: order.date,
            lines: Vec::new(),
        });
        Ok(id)
    }

    async fn add_tour(&self, order_id: i64, tour_id: i64) -> CoreResult<()> {
        if self.catalog.get_tour(tour_id).await?.is_none() {
            return Err(CoreError::not_found(format!("tour {}", tour_id)));
        }

        let mut state = self.state.write().await;
        state.last_line_id += 1;
        let line_id = state.last_line_id;
        let order = state
            .orders
            .get_mut(&order_id)
            .filter(|order| order.status == OrderStatus::Open)
            .ok_or_else(|| order_not_found(order_id))?;

        order.lines.push(StoredLine { id: line_id, tour_id, qty: DEFAULT_LINE_QTY });
        Ok(())
    }

    async fn remove_tour(&self, order_id: i64, tour_id: i64) -> CoreResult<()> {
        let mut state = self.state.write().await;
        let order = state
            .orders
            .get_mut(&order_id)
            .filter(|order| order.status == OrderStatus::Open)
            .ok_or_else(|| order_not_found(order_id))?;

        let index = order
            .lines
            .iter()
            .position(|line| line.tour_id == tour_id)
            .ok_or_else(|| line_not_found(order_id, tour_id))?;
        order.lines.remove(index);
        Ok(())
    }

    async fn set_quantity(&self, order_id: i64, tour_id: i64, qty: i32) -> CoreResult<()> {
        if qty < 1 {
            let mut errors = FieldErrors::default();
            errors.push("qty", "Must be at least 1");
            return Err(CoreError::Validation(errors));
        }

        let mut state = self.state.write().await;
        let order = state
            .orders
            .get_mut(&order_id)
            .filter(|order| order.status == OrderStatus::Open)
            .ok_or_else(|| order_not_found(order_id))?;

        let line = order
            .lines
            .iter_mut()
            .find(|line| line.tour_id == tour_id)
            .ok_or_else(|| line_not_found(order_id, tour_id))?;
        line.qty = qty;
        Ok(())
    }

    async fn update_total(&self, order_id: i64, total_cost: Decimal) -> CoreResult<()> {
        let mut state = self.state.write().await;
        let order = state
            .orders
            .get_mut(&order_id)
            .filter(|order| order.status == OrderStatus::Open)
            .ok_or_else(|| order_not_found(order_id))?;
        order.total_cost = total_cost;
        Ok(())
    }

    async fn delete(&self, order_id: i64) -> CoreResult<bool> {
        Ok(self.state.write().await.orders.remove(&order_id).is_some())
    }

    async fn finalize(
        &self,
        order_id: i64,
        contact: &ContactDetails,
        total_cost: Decimal,
        timestamp: DateTime<Utc>,
    ) -> CoreResult<()> {
        let mut state = self.state.write().await;
        let order = state
            .orders
            .get_mut(&order_id)
            .filter(|order| order.status == OrderStatus::Open)
            .ok_or_else(|| order_not_found(order_id))?;

        order.status = OrderStatus::Submitted;
        order.contact = contact.clone();
        order.total_cost = total_cost;
        order.date = timestamp;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use milton_catalog::{InMemoryCatalog, Tour};
    use milton_shared::Masked;

    async fn repo_with_tours() -> (Arc<InMemoryCatalog>, InMemoryOrderRepository) {
        let catalog = Arc::new(InMemoryCatalog::new());
        for (id, price) in [(1, 10), (2, 5)] {
            catalog
                .insert_tour(Tour {
                    id,
                    city_id: 1,
                    name: format!("Tour {}", id),
                    description: String::new(),
                    image: String::new(),
                    price: Decimal::from(price),
                })
                .await;
        }
        let repo = InMemoryOrderRepository::new(catalog.clone());
        (catalog, repo)
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let (_, repo) = repo_with_tours().await;
        let id = repo.create().await.unwrap();

        let order = repo.get(id).await.unwrap().unwrap();
        assert_eq!(order.id, id);
        assert!(order.is_open());
        assert!(order.is_empty());
        assert!(repo.get(id + 1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_add_tour_rejects_unknown_ids() {
        let (_, repo) = repo_with_tours().await;
        let id = repo.create().await.unwrap();

        assert!(matches!(repo.add_tour(id, 99).await, Err(CoreError::NotFound(_))));
        assert!(matches!(repo.add_tour(id + 1, 1).await, Err(CoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_remove_takes_one_occurrence() {
        let (_, repo) = repo_with_tours().await;
        let id = repo.create().await.unwrap();
        repo.add_tour(id, 1).await.unwrap();
        repo.add_tour(id, 1).await.unwrap();

        repo.remove_tour(id, 1).await.unwrap();
        assert_eq!(repo.get(id).await.unwrap().unwrap().lines.len(), 1);

        repo.remove_tour(id, 1).await.unwrap();
        assert!(matches!(repo.remove_tour(id, 1).await, Err(CoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_quantity_is_per_order() {
        let (_, repo) = repo_with_tours().await;
        let first = repo.create().await.unwrap();
        let second = repo.create().await.unwrap();
        repo.add_tour(first, 1).await.unwrap();
        repo.add_tour(second, 1).await.unwrap();

        repo.set_quantity(first, 1, 4).await.unwrap();
        repo.remove_tour(second, 1).await.unwrap();

        let first = repo.get(first).await.unwrap().unwrap();
        assert_eq!(first.lines[0].qty, 4);
        assert!(matches!(repo.set_quantity(second, 1, 2).await, Err(CoreError::NotFound(_))));
        assert!(matches!(repo.set_quantity(first.id, 1, 0).await, Err(CoreError::Validation(_))));
    }

    #[tokio::test]
    async fn test_reads_live_prices() {
        let (catalog, repo) = repo_with_tours().await;
        let id = repo.create().await.unwrap();
        repo.add_tour(id, 2).await.unwrap();

        catalog.set_price(2, Decimal::from(7)).await;
        let order = repo.get(id).await.unwrap().unwrap();
        assert_eq!(order.lines[0].tour.price, Decimal::from(7));
    }

    #[tokio::test]
    async fn test_finalize_freezes_order() {
        let (_, repo) = repo_with_tours().await;
        let id = repo.create().await.unwrap();
        repo.add_tour(id, 1).await.unwrap();

        let contact = ContactDetails {
            first_name: "Ada".into(),
            surname: "Lovelace".into(),
            email: Masked("ada@example.com".into()),
            phone: Masked("0400 000 000".into()),
        };
        let at = Utc::now();
        repo.finalize(id, &contact, Decimal::from(10), at).await.unwrap();

        let order = repo.get(id).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Submitted);
        assert_eq!(order.contact, contact);
        assert_eq!(order.date, at);

        // Submitted orders no longer accept basket changes.
        assert!(repo.add_tour(id, 2).await.is_err());
        assert!(repo.finalize(id, &contact, Decimal::ZERO, at).await.is_err());
    }

    #[tokio::test]
    async fn test_delete_reports_nothing_to_delete() {
        let (_, repo) = repo_with_tours().await;
        let id = repo.create().await.unwrap();

        assert!(repo.delete(id).await.unwrap());
        assert!(!repo.delete(id).await.unwrap());
        assert_eq!(repo.order_count().await, 0);
    }
}
