use std::sync::Arc;
use chrono::Utc;
use milton_core::{CheckoutForm, CoreError, CoreResult, FieldErrors, SessionContext};
use rust_decimal::Decimal;
use tracing::{info, warn};
use crate::basket::BasketService;
use crate::models::Order;
use crate::repository::OrderRepository;
use crate::totals::checkout_total;

#[derive(Debug)]
pub enum SubmitOutcome {
    Submitted { order_id: i64, total: Decimal },
    /// No basket, or a basket without tours. Nothing was changed.
    EmptyBasket,
    /// The contact form was rejected. Nothing was changed.
    Invalid(FieldErrors),
    /// Finalizing failed; the basket is still open and bound to the session.
    Failed(CoreError),
}

/// Turns an open basket into a submitted order.
#[derive(Clone)]
pub struct CheckoutService {
    orders: Arc<dyn OrderRepository>,
    basket: BasketService,
}

impl CheckoutService {
    pub fn new(orders: Arc<dyn OrderRepository>) -> Self {
        let basket = BasketService::new(orders.clone());
        Self { orders, basket }
    }

    /// The session's basket if it holds at least one tour.
    pub async fn ready(&self, session: &SessionContext) -> CoreResult<Option<Order>> {
        Ok(self.basket.current(session).await?.filter(|order| !order.is_empty()))
    }

    pub async fn submit(
        &self,
        session: &mut SessionContext,
        form: &CheckoutForm,
    ) -> CoreResult<SubmitOutcome> {
        let Some(order) = self.ready(session).await? else {
            return Ok(SubmitOutcome::EmptyBasket);
        };

        let contact = match form.validate() {
            Ok(contact) => contact,
            Err(CoreError::Validation(errors)) => return Ok(SubmitOutcome::Invalid(errors)),
            Err(e) => return Err(e),
        };

        let total = checkout_total(&order);
        if let Err(e) = self.orders.finalize(order.id, &contact, total, Utc::now()).await {
            warn!("There was an issue completing order {}: {}", order.id, e);
            return Ok(SubmitOutcome::Failed(e));
        }
        info!(
            "Order {} submitted by {} {} ({}), total {}",
            order.id, contact.first_name, contact.surname, contact.email, total
        );

        // A submitted order left behind reads as stale, so the session is released regardless.
        if let Err(e) = self.basket.discard(session, order.id).await {
            warn!("Submitted order {} could not be removed from the basket: {}", order.id, e);
        }
        session.clear_order_id();

        Ok(SubmitOutcome::Submitted { order_id: order.id, total })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryOrderRepository;
    use crate::repository::MockOrderRepository;
    use crate::models::OrderLine;
    use milton_catalog::{InMemoryCatalog, Tour};

    fn tour(id: i64, price: i64) -> Tour {
        Tour {
            id,
            city_id: 1,
            name: format!("Tour {}", id),
            description: String::new(),
            image: String::new(),
            price: Decimal::from(price),
        }
    }

    fn form() -> CheckoutForm {
        CheckoutForm {
            firstname: "Grace".into(),
            surname: "Hopper".into(),
            email: "grace@example.com".into(),
            phone: "07 3000 0000".into(),
        }
    }

    async fn setup() -> (Arc<InMemoryOrderRepository>, BasketService, CheckoutService) {
        let catalog = Arc::new(InMemoryCatalog::new());
        catalog.insert_tour(tour(1, 10)).await;
        catalog.insert_tour(tour(2, 5)).await;
        let orders = Arc::new(InMemoryOrderRepository::new(catalog));
        (orders.clone(), BasketService::new(orders.clone()), CheckoutService::new(orders))
    }

    #[tokio::test]
    async fn test_submit_uses_quantity_total_and_clears_session() {
        let (orders, basket, checkout) = setup().await;
        let mut session = SessionContext::fresh();
        basket.add_item(&mut session, 1).await;
        basket.add_item(&mut session, 2).await;
        basket.update_quantity(&mut session, 1, 2).await.unwrap();

        let outcome = checkout.submit(&mut session, &form()).await.unwrap();
        let SubmitOutcome::Submitted { total, .. } = outcome else {
            panic!("unexpected outcome: {:?}", outcome);
        };

        assert_eq!(total, Decimal::from(25));
        assert_eq!(session.order_id(), None);
        assert_eq!(orders.order_count().await, 0);
        assert!(basket.current(&session).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_empty_basket_is_rejected() {
        let (orders, basket, checkout) = setup().await;
        let mut session = SessionContext::fresh();

        let outcome = checkout.submit(&mut session, &form()).await.unwrap();
        assert!(matches!(outcome, SubmitOutcome::EmptyBasket));

        // A bound basket with zero tours is rejected too, and survives.
        basket.add_item(&mut session, 1).await;
        basket.remove_item(&mut session, 1).await.unwrap();
        let order_id = session.order_id().unwrap();

        let outcome = checkout.submit(&mut session, &form()).await.unwrap();
        assert!(matches!(outcome, SubmitOutcome::EmptyBasket));
        assert_eq!(session.order_id(), Some(order_id));
        let order = orders.get(order_id).await.unwrap().unwrap();
        assert!(order.is_open());
    }

    #[tokio::test]
    async fn test_invalid_form_changes_nothing() {
        let (orders, basket, checkout) = setup().await;
        let mut session = SessionContext::fresh();
        basket.add_item(&mut session, 1).await;
        let order_id = session.order_id().unwrap();

        let mut bad = form();
        bad.email = "not-an-email".into();
        let outcome = checkout.submit(&mut session, &bad).await.unwrap();

        assert!(matches!(outcome, SubmitOutcome::Invalid(ref errors) if errors.has("email")));
        let order = orders.get(order_id).await.unwrap().unwrap();
        assert!(order.is_open());
        assert_eq!(session.order_id(), Some(order_id));
    }

    #[tokio::test]
    async fn test_finalize_failure_keeps_basket_open() {
        let mut orders = MockOrderRepository::new();
        orders.expect_get().returning(|id| {
            let mut order = Order::new(id);
            order.lines.push(OrderLine::new(1, tour(1, 10)));
            Ok(Some(order))
        });
        orders
            .expect_finalize()
            .times(1)
            .returning(|_, _, _, _| Err(CoreError::persistence("commit failed")));
        orders.expect_delete().never();

        let checkout = CheckoutService::new(Arc::new(orders));
        let mut session = SessionContext::fresh();
        session.set_order_id(12);

        let outcome = checkout.submit(&mut session, &form()).await.unwrap();
        assert!(matches!(outcome, SubmitOutcome::Failed(CoreError::Persistence(_))));
        assert_eq!(session.order_id(), Some(12));
    }

    #[tokio::test]
    async fn test_cleanup_failure_still_reports_success() {
        let mut orders = MockOrderRepository::new();
        orders.expect_get().returning(|id| {
            let mut order = Order::new(id);
            order.lines.push(OrderLine::new(1, tour(1, 10)));
            Ok(Some(order))
        });
        orders.expect_finalize().returning(|_, _, _, _| Ok(()));
        orders
            .expect_delete()
            .returning(|_| Err(CoreError::persistence("connection reset")));

        let checkout = CheckoutService::new(Arc::new(orders));
        let mut session = SessionContext::fresh();
        session.set_order_id(12);

        let outcome = checkout.submit(&mut session, &form()).await.unwrap();
        assert!(matches!(outcome, SubmitOutcome::Submitted { order_id: 12, .. }));
        assert_eq!(session.order_id(), None);
    }
}
