use std::sync::Arc;
use milton_core::{CoreError, CoreResult, FieldErrors, SessionContext};
use rust_decimal::Decimal;
use tracing::{error, info, warn};
use crate::models::Order;
use crate::repository::OrderRepository;
use crate::totals::browsing_total;

#[derive(Debug)]
pub enum AddItemOutcome {
    Added { order_id: i64, total: Decimal },
    /// No basket could be created. Logged only; the visitor sees no message.
    NoBasket,
    /// The tour could not be added; shown to the visitor as a warning.
    Warning(CoreError),
}

#[derive(Debug, PartialEq)]
pub enum RemoveItemOutcome {
    Removed { order_id: i64, total: Decimal },
    NothingToDelete,
}

#[derive(Debug, PartialEq)]
pub enum UpdateQuantityOutcome {
    Updated { order_id: i64, qty: i32 },
    NothingToDelete,
}

#[derive(Debug)]
pub enum EmptyBasketOutcome {
    Emptied { order_id: i64 },
    NothingToDelete,
    Warning(CoreError),
}

/// Binds a session to an open order and applies basket edits to it.
///
/// Adding is forgiving: every failure becomes an [`AddItemOutcome`].
/// Removing and re-quantifying return `Err` on repository failure, which the
/// HTTP layer turns into an internal error page.
#[derive(Clone)]
pub struct BasketService {
    orders: Arc<dyn OrderRepository>,
}

impl BasketService {
    pub fn new(orders: Arc<dyn OrderRepository>) -> Self {
        Self { orders }
    }

    /// The open order bound to this session, if any.
    ///
    /// An id that no longer resolves, or that points at a submitted order,
    /// is stale and reads as "no basket".
    pub async fn current(&self, session: &SessionContext) -> CoreResult<Option<Order>> {
        let Some(order_id) = session.order_id() else {
            return Ok(None);
        };

        match self.open_order(order_id).await {
            Ok(order) => Ok(Some(order)),
            Err(e @ CoreError::StaleSession(_)) => {
                warn!("{}; treating as no basket", e);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// `StaleSession` when the id is gone or the order was already submitted.
    async fn open_order(&self, order_id: i64) -> CoreResult<Order> {
        match self.orders.get(order_id).await? {
            Some(order) if order.is_open() => Ok(order),
            _ => Err(CoreError::StaleSession(order_id)),
        }
    }

    /// Returns the bound order id, creating and binding a new order when the
    /// session has none. A failed create is logged and yields `None`.
    pub async fn ensure_basket(&self, session: &mut SessionContext) -> CoreResult<Option<i64>> {
        if let Some(order) = self.current(session).await? {
            return Ok(Some(order.id));
        }

        match self.orders.create().await {
            Ok(order_id) => {
                session.set_order_id(order_id);
                info!("Created basket order {} for session {}", order_id, session.id());
                Ok(Some(order_id))
            }
            Err(e) => {
                warn!("Failed trying to create a new order: {}", e);
                Ok(None)
            }
        }
    }

    pub async fn add_item(&self, session: &mut SessionContext, tour_id: i64) -> AddItemOutcome {
        let order_id = match self.ensure_basket(session).await {
            Ok(Some(order_id)) => order_id,
            Ok(None) => return AddItemOutcome::NoBasket,
            Err(e) => {
                warn!("Basket lookup failed while adding tour {}: {}", tour_id, e);
                return AddItemOutcome::Warning(e);
            }
        };

        if let Err(e) = self.orders.add_tour(order_id, tour_id).await {
            warn!("Could not add tour {} to order {}: {}", tour_id, order_id, e);
            return AddItemOutcome::Warning(e);
        }

        match self.refresh_total(order_id).await {
            Ok(total) => AddItemOutcome::Added { order_id, total },
            Err(e) => {
                warn!("Could not update total of order {}: {}", order_id, e);
                AddItemOutcome::Warning(e)
            }
        }
    }

    pub async fn remove_item(
        &self,
        session: &mut SessionContext,
        tour_id: i64,
    ) -> CoreResult<RemoveItemOutcome> {
        let Some(order) = self.current(session).await? else {
            return Ok(RemoveItemOutcome::NothingToDelete);
        };

        self.orders.remove_tour(order.id, tour_id).await.map_err(|e| {
            error!("Something went wrong removing tour {} from order {}: {}", tour_id, order.id, e);
            e
        })?;

        let total = self.refresh_total(order.id).await?;
        Ok(RemoveItemOutcome::Removed { order_id: order.id, total })
    }

    pub async fn update_quantity(
        &self,
        session: &mut SessionContext,
        tour_id: i64,
        qty: i32,
    ) -> CoreResult<UpdateQuantityOutcome> {
        if qty < 1 {
            let mut errors = FieldErrors::default();
            errors.push("qty", "Must be at least 1");
            return Err(CoreError::Validation(errors));
        }

        let Some(order) = self.current(session).await? else {
            return Ok(UpdateQuantityOutcome::NothingToDelete);
        };

        self.orders.set_quantity(order.id, tour_id, qty).await.map_err(|e| {
            error!("Could not set quantity of tour {} in order {}: {}", tour_id, order.id, e);
            e
        })?;

        Ok(UpdateQuantityOutcome::Updated { order_id: order.id, qty })
    }

    pub async fn empty_basket(&self, session: &mut SessionContext) -> EmptyBasketOutcome {
        let order = match self.current(session).await {
            Ok(Some(order)) => order,
            Ok(None) => return EmptyBasketOutcome::NothingToDelete,
            Err(e) => return EmptyBasketOutcome::Warning(e),
        };

        match self.discard(session, order.id).await {
            Ok(true) => EmptyBasketOutcome::Emptied { order_id: order.id },
            Ok(false) => EmptyBasketOutcome::NothingToDelete,
            Err(e) => {
                warn!("An error occurred while deleting order {}: {}", order.id, e);
                EmptyBasketOutcome::Warning(e)
            }
        }
    }

    /// Deletes `order_id` and unbinds it from the session, whatever its status.
    pub(crate) async fn discard(
        &self,
        session: &mut SessionContext,
        order_id: i64,
    ) -> CoreResult<bool> {
        let deleted = self.orders.delete(order_id).await?;
        if deleted {
            session.clear_order_id();
            info!("Deleted order {}", order_id);
        }
        Ok(deleted)
    }

    async fn refresh_total(&self, order_id: i64) -> CoreResult<Decimal> {
        let order = self
            .orders
            .get(order_id)
            .await?
            .ok_or_else(|| CoreError::not_found(format!("order {}", order_id)))?;
        let total = browsing_total(&order);
        self.orders.update_total(order_id, total).await?;
        Ok(total)
    }
}
