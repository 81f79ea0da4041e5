use chrono::{DateTime, Utc};
use milton_catalog::Tour;
use milton_core::ContactDetails;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Quantity given to a line when a tour is first put in the basket.
pub const DEFAULT_LINE_QTY: i32 = 1;

/// Order status in the lifecycle. Persisted as a boolean `status` column.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Still a basket; the visitor can change it.
    Open,
    /// Contact details captured, totals frozen.
    Submitted,
}

impl OrderStatus {
    pub fn from_flag(submitted: bool) -> Self {
        if submitted {
            OrderStatus::Submitted
        } else {
            OrderStatus::Open
        }
    }

    pub fn as_flag(self) -> bool {
        matches!(self, OrderStatus::Submitted)
    }
}

/// A visitor's order. While `Open` it is what the site calls the basket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub status: OrderStatus,
    pub contact: ContactDetails,
    pub total_cost: Decimal,
    /// Creation time, replaced by the submission time at checkout.
    pub date: DateTime<Utc>,
    pub lines: Vec<OrderLine>,
}

impl Order {
    pub fn new(id: i64) -> Self {
        Self {
            id,
            status: OrderStatus::Open,
            contact: ContactDetails::default(),
            total_cost: Decimal::ZERO,
            date: Utc::now(),
            lines: Vec::new(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.status == OrderStatus::Open
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn contains_tour(&self, tour_id: i64) -> bool {
        self.lines.iter().any(|line| line.tour.id == tour_id)
    }
}

/// One tour placed in an order, with its own quantity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLine {
    pub id: i64,
    pub tour: Tour,
    pub qty: i32,
}

impl OrderLine {
    pub fn new(id: i64, tour: Tour) -> Self {
        Self { id, tour, qty: DEFAULT_LINE_QTY }
    }
}
