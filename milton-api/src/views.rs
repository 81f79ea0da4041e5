use milton_order::Order;
use rust_decimal::Decimal;
use serde::Serialize;

/// Basket as shown to the visitor.
#[derive(Debug, Serialize)]
pub struct OrderSummary {
    pub order_id: i64,
    pub lines: Vec<LineSummary>,
    pub total_cost: Decimal,
}

#[derive(Debug, Serialize)]
pub struct LineSummary {
    pub tour_id: i64,
    pub name: String,
    pub price: Decimal,
    pub qty: i32,
}

impl From<&Order> for OrderSummary {
    fn from(order: &Order) -> Self {
        OrderSummary {
            order_id: order.id,
            lines: order
                .lines
                .iter()
                .map(|line| LineSummary {
                    tour_id: line.tour.id,
                    name: line.tour.name.clone(),
                    price: line.tour.price,
                    qty: line.qty,
                })
                .collect(),
            total_cost: order.total_cost,
        }
    }
}
