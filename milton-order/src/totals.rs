//! The two order total formulas.
//!
//! The basket shows the sum of unit prices; a submitted order records the
//! quantity-weighted sum.

use rust_decimal::Decimal;
use crate::models::Order;

/// Basket total: sum of each line's unit price. Quantity is ignored.
pub fn browsing_total(order: &Order) -> Decimal {
    order.lines.iter().map(|line| line.tour.price).sum()
}

/// Submission total: sum of `price * qty` over all lines.
pub fn checkout_total(order: &Order) -> Decimal {
    order
        .lines
        .iter()
        .map(|line| line.tour.price * Decimal::from(line.qty))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OrderLine;
    use milton_catalog::Tour;

    fn line(id: i64, price: i64, qty: i32) -> OrderLine {
        OrderLine {
            id,
            tour: Tour {
                id,
                city_id: 1,
                name: format!("Tour {}", id),
                description: String::new(),
                image: String::new(),
                price: Decimal::from(price),
            },
            qty,
        }
    }

    #[test]
    fn test_totals_diverge_on_quantity() {
        let mut order = Order::new(1);
        order.lines = vec![line(1, 10, 2), line(2, 5, 1)];

        assert_eq!(browsing_total(&order), Decimal::from(15));
        assert_eq!(checkout_total(&order), Decimal::from(25));
    }

    #[test]
    fn test_empty_order_totals_zero() {
        let order = Order::new(1);
        assert_eq!(browsing_total(&order), Decimal::ZERO);
        assert_eq!(checkout_total(&order), Decimal::ZERO);
    }

    #[test]
    fn test_decimal_prices_are_exact() {
        let mut order = Order::new(1);
        let mut first = line(1, 0, 3);
        first.tour.price = Decimal::new(1999, 2);
        order.lines = vec![first];

        assert_eq!(browsing_total(&order), Decimal::new(1999, 2));
        assert_eq!(checkout_total(&order), Decimal::new(5997, 2));
    }
}
