pub mod models;
pub mod totals;
pub mod repository;
pub mod memory;
pub mod basket;
pub mod checkout;

pub use models::{Order, OrderLine, OrderStatus};
pub use totals::{browsing_total, checkout_total};
pub use repository::OrderRepository;
pub use memory::InMemoryOrderRepository;
pub use basket::{
    AddItemOutcome, BasketService, EmptyBasketOutcome, RemoveItemOutcome, UpdateQuantityOutcome,
};
pub use checkout::{CheckoutService, SubmitOutcome};
