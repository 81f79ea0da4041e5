use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A destination city. Managed by admin tooling, read-only here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub image: String,
}

/// A bookable tour run in exactly one city.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tour {
    pub id: i64,
    pub city_id: i64,
    pub name: String,
    pub description: String,
    pub image: String,
    /// Unit price, never negative.
    pub price: Decimal,
}
