//! Aggregated order model
//!
//! The User → Orders → Products tree built by folding legacy records.
//! All monetary values carry exactly two decimal places; the order total
//! is re-rounded after every product addition, not once at the end, so
//! rounding error can accumulate across a long product list. That is the
//! ledger format this service ingests and it is preserved exactly.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Decimal places kept on product values and order totals.
pub const VALUE_SCALE: u32 = 2;

/// Round a monetary value to the fixed two-decimal scale.
pub fn round_value(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(VALUE_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// A single product entry within an order. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub product_id: i64,
    pub value: Decimal,
}

/// One order under a user: its products in arrival order and the running
/// total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_id: i64,
    /// ISO date ("YYYY-MM-DD"), reformatted from the raw record date.
    pub date: String,
    pub products: Vec<Product>,
    pub total: Decimal,
}

impl Order {
    /// Open a new empty order, reformatting the raw "YYYYMMDD" date by
    /// inserting separators at fixed positions.
    pub fn open(order_id: i64, raw_date: &str) -> Self {
        let date = format!(
            "{}-{}-{}",
            &raw_date[0..4],
            &raw_date[4..6],
            &raw_date[6..8]
        );

        Self {
            order_id,
            date,
            products: Vec::new(),
            total: Decimal::ZERO,
        }
    }

    /// Append a product and fold its value into the running total.
    ///
    /// The product keeps the value rounded to two decimals; the total
    /// adds the raw value first and is rounded afterwards, on every call.
    pub fn add_product(&mut self, product_id: i64, value: Decimal) {
        self.products.push(Product {
            product_id,
            value: round_value(value),
        });
        self.total = round_value(self.total + value);
    }
}

/// A user and every order seen for them, in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub user_id: i64,
    pub user_name: String,
    pub orders: Vec<Order>,
}

impl User {
    /// Create a user with no orders yet. The name is trimmed of
    /// surrounding whitespace.
    pub fn new(user_id: i64, user_name: &str) -> Self {
        Self {
            user_id,
            user_name: user_name.trim().to_string(),
            orders: Vec::new(),
        }
    }

    /// Find an existing order by id.
    pub fn find_order(&self, order_id: i64) -> Option<&Order> {
        self.orders.iter().find(|o| o.order_id == order_id)
    }
}
