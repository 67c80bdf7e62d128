//! Order records and the list projection served to the dashboard.

use chrono::{DateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, Serializer};

use super::{OrderId, OrderStatus};

/// A single line item on an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    /// Product name.
    pub name: String,
    /// Units ordered.
    pub quantity: u32,
    /// Unit price.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

impl OrderItem {
    /// Price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// The persisted shape of the `items` column: `{ "items": [...] }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItems {
    pub items: Vec<OrderItem>,
}

impl OrderItems {
    /// Sum of all line totals, rounded to cents.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.items
            .iter()
            .map(OrderItem::line_total)
            .sum::<Decimal>()
            .round_dp(2)
    }
}

/// A full order record as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub customer_name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub order_amount: Decimal,
    pub status: OrderStatus,
    pub items: OrderItems,
    #[serde(serialize_with = "serialize_iso_millis")]
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// The list projection of this order.
    #[must_use]
    pub fn summary(&self) -> OrderSummary {
        OrderSummary {
            id: self.id,
            customer_name: self.customer_name.clone(),
            order_amount: self.order_amount,
            status: self.status,
            created_at: self.created_at,
        }
    }
}

/// One row of the orders list.
///
/// This is the projection returned by the list endpoint; line items are not
/// part of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub id: OrderId,
    pub customer_name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub order_amount: Decimal,
    pub status: OrderStatus,
    #[serde(serialize_with = "serialize_iso_millis")]
    pub created_at: DateTime<Utc>,
}

/// Serialize a timestamp the way browsers print `Date#toISOString`.
fn serialize_iso_millis<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
}
