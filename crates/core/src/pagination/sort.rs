//! Sort model for the orders list.
//!
//! Every listing is ordered by `(column direction, id asc)`. The id tie-break
//! makes the order total even when the sort column has duplicate values, which
//! is what makes cursor pagination deterministic.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{OrderId, OrderSummary};

/// Error returned when a sort column name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown sort column: {0}")]
pub struct UnknownSortColumn(pub String);

/// Error returned when a sort direction is neither `asc` nor `desc`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid sort direction: {0}")]
pub struct InvalidSortDirection(pub String);

/// A column the orders list can be sorted by.
///
/// Wire names are camelCase (`customerName`, `createdAt`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum SortColumn {
    Id,
    CustomerName,
    OrderAmount,
    Status,
    #[default]
    CreatedAt,
}

impl SortColumn {
    /// Every sortable column.
    pub const ALL: [Self; 5] = [
        Self::Id,
        Self::CustomerName,
        Self::OrderAmount,
        Self::Status,
        Self::CreatedAt,
    ];

    /// The wire name of the column.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::CustomerName => "customerName",
            Self::OrderAmount => "orderAmount",
            Self::Status => "status",
            Self::CreatedAt => "createdAt",
        }
    }

    /// Extract this column's value from a row.
    #[must_use]
    pub fn key_of(&self, row: &OrderSummary) -> SortValue {
        match self {
            Self::Id => SortValue::Id(row.id),
            Self::CustomerName => SortValue::Text(row.customer_name.clone()),
            Self::OrderAmount => SortValue::Amount(row.order_amount),
            Self::Status => SortValue::Text(row.status.as_str().to_string()),
            Self::CreatedAt => SortValue::Timestamp(row.created_at),
        }
    }

    /// Whether `value` has the type this column produces.
    #[must_use]
    pub const fn accepts(&self, value: &SortValue) -> bool {
        matches!(
            (self, value),
            (Self::Id, SortValue::Id(_))
                | (Self::CustomerName | Self::Status, SortValue::Text(_))
                | (Self::OrderAmount, SortValue::Amount(_))
                | (Self::CreatedAt, SortValue::Timestamp(_))
        )
    }

    /// Compare two rows on this column only, ascending.
    fn compare_rows(self, a: &OrderSummary, b: &OrderSummary) -> Ordering {
        match self {
            Self::Id => a.id.cmp(&b.id),
            Self::CustomerName => a.customer_name.cmp(&b.customer_name),
            Self::OrderAmount => a.order_amount.cmp(&b.order_amount),
            Self::Status => a.status.as_str().cmp(b.status.as_str()),
            Self::CreatedAt => a.created_at.cmp(&b.created_at),
        }
    }
}

impl std::fmt::Display for SortColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SortColumn {
    type Err = UnknownSortColumn;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|column| column.as_str() == s)
            .ok_or_else(|| UnknownSortColumn(s.to_string()))
    }
}

/// Sort direction for the primary column. The id tie-break is always ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    /// The wire name of the direction.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    /// Apply this direction to an ascending comparison.
    #[must_use]
    pub const fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Asc => ordering,
            Self::Desc => ordering.reverse(),
        }
    }
}

impl std::fmt::Display for SortDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SortDirection {
    type Err = InvalidSortDirection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(InvalidSortDirection(s.to_string())),
        }
    }
}

/// A complete sort key: column plus direction.
///
/// This is also the query key of the list controller: changing it restarts
/// pagination from the first page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SortOrder {
    pub column: SortColumn,
    pub direction: SortDirection,
}

impl SortOrder {
    /// Create a sort order.
    #[must_use]
    pub const fn new(column: SortColumn, direction: SortDirection) -> Self {
        Self { column, direction }
    }

    /// The sort order a column header click produces.
    ///
    /// Clicking the column that is currently sorted descending flips it to
    /// ascending; any other click sorts that column descending.
    #[must_use]
    pub fn toggled(self, column: SortColumn) -> Self {
        let direction = if self.column == column && self.direction == SortDirection::Desc {
            SortDirection::Asc
        } else {
            SortDirection::Desc
        };
        Self { column, direction }
    }

    /// Total order over rows: `(column direction, id asc)`.
    #[must_use]
    pub fn compare(&self, a: &OrderSummary, b: &OrderSummary) -> Ordering {
        self.direction
            .apply(self.column.compare_rows(a, b))
            .then_with(|| a.id.cmp(&b.id))
    }

    /// The seek position of a row under this order.
    #[must_use]
    pub fn position_of(&self, row: &OrderSummary) -> SeekPosition {
        SeekPosition {
            key: self.column.key_of(row),
            id: row.id,
        }
    }

    /// Whether `row` comes strictly after `position` under this order.
    #[must_use]
    pub fn is_after(&self, row: &OrderSummary, position: &SeekPosition) -> bool {
        let key = self.column.key_of(row);
        self.direction
            .apply(key.cmp(&position.key))
            .then_with(|| row.id.cmp(&position.id))
            == Ordering::Greater
    }
}

/// The value of a sort column, as carried inside a cursor.
///
/// Values of different variants never meet in practice: cursors are validated
/// against their column before use.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum SortValue {
    Id(OrderId),
    Text(String),
    Amount(Decimal),
    Timestamp(DateTime<Utc>),
}

/// A position in a sorted listing: the last row's sort value and id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SeekPosition {
    pub key: SortValue,
    pub id: OrderId,
}
