//! Page assembly and the list endpoint's response envelope.

use serde::{Deserialize, Serialize};

use super::cursor::{Cursor, CursorError};
use super::sort::{SortColumn, SortDirection, SortOrder};
use crate::types::OrderSummary;

/// One page cut from a lookahead fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub rows: Vec<OrderSummary>,
    pub next_cursor: Option<Cursor>,
    pub has_next_page: bool,
}

impl Page {
    /// Build a page from up to `limit + 1` rows in sort order.
    ///
    /// Receiving more than `limit` rows means another page exists; the extra row
    /// is dropped and the cursor points after the last row kept.
    #[must_use]
    pub fn from_lookahead(mut rows: Vec<OrderSummary>, limit: u32, sort: SortOrder) -> Self {
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        let has_next_page = rows.len() > limit;
        rows.truncate(limit);

        let next_cursor = if has_next_page {
            rows.last().map(|row| Cursor::after(row, sort))
        } else {
            None
        };

        Self {
            rows,
            has_next_page: next_cursor.is_some(),
            next_cursor,
        }
    }

    /// Wrap the page in the wire envelope.
    ///
    /// # Errors
    ///
    /// Returns `CursorError` if the next cursor cannot be encoded.
    pub fn into_response(
        self,
        sort: SortOrder,
        total_count: u64,
        responded_at_ms: i64,
    ) -> Result<OrdersResponse, CursorError> {
        let next_cursor = self.next_cursor.as_ref().map(Cursor::encode).transpose()?;

        Ok(OrdersResponse {
            data: self.rows,
            next_cursor,
            has_next_page: self.has_next_page,
            total_count,
            metadata: ResponseMetadata {
                sort_by: sort.column,
                sort_direction: sort.direction,
                response_time: responded_at_ms,
            },
        })
    }
}

/// Response body of `GET /api/orders`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrdersResponse {
    pub data: Vec<OrderSummary>,
    pub next_cursor: Option<String>,
    pub has_next_page: bool,
    pub total_count: u64,
    pub metadata: ResponseMetadata,
}

impl OrdersResponse {
    /// The sort key this page was served under.
    #[must_use]
    pub const fn sort(&self) -> SortOrder {
        SortOrder::new(self.metadata.sort_by, self.metadata.sort_direction)
    }
}

/// Echo of the effective sort plus the server timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMetadata {
    pub sort_by: SortColumn,
    pub sort_direction: SortDirection,
    /// Server clock when the page was produced, in epoch milliseconds.
    pub response_time: i64,
}

/// Error body: `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};
    use rust_decimal::Decimal;

    use super::*;
    use crate::types::{OrderId, OrderStatus};

    fn rows(n: u128) -> Vec<OrderSummary> {
        let base = Utc
            .with_ymd_and_hms(2025, 6, 1, 0, 0, 0)
            .single()
            .expect("valid timestamp");
        (1..=n)
            .map(|i| OrderSummary {
                id: OrderId::new(uuid::Uuid::from_u128(i)),
                customer_name: format!("Customer {i}"),
                order_amount: Decimal::new(i64::try_from(i).expect("small") * 100, 2),
                status: OrderStatus::Pending,
                created_at: base - Duration::minutes(i64::try_from(i).expect("small")),
            })
            .collect()
    }

    #[test]
    fn test_lookahead_row_signals_next_page() {
        let sort = SortOrder::default();
        let page = Page::from_lookahead(rows(11), 10, sort);

        assert_eq!(page.rows.len(), 10);
        assert!(page.has_next_page);
        let cursor = page.next_cursor.expect("cursor");
        assert_eq!(cursor.position(), sort.position_of(&page.rows[9]));
    }

    #[test]
    fn test_short_fetch_is_last_page() {
        let page = Page::from_lookahead(rows(10), 10, SortOrder::default());

        assert_eq!(page.rows.len(), 10);
        assert!(!page.has_next_page);
        assert!(page.next_cursor.is_none());
    }

    #[test]
    fn test_empty_fetch() {
        let page = Page::from_lookahead(Vec::new(), 10, SortOrder::default());

        assert!(page.rows.is_empty());
        assert!(!page.has_next_page);
        assert!(page.next_cursor.is_none());
    }

    #[test]
    fn test_response_envelope_shape() {
        let sort = SortOrder::new(SortColumn::OrderAmount, SortDirection::Asc);
        let response = Page::from_lookahead(rows(3), 2, sort)
            .into_response(sort, 3, 7)
            .expect("envelope");

        let json = serde_json::to_value(&response).expect("serialize");
        assert_eq!(json["data"].as_array().map(Vec::len), Some(2));
        assert!(json["nextCursor"].is_string());
        assert_eq!(json["hasNextPage"], true);
        assert_eq!(json["totalCount"], 3);
        assert_eq!(json["metadata"]["sortBy"], "orderAmount");
        assert_eq!(json["metadata"]["sortDirection"], "asc");
        assert_eq!(json["metadata"]["responseTime"], 7);
    }

    #[test]
    fn test_last_page_serializes_null_cursor() {
        let sort = SortOrder::default();
        let response = Page::from_lookahead(rows(1), 5, sort)
            .into_response(sort, 1, 0)
            .expect("envelope");

        let json = serde_json::to_value(&response).expect("serialize");
        assert!(json["nextCursor"].is_null());
        assert_eq!(json["hasNextPage"], false);
    }

    #[test]
    fn test_error_body() {
        let json = serde_json::to_string(&ErrorBody::new("Failed to fetch orders")).expect("json");
        assert_eq!(json, r#"{"error":"Failed to fetch orders"}"#);
    }
}
