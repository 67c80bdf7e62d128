//! Query parameters of the orders list endpoint and their validation.
//!
//! Raw parameters arrive as optional strings so that junk input reaches this
//! module instead of failing inside the HTTP extractor. Validation rules:
//!
//! - `limit`: missing, empty, non-numeric, zero or negative falls back to the
//!   default page size; values above the maximum are clamped to it.
//! - `sortBy`: missing or empty means `createdAt`; unknown names are rejected.
//! - `sortDirection`: missing or empty means `desc`; anything but `asc`/`desc`
//!   is rejected.
//! - `cursor`: missing or empty means the first page; a cursor must decode and
//!   must have been issued for the same sort key.

use serde::{Deserialize, Serialize};

use super::cursor::{Cursor, CursorError};
use super::sort::{
    InvalidSortDirection, SeekPosition, SortColumn, SortDirection, SortOrder, UnknownSortColumn,
};

/// Page size used when the request does not carry a usable `limit`.
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Largest page a single request may ask for.
pub const MAX_PAGE_SIZE: u32 = 500;

/// Page size bounds applied to incoming requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    /// Used when `limit` is missing or not a positive integer.
    pub default_size: u32,
    /// Requests above this are clamped.
    pub max_size: u32,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            default_size: DEFAULT_PAGE_SIZE,
            max_size: MAX_PAGE_SIZE,
        }
    }
}

impl PageLimits {
    /// Resolve a raw `limit` parameter to a page size.
    #[must_use]
    pub fn resolve(&self, raw: Option<&str>) -> u32 {
        match raw.map(str::trim).and_then(|s| s.parse::<i64>().ok()) {
            Some(n) if n > 0 => u32::try_from(n).map_or(self.max_size, |n| n.min(self.max_size)),
            _ => self.default_size,
        }
    }
}

/// Errors for requests that cannot be served.
#[derive(Debug, thiserror::Error)]
pub enum PageRequestError {
    #[error(transparent)]
    UnknownSortColumn(#[from] UnknownSortColumn),

    #[error(transparent)]
    InvalidSortDirection(#[from] InvalidSortDirection),

    #[error("invalid cursor: {0}")]
    InvalidCursor(#[from] CursorError),

    /// The cursor was issued for a different sort key.
    #[error("cursor was issued for {cursor_sort_by} {cursor_direction}, not {sort_by} {direction}")]
    CursorSortMismatch {
        cursor_sort_by: SortColumn,
        cursor_direction: SortDirection,
        sort_by: SortColumn,
        direction: SortDirection,
    },
}

/// Raw query parameters, as sent on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrdersQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_direction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<String>,
}

impl OrdersQuery {
    /// Query for one page under `sort`, continuing from `cursor` if given.
    #[must_use]
    pub fn new(sort: SortOrder, cursor: Option<String>, limit: u32) -> Self {
        Self {
            cursor,
            sort_by: Some(sort.column.as_str().to_string()),
            sort_direction: Some(sort.direction.as_str().to_string()),
            limit: Some(limit.to_string()),
        }
    }

    /// The parameters that are set, as `(name, value)` pairs.
    #[must_use]
    pub fn pairs(&self) -> Vec<(&'static str, &str)> {
        [
            ("cursor", self.cursor.as_deref()),
            ("limit", self.limit.as_deref()),
            ("sortBy", self.sort_by.as_deref()),
            ("sortDirection", self.sort_direction.as_deref()),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.map(|v| (name, v)))
        .collect()
    }

    /// Build a query from decoded `(name, value)` pairs.
    ///
    /// The first occurrence of a parameter wins; unknown names are ignored.
    #[must_use]
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut query = Self::default();
        for (name, value) in pairs {
            let slot = match name.as_ref() {
                "cursor" => &mut query.cursor,
                "sortBy" => &mut query.sort_by,
                "sortDirection" => &mut query.sort_direction,
                "limit" => &mut query.limit,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into());
            }
        }
        query
    }
}

/// A validated page request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub sort: SortOrder,
    pub cursor: Option<Cursor>,
    pub limit: u32,
}

impl PageRequest {
    /// Validate raw query parameters.
    ///
    /// # Errors
    ///
    /// Returns `PageRequestError` for an unknown sort column, an invalid sort
    /// direction, an undecodable cursor, or a cursor issued for another sort key.
    pub fn parse(query: &OrdersQuery, limits: PageLimits) -> Result<Self, PageRequestError> {
        let column = match non_empty(query.sort_by.as_deref()) {
            Some(raw) => raw.parse::<SortColumn>()?,
            None => SortColumn::default(),
        };
        let direction = match non_empty(query.sort_direction.as_deref()) {
            Some(raw) => raw.parse::<SortDirection>()?,
            None => SortDirection::default(),
        };
        let sort = SortOrder::new(column, direction);

        let cursor = non_empty(query.cursor.as_deref())
            .map(Cursor::decode)
            .transpose()?;

        if let Some(cursor) = &cursor
            && cursor.sort() != sort
        {
            return Err(PageRequestError::CursorSortMismatch {
                cursor_sort_by: cursor.sort_by,
                cursor_direction: cursor.sort_direction,
                sort_by: sort.column,
                direction: sort.direction,
            });
        }

        Ok(Self {
            sort,
            cursor,
            limit: limits.resolve(query.limit.as_deref()),
        })
    }

    /// Where the page starts, if it is not the first page.
    #[must_use]
    pub fn seek(&self) -> Option<SeekPosition> {
        self.cursor.as_ref().map(Cursor::position)
    }

    /// Rows to ask the store for: one extra to detect a following page.
    #[must_use]
    pub const fn fetch_limit(&self) -> u32 {
        self.limit.saturating_add(1)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}
