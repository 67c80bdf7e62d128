//! Opaque pagination cursors.
//!
//! A cursor records where the previous page ended: the sort key it was issued
//! under, the last row's value for the sort column, and the last row's id.
//! On the wire it is `base64url(json)` without padding. Clients must treat it
//! as opaque.
//!
//! Seeking is by value, not by row lookup, so a cursor whose row has since been
//! deleted still resumes at the right position.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};

use super::sort::{SeekPosition, SortColumn, SortDirection, SortOrder, SortValue};
use crate::types::{OrderId, OrderSummary};

/// Upper bound on accepted cursor token length.
pub const MAX_CURSOR_LEN: usize = 1024;

/// Errors produced while encoding or decoding a cursor token.
#[derive(Debug, thiserror::Error)]
pub enum CursorError {
    /// The token is empty.
    #[error("cursor is empty")]
    Empty,

    /// The token exceeds [`MAX_CURSOR_LEN`].
    #[error("cursor exceeds max length: {len} chars (max {max})")]
    TooLong { len: usize, max: usize },

    /// The token is not valid base64url.
    #[error("cursor is not valid base64: {0}")]
    Encoding(#[from] base64::DecodeError),

    /// The decoded payload is not a cursor document.
    #[error("cursor payload is malformed: {0}")]
    Format(#[from] serde_json::Error),

    /// The sort value does not have the type of the sort column.
    #[error("cursor value does not match column {0}")]
    KeyMismatch(SortColumn),
}

/// A decoded pagination cursor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cursor {
    pub sort_by: SortColumn,
    pub sort_direction: SortDirection,
    pub key: SortValue,
    pub id: OrderId,
}

impl Cursor {
    /// Cursor positioned just after `row` under `sort`.
    #[must_use]
    pub fn after(row: &OrderSummary, sort: SortOrder) -> Self {
        Self {
            sort_by: sort.column,
            sort_direction: sort.direction,
            key: sort.column.key_of(row),
            id: row.id,
        }
    }

    /// The sort key this cursor was issued under.
    #[must_use]
    pub const fn sort(&self) -> SortOrder {
        SortOrder::new(self.sort_by, self.sort_direction)
    }

    /// The seek position encoded in this cursor.
    #[must_use]
    pub fn position(&self) -> SeekPosition {
        SeekPosition {
            key: self.key.clone(),
            id: self.id,
        }
    }

    /// Encode as an opaque token.
    ///
    /// # Errors
    ///
    /// Returns `CursorError::Format` if the payload cannot be serialized.
    pub fn encode(&self) -> Result<String, CursorError> {
        let payload = serde_json::to_vec(self)?;
        Ok(URL_SAFE_NO_PAD.encode(payload))
    }

    /// Decode an opaque token. Surrounding whitespace is ignored.
    ///
    /// # Errors
    ///
    /// Returns a `CursorError` if the token is empty, too long, not base64url,
    /// not a cursor document, or carries a value of the wrong type for its
    /// column.
    pub fn decode(token: &str) -> Result<Self, CursorError> {
        let token = token.trim();

        if token.is_empty() {
            return Err(CursorError::Empty);
        }

        if token.len() > MAX_CURSOR_LEN {
            return Err(CursorError::TooLong {
                len: token.len(),
                max: MAX_CURSOR_LEN,
            });
        }

        let payload = URL_SAFE_NO_PAD.decode(token)?;
        let cursor: Self = serde_json::from_slice(&payload)?;

        if !cursor.sort_by.accepts(&cursor.key) {
            return Err(CursorError::KeyMismatch(cursor.sort_by));
        }

        Ok(cursor)
    }
}
