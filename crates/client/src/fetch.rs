//! The seam between the list controller and whatever serves pages.

use async_trait::async_trait;
use orders_dashboard_core::{OrdersQuery, OrdersResponse};

/// Errors a page fetch can end with.
///
/// Cloneable so the controller can keep the last error for display while the
/// feed logs it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// The request never produced a response.
    #[error("request failed: {0}")]
    Transport(String),

    /// The server answered with a non-success status.
    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The response body was not an orders page.
    #[error("invalid response body: {0}")]
    Decode(String),
}

/// Something that can serve one page of orders.
#[async_trait]
pub trait FetchOrders: Send + Sync + 'static {
    /// Fetch the page described by `query`.
    async fn fetch_orders(&self, query: &OrdersQuery) -> Result<OrdersResponse, FetchError>;
}
