//! HTTP fetcher for `GET /api/orders`.

use async_trait::async_trait;
use orders_dashboard_core::{ErrorBody, OrdersQuery, OrdersResponse};
use url::Url;

use crate::fetch::{FetchError, FetchOrders};

/// Orders API client.
#[derive(Debug, Clone)]
pub struct HttpOrdersClient {
    http: reqwest::Client,
    endpoint: Url,
}

impl HttpOrdersClient {
    /// Create a client for the server at `base_url` (e.g. `http://127.0.0.1:3000`).
    ///
    /// # Errors
    ///
    /// Returns `url::ParseError` if `base_url` is not a valid absolute URL.
    pub fn new(base_url: &str) -> Result<Self, url::ParseError> {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Create a client that reuses an existing `reqwest::Client`.
    ///
    /// # Errors
    ///
    /// Returns `url::ParseError` if `base_url` is not a valid absolute URL.
    pub fn with_client(http: reqwest::Client, base_url: &str) -> Result<Self, url::ParseError> {
        let endpoint = Url::parse(base_url)?.join("/api/orders")?;
        Ok(Self { http, endpoint })
    }

    /// The full request URL for `query`.
    #[must_use]
    pub fn url_for(&self, query: &OrdersQuery) -> Url {
        let mut url = self.endpoint.clone();
        let pairs = query.pairs();
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }
        url
    }
}

#[async_trait]
impl FetchOrders for HttpOrdersClient {
    async fn fetch_orders(&self, query: &OrdersQuery) -> Result<OrdersResponse, FetchError> {
        let url = self.url_for(query);
        tracing::debug!(%url, "Fetching orders page");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorBody>(&body).map_or_else(
                |_| {
                    status
                        .canonical_reason()
                        .unwrap_or("unexpected status")
                        .to_string()
                },
                |body| body.error,
            );
            return Err(FetchError::Status {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_slice(&body).map_err(|e| FetchError::Decode(e.to_string()))
    }
}
