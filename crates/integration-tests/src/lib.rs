//! Integration tests for the orders dashboard.
//!
//! # Running Tests
//!
//! ```bash
//! # In-memory store, no external services
//! cargo test -p orders-dashboard-integration-tests
//!
//! # Include the PostgreSQL tests (needs a migrated database)
//! ORDERS_TEST_DATABASE_URL=postgres://... cargo test -p orders-dashboard-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `orders_api` - `GET /api/orders` over a real listener
//! - `orders_feed` - The client feed paging against the server
//! - `postgres_store` - Keyset queries against `PostgreSQL`

use std::net::SocketAddr;
use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use orders_dashboard_core::{Order, PageLimits};
use orders_dashboard_server::db::MemoryOrderStore;
use orders_dashboard_server::routes;
use orders_dashboard_server::seed::generate_orders;
use orders_dashboard_server::state::AppState;
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Fixed clock for generated data.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 30, 12, 0, 0)
        .single()
        .expect("valid timestamp")
}

/// `count` reproducible orders.
#[must_use]
pub fn sample_orders(count: usize, seed: u64) -> Vec<Order> {
    let mut rng = StdRng::seed_from_u64(seed);
    generate_orders(&mut rng, count, fixed_now())
}

/// The server app listening on an ephemeral local port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub store: Arc<MemoryOrderStore>,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    /// Serve `orders` from an in-memory store with default page limits.
    pub async fn start(orders: &[Order]) -> Self {
        Self::start_with_limits(orders, PageLimits::default()).await
    }

    /// Serve `orders` with custom page limits.
    pub async fn start_with_limits(orders: &[Order], limits: PageLimits) -> Self {
        let store = Arc::new(MemoryOrderStore::with_orders(orders));
        let state = AppState::new(store.clone(), limits);
        let app = routes::app(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to read local address");

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Test server error");
        });

        Self {
            addr,
            store,
            handle,
        }
    }

    /// Base URL, e.g. `http://127.0.0.1:41234`.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Full URL of the orders endpoint.
    #[must_use]
    pub fn orders_url(&self) -> String {
        format!("{}/api/orders", self.base_url())
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
