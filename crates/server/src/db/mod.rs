//! Order storage.
//!
//! # Database: `orders`
//!
//! ## Tables
//!
//! - `orders` - One row per order, line items as a JSONB document
//!
//! Every sortable column has a composite `(column, id)` index so that keyset
//! pages are index range scans.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p orders-cli -- migrate
//! ```

pub mod memory;
pub mod orders;

use std::time::Duration;

use async_trait::async_trait;
use orders_dashboard_core::{OrderSummary, SeekPosition, SortOrder};
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use memory::MemoryOrderStore;
pub use orders::PgOrderStore;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// The store cannot be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Read access to orders in sort order.
///
/// Implementations must honour the total order `(column direction, id asc)`
/// of [`SortOrder::compare`], and must agree with it on text columns (byte
/// order), or pages will overlap or skip rows.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Up to `take` rows in `sort` order, strictly after `seek` when given.
    async fn fetch_page(
        &self,
        sort: SortOrder,
        seek: Option<&SeekPosition>,
        take: u32,
    ) -> Result<Vec<OrderSummary>, RepositoryError>;

    /// Total number of orders.
    async fn count(&self) -> Result<u64, RepositoryError>;

    /// Check the store is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
