//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! orders-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `ORDERS_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   `DATABASE_URL`)
//!
//! Migrations live in `crates/server/migrations/` and are embedded at build
//! time. The server never runs them itself.

use orders_dashboard_server::db;

use super::{MissingDatabaseUrl, database_url};

/// Errors that can occur while migrating.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error(transparent)]
    MissingEnvVar(#[from] MissingDatabaseUrl),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run the orders database migrations.
///
/// # Errors
///
/// Returns `MigrationError` if the URL is missing, the database is
/// unreachable, or a migration fails.
pub async fn run() -> Result<(), MigrationError> {
    let database_url = database_url()?;

    tracing::info!("Connecting to orders database...");
    let pool = db::create_pool(&database_url).await?;

    tracing::info!("Running orders migrations...");
    sqlx::migrate!("../server/migrations").run(&pool).await?;

    // Connectivity check
    sqlx::query("SELECT 1").execute(&pool).await?;

    tracing::info!("Orders migrations complete!");
    Ok(())
}
