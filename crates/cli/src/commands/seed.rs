//! Seed the orders table with generated sample data.

use orders_dashboard_server::db::{self, PgOrderStore, RepositoryError};
use orders_dashboard_server::seed::{self, SeedOptions};
use rand::SeedableRng;
use rand::rngs::StdRng;

use super::{MissingDatabaseUrl, database_url};

/// Errors that can occur while seeding.
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error(transparent)]
    MissingEnvVar(#[from] MissingDatabaseUrl),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Replace (or extend) the orders table with `options.count` generated orders.
///
/// `rng_seed` makes the generated data reproducible.
///
/// # Errors
///
/// Returns `SeedError` if the URL is missing or any database call fails.
pub async fn orders(options: SeedOptions, rng_seed: Option<u64>) -> Result<(), SeedError> {
    let database_url = database_url()?;
    let pool = db::create_pool(&database_url).await?;
    tracing::info!("Connected to database");

    let store = PgOrderStore::new(pool);
    let mut rng = rng_seed.map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);

    tracing::info!(
        count = options.count,
        batch_size = options.batch_size,
        keep_existing = options.keep_existing,
        "Starting seeding process"
    );
    let summary = seed::seed_orders(&store, &mut rng, options).await?;

    tracing::info!("Seeding complete!");
    tracing::info!("  Orders deleted: {}", summary.deleted);
    tracing::info!("  Orders inserted: {}", summary.inserted);
    tracing::info!("  Duration: {:.2}s", summary.elapsed.as_secs_f64());
    Ok(())
}
