//! Subcommand implementations.

pub mod browse;
pub mod migrate;
pub mod seed;

use secrecy::SecretString;

/// Error returned when no database URL is configured.
#[derive(Debug, thiserror::Error)]
#[error("Missing environment variable: ORDERS_DATABASE_URL (or DATABASE_URL)")]
pub struct MissingDatabaseUrl;

/// Read the database URL the server would use.
fn database_url() -> Result<SecretString, MissingDatabaseUrl> {
    dotenvy::dotenv().ok();

    ["ORDERS_DATABASE_URL", "DATABASE_URL"]
        .iter()
        .find_map(|key| std::env::var(key).ok().filter(|v| !v.is_empty()))
        .map(SecretString::from)
        .ok_or(MissingDatabaseUrl)
}
