//! Orders CLI - Database migrations, sample data and API browsing.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! orders-cli migrate
//!
//! # Replace all orders with 10,000 generated ones
//! orders-cli seed
//!
//! # Append 500 reproducible orders
//! orders-cli seed --count 500 --keep-existing --rng-seed 42
//!
//! # Page through a running server, cheapest orders first
//! orders-cli browse --sort-by orderAmount --direction asc --pages 3
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `seed` - Fill the orders table with generated data
//! - `browse` - Scroll through `GET /api/orders` page by page

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use orders_dashboard_core::{DEFAULT_PAGE_SIZE, SortColumn, SortDirection};
use orders_dashboard_server::seed::{DEFAULT_BATCH_SIZE, DEFAULT_ORDER_COUNT, SeedOptions};

mod commands;

#[derive(Parser)]
#[command(name = "orders-cli")]
#[command(author, version, about = "Orders dashboard CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the orders table with generated data
    Seed {
        /// Number of orders to create
        #[arg(short, long, default_value_t = DEFAULT_ORDER_COUNT)]
        count: usize,

        /// Orders per insert statement
        #[arg(short, long, default_value_t = DEFAULT_BATCH_SIZE)]
        batch_size: usize,

        /// Keep existing orders instead of deleting them first
        #[arg(long)]
        keep_existing: bool,

        /// Seed for the random generator, for reproducible data
        #[arg(long)]
        rng_seed: Option<u64>,
    },
    /// Page through a running orders API
    Browse {
        /// Server base URL
        #[arg(short, long, default_value = "http://127.0.0.1:3000")]
        url: String,

        /// Sort column (`id`, `customerName`, `orderAmount`, `status`, `createdAt`)
        #[arg(short, long, default_value_t = SortColumn::default())]
        sort_by: SortColumn,

        /// Sort direction (`asc` or `desc`)
        #[arg(short, long, default_value_t = SortDirection::default())]
        direction: SortDirection,

        /// Rows per page
        #[arg(short, long, default_value_t = DEFAULT_PAGE_SIZE)]
        limit: u32,

        /// Maximum number of pages to load
        #[arg(short, long, default_value_t = 3)]
        pages: usize,

        /// Rows visible at once
        #[arg(long, default_value_t = 12)]
        rows: u32,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed {
            count,
            batch_size,
            keep_existing,
            rng_seed,
        } => {
            let options = SeedOptions {
                count,
                batch_size,
                keep_existing,
            };
            commands::seed::orders(options, rng_seed).await?;
        }
        Commands::Browse {
            url,
            sort_by,
            direction,
            limit,
            pages,
            rows,
        } => {
            commands::browse::run(commands::browse::BrowseOptions {
                url,
                sort_by,
                direction,
                page_size: limit,
                pages,
                visible_rows: rows,
            })
            .await?;
        }
    }
    Ok(())
}
