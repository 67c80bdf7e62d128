//! Sample data generator.
//!
//! Produces realistic-looking orders for local development and demos. The
//! generator takes any `Rng`, so a seeded RNG gives reproducible data sets.

use std::time::Instant;

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use rand::seq::IndexedRandom;
use rust_decimal::Decimal;
use tracing::{info, instrument};

use orders_dashboard_core::{Order, OrderId, OrderItem, OrderItems, OrderStatus};

use crate::db::{PgOrderStore, RepositoryError};

/// Number of orders `orders-cli seed` creates by default.
pub const DEFAULT_ORDER_COUNT: usize = 10_000;

/// Orders inserted per statement by default.
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Product catalogue line items are drawn from.
pub const PRODUCT_NAMES: &[&str] = &[
    "Laptop",
    "Smartphone",
    "Headphones",
    "Monitor",
    "Keyboard",
    "Mouse",
    "Tablet",
    "Smartwatch",
    "Camera",
    "Speaker",
    "Printer",
    "Router",
    "External HDD",
    "USB Drive",
    "Graphics Card",
    "RAM",
    "SSD",
    "Processor",
    "Motherboard",
    "Power Supply",
];

const FIRST_NAMES: &[&str] = &[
    "Ada", "Alan", "Barbara", "Brian", "Carol", "Claude", "Dennis", "Donald", "Edsger", "Frances",
    "Grace", "Guido", "Hedy", "Ivan", "Joan", "John", "Ken", "Katherine", "Leslie", "Linus",
    "Margaret", "Niklaus", "Radia", "Robin", "Shafi", "Sophie", "Tim", "Vint", "Whitfield",
    "Yukihiro",
];

const LAST_NAMES: &[&str] = &[
    "Lovelace", "Turing", "Liskov", "Kernighan", "Shaw", "Shannon", "Ritchie", "Knuth", "Dijkstra",
    "Allen", "Hopper", "van Rossum", "Lamarr", "Sutherland", "Clarke", "McCarthy", "Thompson",
    "Johnson", "Lamport", "Torvalds", "Hamilton", "Wirth", "Perlman", "Milner", "Goldwasser",
    "Wilson", "Berners-Lee", "Cerf", "Diffie", "Matsumoto",
];

/// Span of `created_at` values: the year before `now`.
const HISTORY_DAYS: i64 = 365;

/// Generate one order created within the year before `now`.
///
/// Each order has 1-5 line items with quantity 1-5 and a unit price between
/// 10.00 and 1000.00; the order amount is the sum of line totals.
pub fn generate_order<R: Rng + ?Sized>(rng: &mut R, now: DateTime<Utc>) -> Order {
    let item_count = rng.random_range(1..=5);
    let items = OrderItems {
        items: (0..item_count).map(|_| generate_item(rng)).collect(),
    };

    let first = FIRST_NAMES.choose(rng).copied().unwrap_or("Ada");
    let last = LAST_NAMES.choose(rng).copied().unwrap_or("Lovelace");
    let status = OrderStatus::ALL
        .choose(rng)
        .copied()
        .unwrap_or_default();

    let history_ms = Duration::days(HISTORY_DAYS).num_milliseconds();
    let created_at = now - Duration::milliseconds(rng.random_range(0..=history_ms));

    Order {
        id: OrderId::new(uuid::Builder::from_random_bytes(rng.random()).into_uuid()),
        customer_name: format!("{first} {last}"),
        order_amount: items.total(),
        status,
        items,
        created_at,
    }
}

fn generate_item<R: Rng + ?Sized>(rng: &mut R) -> OrderItem {
    OrderItem {
        name: PRODUCT_NAMES
            .choose(rng)
            .copied()
            .unwrap_or("Laptop")
            .to_string(),
        quantity: rng.random_range(1..=5),
        price: Decimal::new(rng.random_range(1_000..=100_000), 2),
    }
}

/// Generate `count` orders created within the year before `now`.
pub fn generate_orders<R: Rng + ?Sized>(rng: &mut R, count: usize, now: DateTime<Utc>) -> Vec<Order> {
    (0..count).map(|_| generate_order(rng, now)).collect()
}

/// Outcome of a seeding run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    /// Orders removed before seeding.
    pub deleted: u64,
    /// Orders inserted.
    pub inserted: u64,
    /// Wall-clock time of the run.
    pub elapsed: std::time::Duration,
}

/// Options for [`seed_orders`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedOptions {
    /// Orders to create.
    pub count: usize,
    /// Orders per insert statement.
    pub batch_size: usize,
    /// Keep existing orders instead of clearing the table first.
    pub keep_existing: bool,
}

impl Default for SeedOptions {
    fn default() -> Self {
        Self {
            count: DEFAULT_ORDER_COUNT,
            batch_size: DEFAULT_BATCH_SIZE,
            keep_existing: false,
        }
    }
}

/// Fill the `orders` table with generated orders, batch by batch.
///
/// # Errors
///
/// Returns `RepositoryError` if clearing or inserting fails. Batches inserted
/// before the failure stay in the table.
#[instrument(skip(store, rng))]
pub async fn seed_orders<R: Rng + Send>(
    store: &PgOrderStore,
    rng: &mut R,
    options: SeedOptions,
) -> Result<SeedSummary, RepositoryError> {
    let started = Instant::now();
    let batch_size = options.batch_size.max(1);

    let deleted = if options.keep_existing {
        0
    } else {
        let deleted = store.delete_all().await?;
        info!(deleted, "Cleared existing orders");
        deleted
    };

    let now = Utc::now();
    let mut inserted: u64 = 0;
    let mut remaining = options.count;

    while remaining > 0 {
        let batch = generate_orders(rng, remaining.min(batch_size), now);
        remaining -= batch.len();
        inserted += store.insert_batch(&batch).await?;

        info!(
            inserted,
            total = options.count,
            progress = %format!("{:.1}%", percent(inserted, options.count)),
            "Seeding progress"
        );
    }

    let summary = SeedSummary {
        deleted,
        inserted,
        elapsed: started.elapsed(),
    };
    info!(
        inserted,
        seconds = %format!("{:.2}", summary.elapsed.as_secs_f64()),
        "Seeding completed"
    );
    Ok(summary)
}

#[allow(clippy::cast_precision_loss)] // Order counts stay far below f64 precision
fn percent(done: u64, total: usize) -> f64 {
    if total == 0 {
        return 100.0;
    }
    done as f64 / total as f64 * 100.0
}
