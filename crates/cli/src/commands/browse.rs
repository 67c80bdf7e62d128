//! Page through a running orders API the way the dashboard table does.
//!
//! Each step scrolls the viewport to the bottom of the loaded rows, which
//! makes the controller request the next page, then prints the visible
//! window.

use std::sync::Arc;

use orders_dashboard_client::{
    ControllerConfig, FetchError, FetchOrders, HttpOrdersClient, OrdersFeed, RowSlot, Viewport,
    WindowLayout,
};
use orders_dashboard_core::{SortColumn, SortDirection, SortOrder};

/// Errors that can occur while browsing.
#[derive(Debug, thiserror::Error)]
pub enum BrowseError {
    #[error("Invalid server URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// What to browse and how much.
#[derive(Debug, Clone)]
pub struct BrowseOptions {
    pub url: String,
    pub sort_by: SortColumn,
    pub direction: SortDirection,
    pub page_size: u32,
    pub pages: usize,
    pub visible_rows: u32,
}

/// Fetch up to `options.pages` pages and print each window.
///
/// # Errors
///
/// Returns `BrowseError` if the URL is invalid or a fetch fails.
pub async fn run(options: BrowseOptions) -> Result<(), BrowseError> {
    let client = HttpOrdersClient::new(&options.url)?;
    let layout = WindowLayout::default();
    let config = ControllerConfig {
        page_size: options.page_size,
        layout,
    };
    let height_px = options.visible_rows.saturating_mul(layout.row_height_px);
    let sort = SortOrder::new(options.sort_by, options.direction);

    let mut feed = OrdersFeed::start(Arc::new(client), sort, config);
    feed.scroll(Viewport::new(0, height_px));

    for page in 1..=options.pages {
        feed.settle_all().await;
        if let Some(err) = feed.controller().error() {
            return Err(err.clone().into());
        }

        print_window(&feed, page);

        if !feed.controller().has_more() || page == options.pages {
            break;
        }

        let loaded = u32::try_from(feed.controller().rows().len()).unwrap_or(u32::MAX);
        let bottom = loaded
            .saturating_mul(layout.row_height_px)
            .saturating_sub(height_px);
        feed.scroll(Viewport::new(bottom, height_px));
    }

    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_window<F: FetchOrders>(feed: &OrdersFeed<F>, page: usize) {
    let controller = feed.controller();
    let sort = controller.sort();
    let latency = feed
        .last_latency()
        .map_or_else(String::new, |d| format!(" in {} ms", d.as_millis()));

    println!(
        "page {page}: {} of {} orders loaded{latency}, sorted by {} {}",
        controller.rows().len(),
        controller.total_count(),
        sort.column,
        sort.direction,
    );

    for row in &controller.window().rows {
        match row.slot {
            RowSlot::Order(order) => println!(
                "  {:>6}  {}  {:<28}  {:>10}  {:<10}  {}",
                row.index,
                order.id,
                order.customer_name,
                order.order_amount.to_string(),
                order.status.as_str(),
                order.created_at.format("%Y-%m-%d %H:%M"),
            ),
            RowSlot::LoadingMore | RowSlot::Pending => println!("  {:>6}  ...", row.index),
        }
    }

    if !controller.has_more() {
        println!("end of list");
    }
}
