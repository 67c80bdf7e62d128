//! Application state shared across handlers.

use std::sync::Arc;

use orders_dashboard_core::PageLimits;

use crate::db::OrderStore;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the order store and the page size limits.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    store: Arc<dyn OrderStore>,
    page_limits: PageLimits,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `store` - Order store (`PostgreSQL` in production, in-memory in tests)
    /// * `page_limits` - Default and maximum page size
    #[must_use]
    pub fn new(store: Arc<dyn OrderStore>, page_limits: PageLimits) -> Self {
        Self {
            inner: Arc::new(AppStateInner { store, page_limits }),
        }
    }

    /// Get a reference to the order store.
    #[must_use]
    pub fn store(&self) -> &dyn OrderStore {
        self.inner.store.as_ref()
    }

    /// Get the page size limits.
    #[must_use]
    pub fn page_limits(&self) -> PageLimits {
        self.inner.page_limits
    }
}
