//! In-memory order store.
//!
//! Used by tests and local demos. It applies exactly the ordering the
//! `PostgreSQL` store does, so the same pagination properties hold for both.

use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use orders_dashboard_core::{Order, OrderId, OrderSummary, SeekPosition, SortOrder};

use super::{OrderStore, RepositoryError};

/// Order store backed by a vector.
#[derive(Debug, Default)]
pub struct MemoryOrderStore {
    rows: RwLock<Vec<OrderSummary>>,
    unavailable: AtomicBool,
}

impl MemoryOrderStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding the list projections of `orders`.
    #[must_use]
    pub fn with_orders(orders: &[Order]) -> Self {
        Self {
            rows: RwLock::new(orders.iter().map(Order::summary).collect()),
            unavailable: AtomicBool::new(false),
        }
    }

    /// Add an order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Unavailable` if the lock is poisoned.
    pub fn insert(&self, order: &Order) -> Result<(), RepositoryError> {
        self.rows
            .write()
            .map_err(|e| RepositoryError::Unavailable(e.to_string()))?
            .push(order.summary());
        Ok(())
    }

    /// Remove an order, returning whether it existed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Unavailable` if the lock is poisoned.
    pub fn remove(&self, id: OrderId) -> Result<bool, RepositoryError> {
        let mut rows = self
            .rows
            .write()
            .map_err(|e| RepositoryError::Unavailable(e.to_string()))?;
        let before = rows.len();
        rows.retain(|row| row.id != id);
        Ok(rows.len() != before)
    }

    /// Make every subsequent call fail (or succeed again).
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), RepositoryError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable(
                "in-memory store is switched off".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn fetch_page(
        &self,
        sort: SortOrder,
        seek: Option<&SeekPosition>,
        take: u32,
    ) -> Result<Vec<OrderSummary>, RepositoryError> {
        self.check_available()?;

        let rows = self
            .rows
            .read()
            .map_err(|e| RepositoryError::Unavailable(e.to_string()))?;

        let mut page: Vec<OrderSummary> = rows
            .iter()
            .filter(|row| seek.is_none_or(|position| sort.is_after(row, position)))
            .cloned()
            .collect();
        drop(rows);

        page.sort_by(|a, b| sort.compare(a, b));
        page.truncate(usize::try_from(take).unwrap_or(usize::MAX));
        Ok(page)
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        self.check_available()?;

        let rows = self
            .rows
            .read()
            .map_err(|e| RepositoryError::Unavailable(e.to_string()))?;
        Ok(rows.len() as u64)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        self.check_available()
    }
}
