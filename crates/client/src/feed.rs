//! Async driver for [`ListController`].
//!
//! `OrdersFeed` runs the controller's fetch requests on the tokio runtime and
//! feeds the outcomes back in arrival order. Each request runs as its own
//! task in a [`JoinSet`] owned by the feed, so a response for an abandoned
//! sort still drains and gets discarded by the controller, and a task that
//! panics is reported as a failed fetch rather than lost.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use orders_dashboard_core::{OrdersResponse, SortColumn, SortOrder};
use tokio::task::{self, JoinSet};

use crate::controller::{Completion, ControllerConfig, DiscardReason, FetchRequest, ListController};
use crate::fetch::{FetchError, FetchOrders};
use crate::window::Viewport;

/// What a fetch task hands back: the result and its round-trip time.
type TaskOutput = (Result<OrdersResponse, FetchError>, Duration);

/// Orders list backed by a [`FetchOrders`] implementation.
pub struct OrdersFeed<F> {
    fetcher: Arc<F>,
    controller: ListController,
    tasks: JoinSet<TaskOutput>,
    requests: HashMap<task::Id, FetchRequest>,
    last_latency: Option<Duration>,
}

impl<F: FetchOrders> OrdersFeed<F> {
    /// Create a feed for `sort` and dispatch its first page.
    ///
    /// Must be called within a tokio runtime.
    #[must_use]
    pub fn start(fetcher: Arc<F>, sort: SortOrder, config: ControllerConfig) -> Self {
        let (controller, first) = ListController::new(sort, config);
        let mut feed = Self {
            fetcher,
            controller,
            tasks: JoinSet::new(),
            requests: HashMap::new(),
            last_latency: None,
        };
        feed.dispatch(first);
        feed
    }

    /// The controller, for reading rows and state.
    #[must_use]
    pub const fn controller(&self) -> &ListController {
        &self.controller
    }

    /// Report a scroll position. Returns whether a page fetch was dispatched.
    pub fn scroll(&mut self, viewport: Viewport) -> bool {
        let request = self.controller.set_viewport(viewport);
        self.dispatch_opt(request)
    }

    /// Switch sort order. Returns whether a new first page was dispatched.
    pub fn set_sort(&mut self, sort: SortOrder) -> bool {
        let request = self.controller.set_sort(sort);
        self.dispatch_opt(request)
    }

    /// Apply a column header click.
    pub fn toggle_sort(&mut self, column: SortColumn) -> bool {
        let request = self.controller.toggle_sort(column);
        self.dispatch_opt(request)
    }

    /// Re-run the failed request, if the list has failed.
    pub fn retry(&mut self) -> bool {
        let request = self.controller.retry();
        self.dispatch_opt(request)
    }

    /// Wait for the next fetch to finish and apply it.
    ///
    /// A follow-up page requested by the controller is dispatched before
    /// returning. A fetch task that panicked or was aborted completes its
    /// request with [`FetchError::Transport`]. Returns `None` when nothing is
    /// pending.
    pub async fn settle(&mut self) -> Option<Completion> {
        let (id, result, latency) = match self.tasks.join_next_with_id().await? {
            Ok((id, (result, latency))) => (id, result, Some(latency)),
            Err(err) => {
                tracing::warn!(error = %err, "Orders fetch task did not finish");
                let failure = FetchError::Transport(format!("fetch task failed: {err}"));
                (err.id(), Err(failure), None)
            }
        };

        let Some(request) = self.requests.remove(&id) else {
            return Some(Completion::Discarded(DiscardReason::Unexpected));
        };

        let completion = self.controller.complete(&request, result);
        match &completion {
            Completion::Applied { next } => {
                if latency.is_some() {
                    self.last_latency = latency;
                }
                tracing::debug!(
                    latency_ms = latency.map(|l| u64::try_from(l.as_millis()).unwrap_or(u64::MAX)),
                    rows = self.controller.rows().len(),
                    total = self.controller.total_count(),
                    "Orders page applied"
                );
                if let Some(next) = next.clone() {
                    self.dispatch(next);
                }
            }
            Completion::Discarded(reason) => {
                tracing::debug!(?reason, generation = request.generation, "Orders page discarded");
            }
        }
        Some(completion)
    }

    /// Settle until nothing is pending. Returns how many outcomes were applied.
    pub async fn settle_all(&mut self) -> usize {
        let mut applied = 0;
        while let Some(completion) = self.settle().await {
            if matches!(completion, Completion::Applied { .. }) {
                applied += 1;
            }
        }
        applied
    }

    /// Requests dispatched but not yet applied or discarded.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.tasks.len()
    }

    /// Round-trip time of the most recently applied fetch.
    #[must_use]
    pub const fn last_latency(&self) -> Option<Duration> {
        self.last_latency
    }

    fn dispatch_opt(&mut self, request: Option<FetchRequest>) -> bool {
        request.map(|request| self.dispatch(request)).is_some()
    }

    fn dispatch(&mut self, request: FetchRequest) {
        let fetcher = Arc::clone(&self.fetcher);
        let query = request.query();

        let handle = self.tasks.spawn(async move {
            let started = Instant::now();
            let result = fetcher.fetch_orders(&query).await;
            (result, started.elapsed())
        });
        self.requests.insert(handle.id(), request);
    }
}
