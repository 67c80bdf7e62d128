//! Incremental list controller.
//!
//! `ListController` owns everything the orders table shows: accumulated rows,
//! the next-page cursor, the total count, loading and error state, and the
//! viewport. It performs no I/O. Every operation that needs a page returns a
//! [`FetchRequest`]; the caller runs it and hands the result back through
//! [`ListController::complete`].
//!
//! State belongs to one query key (the sort order). Changing the key replaces
//! the state wholesale under a new generation, and results that carry an old
//! generation are discarded, so a slow response for a previous sort can never
//! leak into the current list.
//!
//! At most one request is in flight per generation. Scrolling near the end
//! while a page is loading does not issue a second request.

use orders_dashboard_core::{
    DEFAULT_PAGE_SIZE, OrderSummary, OrdersQuery, OrdersResponse, SortColumn, SortOrder,
};

use crate::fetch::FetchError;
use crate::window::{Viewport, VirtualWindow, WindowLayout};

/// Controller settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Rows requested per page.
    pub page_size: u32,
    /// Row geometry used for windowing and the fetch trigger.
    pub layout: WindowLayout,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            layout: WindowLayout::default(),
        }
    }
}

/// Which fetch failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailedStage {
    FirstPage,
    NextPage,
}

/// Lifecycle of the list for the current query key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// The first page is being fetched.
    Loading,
    /// Idle; rows may be shown.
    Ready,
    /// A later page is being fetched; loaded rows stay visible.
    FetchingMore,
    /// The last fetch failed. Rows loaded earlier stay visible.
    Failed { stage: FailedStage },
}

/// A page the caller should fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    /// Generation of the state that issued the request.
    pub generation: u64,
    pub sort: SortOrder,
    /// `None` for the first page.
    pub cursor: Option<String>,
    pub limit: u32,
}

impl FetchRequest {
    /// Query parameters for this request.
    #[must_use]
    pub fn query(&self) -> OrdersQuery {
        OrdersQuery::new(self.sort, self.cursor.clone(), self.limit)
    }

    /// Whether this request is for the first page.
    #[must_use]
    pub const fn is_first_page(&self) -> bool {
        self.cursor.is_none()
    }
}

/// Why a completion was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscardReason {
    /// Issued under a query key that has since been replaced.
    Stale,
    /// Not the request the controller is waiting for.
    Unexpected,
}

/// Result of handing a fetch outcome to the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// The outcome was applied. `next` is a follow-up fetch to run, if the
    /// viewport already reaches the end of the new rows.
    Applied { next: Option<FetchRequest> },
    /// The outcome was ignored.
    Discarded(DiscardReason),
}

/// State for one query key.
#[derive(Debug)]
struct ListState {
    generation: u64,
    sort: SortOrder,
    rows: Vec<OrderSummary>,
    next_cursor: Option<String>,
    has_next_page: bool,
    total_count: u64,
    phase: Phase,
    error: Option<FetchError>,
    in_flight: Option<FetchRequest>,
    failed: Option<FetchRequest>,
}

impl ListState {
    fn loading(generation: u64, sort: SortOrder) -> Self {
        Self {
            generation,
            sort,
            rows: Vec::new(),
            next_cursor: None,
            has_next_page: false,
            total_count: 0,
            phase: Phase::Loading,
            error: None,
            in_flight: None,
            failed: None,
        }
    }

    fn has_more(&self) -> bool {
        self.has_next_page && self.next_cursor.is_some()
    }
}

/// Single-owner controller for the incrementally loaded orders list.
#[derive(Debug)]
pub struct ListController {
    config: ControllerConfig,
    viewport: Option<Viewport>,
    state: ListState,
}

impl ListController {
    /// Create a controller for `sort` and the request for its first page.
    #[must_use]
    pub fn new(sort: SortOrder, config: ControllerConfig) -> (Self, FetchRequest) {
        let mut controller = Self {
            config,
            viewport: None,
            state: ListState::loading(1, sort),
        };
        let request = controller.issue(None);
        (controller, request)
    }

    /// Switch to another sort order.
    ///
    /// Returns `None` if `sort` is already current. Otherwise all rows are
    /// dropped, the scroll offset resets to the top, and the first page of the
    /// new order is requested.
    pub fn set_sort(&mut self, sort: SortOrder) -> Option<FetchRequest> {
        if sort == self.state.sort {
            return None;
        }

        let generation = self.state.generation + 1;
        tracing::debug!(generation, sort_by = %sort.column, direction = %sort.direction, "Sort changed");

        self.state = ListState::loading(generation, sort);
        if let Some(viewport) = &mut self.viewport {
            viewport.offset_px = 0;
        }
        Some(self.issue(None))
    }

    /// Apply a column header click.
    ///
    /// The active column flips from descending to ascending; anything else
    /// sorts descending.
    pub fn toggle_sort(&mut self, column: SortColumn) -> Option<FetchRequest> {
        self.set_sort(self.state.sort.toggled(column))
    }

    /// Record the viewport and fetch the next page if it reaches the end.
    pub fn set_viewport(&mut self, viewport: Viewport) -> Option<FetchRequest> {
        self.viewport = Some(viewport);
        self.next_page_if_needed()
    }

    /// Hand back the outcome of `request`.
    pub fn complete(
        &mut self,
        request: &FetchRequest,
        result: Result<OrdersResponse, FetchError>,
    ) -> Completion {
        if request.generation != self.state.generation {
            return Completion::Discarded(DiscardReason::Stale);
        }
        if self.state.in_flight.as_ref() != Some(request) {
            return Completion::Discarded(DiscardReason::Unexpected);
        }
        self.state.in_flight = None;

        match result {
            Ok(page) => {
                let state = &mut self.state;
                if request.is_first_page() {
                    state.rows = page.data;
                } else {
                    state.rows.extend(page.data);
                }
                state.next_cursor = page.next_cursor;
                state.has_next_page = page.has_next_page;
                state.total_count = page.total_count;
                state.phase = Phase::Ready;
                state.error = None;
                state.failed = None;

                Completion::Applied {
                    next: self.next_page_if_needed(),
                }
            }
            Err(err) => {
                let stage = if request.is_first_page() {
                    FailedStage::FirstPage
                } else {
                    FailedStage::NextPage
                };
                tracing::warn!(error = %err, ?stage, "Orders fetch failed");

                self.state.phase = Phase::Failed { stage };
                self.state.error = Some(err);
                self.state.failed = Some(request.clone());
                Completion::Applied { next: None }
            }
        }
    }

    /// Re-issue the request that failed. `None` unless the list has failed.
    pub fn retry(&mut self) -> Option<FetchRequest> {
        if !matches!(self.state.phase, Phase::Failed { .. }) {
            return None;
        }
        let failed = self.state.failed.take()?;

        self.state.error = None;
        self.state.phase = if failed.is_first_page() {
            Phase::Loading
        } else {
            Phase::FetchingMore
        };
        self.state.in_flight = Some(failed.clone());
        Some(failed)
    }

    /// Rows to render for the last known viewport.
    #[must_use]
    pub fn window(&self) -> VirtualWindow<'_> {
        VirtualWindow::compute(
            self.config.layout,
            self.viewport.unwrap_or_default(),
            &self.state.rows,
            self.has_more(),
            self.is_fetching_more(),
        )
    }

    /// Rows loaded so far, in sort order.
    #[must_use]
    pub fn rows(&self) -> &[OrderSummary] {
        &self.state.rows
    }

    /// Total orders, as of the most recent page.
    #[must_use]
    pub const fn total_count(&self) -> u64 {
        self.state.total_count
    }

    /// Whether another page can be fetched.
    #[must_use]
    pub fn has_more(&self) -> bool {
        self.state.has_more()
    }

    #[must_use]
    pub const fn sort(&self) -> SortOrder {
        self.state.sort
    }

    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.state.phase
    }

    /// The error of the last failed fetch, until the next success or retry.
    #[must_use]
    pub const fn error(&self) -> Option<&FetchError> {
        self.state.error.as_ref()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state.phase == Phase::Loading
    }

    #[must_use]
    pub fn is_fetching_more(&self) -> bool {
        self.state.phase == Phase::FetchingMore
    }

    /// The request currently awaited, if any.
    #[must_use]
    pub const fn in_flight(&self) -> Option<&FetchRequest> {
        self.state.in_flight.as_ref()
    }

    /// Current generation; bumps on every query key change.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.state.generation
    }

    fn issue(&mut self, cursor: Option<String>) -> FetchRequest {
        let request = FetchRequest {
            generation: self.state.generation,
            sort: self.state.sort,
            cursor,
            limit: self.config.page_size,
        };
        self.state.in_flight = Some(request.clone());
        request
    }

    /// The trigger rule: the last materialized index reaches the last loaded
    /// row, more pages exist, and nothing is in flight.
    fn next_page_if_needed(&mut self) -> Option<FetchRequest> {
        if self.state.phase != Phase::Ready || self.state.in_flight.is_some() || !self.has_more() {
            return None;
        }

        let last_index = self.window().last_index()?;
        if last_index + 1 < self.state.rows.len() {
            return None;
        }

        let cursor = self.state.next_cursor.clone();
        self.state.phase = Phase::FetchingMore;
        Some(self.issue(cursor))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};
    use orders_dashboard_core::{OrderId, OrderStatus, ResponseMetadata, SortDirection};
    use rust_decimal::Decimal;

    use super::*;
    use crate::window::RowSlot;

    fn config(page_size: u32) -> ControllerConfig {
        ControllerConfig {
            page_size,
            layout: WindowLayout::default(),
        }
    }

    fn rows(from: u128, n: u128) -> Vec<OrderSummary> {
        let base = Utc
            .with_ymd_and_hms(2025, 5, 1, 0, 0, 0)
            .single()
            .expect("valid timestamp");
        (from..from + n)
            .map(|i| OrderSummary {
                id: OrderId::new(uuid::Uuid::from_u128(i)),
                customer_name: format!("Customer {i}"),
                order_amount: Decimal::new(1_999, 2),
                status: OrderStatus::Completed,
                created_at: base - Duration::minutes(i64::try_from(i).expect("small")),
            })
            .collect()
    }

    fn page(request: &FetchRequest, data: Vec<OrderSummary>, more: bool, total: u64) -> OrdersResponse {
        OrdersResponse {
            data,
            next_cursor: more.then(|| format!("cursor-after-{total}")),
            has_next_page: more,
            total_count: total,
            metadata: ResponseMetadata {
                sort_by: request.sort.column,
                sort_direction: request.sort.direction,
                response_time: 0,
            },
        }
    }

    /// Viewport scrolled so the last loaded row is visible.
    fn bottom(rows: usize) -> Viewport {
        Viewport::new(u32::try_from(rows * 50).expect("small").saturating_sub(600), 600)
    }

    #[test]
    fn test_new_requests_first_page() {
        let (controller, request) = ListController::new(SortOrder::default(), config(50));

        assert!(request.is_first_page());
        assert_eq!(request.limit, 50);
        assert!(controller.is_loading());
        assert_eq!(controller.in_flight(), Some(&request));
        assert!(controller.rows().is_empty());
    }

    #[test]
    fn test_first_page_applies_without_follow_up_at_top() {
        let (mut controller, first) = ListController::new(SortOrder::default(), config(50));
        controller.set_viewport(Viewport::new(0, 600));

        let completion = controller.complete(&first, Ok(page(&first, rows(0, 50), true, 120)));

        assert_eq!(completion, Completion::Applied { next: None });
        assert_eq!(controller.rows().len(), 50);
        assert_eq!(controller.total_count(), 120);
        assert!(controller.has_more());
        assert_eq!(controller.phase(), Phase::Ready);
    }

    #[test]
    fn test_scrolling_to_end_requests_exactly_one_next_page() {
        let (mut controller, first) = ListController::new(SortOrder::default(), config(50));
        controller.complete(&first, Ok(page(&first, rows(0, 50), true, 120)));

        let next = controller.set_viewport(bottom(50)).expect("next page");
        assert_eq!(next.cursor.as_deref(), Some("cursor-after-120"));
        assert!(controller.is_fetching_more());

        // A second trigger while the first is pending is coalesced.
        assert!(controller.set_viewport(bottom(51)).is_none());
        assert_eq!(controller.in_flight(), Some(&next));
    }

    #[test]
    fn test_pages_accumulate_in_order() {
        let (mut controller, first) = ListController::new(SortOrder::default(), config(50));
        controller.complete(&first, Ok(page(&first, rows(0, 50), true, 120)));
        let second = controller.set_viewport(bottom(50)).expect("second page");
        controller.complete(&second, Ok(page(&second, rows(50, 50), true, 120)));
        let third = controller.set_viewport(bottom(100)).expect("third page");
        controller.complete(&third, Ok(page(&third, rows(100, 20), false, 120)));

        let ids: Vec<OrderId> = controller.rows().iter().map(|r| r.id).collect();
        let expected: Vec<OrderId> = rows(0, 120).iter().map(|r| r.id).collect();
        assert_eq!(ids, expected);
        assert!(!controller.has_more());
        assert!(controller.set_viewport(bottom(120)).is_none());
    }

    #[test]
    fn test_short_first_page_in_tall_viewport_fetches_again() {
        let (mut controller, first) = ListController::new(SortOrder::default(), config(5));
        controller.set_viewport(Viewport::new(0, 600));

        let completion = controller.complete(&first, Ok(page(&first, rows(0, 5), true, 40)));
        let next = match completion {
            Completion::Applied { next: Some(next) } => next,
            other => panic!("expected a follow-up request, got {other:?}"),
        };
        assert!(!next.is_first_page());
    }

    #[test]
    fn test_has_more_requires_cursor() {
        let (mut controller, first) = ListController::new(SortOrder::default(), config(50));
        let mut response = page(&first, rows(0, 50), true, 120);
        response.next_cursor = None;
        controller.complete(&first, Ok(response));

        assert!(!controller.has_more());
        assert!(controller.set_viewport(bottom(50)).is_none());
    }

    #[test]
    fn test_sort_change_discards_stale_response() {
        let (mut controller, first) = ListController::new(SortOrder::default(), config(50));
        let by_name = SortOrder::new(SortColumn::CustomerName, SortDirection::Asc);
        let second = controller.set_sort(by_name).expect("new first page");

        assert!(second.is_first_page());
        assert_eq!(second.generation, first.generation + 1);

        let stale = controller.complete(&first, Ok(page(&first, rows(0, 50), true, 120)));
        assert_eq!(stale, Completion::Discarded(DiscardReason::Stale));
        assert!(controller.rows().is_empty());
        assert!(controller.is_loading());

        controller.complete(&second, Ok(page(&second, rows(500, 50), true, 120)));
        assert_eq!(controller.rows()[0].customer_name, "Customer 500");
    }

    #[test]
    fn test_sort_change_resets_rows_and_scroll() {
        let (mut controller, first) = ListController::new(SortOrder::default(), config(50));
        controller.complete(&first, Ok(page(&first, rows(0, 50), true, 120)));
        controller.set_viewport(Viewport::new(900, 600));

        controller
            .toggle_sort(SortColumn::OrderAmount)
            .expect("new first page");

        assert!(controller.rows().is_empty());
        assert_eq!(controller.sort().column, SortColumn::OrderAmount);
        assert_eq!(controller.sort().direction, SortDirection::Desc);
        assert_eq!(controller.window().range, 0..0);
    }

    #[test]
    fn test_same_sort_is_a_no_op() {
        let (mut controller, _) = ListController::new(SortOrder::default(), config(50));
        assert!(controller.set_sort(SortOrder::default()).is_none());
        assert_eq!(controller.generation(), 1);
    }

    #[test]
    fn test_toggle_active_column_flips_direction() {
        let (mut controller, _) = ListController::new(SortOrder::default(), config(50));
        let request = controller
            .toggle_sort(SortColumn::CreatedAt)
            .expect("flipped sort");
        assert_eq!(request.sort.direction, SortDirection::Asc);
    }

    #[test]
    fn test_unexpected_completion_is_ignored() {
        let (mut controller, first) = ListController::new(SortOrder::default(), config(50));
        let bogus = FetchRequest {
            cursor: Some("never-issued".to_string()),
            ..first.clone()
        };

        let completion = controller.complete(&bogus, Ok(page(&bogus, rows(0, 3), false, 3)));
        assert_eq!(completion, Completion::Discarded(DiscardReason::Unexpected));
        assert_eq!(controller.in_flight(), Some(&first));
    }

    #[test]
    fn test_first_page_failure_then_retry() {
        let (mut controller, first) = ListController::new(SortOrder::default(), config(50));
        let err = FetchError::Status {
            status: 500,
            message: "Failed to fetch orders".to_string(),
        };

        controller.complete(&first, Err(err.clone()));
        assert_eq!(
            controller.phase(),
            Phase::Failed {
                stage: FailedStage::FirstPage
            }
        );
        assert_eq!(controller.error(), Some(&err));

        let retry = controller.retry().expect("retry");
        assert_eq!(retry, first);
        assert!(controller.is_loading());
        assert!(controller.error().is_none());
        assert!(controller.retry().is_none());
    }

    #[test]
    fn test_next_page_failure_keeps_rows_and_stops_fetching() {
        let (mut controller, first) = ListController::new(SortOrder::default(), config(50));
        controller.complete(&first, Ok(page(&first, rows(0, 50), true, 120)));
        let second = controller.set_viewport(bottom(50)).expect("second page");

        controller.complete(&second, Err(FetchError::Transport("reset".to_string())));
        assert_eq!(controller.rows().len(), 50);
        assert_eq!(
            controller.phase(),
            Phase::Failed {
                stage: FailedStage::NextPage
            }
        );
        assert!(controller.set_viewport(bottom(51)).is_none());

        let retry = controller.retry().expect("retry");
        assert_eq!(retry, second);
        controller.complete(&retry, Ok(page(&retry, rows(50, 50), true, 120)));
        assert_eq!(controller.rows().len(), 100);
        assert_eq!(controller.phase(), Phase::Ready);
    }

    #[test]
    fn test_window_shows_loader_while_fetching_more() {
        let (mut controller, first) = ListController::new(SortOrder::default(), config(50));
        controller.complete(&first, Ok(page(&first, rows(0, 50), true, 120)));
        controller.set_viewport(bottom(50)).expect("next page");

        let window = controller.window();
        let last = window.rows.last().expect("rows");
        assert_eq!(last.index, 50);
        assert_eq!(last.slot, RowSlot::LoadingMore);
        assert_eq!(window.total_height_px, 51 * 50);
    }
}
