//! Visible-window computation for a virtualized list.
//!
//! Rows have a fixed estimated height. Only rows that intersect the viewport,
//! plus an overscan margin on each side, are materialized. While more pages
//! exist, one extra loader row follows the last loaded row.

use std::ops::Range;

use orders_dashboard_core::OrderSummary;

/// Estimated height of one row.
pub const ROW_HEIGHT_PX: u32 = 50;

/// Rows materialized beyond each edge of the viewport.
pub const OVERSCAN: usize = 5;

/// The scroll container's visible area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    /// Scroll offset from the top of the list.
    pub offset_px: u32,
    /// Height of the visible area.
    pub height_px: u32,
}

impl Viewport {
    #[must_use]
    pub const fn new(offset_px: u32, height_px: u32) -> Self {
        Self {
            offset_px,
            height_px,
        }
    }
}

/// Row geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowLayout {
    pub row_height_px: u32,
    pub overscan: usize,
}

impl Default for WindowLayout {
    fn default() -> Self {
        Self {
            row_height_px: ROW_HEIGHT_PX,
            overscan: OVERSCAN,
        }
    }
}

impl WindowLayout {
    /// Indices to materialize for `count` virtual rows, overscan included.
    #[must_use]
    pub fn range(&self, count: usize, viewport: Viewport) -> Range<usize> {
        if count == 0 {
            return 0..0;
        }

        let row_height = self.row_height_px.max(1);
        let first = (viewport.offset_px / row_height) as usize;
        let bottom = viewport.offset_px.saturating_add(viewport.height_px.saturating_sub(1));
        let last = ((bottom / row_height) as usize).min(count - 1);
        let first = first.min(last);

        let start = first.saturating_sub(self.overscan);
        let end = last.saturating_add(self.overscan).min(count - 1) + 1;
        start..end
    }

    /// Top offset of row `index`.
    #[must_use]
    pub fn start_px(&self, index: usize) -> u64 {
        index as u64 * u64::from(self.row_height_px)
    }

    /// Height of `count` rows.
    #[must_use]
    pub fn total_height_px(&self, count: usize) -> u64 {
        self.start_px(count)
    }
}

/// What a materialized row shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowSlot<'a> {
    /// A loaded order.
    Order(&'a OrderSummary),
    /// The loader row while the next page is being fetched.
    LoadingMore,
    /// The loader row while more pages exist but none is in flight.
    Pending,
}

/// One materialized row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VirtualRow<'a> {
    pub index: usize,
    pub start_px: u64,
    pub slot: RowSlot<'a>,
}

/// The rows to render for the current viewport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualWindow<'a> {
    /// Materialized index range, overscan included.
    pub range: Range<usize>,
    /// Materialized rows, in index order.
    pub rows: Vec<VirtualRow<'a>>,
    /// Height of the whole scrollable list.
    pub total_height_px: u64,
}

impl<'a> VirtualWindow<'a> {
    /// Lay out `rows` (plus a loader row when `has_more`) for `viewport`.
    #[must_use]
    pub fn compute(
        layout: WindowLayout,
        viewport: Viewport,
        rows: &'a [OrderSummary],
        has_more: bool,
        fetching_more: bool,
    ) -> Self {
        let count = rows.len() + usize::from(has_more);
        let range = layout.range(count, viewport);

        let materialized = range
            .clone()
            .map(|index| VirtualRow {
                index,
                start_px: layout.start_px(index),
                slot: match rows.get(index) {
                    Some(order) => RowSlot::Order(order),
                    None if fetching_more => RowSlot::LoadingMore,
                    None => RowSlot::Pending,
                },
            })
            .collect();

        Self {
            range,
            rows: materialized,
            total_height_px: layout.total_height_px(count),
        }
    }

    /// Index of the last materialized row.
    #[must_use]
    pub fn last_index(&self) -> Option<usize> {
        self.range.end.checked_sub(1).filter(|_| !self.range.is_empty())
    }
}
