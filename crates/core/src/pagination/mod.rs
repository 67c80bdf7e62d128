//! Keyset pagination over the orders list.

pub mod cursor;
pub mod request;
pub mod response;
pub mod sort;

pub use cursor::{Cursor, CursorError, MAX_CURSOR_LEN};
pub use request::{
    DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, OrdersQuery, PageLimits, PageRequest, PageRequestError,
};
pub use response::{ErrorBody, OrdersResponse, Page, ResponseMetadata};
pub use sort::{
    InvalidSortDirection, SeekPosition, SortColumn, SortDirection, SortOrder, SortValue,
    UnknownSortColumn,
};
