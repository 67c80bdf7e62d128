//! Orders Dashboard Client - Incremental orders list.
//!
//! Consumes `GET /api/orders` page by page and keeps the state an infinitely
//! scrolling, virtualized table needs.
//!
//! # Modules
//!
//! - [`controller`] - Sans-IO list state machine: rows, cursor, fetch trigger,
//!   sort changes and stale-response discarding
//! - [`window`] - Visible-window math for fixed-height rows
//! - [`fetch`] - The [`FetchOrders`] seam
//! - [`http`] - `reqwest` implementation of [`FetchOrders`]
//! - [`feed`] - Runs controller requests on tokio

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod controller;
pub mod feed;
pub mod fetch;
pub mod http;
pub mod window;

pub use controller::{
    Completion, ControllerConfig, DiscardReason, FailedStage, FetchRequest, ListController, Phase,
};
pub use feed::OrdersFeed;
pub use fetch::{FetchError, FetchOrders};
pub use http::HttpOrdersClient;
pub use window::{RowSlot, Viewport, VirtualRow, VirtualWindow, WindowLayout};
