//! Core types for the orders dashboard.
//!
//! This module provides type-safe wrappers for the order domain.

pub mod id;
pub mod order;
pub mod status;

pub use id::*;
pub use order::{Order, OrderItem, OrderItems, OrderSummary};
pub use status::{OrderStatus, OrderStatusError};
