//! Orders Dashboard Core - Shared types library.
//!
//! This crate provides common types used across all orders dashboard components:
//! - `server` - The paginated orders API
//! - `client` - The incremental list controller that consumes the API
//! - `cli` - Command-line tools for migrations, seeding and browsing
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP clients. The wire contract between server and client lives
//! here so both sides agree on it by construction.
//!
//! # Modules
//!
//! - [`types`] - Order records, list projections, statuses and type-safe ids
//! - [`pagination`] - Sort model, opaque cursors, query validation and the
//!   response envelope

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod pagination;
pub mod types;

pub use pagination::*;
pub use types::*;
