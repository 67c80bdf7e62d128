//! Orders Dashboard Server library.
//!
//! This crate provides the cursor-paginated orders API as a library,
//! allowing it to be tested and reused (the CLI seeds through it, the
//! integration tests serve it from an in-memory store).

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod routes;
pub mod seed;
pub mod state;
