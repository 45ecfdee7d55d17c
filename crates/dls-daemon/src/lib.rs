//! dls-daemon library target.
//!
//! Exposes the router, state and API types for integration tests.
//! The binary `main.rs` depends on this library target.

pub mod api_types;
pub mod error;
pub mod routes;
pub mod state;
