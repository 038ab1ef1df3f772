//! Shared utilities: fixture integrity validation.

pub mod validation;

pub use validation::{validate_all, validate_routes, validate_streams, validate_topology};
