//! Error handling
//!
//! Defines error types and handling for the storage test.

pub mod handlers;
pub mod types;

pub use types::*;
