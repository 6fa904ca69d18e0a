//! Storage verification
//!
//! Chunked write, read-back and compare test for flash-backed parameter storage.

pub mod operations;
pub mod pattern;
pub mod results;

pub use operations::StorageVerifier;
pub use pattern::{fill_pattern, pattern_byte};
pub use results::{ChunkReport, ExitStatus, PhaseOutcome};
