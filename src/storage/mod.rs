//! Storage under test
//!
//! File-like collaborator the verifier writes to and reads back from.

pub mod filesystem;

pub use filesystem::{FsHandle, FsStorage, StorageBackend, StorageHandle};
