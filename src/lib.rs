pub mod config;
pub mod error;
pub mod input;
pub mod storage;
pub mod verify;

pub use config::TestConfig;
pub use error::VerifyError;
pub use verify::{ExitStatus, StorageVerifier};
