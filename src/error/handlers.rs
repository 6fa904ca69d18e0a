//! Error handlers
//!
//! Reports verification failures to the operator.

use crate::error::types::VerifyError;
use log::error;

/// Handle a verification error
pub fn handle_error(err: &VerifyError) {
    error!("MTD test failed: {}", err);

    if let VerifyError::ComparisonError { .. } = err {
        error!("Aborting further comparison due to error");
    }
}

/// Convert error to process exit code
pub fn error_to_exit_code(err: &VerifyError) -> i32 {
    match err {
        VerifyError::StorageNotMounted { .. } => 1,
        VerifyError::WriteError { .. } => 1,
        VerifyError::ReadError { .. } => 1,
        VerifyError::SyncError { .. } => 1,
        VerifyError::ComparisonError { .. } => 1,
        VerifyError::Io { .. } => 1,
    }
}
