//! Verification result types
//!
//! Defines result structures returned by verification runs.

use std::time::Duration;

use crate::error::VerifyError;
use crate::error::handlers::error_to_exit_code;

/// Overall outcome of a test run
#[derive(Debug)]
pub enum ExitStatus {
    /// Every configured chunk size was written and read back without error
    Success,
    /// The user stopped the run, not an error
    Aborted,
    /// The run stopped at its first failure
    Failure(VerifyError),
}

impl ExitStatus {
    /// Status code reported to the surrounding test runner
    pub fn exit_code(&self) -> i32 {
        match self {
            ExitStatus::Success | ExitStatus::Aborted => 0,
            ExitStatus::Failure(err) => error_to_exit_code(err),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, ExitStatus::Failure(_))
    }

    pub fn error(&self) -> Option<&VerifyError> {
        match self {
            ExitStatus::Failure(err) => Some(err),
            _ => None,
        }
    }
}

/// Whether a phase ran to the end or was stopped by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseOutcome {
    Completed,
    Aborted,
}

/// Result of one completed chunk-size pass
#[derive(Debug, Clone)]
pub struct ChunkReport {
    pub chunk_size: usize,
    pub iterations: usize,
    pub untested_bytes: usize,
    pub write_elapsed: Duration,
    pub read_elapsed: Duration,
}

impl ChunkReport {
    /// Bytes written and verified in this pass
    pub fn bytes_tested(&self) -> usize {
        self.chunk_size * self.iterations
    }

    /// Write throughput including the per-write sync, in KiB/s
    pub fn write_kib_per_sec(&self) -> f64 {
        kib_per_sec(self.bytes_tested(), self.write_elapsed)
    }

    /// Read-back throughput including comparison, in KiB/s
    pub fn read_kib_per_sec(&self) -> f64 {
        kib_per_sec(self.bytes_tested(), self.read_elapsed)
    }
}

fn kib_per_sec(bytes: usize, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs == 0.0 {
        return 0.0;
    }
    bytes as f64 / 1024.0 / secs
}
