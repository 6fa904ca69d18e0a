//! Verification operations
//!
//! Writes the test pattern in chunks, reads it back and compares byte by byte,
//! once per configured chunk size.

use log::{debug, info, warn};
use std::path::Path;
use std::time::Instant;

use crate::config::TestConfig;
use crate::error::VerifyError;
use crate::error::handlers::handle_error;
use crate::input::{InputSource, check_user_abort};
use crate::storage::{StorageBackend, StorageHandle};
use crate::verify::pattern::{fill_pattern, first_mismatch};
use crate::verify::results::{ChunkReport, ExitStatus, PhaseOutcome};

/// Drives the write/read-back test against one storage file
pub struct StorageVerifier<B: StorageBackend, I: InputSource> {
    config: TestConfig,
    backend: B,
    input: I,
    reports: Vec<ChunkReport>,
}

impl<B: StorageBackend, I: InputSource> StorageVerifier<B, I> {
    pub fn new(config: TestConfig, backend: B, input: I) -> Self {
        Self {
            config,
            backend,
            input,
            reports: Vec::new(),
        }
    }

    pub fn config(&self) -> &TestConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Chunk-size passes completed by the last run
    pub fn reports(&self) -> &[ChunkReport] {
        &self.reports
    }

    /// Run the full test and report its outcome
    pub fn run_test(&mut self) -> ExitStatus {
        self.reports.clear();

        match self.try_run() {
            Ok(PhaseOutcome::Completed) => {
                info!(
                    "MTD test passed for {} chunk size(s)",
                    self.reports.len()
                );
                ExitStatus::Success
            }
            Ok(PhaseOutcome::Aborted) => ExitStatus::Aborted,
            Err(err) => {
                handle_error(&err);
                ExitStatus::Failure(err)
            }
        }
    }

    fn try_run(&mut self) -> Result<PhaseOutcome, VerifyError> {
        let path = self.config.target_path.clone();

        if !self.backend.exists(&path) {
            return Err(VerifyError::StorageNotMounted { path });
        }

        let chunk_sizes = self.config.chunk_sizes.clone();
        let mut write_buf = Vec::new();
        let mut read_buf = Vec::new();

        for chunk_size in chunk_sizes {
            info!("====== FILE TEST: {} bytes chunks ======", chunk_size);

            fill_pattern(&mut write_buf, chunk_size);
            read_buf.clear();
            read_buf.resize(chunk_size, 0);

            let iterations = self.config.iterations(chunk_size);
            let untested_bytes = self.config.untested_bytes(chunk_size);
            if untested_bytes > 0 {
                debug!(
                    "{} trailing bytes not covered by {}-byte chunks",
                    untested_bytes, chunk_size
                );
            }

            info!("Testing unaligned writes - please wait..");
            let start = Instant::now();
            if self.write_phase(&path, &write_buf, iterations)? == PhaseOutcome::Aborted {
                return Ok(PhaseOutcome::Aborted);
            }
            let write_elapsed = start.elapsed();

            let start = Instant::now();
            if self.read_phase(&path, &write_buf, &mut read_buf, iterations)?
                == PhaseOutcome::Aborted
            {
                return Ok(PhaseOutcome::Aborted);
            }
            let read_elapsed = start.elapsed();

            let report = ChunkReport {
                chunk_size,
                iterations,
                untested_bytes,
                write_elapsed,
                read_elapsed,
            };
            info!(
                "RESULT: OK! No readback errors ({} bytes, write {:.1} KiB/s, read {:.1} KiB/s)",
                report.bytes_tested(),
                report.write_kib_per_sec(),
                report.read_kib_per_sec()
            );
            self.reports.push(report);
        }

        Ok(PhaseOutcome::Completed)
    }

    /// Write `iterations` copies of the pattern, syncing after every write
    fn write_phase(
        &mut self,
        path: &Path,
        pattern: &[u8],
        iterations: usize,
    ) -> Result<PhaseOutcome, VerifyError> {
        let chunk_size = pattern.len();
        let mut handle = self
            .backend
            .open_write(path)
            .map_err(|e| VerifyError::io("open for write", path, e))?;

        for iteration in 0..iterations {
            let written = handle.write(pattern).map_err(|e| VerifyError::WriteError {
                chunk_size,
                iteration,
                written: 0,
                source: Some(e),
            })?;

            if written != chunk_size {
                return Err(VerifyError::WriteError {
                    chunk_size,
                    iteration,
                    written,
                    source: None,
                });
            }

            handle.sync().map_err(|e| VerifyError::SyncError {
                chunk_size,
                iteration,
                source: e,
            })?;

            if check_user_abort(&mut self.input) {
                abort_run(handle, path);
                return Ok(PhaseOutcome::Aborted);
            }
        }

        handle
            .close()
            .map_err(|e| VerifyError::io("close", path, e))?;

        Ok(PhaseOutcome::Completed)
    }

    /// Read back `iterations` chunks and compare each against the pattern
    fn read_phase(
        &mut self,
        path: &Path,
        pattern: &[u8],
        read_buf: &mut [u8],
        iterations: usize,
    ) -> Result<PhaseOutcome, VerifyError> {
        let chunk_size = pattern.len();
        let mut handle = self
            .backend
            .open_read(path)
            .map_err(|e| VerifyError::io("open for read", path, e))?;

        for iteration in 0..iterations {
            let read = handle.read(read_buf).map_err(|e| VerifyError::ReadError {
                chunk_size,
                iteration,
                read: 0,
                source: Some(e),
            })?;

            if read != chunk_size {
                return Err(VerifyError::ReadError {
                    chunk_size,
                    iteration,
                    read,
                    source: None,
                });
            }

            if let Some(offset) = first_mismatch(pattern, read_buf) {
                return Err(VerifyError::ComparisonError {
                    chunk_size,
                    iteration,
                    offset,
                    expected: pattern[offset],
                    actual: read_buf[offset],
                });
            }

            if check_user_abort(&mut self.input) {
                abort_run(handle, path);
                return Ok(PhaseOutcome::Aborted);
            }
        }

        handle
            .close()
            .map_err(|e| VerifyError::io("close", path, e))?;

        Ok(PhaseOutcome::Completed)
    }
}

/// Sync and close the open handle after a user abort
///
/// Failures are only logged, the run still ends as aborted.
fn abort_run<H: StorageHandle>(mut handle: H, path: &Path) {
    warn!("Test aborted.");

    if let Err(e) = handle.sync() {
        warn!("Failed to sync {} after abort: {}", path.display(), e);
    }
    if let Err(e) = handle.close() {
        warn!("Failed to close {} after abort: {}", path.display(), e);
    }
}
