//! Configuration management for the MTD storage test
//!
//! Test parameters come from built-in defaults, an optional `mtd_test.toml`
//! and `MTD_TEST_*` environment overrides, in that order.

use config::{Config, ConfigError, Environment, File, FileFormat, FileSourceFile};
use log::warn;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Parameter file on the flash-backed storage mount
pub const DEFAULT_TARGET_PATH: &str = "/fs/mtd_params";

/// Bytes covered by every chunk-size pass
pub const DEFAULT_TOTAL_SIZE: usize = 4096;

/// Chunk sizes exercised, in order
pub const DEFAULT_CHUNK_SIZES: [usize; 3] = [256, 512, 4096];

const DEFAULT_CONFIG_NAME: &str = "mtd_test";
const ENV_PREFIX: &str = "MTD_TEST";

/// Parameters of one test run
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct TestConfig {
    /// File the patterns are written to and read back from
    /// Environment: MTD_TEST_TARGET_PATH
    pub target_path: PathBuf,

    /// Total bytes per pass; the remainder after division by the chunk size
    /// is never written
    /// Environment: MTD_TEST_TOTAL_SIZE
    pub total_size: usize,

    /// Chunk sizes to exercise, comma separated in the environment
    /// Environment: MTD_TEST_CHUNK_SIZES
    pub chunk_sizes: Vec<usize>,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            target_path: PathBuf::from(DEFAULT_TARGET_PATH),
            total_size: DEFAULT_TOTAL_SIZE,
            chunk_sizes: DEFAULT_CHUNK_SIZES.to_vec(),
        }
    }
}

impl TestConfig {
    pub fn new(target_path: impl Into<PathBuf>, total_size: usize, chunk_sizes: Vec<usize>) -> Self {
        Self {
            target_path: target_path.into(),
            total_size,
            chunk_sizes,
        }
    }

    /// Load configuration from `mtd_test.toml` (if present) with environment overrides
    pub fn load() -> Result<Self, ConfigError> {
        Self::build(File::with_name(DEFAULT_CONFIG_NAME).required(false))
    }

    /// Load configuration from an explicit file with environment overrides
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        Self::build(File::from(path))
    }

    fn build(file: File<FileSourceFile, FileFormat>) -> Result<Self, ConfigError> {
        let default_chunks: Vec<i64> = DEFAULT_CHUNK_SIZES.iter().map(|&c| c as i64).collect();

        let settings = Config::builder()
            .set_default("target_path", DEFAULT_TARGET_PATH)?
            .set_default("total_size", DEFAULT_TOTAL_SIZE as i64)?
            .set_default("chunk_sizes", default_chunks)?
            .add_source(file)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("chunk_sizes"),
            )
            .build()?;

        let config: TestConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validation for all configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target_path.as_os_str().is_empty() {
            return Err(ConfigError::Message("target_path cannot be empty".into()));
        }

        if self.total_size == 0 {
            return Err(ConfigError::Message(
                "total_size must be greater than 0".into(),
            ));
        }

        if self.chunk_sizes.is_empty() {
            return Err(ConfigError::Message(
                "chunk_sizes must name at least one chunk size".into(),
            ));
        }

        if self.chunk_sizes.contains(&0) {
            return Err(ConfigError::Message(
                "chunk sizes must be greater than 0".into(),
            ));
        }

        for &chunk_size in &self.chunk_sizes {
            if chunk_size > self.total_size {
                warn!(
                    "Chunk size {} exceeds total size {}, that pass writes nothing",
                    chunk_size, self.total_size
                );
            }
        }

        Ok(())
    }

    /// Number of write (and read) operations for one chunk size
    pub fn iterations(&self, chunk_size: usize) -> usize {
        self.total_size / chunk_size
    }

    /// Trailing bytes a pass with this chunk size never touches
    pub fn untested_bytes(&self, chunk_size: usize) -> usize {
        self.total_size % chunk_size
    }
}
