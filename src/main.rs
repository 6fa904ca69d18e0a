//! MTD storage test - Entry Point
//!
//! Writes known patterns to the parameter storage file in several chunk sizes
//! and verifies them on read-back. Press `q`, `c`, ESC or Ctrl-C to abort.

use log::{error, info};
use std::process;

use mtd_storage_test::storage::FsStorage;
use mtd_storage_test::{StorageVerifier, TestConfig};

#[cfg(unix)]
use mtd_storage_test::input::FdInput as Input;
#[cfg(not(unix))]
use mtd_storage_test::input::NoInput as Input;

fn main() {
    // Initialize the logger (env_logger picks up RUST_LOG, info by default)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match TestConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid test configuration: {}", e);
            process::exit(1);
        }
    };

    info!(
        "Launching MTD test on {} ({} bytes, chunks {:?})",
        config.target_path.display(),
        config.total_size,
        config.chunk_sizes
    );

    #[cfg(unix)]
    let input = Input::stdin();
    #[cfg(not(unix))]
    let input = Input;

    let mut verifier = StorageVerifier::new(config, FsStorage, input);
    let status = verifier.run_test();

    process::exit(status.exit_code());
}
