//! Console and log-file output.
//!
//! The console gets progress and the final report on stderr, leaving stdout
//! to `--json`. The log file gets the full per-disc breakdown at DEBUG level.

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, Layer};

/// Targets written to the log file. Dependencies stay at INFO.
const FILE_FILTER: &str = "info,miafix_core=debug,mia_fixer=debug";

/// Log file name for a run started at `timestamp`.
pub fn log_file_name(timestamp: &chrono::DateTime<chrono::Local>) -> String {
    format!("mia-fix({}).log", timestamp.format("%Y-%m-%d %H-%M-%S"))
}

/// Install the subscriber. Returns the log file path.
pub fn init(debug: bool, log_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;
    let log_path = log_dir.join(log_file_name(&chrono::Local::now()));
    let file = File::create(&log_path)
        .with_context(|| format!("Failed to create log file {}", log_path.display()))?;

    let console_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if debug {
            "info,miafix_core=debug,mia_fixer=debug"
        } else {
            "info"
        })
    });

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(io::stderr)
                .with_ansi(io::stderr().is_terminal())
                .with_target(false)
                .without_time()
                .compact()
                .with_filter(console_filter),
        )
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_target(false)
                .with_writer(Mutex::new(file))
                .with_filter(EnvFilter::new(FILE_FILTER)),
        )
        .init();

    Ok(log_path)
}
