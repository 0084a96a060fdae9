//! MIA Fixer - marks Missing In Action discs in Redump DAT files.
//!
//! Takes DAT files or folders (drag & drop onto the executable works too),
//! looks every system up on the Redump wiki's MIA lists, and writes a
//! `[mia-fixed]` copy of each DAT with the listed discs tagged.

mod backups;
mod interrupt;
mod logging;
mod report;

use anyhow::{bail, Context, Result};
use backups::BackupPolicy;
use clap::Parser;
use interrupt::{Interrupts, SignalAction, EXIT_INTERRUPTED};
use miafix_core::config::{PathsConfig, RegistryConfig};
use miafix_core::{
    discover_catalogs, HttpClient, MiaFixError, ReconcileOptions, Reconciler, RunStatistics,
};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Parser, Debug)]
#[command(name = "mia-fixer")]
#[command(version, about = "Tag MIA discs in Redump DAT files using the Redump wiki's MIA lists")]
struct Args {
    /// DAT files or folders to process (prompted for when omitted)
    inputs: Vec<PathBuf>,

    /// Base URL of the wiki hosting the MIA lists
    #[arg(long, env = "MIAFIX_REGISTRY_URL", default_value = RegistryConfig::BASE_URL)]
    registry_url: String,

    /// Directory for log files
    #[arg(long, env = "MIAFIX_LOG_DIR", default_value = PathsConfig::LOGS_DIR_NAME)]
    log_dir: PathBuf,

    /// Enable debug logging on the console
    #[arg(short, long)]
    debug: bool,

    /// Print the run summary as JSON on stdout
    #[arg(long)]
    json: bool,

    /// Delete the original of every updated DAT without asking
    #[arg(long, conflicts_with = "keep_originals")]
    delete_originals: bool,

    /// Keep the original of every updated DAT without asking
    #[arg(long)]
    keep_originals: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_path = logging::init(args.debug, &args.log_dir)?;
    let started = chrono::Local::now();
    debug!("Program start: {}", started.format("%Y-%m-%d %H-%M-%S"));
    debug!("Log file: {}", log_path.display());

    let interrupts = Interrupts::new();
    {
        let interrupts = interrupts.clone();
        ctrlc::set_handler(move || match interrupts.on_signal() {
            SignalAction::StopAfterCurrent => {
                warn!("Ctrl-C was pressed. Stopping after the current DAT.")
            }
            SignalAction::Exit => std::process::exit(EXIT_INTERRUPTED),
        })
        .context("Failed to install Ctrl-C handler")?;
    }

    let inputs = if args.inputs.is_empty() {
        prompt_for_input()?
    } else {
        args.inputs.clone()
    };
    debug!("Number of files/folders to check: {}", inputs.len());

    info!("Checking...");
    let sources = discover_catalogs(&inputs);
    match sources.len() {
        0 => bail!("Invalid path specified. No .dat files found."),
        1 => info!("1 DAT file detected."),
        n => info!("{} DAT files detected.", n),
    }

    let options = ReconcileOptions::default().with_registry_base_url(&args.registry_url);
    let fetcher = Arc::new(HttpClient::new()?);
    let mut reconciler = Reconciler::connect(fetcher, options)
        .await
        .context("Could not load the MIA Lists page. Please try again.")?;

    let mut stats = RunStatistics::new();
    interrupts.begin_processing();
    let run = reconciler.run(&sources, &mut stats, interrupts.token()).await;
    interrupts.end_processing();

    report::log_report(&stats, sources.len());
    if args.json {
        report::write_json(&stats.summary(), &mut io::stdout().lock())?;
    }

    // A Ctrl-C during the last DAT lets `run` finish with Ok.
    if matches!(run, Err(MiaFixError::Interrupted)) || interrupts.token().is_cancelled() {
        info!("Run interrupted; originals of updated DATs were kept.");
        std::process::exit(EXIT_INTERRUPTED);
    }
    run?;

    let policy = BackupPolicy::from_flags(args.delete_originals, args.keep_originals);
    backups::resolve(policy, stats.written(), interrupts.token())?;

    debug!("Program end: {}", chrono::Local::now().format("%Y-%m-%d %H-%M-%S"));
    Ok(())
}

/// Ask for a single file or folder path when none was given.
fn prompt_for_input() -> Result<Vec<PathBuf>> {
    let mut stderr = io::stderr().lock();
    write!(stderr, "Please enter individual file or folder path: ")?;
    stderr.flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let path = line.trim().trim_matches('"');
    if path.is_empty() {
        bail!("No path entered.");
    }
    Ok(vec![PathBuf::from(path)])
}
