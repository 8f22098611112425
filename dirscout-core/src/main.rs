//! src/main.rs
//! Runs the configured search once and prints one path per line.
//!
//! Usage: `dirscout [CONFIG.toml]`. Without an argument the platform config
//! file is used (and created with defaults when missing). Ctrl-C cancels the
//! search cooperatively; whatever is final at that point is printed.

use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use dirscout_core::{ComparatorRegistry, Config, Logger, searchlets::Searchlet};

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> Result<()> {
    let config_path: Option<PathBuf> = std::env::args_os().nth(1).map(PathBuf::from);

    let config: Config = Config::load(config_path.as_deref())
        .await
        .context("Failed to load configuration")?;

    let _log_guard = Logger::init(&config.logging).context("Failed to initialize logging")?;

    let comparators: ComparatorRegistry = ComparatorRegistry::with_builtins();
    let search: Box<dyn Searchlet> = config
        .search
        .build(&comparators)
        .map_err(|e| e.trace())
        .context("Invalid search configuration")?;

    info!("Starting {} search: {}", search.name(), search.summary());

    let cancel: CancellationToken = CancellationToken::new();
    let ctrl_c_token: CancellationToken = cancel.clone();
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, stopping search");
            ctrl_c_token.cancel();
        }
    });

    let start_time: Instant = Instant::now();
    let paths: Vec<String> = search
        .search(&cancel)
        .await
        .map_err(|e| e.trace())
        .context("Search failed")?;

    info!(
        marker = "SEARCH_COMPLETE",
        results = paths.len(),
        cancelled = cancel.is_cancelled(),
        "Search finished in {:?}",
        start_time.elapsed()
    );

    let stdout = io::stdout();
    let mut out: BufWriter<io::StdoutLock<'_>> = BufWriter::new(stdout.lock());
    for path in &paths {
        writeln!(out, "{path}").context("Failed to write results")?;
    }
    out.flush().context("Failed to write results")?;

    Ok(())
}
