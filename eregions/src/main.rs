//! # eRegions
//!
//! Runs the plugin against a simulated server driven from the terminal. Type `help` for the
//! list of console commands.
//!
//! Files are kept in the directory given as the first argument, the working directory by
//! default. The log level follows `RUST_LOG` and defaults to `info`, or `debug` when the
//! configuration turns on debugging.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use eregions_core::region::MemoryRegionDirectory;
use eregions_core::selection::MemorySelectionTool;
use eregions_core::{ConfigStore, ERegions, SystemClock};
use tokio::runtime::Builder;
use tokio::signal::ctrl_c;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::subscriber::set_global_default;
use tracing_log::LogTracer;
use tracing_subscriber::EnvFilter;

use crate::console::Console;
use crate::host::SimHost;

mod console;
mod host;

const CONFIG_FILE: &str = "eregions_config.json5";
const REGIONS_FILE: &str = "regions.json";
const DEFAULT_WORLD: &str = "world";
/// Length of one server tick.
const TICK: Duration = Duration::from_millis(50);

fn main() -> anyhow::Result<()> {
    let data_dir = env::args_os()
        .nth(1)
        .map_or_else(|| PathBuf::from("."), PathBuf::from);
    fs::create_dir_all(&data_dir)?;

    let config = Arc::new(ConfigStore::load_or_create(data_dir.join(CONFIG_FILE))?);
    init_logging(config.get().settings.debug)?;

    let runtime = Builder::new_multi_thread().enable_all().build()?;
    let result = runtime.block_on(run(&data_dir, config));
    // Stdin reads cannot be interrupted, so the runtime is not waited on forever.
    runtime.shutdown_timeout(Duration::from_millis(250));
    result
}

fn init_logging(debug: bool) -> anyhow::Result<()> {
    let level = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .finish();
    set_global_default(subscriber)?;
    LogTracer::init()?;
    Ok(())
}

async fn run(data_dir: &Path, config: Arc<ConfigStore>) -> anyhow::Result<()> {
    let directory = Arc::new(MemoryRegionDirectory::open(data_dir.join(REGIONS_FILE))?);
    let host = Arc::new(SimHost::new(DEFAULT_WORLD));
    let plugin = Arc::new(ERegions::new(
        host.clone(),
        Arc::new(SystemClock),
        directory,
        Arc::new(MemorySelectionTool::new()),
        config,
    ));

    let cancel_token = CancellationToken::new();
    let ticker = tokio::spawn(tick_loop(plugin.clone(), cancel_token.clone()));
    tokio::spawn(Console::new(plugin.clone(), host, cancel_token.clone()).run());
    log::info!("Type 'help' for console commands");

    tokio::select! {
        () = cancel_token.cancelled() => {}
        signal = ctrl_c() => {
            if let Err(error) = signal {
                log::error!("Failed to listen for Ctrl-C: {error}");
            }
        }
    }
    cancel_token.cancel();
    if let Err(error) = ticker.await {
        log::error!("Tick loop panicked: {error}");
    }

    plugin.shutdown();
    Ok(())
}

async fn tick_loop(plugin: Arc<ERegions>, cancel_token: CancellationToken) {
    let mut ticks = interval(TICK);
    ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        tokio::select! {
            () = cancel_token.cancelled() => break,
            _ = ticks.tick() => plugin.tick(),
        }
    }
}
