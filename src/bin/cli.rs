//! menu-sync CLI
//!
//! Local entry point for one-shot syncs, the background refresh loop,
//! and inspection of the stored snapshot.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use menu_sync::{
    config::Secrets,
    error::Result,
    models::{Config, Slot},
    pipeline::{CurrentMenu, SyncOrchestrator, SyncScheduler},
    services::{FeedSource, FileSource, MenuExtractor, MenuSource, SheetSource},
    storage::LocalStore,
    utils::http,
};

/// menu-sync - Daily Menu Synchronizer
#[derive(Parser, Debug)]
#[command(name = "menu-sync", version, about = "Daily bento menu synchronizer")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "menu-sync.toml")]
    config: PathBuf,

    /// Directory holding the durable snapshot store
    #[arg(long, default_value = "state")]
    state_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one sync cycle and print the result
    Sync,

    /// Run the scheduled refresh loop until interrupted
    Watch,

    /// Print the display response from the stored snapshot
    Show,

    /// Validate the configuration file
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Assemble the orchestrator: shared client, the three sources in fixed
/// priority order, and the durable store.
fn build_orchestrator(config: &Config, state_dir: &PathBuf) -> Result<Arc<SyncOrchestrator>> {
    let secrets = Secrets::from_env(config);
    let client = http::create_client(&config.http)?;
    let offset = config.sync.utc_offset_hours;

    let extractor = MenuExtractor::new(
        client.clone(),
        config.extractor.clone(),
        secrets.extractor_api_key,
    );

    let sources: Vec<Box<dyn MenuSource>> = vec![
        Box::new(SheetSource::new(
            client.clone(),
            config.sheet.clone(),
            secrets.sheet_api_key,
            offset,
        )),
        Box::new(FeedSource::new(
            client.clone(),
            config.feed.clone(),
            secrets.feed_bearer_token,
            offset,
            extractor,
        )),
        Box::new(FileSource::new(&config.fallback.path, offset)),
    ];

    let store = Arc::new(LocalStore::new(state_dir));
    let ttl = Duration::from_secs(config.sync.ttl_minutes * 60);

    Ok(Arc::new(SyncOrchestrator::new(sources, store, ttl)))
}

fn print_menu(result: &CurrentMenu) {
    match result.snapshot() {
        Some(snapshot) => {
            log::info!("Menu (origin: {}):", snapshot.origin);
            for slot in Slot::ALL {
                let item = snapshot.item(slot);
                let price = item
                    .price
                    .map(|p| format!("¥{p}"))
                    .unwrap_or_else(|| "¥---".to_string());
                log::info!("  【{}】{} {}", slot.letter(), item.name, price);
            }
            log::info!("  captured: {}", snapshot.captured_at.to_rfc3339());
            log::info!("  fetched:  {}", snapshot.fetched_at.to_rfc3339());
        }
        None => {
            log::warn!("No menu data available; display shows its placeholder");
        }
    }
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    log::info!("menu-sync starting...");

    match cli.command {
        Command::Sync => {
            let config = Config::load_or_default(&cli.config);
            let orchestrator = build_orchestrator(&config, &cli.state_dir)?;
            let result = orchestrator.sync().await;
            print_menu(&result);
        }

        Command::Watch => {
            let config = Config::load_or_default(&cli.config);
            let orchestrator = build_orchestrator(&config, &cli.state_dir)?;
            let interval = Duration::from_secs(config.sync.interval_minutes * 60);

            log::info!(
                "Refreshing every {} minutes; Ctrl-C to stop",
                config.sync.interval_minutes
            );
            let scheduler = SyncScheduler::spawn(Arc::clone(&orchestrator), interval);

            tokio::signal::ctrl_c().await?;
            log::info!("Interrupt received, shutting down");
            scheduler.shutdown().await;
        }

        Command::Show => {
            let config = Config::load_or_default(&cli.config);
            let orchestrator = build_orchestrator(&config, &cli.state_dir)?;
            let response = orchestrator.response().await;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }

        Command::Validate => {
            log::info!("Validating configuration...");
            // Strict load here: a parse error is exactly what this
            // command exists to surface.
            let config = Config::load(&cli.config)?;
            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {e}");
                return Err(e);
            }
            log::info!("✓ Config OK");
        }
    }

    log::info!("Done!");

    Ok(())
}
