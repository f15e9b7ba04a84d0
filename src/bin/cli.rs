//! auto-news CLI
//!
//! Local entry point: runs the polling loop or a single tick.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use auto_news::{
    error::Result,
    models::Config,
    notify::{LogNotifier, Notifier, WebhookNotifier},
    pipeline::{self, Scheduler},
    storage::{JsonFileStore, MemoryStore, SnapshotStore},
    utils::http::{self, HttpFetcher},
};
use clap::{Parser, Subcommand};

/// auto-news - Discord news announcer
#[derive(Parser, Debug)]
#[command(
    name = "auto-news",
    version,
    about = "Polls launcher, staff and shop pages and announces changes"
)]
struct Cli {
    /// Path to the TOML config file
    #[arg(short, long, default_value = "data/config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Log announcements instead of posting them, and persist nothing
    #[arg(long)]
    dry_run: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the polling loop until Ctrl-C
    Run,

    /// Run a single tick (every checker is due) and exit
    Tick,

    /// Validate configuration
    Validate,

    /// Show saved snapshot info
    Info,
}

/// Initialize logging from the verbosity flag and configured level.
fn init_logging(verbose: bool, level: &str) {
    let level = if verbose { "debug" } else { level };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Snapshot store for this invocation.
///
/// A dry run diffs against the saved data but keeps every write in memory.
async fn open_store(config: &Config, dry_run: bool) -> Result<Arc<dyn SnapshotStore>> {
    let file = JsonFileStore::open(&config.storage.path).await?;
    if !dry_run {
        return Ok(Arc::new(file));
    }

    let memory = MemoryStore::new();
    for (key, stored) in file.entries().await {
        memory.save(&key, &stored.snapshot).await?;
    }
    Ok(Arc::new(memory))
}

/// Notifier for this invocation.
fn build_notifier(config: &Config, dry_run: bool) -> Result<Arc<dyn Notifier>> {
    if dry_run {
        return Ok(Arc::new(LogNotifier));
    }
    if config.notifier.webhooks.is_empty() {
        log::warn!("No webhooks configured, announcements will only be logged");
        return Ok(Arc::new(LogNotifier));
    }

    let client = http::create_async_client(&config.http)?;
    Ok(Arc::new(WebhookNotifier::from_config(client, &config.notifier)))
}

async fn build_scheduler(config: &Config, dry_run: bool) -> Result<Scheduler> {
    let store = open_store(config, dry_run).await?;
    let notifier = build_notifier(config, dry_run)?;
    let fetcher = Arc::new(HttpFetcher::from_config(&config.http)?);

    let mut scheduler = Scheduler::new(store, notifier);
    for checker in pipeline::build_checkers(&config.checkers, fetcher) {
        scheduler.register(checker)?;
    }
    Ok(scheduler)
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();

    let loaded = Config::load(&cli.config);
    let mut config = match &loaded {
        Ok(config) => config.clone(),
        Err(_) => Config::default(),
    };
    config.apply_env();
    init_logging(cli.verbose, &config.logging.level);

    match loaded {
        Ok(_) => log::info!("Loaded configuration from {}", cli.config.display()),
        Err(e) => log::warn!(
            "Config load failed from {}: {}. Using defaults.",
            cli.config.display(),
            e
        ),
    }

    match cli.command {
        Command::Run => {
            config.validate()?;
            let mut scheduler = build_scheduler(&config, cli.dry_run).await?;

            let shutdown = async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    log::error!("Failed to listen for Ctrl-C: {}", e);
                    std::future::pending::<()>().await;
                }
            };
            scheduler
                .run_until(shutdown, Duration::from_secs(config.ticker.tick_secs))
                .await?;
        }

        Command::Tick => {
            config.validate()?;
            let mut scheduler = build_scheduler(&config, cli.dry_run).await?;

            let report = scheduler.tick().await;
            log::info!(
                "Tick {}: ran {}, failed {}, dispatched {}",
                report.tick,
                report.ran.join(", "),
                report.failed.len(),
                report.dispatched
            );
            if !scheduler.queue().is_empty() {
                log::warn!(
                    "{} delayed announcement(s) not sent; delays only elapse in `run` mode",
                    scheduler.queue().len()
                );
            }
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            let checkers = pipeline::build_checkers(
                &config.checkers,
                Arc::new(HttpFetcher::from_config(&config.http)?),
            );
            for checker in &checkers {
                log::info!(
                    "✓ {} (every {} tick(s), delay {})",
                    checker.key(),
                    checker.interval_ticks(),
                    checker.announce_delay_ticks()
                );
            }
            log::info!("✓ {} webhook(s) configured", config.notifier.webhooks.len());

            log::info!("All validations passed!");
        }

        Command::Info => {
            log::info!("Save data: {}", config.storage.path);

            let store = JsonFileStore::open(&config.storage.path).await?;
            let entries = store.entries().await;
            if entries.is_empty() {
                log::info!("No snapshots saved yet.");
            }
            for (key, stored) in entries {
                log::info!(
                    "{}: {} snapshot, {} entries, saved {}",
                    key,
                    stored.snapshot.kind(),
                    stored.snapshot.len(),
                    stored.saved_at.to_rfc3339()
                );
            }
        }
    }

    log::info!("Done!");

    Ok(())
}
