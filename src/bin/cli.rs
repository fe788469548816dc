//! zpwatch CLI
//!
//! One invocation performs one check-and-notify cycle; scheduling is
//! external (cron, CI).

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use zpwatch::{
    error::{AppError, Result},
    models::Config,
    pipeline::run_cycle,
    services::{Dispatcher, HttpPageFetcher, Transport, WebhookTransport, fetch},
    storage::{LocalStore, SnapshotStore},
    utils::http,
};

/// zpwatch - ZwiftPower roster change monitor
#[derive(Parser, Debug)]
#[command(name = "zpwatch", version, about = "ZwiftPower roster change monitor")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "zpwatch.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one check-and-notify cycle
    Check,

    /// Validate the configuration file
    Validate,

    /// Show current snapshot info
    Info,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Validate => {
            if !cli.config.exists() {
                return Err(AppError::config(format!(
                    "config file not found: {}",
                    cli.config.display()
                )));
            }
            // Strict load here: validation should not fall back to defaults.
            let config = Config::load(&cli.config)?;
            config.validate()?;
            for selector in &config.monitor.selectors {
                fetch::parse_selector(selector)?;
            }
            log::info!(
                "Configuration OK: watching {} with {} channel(s)",
                config.monitor.target_url,
                config.channels.len()
            );
        }

        Command::Info => {
            let config = Config::load_or_default(&cli.config);
            let store = LocalStore::new(&config.storage.root_dir);
            match store.load().await? {
                Some(snapshot) => {
                    log::info!("Snapshot captured at {}", snapshot.captured_at);
                    log::info!("Fingerprint: {}", snapshot.fingerprint);
                    log::info!(
                        "{} rows, columns: {}",
                        snapshot.dataset.rows.len(),
                        snapshot.dataset.headers.join(", ")
                    );
                }
                None => log::info!("No snapshot stored yet"),
            }
        }

        Command::Check => {
            let config = Config::load_or_default(&cli.config);
            config.validate()?;

            let fetcher = HttpPageFetcher::new(&config.monitor)?;
            let store = LocalStore::new(&config.storage.root_dir);
            let client = http::create_async_client(&config.monitor)?;
            let transport: Arc<dyn Transport> = Arc::new(WebhookTransport::new(client));
            let dispatcher = Dispatcher::new(transport, &config.notify);

            let summary = run_cycle(&config, &fetcher, &store, &dispatcher).await?;
            log::debug!("Cycle summary: {}", serde_json::to_string(&summary)?);

            if summary.changed {
                log::info!(
                    "Cycle complete: {} added, {} removed, {} changed; {}/{} deliveries succeeded",
                    summary.added,
                    summary.removed,
                    summary.changed_rows,
                    summary.dispatch.attempts.len() - summary.dispatch.failure_count(),
                    summary.dispatch.attempts.len()
                );
                if summary.dispatch.all_failed() {
                    return Err(AppError::dispatch("all configured channels failed"));
                }
            } else {
                log::info!("Cycle complete: no change");
            }
        }
    }

    Ok(())
}
