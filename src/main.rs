//! price-watch - Scheduled lowest-price watcher with email alerts

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use price_watch::client::HttpFetcher;
use price_watch::config::{Config, OutputFormat};
use price_watch::format::Formatter;
use price_watch::notify::{LogNotifier, Notifier, SmtpNotifier};
use price_watch::store::{DryRunStore, JsonFileStore, PriceStore};
use price_watch::watch::{PriceWatch, WatchSettings};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "price-watch",
    version,
    about = "Scheduled lowest-price watcher with email alerts",
    long_about = "Scrapes a listing page for the lowest advertised price and emails you when it changes."
)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true)]
    format: Option<OutputFormat>,

    /// Proxy URL (e.g., socks5://host:port)
    #[arg(long, global = true, env = "PRICE_WATCH_PROXY")]
    proxy: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the price once
    #[command(alias = "c")]
    Check {
        /// Log the alert and skip the store write
        #[arg(long)]
        dry_run: bool,
    },

    /// Check the price on a fixed interval until interrupted
    #[command(alias = "w")]
    Watch {
        /// Seconds between checks
        #[arg(short, long)]
        interval: Option<u64>,

        /// Log alerts and skip store writes
        #[arg(long)]
        dry_run: bool,
    },

    /// Show the stored price
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new(Level::DEBUG.to_string())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };

    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    // Load config with layered overrides
    let mut config = Config::load(cli.config.as_deref())?.with_env();

    if let Some(format) = cli.format {
        config.format = format;
    }
    if let Some(proxy) = cli.proxy {
        config.proxy = Some(proxy);
    }

    let formatter = Formatter::new(config.format);
    let store = JsonFileStore::new(config.store_path(), &config.partition_key, &config.row_key);

    match cli.command {
        Commands::Check { dry_run } => {
            config.validate(!dry_run)?;
            let fetcher = HttpFetcher::new(&config).context("Failed to create HTTP client")?;
            let settings = WatchSettings::from(&config);

            let outcome = if dry_run {
                PriceWatch::new(fetcher, DryRunStore::new(store), LogNotifier, settings)
                    .run_once()
                    .await?
            } else {
                let notifier = SmtpNotifier::new(&config.mail)?;
                PriceWatch::new(fetcher, store, notifier, settings).run_once().await?
            };

            println!("{}", formatter.format_outcome(&outcome));
        }

        Commands::Watch { interval, dry_run } => {
            if let Some(secs) = interval {
                config.interval_secs = secs;
            }
            config.validate(!dry_run)?;

            let fetcher = HttpFetcher::new(&config).context("Failed to create HTTP client")?;
            let settings = WatchSettings::from(&config);
            let period = Duration::from_secs(config.interval_secs);

            info!("Checking {} every {}s", config.product, config.interval_secs);
            if dry_run {
                let watch =
                    PriceWatch::new(fetcher, DryRunStore::new(store), LogNotifier, settings);
                run_watch(&watch, period, &formatter).await;
            } else {
                let notifier = SmtpNotifier::new(&config.mail)?;
                let watch = PriceWatch::new(fetcher, store, notifier, settings);
                run_watch(&watch, period, &formatter).await;
            }
        }

        Commands::Show => {
            let record = store.read_record().await?;
            println!("{}", formatter.format_record(record.as_ref()));
        }
    }

    Ok(())
}

async fn run_watch<S, N>(
    watch: &PriceWatch<HttpFetcher, S, N>,
    period: Duration,
    formatter: &Formatter,
) where
    S: PriceStore,
    N: Notifier,
{
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    watch
        .run_forever(period, shutdown, |result| {
            if let Ok(outcome) = result {
                println!("{}", formatter.format_outcome(outcome));
            }
        })
        .await;
}
