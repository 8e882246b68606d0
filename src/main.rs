//! Memescout - continuously running memecoin signal engine
//!
//! # WARNING
//! - Signals are advisory. This process never places trades.
//! - Most newly launched tokens go to zero (rug pulls, abandonment).
//! - Upstream data sources are best-effort; absence of a signal means
//!   nothing either way.

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use memescout::analysis::tier::{PositionSizer, TierTable};
use memescout::config::Config;
use memescout::engine::discovery::DiscoveryTracker;
use memescout::engine::pipeline::Pipeline;
use memescout::engine::thresholds::ThresholdStore;
use memescout::engine::Engine;
use memescout::market::MarketData;
use memescout::providers::{DexScreenerClient, DirectoryClient, HolderScanClient, RpcClient};
use memescout::sink::{LogNotifier, MemorySignalStore, SignalStore};

/// Memecoin signal engine - scans, scores and signals newly traded tokens
#[derive(Parser)]
#[command(name = "memescout")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the scan engine
    Start {
        /// Force learning mode on or off, overriding config
        #[arg(long)]
        learning: Option<bool>,
    },

    /// Show current configuration (secrets masked)
    Config,

    /// Check reachability of the enabled providers
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("memescout=info".parse().unwrap()),
        )
        .with_target(true)
        .init();

    let cli = Cli::parse();

    let mut config = match Config::load(&cli.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Start { learning } => {
            if let Some(learning) = learning {
                config.scan.learning_mode = learning;
            }
            start(&config).await
        }
        Commands::Config => {
            println!("{}", config.masked_summary());
            Ok(())
        }
        Commands::Health => health(&config).await,
    };

    if let Err(e) = result {
        error!("Command failed: {}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Build the provider stack from configuration. A provider with no key is
/// disabled rather than fatal; the facade degrades gracefully.
fn build_market(config: &Config) -> Result<(Arc<MarketData>, Option<Arc<DirectoryClient>>)> {
    let rpc = if config.providers.rpc.enabled() {
        Some(Arc::new(RpcClient::new(&config.providers.rpc)?))
    } else {
        warn!("chain RPC provider disabled; safety checks degrade to permissive defaults");
        None
    };

    let dex = Arc::new(DexScreenerClient::new(&config.providers.dexscreener)?);

    let holders = if config.providers.holderscan.enabled() {
        Some(Arc::new(HolderScanClient::new(&config.providers.holderscan)?))
    } else {
        warn!("holder provider disabled; holder counts fall back to the RPC index");
        None
    };

    let directory = if config.providers.directory.enabled {
        Some(Arc::new(DirectoryClient::new(&config.providers.directory)?))
    } else {
        None
    };

    Ok((Arc::new(MarketData::new(rpc, dex, holders)), directory))
}

async fn start(config: &Config) -> Result<()> {
    info!("starting memescout");

    let (market, directory) = build_market(config)?;

    let store: Arc<dyn SignalStore> = Arc::new(MemorySignalStore::new());
    let notifier = Arc::new(LogNotifier);

    // Persisted thresholds win, but the learning flag follows config
    let mut initial = match store.load_thresholds().await {
        Ok(Some(persisted)) => persisted,
        _ => memescout::engine::thresholds::Thresholds::default(),
    };
    initial.learning_mode = config.scan.learning_mode;
    let thresholds = Arc::new(ThresholdStore::with_thresholds(store.clone(), initial));
    let discovery = Arc::new(DiscoveryTracker::new());

    let pipeline = Pipeline::new(
        market.clone(),
        TierTable::with_overrides(&config.tiers),
        PositionSizer::new(config.sizing.base_position_size),
        config.screening.clone(),
        thresholds.clone(),
        discovery.clone(),
        store.clone(),
        notifier,
    );

    let cancel = CancellationToken::new();
    let maintenance =
        spawn_cache_maintenance(market.clone(), directory.clone(), cancel.clone());

    // Learn from outcomes: a periodic optimization pass over recent signals
    let optimizer = {
        let thresholds = thresholds.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move {
            const OPTIMIZE_INTERVAL: std::time::Duration =
                std::time::Duration::from_secs(6 * 3600);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(OPTIMIZE_INTERVAL) => {
                        match thresholds.optimize(true).await {
                            Ok(result) => info!(
                                samples = result.sample_size,
                                recommendations = result.recommendations.len(),
                                "threshold optimization pass"
                            ),
                            Err(e) => warn!(error = %e, "threshold optimization failed"),
                        }
                    }
                }
            }
        })
    };
    let engine = Engine::new(
        config.scan.clone(),
        market,
        directory,
        pipeline,
        discovery,
        cancel.clone(),
    );

    let shutdown = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("received shutdown signal");
                cancel.cancel();
            }
        })
    };

    engine.run().await;
    optimizer.abort();
    maintenance.abort();
    shutdown.abort();

    Ok(())
}

/// Periodic cache sweeper across every provider client
fn spawn_cache_maintenance(
    market: Arc<MarketData>,
    directory: Option<Arc<DirectoryClient>>,
    cancel: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    const SWEEP_INTERVAL: std::time::Duration = std::time::Duration::from_secs(180);
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(SWEEP_INTERVAL) => {
                    let mut removed = market.sweep_caches();
                    if let Some(directory) = &directory {
                        removed += directory.sweep_caches();
                    }
                    if removed > 0 {
                        tracing::debug!(removed, "cache sweep complete");
                    }
                }
            }
        }
    })
}

async fn health(config: &Config) -> Result<()> {
    let (market, directory) = build_market(config)?;

    // wSOL always has pairs; an empty answer means the aggregator is down
    let probe = "So11111111111111111111111111111111111111112";

    let metrics = market.get_token_metrics(probe).await;
    println!(
        "market aggregator: {}",
        if metrics.is_some() { "ok" } else { "unreachable" }
    );
    println!(
        "chain rpc: {}",
        if market.rpc_enabled() { "configured" } else { "disabled" }
    );

    if let Some(directory) = directory {
        let verified = directory.get_verified_tokens(5).await;
        println!(
            "token directory: {}",
            if verified.is_empty() { "unreachable" } else { "ok" }
        );
    } else {
        println!("token directory: disabled");
    }

    Ok(())
}
