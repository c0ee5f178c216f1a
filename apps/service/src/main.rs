use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tokio::signal;
use tokio::sync::RwLock;
use tracing::{info, warn};

use netpulse_service::config::Config;
use netpulse_service::monitoring::{HttpProber, MonitorScheduler, PingProber, Prober};
use netpulse_service::registry::EndpointRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ProberKind {
    /// System `ping` utility (ICMP)
    Ping,
    /// HTTPS GET against the bare host
    Http,
}

#[derive(Debug, Parser)]
#[command(name = "netpulse-service", version, about = "Periodic reachability monitor for a small set of network endpoints")]
struct Cli {
    /// Path to the TOML config/snapshot file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Probe transport
    #[arg(long, value_enum, default_value_t = ProberKind::Ping)]
    prober: ProberKind,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    logger::init_with_level(if cli.debug {
        logger::LevelFilter::DEBUG
    } else {
        logger::LevelFilter::INFO
    });

    let config_path =
        Config::resolve_path(cli.config.as_deref()).context("Failed to resolve config path")?;
    let config = Config::load_or_default(&config_path);
    info!("Config file: {}", config_path.display());
    tracing::debug!("{config}");

    let mut registry = EndpointRegistry::new();
    config.apply_targets(&mut registry);

    let prober: Arc<dyn Prober> = match cli.prober {
        ProberKind::Ping => Arc::new(PingProber::new(config.preferences.timeout_seconds)),
        ProberKind::Http => Arc::new(
            HttpProber::new(config.preferences.timeout_seconds)
                .context("Failed to build HTTP prober")?,
        ),
    };

    let registry = Arc::new(RwLock::new(registry));
    let mut scheduler = MonitorScheduler::new(
        Arc::clone(&registry),
        prober,
        Duration::from_millis(config.preferences.interval_ms),
    );

    if config.auto_start && !registry.read().await.is_empty() {
        scheduler.start();
    } else {
        info!("Auto-start disabled or no targets configured; monitoring is idle");
    }

    signal::ctrl_c().await.context("Failed to listen for ctrl_c")?;
    info!("Received Ctrl+C, shutting down");
    scheduler.stop();

    let snapshot =
        Config::capture(&*registry.read().await, config.auto_start, config.preferences);
    match snapshot.write_config(&config_path) {
        Ok(()) => info!("Configuration saved: {}", config_path.display()),
        Err(error) => warn!("Could not save configuration: {error}"),
    }

    Ok(())
}
