//! Uptime Seeker
//!
//! A flexible Prometheus-compatible uptime checker for your services.
//!
//! ```text
//! ┌──────────────┐    ┌──────────────┐    ┌──────────────┐
//! │    Config    │───▶│    Fleet     │───▶│   Seekers    │──▶ remote hosts
//! │   (hosts)    │    │              │    │ (1 per host) │
//! └──────────────┘    └──────────────┘    └──────┬───────┘
//!                                                │ gauges
//!                     ┌──────────────┐    ┌──────▼───────┐
//!   Prometheus ──────▶│   /metrics   │───▶│   Registry   │
//!                     └──────────────┘    └──────────────┘
//! ```

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn, Level};
use tracing_subscriber::filter::Directive;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use uptime_seeker::config::{self, CheckDefaults, ConfigFile};
use uptime_seeker::error::{Error, Result};
use uptime_seeker::exposition::{self, MetricsServer};
use uptime_seeker::fleet::Fleet;
use uptime_seeker::shutdown;

// =============================================================================
// CLI Arguments
// =============================================================================

/// A flexible Prometheus-compatible uptime checker for your services.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, env = "LOG_JSON")]
    log_json: bool,

    /// Comma-separated list of hosts to check
    #[arg(short = 'H', long, env = "HOSTS", value_delimiter = ',')]
    hosts: Vec<String>,

    /// Interval in seconds between each check
    #[arg(short = 'i', long, env = "INTERVAL", default_value = "5")]
    interval: u64,

    /// Timeout in seconds for each check
    #[arg(short = 't', long, env = "TIMEOUT", default_value = "5")]
    timeout: u64,

    /// Port on which the metrics endpoint will be exposed
    #[arg(short = 'p', long, env = "PORT", default_value = "8080")]
    port: u16,

    /// Address on which the metrics endpoint will be exposed
    #[arg(long, env = "BIND_ADDRESS", default_value = "0.0.0.0")]
    bind_address: IpAddr,

    /// Configuration file (defaults to the first config.toml found in
    /// ., $HOME/.uptimer or /app)
    #[arg(short = 'c', long, env = "CONFIG")]
    config: Option<PathBuf>,
}

// =============================================================================
// Main
// =============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args);

    info!("Starting Uptime Seeker {}", env!("CARGO_PKG_VERSION"));

    let config_file = read_configuration(&args);
    let defaults = CheckDefaults {
        timeout: Duration::from_secs(args.timeout),
        interval: Duration::from_secs(args.interval),
    };

    let hosts = config::resolve(&args.hosts, config_file.as_ref(), &defaults).map_err(|e| {
        error!("No hosts to check. Exiting.");
        e
    })?;

    let registry = exposition::new_registry()?;

    let addr = SocketAddr::new(args.bind_address, args.port);
    let server = MetricsServer::bind(addr, registry.clone())
        .await
        .map_err(|e| {
            error!("Failed to start the HTTP server: {}", e);
            e
        })?;

    let shutdown = CancellationToken::new();
    shutdown::spawn_signal_listener(shutdown.clone());

    let fleet = Fleet::start(&hosts, &registry, shutdown.child_token());
    if fleet.is_empty() {
        error!("No seeker could be started. Exiting.");
        return Err(Error::NoHosts);
    }

    server.serve(shutdown.clone()).await;
    fleet.shutdown().await;

    info!("Uptime Seeker shutdown complete");
    Ok(())
}

// =============================================================================
// Configuration
// =============================================================================

/// Read the configuration file, falling back to CLI/env hosts only
fn read_configuration(args: &Args) -> Option<ConfigFile> {
    let path = match args.config.clone().or_else(ConfigFile::discover) {
        Some(path) => path,
        None => {
            warn!("No configuration file found");
            return None;
        }
    };

    info!("Reading configuration from {}", path.display());
    match ConfigFile::load(&path) {
        Ok(config) => Some(config),
        Err(e) => {
            warn!("Failed to read configuration: {}", e);
            None
        }
    }
}

// =============================================================================
// Logging Setup
// =============================================================================

fn init_logging(args: &Args) {
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = ["hyper=warn", "reqwest=warn"]
        .iter()
        .filter_map(|directive| directive.parse::<Directive>().ok())
        .fold(
            EnvFilter::from_default_env().add_directive(level.into()),
            |filter, directive| filter.add_directive(directive),
        );

    if args.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true))
            .init();
    }
}
