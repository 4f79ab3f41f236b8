//! Secrets server.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client ──▶ request id ──▶ client identity ──▶ audit ──▶ rate limit ──▶ handler
//!                                                     │                        │
//!                                                     │          ┌─────────────┴──────────┐
//!                                                     │          │ POST /v1/message       │──▶ MessageStore
//!                                                     │          │ GET  /v1/message/k/p   │──▶ MessageStore
//!                                                     │          │      (latency floor)   │
//!                                                     │          │ GET  /v1/params, ping  │
//!                                                     │          └────────────────────────┘
//!                                                     ▼
//!                                        masked record on `audit` target
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::net::TcpListener;

use pin_secrets::config::{read_config, validate_config, ConfigError, SecretsConfig};
use pin_secrets::lifecycle::{wait_for_signal, Shutdown};
use pin_secrets::observability::{logging, metrics};
use pin_secrets::{HttpServer, MemoryStore};

#[derive(Parser, Debug)]
#[command(name = "pin-secrets", version, about = "Self-destructing PIN-protected messages")]
struct Args {
    /// TOML configuration file
    #[arg(short, long, env = "SECRETS_CONFIG")]
    config: Option<PathBuf>,

    /// Listen address, overrides listener.bind_address
    #[arg(long, env = "SECRETS_BIND")]
    bind: Option<String>,

    /// PIN length, overrides limits.pin_size
    #[arg(long, env = "SECRETS_PIN_SIZE")]
    pin_size: Option<usize>,

    /// Failed PIN attempts allowed, overrides limits.max_pin_attempts
    #[arg(long, env = "SECRETS_PIN_ATTEMPTS")]
    pin_attempts: Option<u32>,

    /// Longest message lifetime in seconds, overrides limits.max_exp_sec
    #[arg(long, env = "SECRETS_MAX_EXPIRE")]
    max_expire: Option<u64>,

    /// Log level, overrides observability.log_level
    #[arg(long, env = "SECRETS_LOG_LEVEL")]
    log_level: Option<String>,
}

impl Args {
    fn apply(&self, config: &mut SecretsConfig) {
        if let Some(bind) = &self.bind {
            config.listener.bind_address = bind.clone();
        }
        if let Some(size) = self.pin_size {
            config.limits.pin_size = size;
        }
        if let Some(attempts) = self.pin_attempts {
            config.limits.max_pin_attempts = attempts;
        }
        if let Some(secs) = self.max_expire {
            config.limits.max_exp_secs = secs;
        }
        if let Some(level) = &self.log_level {
            config.observability.log_level = level.clone();
        }
    }
}

fn load(args: &Args) -> Result<SecretsConfig, ConfigError> {
    let mut config = match &args.config {
        Some(path) => read_config(path)?,
        None => SecretsConfig::default(),
    };
    args.apply(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load(&args)?;

    logging::init_logging(&config.observability);
    tracing::info!("pin-secrets v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        let addr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let shutdown = Arc::new(Shutdown::new());

    let store = MemoryStore::new(config.limits);
    tokio::spawn(store.clone().run_cleanup(
        Duration::from_secs(config.store.cleanup_interval_secs),
        shutdown.subscribe(),
    ));

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let server = HttpServer::new(config, Arc::new(store));
    let server_shutdown = shutdown.subscribe();

    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        wait_for_signal().await;
        signal_shutdown.trigger();
    });

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
