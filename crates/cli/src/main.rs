//! sipbridge - SIP signaling relay

mod logging;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use sipbridge_relay_core::prelude::*;
use tracing::{error, info};

use crate::logging::{parse_log_level, setup_logging, LoggingConfig};

#[derive(Parser, Debug)]
#[command(name = "sipbridge")]
#[command(version, about = "SIP signaling relay")]
struct Args {
    /// Path to the YAML configuration file
    #[arg(short, long, env = "SIPBRIDGE_CONFIG")]
    config: Option<PathBuf>,

    /// Log level used when RUST_LOG is not set
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,

    /// Log span open/close events
    #[arg(long)]
    log_spans: bool,

    /// Validate the configuration, print it as JSON and exit
    #[arg(long)]
    check_config: bool,
}

fn parse_config(text: &str) -> Result<RelayConfig> {
    let config: RelayConfig = serde_yaml::from_str(text).context("Failed to decode configuration")?;
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn load_config(path: Option<&Path>) -> Result<RelayConfig> {
    match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read configuration file {}", path.display()))?;
            parse_config(&text)
        }
        None => Ok(RelayConfig::default()),
    }
}

async fn run(config: RelayConfig) -> Result<()> {
    let relay = Dispatcher::bind(config).await.context("Failed to start relay")?;

    let shutdown = relay.cancellation_token();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
        }
        info!("Shutting down");
        shutdown.cancel();
    });

    relay.run().await.context("Relay stopped with an error")
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let level = match parse_log_level(&args.log_level) {
        Ok(level) => level,
        Err(e) => {
            eprintln!("{:#}", e);
            std::process::exit(2);
        }
    };
    let mut logging = LoggingConfig::new(level).with_json(args.json_logs);
    if args.log_spans {
        logging = logging.with_spans();
    }
    if let Err(e) = setup_logging(&logging) {
        eprintln!("{:#}", e);
    }

    let config = match load_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("{:#}", e);
            std::process::exit(1);
        }
    };

    if args.check_config {
        match serde_json::to_string_pretty(&config) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Failed to encode configuration: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    info!("Starting sipbridge v{}", env!("CARGO_PKG_VERSION"));
    if let Err(e) = run(config).await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}
