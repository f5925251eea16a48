//! Cipherbank CLI - provision components, run the task demo, fetch FHE keys
//!
//! # Quick Start
//!
//! ```bash
//! # Provision a deployment and write deployments.json
//! cipherbank deploy
//!
//! # Walk an audit task through create → complete → publish
//! cipherbank demo
//!
//! # Ask the key-generation service for a key pair
//! cipherbank keygen --id user-1 --url http://localhost:3000
//! ```
//!
//! Settings come from `--config`, `config/default`, `config/local` and
//! `CIPHERBANK__*` environment variables (e.g. `CIPHERBANK__KEYGEN__URL`).

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod client;
mod commands;
mod config;
mod display;

use client::KeyGenClient;
use config::{CipherbankConfig, LoggingConfig};

/// Cipherbank - permissioned registries and verifiable bank tasks
#[derive(Parser)]
#[command(name = "cipherbank")]
#[command(author = "Cipherbank Contributors")]
#[command(version)]
#[command(about = "Permissioned user/bank registries with a verifiable task workflow", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file (TOML, JSON or YAML)
    #[arg(short, long, global = true, env = "CIPHERBANK_CONFIG")]
    config: Option<String>,

    /// Log level (overrides config)
    #[arg(long, global = true, env = "LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: pretty or json (overrides config)
    #[arg(long, global = true, env = "LOG_FORMAT")]
    log_format: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Provision a fresh deployment and write its record
    Deploy {
        /// Output path for the deployment record
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Run the audit-task scenario and print every event
    Demo {
        /// Fetch the user's FHE public key from the key-generation service
        #[arg(long)]
        keygen: bool,
    },

    /// Request FHE keys from the key-generation service
    Keygen {
        /// Identifier to generate keys for
        #[arg(long)]
        id: String,

        /// Service base URL (overrides config)
        #[arg(long)]
        url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut config = CipherbankConfig::load(cli.config.as_deref())?;
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    if let Some(format) = cli.log_format {
        config.logging.format = format;
    }

    init_logging(&config.logging)?;

    let result = match cli.command {
        Commands::Deploy { out } => {
            let out = out.unwrap_or_else(|| config.deployment.path.clone());
            commands::deploy::run(&out, &config.events)
        }
        Commands::Demo { keygen } => {
            let client = if keygen {
                Some(KeyGenClient::new(&config.keygen.url, config.keygen.timeout())?)
            } else {
                None
            };
            commands::demo::run(&config.events, client.as_ref())
                .await
                .map(|_| ())
        }
        Commands::Keygen { id, url } => {
            let url = url.unwrap_or_else(|| config.keygen.url.clone());
            let client = KeyGenClient::new(&url, config.keygen.timeout())?;
            commands::keygen::run(&client, &id).await
        }
    };

    if let Err(e) = &result {
        display::error(&format!("{e:#}"));
    }
    result
}

/// Initialize tracing/logging
fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let subscriber = tracing_subscriber::registry().with(env_filter);

    match config.format.as_str() {
        "json" => {
            subscriber
                .with(fmt::layer().json().with_target(true))
                .init();
        }
        _ => {
            subscriber
                .with(fmt::layer().pretty().with_target(true))
                .init();
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_keygen() {
        let cli = Cli::try_parse_from([
            "cipherbank",
            "--log-format",
            "json",
            "keygen",
            "--id",
            "user-1",
        ])
        .unwrap();

        assert_eq!(cli.log_format.as_deref(), Some("json"));
        match cli.command {
            Commands::Keygen { id, url } => {
                assert_eq!(id, "user-1");
                assert!(url.is_none());
            }
            _ => panic!("expected keygen"),
        }
    }

    #[test]
    fn test_keygen_requires_id() {
        assert!(Cli::try_parse_from(["cipherbank", "keygen"]).is_err());
    }
}
