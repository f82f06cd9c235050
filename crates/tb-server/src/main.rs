//! toolbridge binary entry point
//!
//! Wires configuration, provider strategies, and the stdio transport
//! together, then serves commands until stdin closes.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tb_providers::{IssueTrackerProvider, WikiProvider};
use tb_server::{default_registry, Dispatcher, Transport, ValidationChain};

/// Stdio JSON bridge between an AI assistant and issue tracker / wiki backends
#[derive(Parser, Debug)]
#[command(name = "toolbridge")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the YAML configuration file
    ///
    /// Defaults to `toolbridge.yaml` in the working directory when present;
    /// otherwise provider credentials are read from the environment.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Stdout carries protocol lines only, so all diagnostics go to stderr.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "toolbridge=info,tb_server=info,tb_providers=info,tb_config=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting toolbridge...");

    let config = tb_config::load(cli.config.as_deref()).context("failed to load configuration")?;

    let registry = default_registry().context("failed to build command registry")?;
    let validation = ValidationChain::new(config.validation.unknown_params);
    let mut dispatcher = Dispatcher::new(registry, validation);

    if let Some(credentials) = config.issue_tracker.clone() {
        let provider = IssueTrackerProvider::new(credentials, &config)
            .context("failed to build issue tracker provider")?;
        dispatcher = dispatcher.with_strategy(Arc::new(provider));
        info!("issue tracker provider configured");
    }
    if let Some(credentials) = config.wiki.clone() {
        let provider =
            WikiProvider::new(credentials, &config).context("failed to build wiki provider")?;
        dispatcher = dispatcher.with_strategy(Arc::new(provider));
        info!("wiki provider configured");
    }

    let transport = Transport::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout());
    transport
        .run(&dispatcher)
        .await
        .context("transport loop failed")?;

    info!("toolbridge exiting");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_invocation_has_no_config_path() {
        let cli = Cli::try_parse_from(["toolbridge"]).unwrap();
        assert!(cli.config.is_none());
    }

    #[test]
    fn config_flag_accepts_short_and_long_forms() {
        let cli = Cli::try_parse_from(["toolbridge", "--config", "bridge.yaml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("bridge.yaml")));

        let cli = Cli::try_parse_from(["toolbridge", "-c", "bridge.yaml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("bridge.yaml")));
    }
}
