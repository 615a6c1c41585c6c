// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>
//! Orchestrate search endpoint binary
//!
//! Serves `GET /?query=..` searches against one collection.

use anyhow::Context;
use clap::Parser;
use orchestrate_client::{ClientConfig, OrchestrateClient};
use orchestrate_search::AppState;

/// Search one Orchestrate collection over HTTP.
#[derive(Parser, Debug)]
#[command(name = "orchestrate-search", version, about)]
struct Cli {
    /// Port to listen on.
    #[arg(long, env = "PORT", default_value_t = 8080)]
    port: u16,

    /// Address to bind.
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Orchestrate API key.
    #[arg(long, env = "ORCHESTRATE_API_KEY", hide_env_values = true)]
    api_key: String,

    /// Collection searched by every request.
    #[arg(long, env = "ORCHESTRATE_COLLECTION", default_value = "emails")]
    collection: String,

    /// Override the API root, e.g. for a staging endpoint.
    #[arg(long, env = "ORCHESTRATE_API_ROOT")]
    api_root: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = ClientConfig::from_env();
    if let Some(root) = &cli.api_root {
        config = config.with_api_root(root);
    }
    let client = OrchestrateClient::with_config(&cli.api_key, config)
        .context("building Orchestrate client")?;

    tracing::info!(
        collection = %cli.collection,
        api_root = client.api_root(),
        "Starting search endpoint on {}:{}",
        cli.host,
        cli.port
    );

    let addr = format!("{}:{}", cli.host, cli.port);
    orchestrate_search::serve(&addr, AppState::new(client, &cli.collection))
        .await
        .with_context(|| format!("serving on {addr}"))?;

    Ok(())
}
