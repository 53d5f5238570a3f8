//! Rollcall API server entry point.

#![forbid(unsafe_code)]

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use rollcall_api::{Backend, Server, ServerConfig, server};

/// Rollcall API server
#[derive(Parser, Debug)]
#[command(name = "rollcall-server")]
#[command(about = "Contact registration API backed by a Google spreadsheet", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, env = "ROLLCALL_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on (overrides PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Spreadsheet store: google or memory (overrides ROLLCALL_BACKEND)
    #[arg(short, long)]
    backend: Option<Backend>,

    /// Serialize duplicate checks and appends
    #[arg(long)]
    serialize_writes: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,rollcall=debug".into()),
        )
        .init();

    let args = Args::parse();

    let mut config =
        ServerConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(backend) = args.backend {
        config.backend = backend;
    }
    if args.serialize_writes {
        config.serialize_writes = true;
    }
    tracing::debug!(?config, "Resolved configuration");

    let port = config.port;
    let server = match Server::from_config(config).await {
        Ok(server) => server,
        Err(e) => {
            tracing::error!(error = %e, "Failed to start server");
            return Err(e.into());
        }
    };

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("Failed to bind port {port}"))?;

    tracing::info!(
        backend = %server.config().backend,
        sheet = %server.config().sheet_name,
        "API: http://localhost:{port}, health check: http://localhost:{port}/health"
    );

    server.serve(listener, server::shutdown_signal()).await
}
