//! kvlin Viewer Server
//!
//! Serves a rendered report page on a local port.

#![warn(missing_docs)]
#![warn(clippy::all)]

use anyhow::Result;
use clap::Parser;
use kvlin_server::{ServerConfig, ViewerServer, DEFAULT_HOST, DEFAULT_PORT};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "kvlin-server")]
#[command(about = "Serve a kvlin report page", long_about = None)]
struct Args {
    /// Rendered report page
    artifact: PathBuf,

    /// Listen host
    #[arg(long, default_value = DEFAULT_HOST)]
    host: String,

    /// Listen port
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("kvlin=info,tower_http=debug")),
        )
        .init();

    let config = ServerConfig::new(args.artifact)
        .with_host(args.host)
        .with_port(args.port);
    let server = ViewerServer::new(config)?;
    println!("Open {} in your browser (Ctrl+C to stop)", server.config().url());
    server.serve().await?;

    Ok(())
}
