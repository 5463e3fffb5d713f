//! shellcache server entry point.
//!
//! Boots the offline cache controller and serves it as an MCP server on stdio.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use anyhow::Result;
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use shellcache_client::{FetchClient, FetchConfig};
use shellcache_core::{AppConfig, CacheDb, OfflineCacheController};
use tracing_subscriber::EnvFilter;

mod handler;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    let worker = config.worker_config()?;
    let db = CacheDb::open(&config.db_path).await?;
    let client = FetchClient::new(FetchConfig::from_app_config(&config)?)?;

    tracing::info!(
        origin = %worker.origin,
        generation = %worker.generation,
        db = %config.db_path.display(),
        "starting shellcache server on stdio transport"
    );

    let controller = OfflineCacheController::new(worker, db, client);
    if let Err(err) = controller.register().await {
        tracing::warn!(error = %err, "registration failed; serving the previous generation if any");
    }

    let handler = handler::ShellcacheServer::new(controller);
    let server = serve_server(handler, stdio()).await?;
    server.waiting().await?;

    Ok(())
}
