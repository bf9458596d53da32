//! HTTP server command
//!
//! Opens the student store and serves the API until SIGINT/SIGTERM.

use std::sync::Arc;

use anyhow::{Context, Result};
use students_server::http::run_server;
use students_server::{Config, SqliteStore};

/// Run the HTTP server
pub async fn run_serve(config: Config) -> Result<()> {
    let store = SqliteStore::open(&config.storage_path)
        .await
        .with_context(|| {
            format!(
                "Failed to initialize storage at {}",
                config.storage_path.display()
            )
        })?;

    tracing::info!(
        env = %config.env,
        version = env!("CARGO_PKG_VERSION"),
        storage_path = %config.storage_path.display(),
        "storage initialized"
    );

    // Run server (blocks until shutdown)
    run_server(Arc::new(store.clone()), &config)
        .await
        .context("Server error")?;

    store.close().await;
    Ok(())
}
