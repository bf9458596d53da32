//! Create the database file and schema, then exit

use anyhow::{Context, Result};
use students_server::{Config, SqliteStore};

pub async fn run_init_db(config: Config) -> Result<()> {
    let store = SqliteStore::open(&config.storage_path)
        .await
        .with_context(|| {
            format!(
                "Failed to initialize storage at {}",
                config.storage_path.display()
            )
        })?;
    store.close().await;

    println!("✅ Schema ready at {}", config.storage_path.display());
    Ok(())
}
