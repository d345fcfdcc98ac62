//! # Auto Clean Example
//!
//! Opens a store with the background clean-and-backup task and watches an
//! expiring key disappear from the file.
//!
//! ```bash
//! RUST_LOG=zjson=debug cargo run --example 04_auto_clean
//! ```

use anyhow::Result;
use std::time::Duration;
use tempfile::TempDir;
use zjson::{Store, StoreConfig};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let temp_dir = TempDir::new()?;
    let db = Store::open(
        StoreConfig::new("file.json")
            .with_directory(temp_dir.path())
            .with_auto_clean_and_backup(true)
            .with_clean_interval(Duration::from_millis(200)),
    )?;
    println!("{db}");

    println!("get('hi'): {:?}", db.get("hi").await?);
    db.set("i", &2, None).await?;
    db.set("hi", "soon gone", Some(Duration::from_millis(300))).await?;

    db.sleep(Duration::from_secs(1)).await;

    println!("On disk:\n{}", std::fs::read_to_string(db.path())?);
    println!("Backup exists: {}", db.backup_path().exists());

    Ok(())
}
