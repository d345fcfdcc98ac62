//! # Backups Example
//!
//! Writes a backup snapshot, clears the store, and restores it from the
//! snapshot.
//!
//! ```bash
//! cargo run --example 02_backups
//! ```

use anyhow::Result;
use serde_json::json;
use tempfile::TempDir;
use zjson::{Store, StoreConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let db = Store::open(StoreConfig::new("file.json").with_directory(temp_dir.path()))?;

    db.set("user:1", &json!({"name": "Ada", "langs": ["en", "fr"]}), None)
        .await?;
    let backup = db.backup(None).await?;
    println!("Backup written to {}", backup.display());

    db.delete_all().await?;
    println!("After clear: {:?}", db.get("user:1").await?);

    db.seed_from_backup(&backup).await?;
    println!("After restore: {:?}", db.get("user:1").await?);

    Ok(())
}
