//! # Temporary Key Example
//!
//! Stores a key with a five second TTL, waits out the TTL, and shows the key
//! is gone.
//!
//! ```bash
//! cargo run --example 01_temp_key
//! ```

use anyhow::Result;
use std::time::Duration;
use tempfile::TempDir;
use zjson::{Store, StoreConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let db = Store::open(StoreConfig::new("file.json").with_directory(temp_dir.path()))?;

    db.set("hi", &1, Some(Duration::from_secs(5))).await?;
    let ttl = db.ttl("hi").await?.unwrap_or_default();
    println!("'hi' expires in {:.2}s, waiting...", ttl.as_secs_f64());

    db.sleep(ttl + Duration::from_millis(10)).await;
    println!("get('hi') after TTL: {:?}", db.get("hi").await?);

    Ok(())
}
