//! # Key Listing Example
//!
//! Lists keys with and without a pattern and a limit.
//!
//! ```bash
//! cargo run --example 03_list_keys
//! ```

use anyhow::Result;
use std::time::Duration;
use tempfile::TempDir;
use zjson::{Store, StoreConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let app = Store::open(StoreConfig::new("file.json").with_directory(temp_dir.path()))?;

    for (key, value) in [("users:1", "Alice"), ("users:2", "Bob"), ("products:1", "Widget")] {
        app.set(key, value, None).await?;
    }
    app.set("session:abc", "token", Some(Duration::from_secs(60)))
        .await?;

    println!("All keys: {:?}", app.keys(None, 0).await?.collect::<Vec<_>>());
    println!(
        "Users: {:?}",
        app.keys(Some("^users:"), 0).await?.collect::<Vec<_>>()
    );
    println!("First two: {:?}", app.keys(None, 2).await?.collect::<Vec<_>>());
    println!("Store: {}", app.path().display());

    Ok(())
}
