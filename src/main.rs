//! Command-line front end for zjson stores.
//!
//! ```bash
//! zjson file.json set hi 1 --expire 5
//! zjson file.json ttl hi
//! zjson file.json keys --pattern '^h' --limit 10
//! zjson file.json backup --to file.json-backup
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::path::PathBuf;
use std::time::Duration;
use zjson::{Store, StoreConfig};

#[derive(Parser)]
#[command(name = "zjson", version, about = "JSON file key-value store")]
struct Cli {
    /// Store file name
    name: Option<String>,

    /// Load store settings from a TOML file
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Directory containing the store file
    #[arg(long, short)]
    dir: Option<PathBuf>,

    /// Pretty-print width of the store file
    #[arg(long)]
    indent: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the value stored under a key
    Get { key: String },
    /// Store a value (parsed as JSON, otherwise kept as a string)
    Set {
        key: String,
        value: String,
        /// Expire the key after this many seconds
        #[arg(long, short)]
        expire: Option<f64>,
    },
    /// Print seconds left before a key expires
    Ttl { key: String },
    /// Delete a key
    Del { key: String },
    /// Delete every key
    Clear,
    /// List keys
    Keys {
        /// Regular expression searched in key names
        #[arg(long, short)]
        pattern: Option<String>,
        /// Maximum number of keys (0 = all)
        #[arg(long, short, default_value_t = 0)]
        limit: usize,
    },
    /// Write a backup snapshot
    Backup {
        /// Destination (defaults to <path>-backup)
        #[arg(long)]
        to: Option<PathBuf>,
    },
    /// Replace the store contents with a backup file
    Restore { from: PathBuf },
    /// Evict expired keys and write a backup
    Clean,
    /// Show the store configuration
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    let store = Store::open(build_config(&cli)?).context("Failed to open store")?;
    execute(&store, cli.command).await
}

/// Initialize stderr logging, `warn` unless `RUST_LOG` says otherwise.
fn init_logging() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn build_config(cli: &Cli) -> Result<StoreConfig> {
    let mut config = match (&cli.config, &cli.name) {
        (Some(path), _) => StoreConfig::load_from(path)?,
        (None, Some(name)) => StoreConfig::new(name.clone()),
        (None, None) => anyhow::bail!("Either a store name or --config is required"),
    };

    if let (Some(_), Some(name)) = (&cli.config, &cli.name) {
        config.name.clone_from(name);
    }
    if let Some(dir) = &cli.dir {
        config.directory = Some(dir.clone());
    }
    if let Some(indent) = cli.indent {
        config.indent = indent;
    }
    // One-shot commands never run the background task.
    config.auto_clean_and_backup = false;

    Ok(config)
}

async fn execute(store: &Store, command: Command) -> Result<()> {
    match command {
        Command::Get { key } => {
            print_json(&store.get(&key).await?.unwrap_or(Value::Null));
        },
        Command::Set { key, value, expire } => {
            let value = serde_json::from_str(&value).unwrap_or(Value::String(value));
            let expire = expire
                .map(Duration::try_from_secs_f64)
                .transpose()
                .context("--expire must be a non-negative number of seconds")?;
            let stored = store.set(&key, &value, expire).await?;
            print_json(&stored.to_json());
        },
        Command::Ttl { key } => {
            let ttl = store.ttl(&key).await?;
            print_json(&ttl.map_or(Value::Null, |ttl| ttl.as_secs_f64().into()));
        },
        Command::Del { key } => {
            store.delete(&key).await?;
            print_json(&Value::Bool(true));
        },
        Command::Clear => {
            store.delete_all().await?;
            print_json(&Value::Bool(true));
        },
        Command::Keys { pattern, limit } => {
            for key in store.keys(pattern.as_deref(), limit).await? {
                println!("{key}");
            }
        },
        Command::Backup { to } => {
            let written = store.backup(to.as_deref()).await?;
            println!("{}", written.display());
        },
        Command::Restore { from } => {
            store
                .seed_from_backup(&from)
                .await
                .with_context(|| format!("Failed to restore from {}", from.display()))?;
            print_json(&Value::Bool(true));
        },
        Command::Clean => {
            // The first pass only loads the document.
            store.clean_and_backup().await?;
            let report = store.clean_and_backup().await?;
            println!("{report:?}");
        },
        Command::Info => println!("{store}"),
    }
    Ok(())
}

fn print_json(value: &Value) {
    println!("{value}");
}
