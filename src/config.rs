//! Store construction parameters.
//!
//! [`StoreConfig`] is built either with its builder methods or loaded from a
//! TOML file:
//!
//! ```toml
//! name = "db.json"
//! directory = "data"
//! indent = 2
//! auto_clean_and_backup = true
//! clean_interval = 0.5
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::Error;

/// Default pretty-print width for the store file.
pub const DEFAULT_INDENT: usize = 4;

/// Default pause between background clean passes.
pub const DEFAULT_CLEAN_INTERVAL: Duration = Duration::from_secs(1);

/// Serde helper for `Duration` as fractional seconds.
pub(crate) mod duration_secs {
    use serde::{self, Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(duration.as_secs_f64())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}

/// Configuration for opening a store handle.
///
/// # Example
///
/// ```rust
/// use zjson::StoreConfig;
/// use std::time::Duration;
///
/// let config = StoreConfig::new("db.json")
///     .with_directory("data")
///     .with_indent(2)
///     .with_auto_clean_and_backup(true)
///     .with_clean_interval(Duration::from_millis(500));
/// assert_eq!(config.indent, 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// File name of the store.
    pub name: String,
    /// Containing directory, created if missing. Defaults to the working directory.
    #[serde(default)]
    pub directory: Option<PathBuf>,
    /// Pretty-print width of the store file.
    #[serde(default = "default_indent")]
    pub indent: usize,
    /// Run the background clean-and-backup task.
    #[serde(default)]
    pub auto_clean_and_backup: bool,
    /// Pause between background passes.
    #[serde(default = "default_clean_interval", with = "duration_secs")]
    pub clean_interval: Duration,
    /// Backup destination. Defaults to `<path>-backup`.
    #[serde(default)]
    pub backup_path: Option<PathBuf>,
}

fn default_indent() -> usize {
    DEFAULT_INDENT
}

fn default_clean_interval() -> Duration {
    DEFAULT_CLEAN_INTERVAL
}

impl StoreConfig {
    /// Creates a configuration for file `name` with default settings.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            directory: None,
            indent: DEFAULT_INDENT,
            auto_clean_and_backup: false,
            clean_interval: DEFAULT_CLEAN_INTERVAL,
            backup_path: None,
        }
    }

    /// Sets the containing directory.
    pub fn with_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.directory = Some(directory.into());
        self
    }

    /// Sets the pretty-print width.
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    /// Enables or disables the background clean-and-backup task.
    pub fn with_auto_clean_and_backup(mut self, enabled: bool) -> Self {
        self.auto_clean_and_backup = enabled;
        self
    }

    /// Sets the pause between background passes.
    pub fn with_clean_interval(mut self, interval: Duration) -> Self {
        self.clean_interval = interval;
        self
    }

    /// Sets where backups are written by default.
    pub fn with_backup_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.backup_path = Some(path.into());
        self
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read (IO error)
    /// - The file contains invalid TOML syntax or unknown keys
    /// - Required fields are missing or have invalid types
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: StoreConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Checks the parameters before a handle is opened.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] for an empty name or a zero clean
    /// interval while the background task is enabled.
    pub fn validate(&self) -> crate::Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::InvalidConfig("name cannot be empty".to_string()));
        }
        if self.auto_clean_and_backup && self.clean_interval.is_zero() {
            return Err(Error::InvalidConfig(
                "clean_interval must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Store path as configured, before canonicalization.
    pub fn path(&self) -> PathBuf {
        match &self.directory {
            Some(directory) => directory.join(&self.name),
            None => PathBuf::from(&self.name),
        }
    }

    /// Absolute store path used to identify the handle.
    ///
    /// Creates the containing directory when it is missing so it can be
    /// canonicalized.
    ///
    /// # Errors
    ///
    /// Returns an IO error if the directory cannot be created or resolved.
    pub fn resolve_path(&self) -> crate::Result<PathBuf> {
        let path = self.path();
        let file_name = path
            .file_name()
            .ok_or_else(|| Error::InvalidConfig(format!("'{}' is not a file name", self.name)))?;
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        fs::create_dir_all(&parent)
            .map_err(|e| Error::io(format!("creating directory {}", parent.display()), e))?;
        let parent = fs::canonicalize(&parent)
            .map_err(|e| Error::io(format!("resolving directory {}", parent.display()), e))?;

        Ok(parent.join(file_name))
    }

    /// Backup destination for a store at `resolved`.
    pub fn backup_path_for(&self, resolved: &Path) -> PathBuf {
        self.backup_path.clone().unwrap_or_else(|| {
            let mut name = resolved.as_os_str().to_os_string();
            name.push("-backup");
            PathBuf::from(name)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = StoreConfig::new("db.json");
        assert_eq!(config.indent, 4);
        assert!(!config.auto_clean_and_backup);
        assert_eq!(config.clean_interval, Duration::from_secs(1));
        assert_eq!(config.path(), PathBuf::from("db.json"));
    }

    #[test]
    fn test_builder_pattern_chaining() {
        let config = StoreConfig::new("db.json")
            .with_directory("data")
            .with_indent(2)
            .with_auto_clean_and_backup(true)
            .with_clean_interval(Duration::from_millis(250))
            .with_backup_path("elsewhere.json");

        assert_eq!(config.path(), PathBuf::from("data").join("db.json"));
        assert_eq!(config.indent, 2);
        assert!(config.auto_clean_and_backup);
        assert_eq!(config.clean_interval, Duration::from_millis(250));
        assert_eq!(config.backup_path, Some(PathBuf::from("elsewhere.json")));
    }

    #[test]
    fn test_validate() {
        assert!(StoreConfig::new("db.json").validate().is_ok());
        assert!(StoreConfig::new("  ").validate().is_err());

        let zero = StoreConfig::new("db.json")
            .with_auto_clean_and_backup(true)
            .with_clean_interval(Duration::ZERO);
        assert!(matches!(zero.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_load_from_toml() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("zjson.toml");
        fs::write(
            &path,
            r#"
name = "db.json"
directory = "data"
indent = 2
auto_clean_and_backup = true
clean_interval = 0.5
"#,
        )
        .unwrap();

        let config = StoreConfig::load_from(&path).unwrap();
        assert_eq!(config.name, "db.json");
        assert_eq!(config.directory, Some(PathBuf::from("data")));
        assert_eq!(config.indent, 2);
        assert!(config.auto_clean_and_backup);
        assert_eq!(config.clean_interval, Duration::from_millis(500));
    }

    #[test]
    fn test_load_from_toml_minimal_and_unknown_key() {
        let tmp = TempDir::new().unwrap();
        let minimal = tmp.path().join("min.toml");
        fs::write(&minimal, "name = \"db.json\"\n").unwrap();
        assert_eq!(
            StoreConfig::load_from(&minimal).unwrap(),
            StoreConfig::new("db.json")
        );

        let unknown = tmp.path().join("bad.toml");
        fs::write(&unknown, "name = \"db.json\"\ncolour = \"red\"\n").unwrap();
        assert!(StoreConfig::load_from(&unknown).is_err());
    }

    #[test]
    fn test_resolve_path_creates_directory() {
        let tmp = TempDir::new().unwrap();
        let config = StoreConfig::new("db.json").with_directory(tmp.path().join("a").join("b"));

        let resolved = config.resolve_path().unwrap();
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("a/b/db.json"));
        assert!(tmp.path().join("a").join("b").is_dir());
    }

    #[test]
    fn test_backup_path_default_and_override() {
        let resolved = PathBuf::from("/srv/db.json");
        assert_eq!(
            StoreConfig::new("db.json").backup_path_for(&resolved),
            PathBuf::from("/srv/db.json-backup")
        );
        assert_eq!(
            StoreConfig::new("db.json")
                .with_backup_path("/b/x.json")
                .backup_path_for(&resolved),
            PathBuf::from("/b/x.json")
        );
    }
}
