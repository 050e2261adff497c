//! # Cart Configuration
//!
//! Where the cart is stored and how the persistence worker behaves.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     GOMARKET_STORAGE_NAMESPACE=@GoMarketPlace                          │
//! │     GOMARKET_DB_PATH=/data/gomarket.db                                 │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/gomarket/cart.toml (Linux)                               │
//! │     ~/Library/Application Support/com.gomarket.app/cart.toml (macOS)   │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     namespace = "@GoMarketPlace", database in the app data dir         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # cart.toml
//! [storage]
//! namespace = "@GoMarketPlace"     # key becomes "@GoMarketPlace:cartProducts"
//! database_path = "/data/gomarket.db"
//! max_connections = 1
//! connect_timeout_secs = 30
//!
//! [persistence]
//! flush_on_shutdown = true
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

use gomarket_core::{CART_STORAGE_SUFFIX, DEFAULT_STORAGE_NAMESPACE};
use gomarket_db::DbError;

use crate::error::{CartError, CartResult};

/// Database file name inside the app data directory.
const DATABASE_FILE_NAME: &str = "gomarket.db";

// =============================================================================
// Storage Settings
// =============================================================================

/// Where the cart lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Key namespace; the cart key is `"{namespace}:cartProducts"`.
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// SQLite file. `None` means `<app data dir>/gomarket.db`.
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    /// SQLite pool size.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Seconds to wait for a database connection.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

fn default_namespace() -> String {
    DEFAULT_STORAGE_NAMESPACE.to_string()
}

fn default_max_connections() -> u32 {
    1
}

fn default_connect_timeout_secs() -> u64 {
    30
}

impl Default for StorageSettings {
    fn default() -> Self {
        StorageSettings {
            namespace: default_namespace(),
            database_path: None,
            max_connections: default_max_connections(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

// =============================================================================
// Persistence Settings
// =============================================================================

/// Persistence worker behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceSettings {
    /// Write the latest unsaved snapshot when the provider unmounts.
    #[serde(default = "default_true")]
    pub flush_on_shutdown: bool,
}

fn default_true() -> bool {
    true
}

impl Default for PersistenceSettings {
    fn default() -> Self {
        PersistenceSettings {
            flush_on_shutdown: true,
        }
    }
}

// =============================================================================
// Main Cart Configuration
// =============================================================================

/// Complete cart configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CartConfig {
    #[serde(default)]
    pub storage: StorageSettings,

    #[serde(default)]
    pub persistence: PersistenceSettings,
}

impl CartConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (cart.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> CartResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading cart config from file");
                let contents = std::fs::read_to_string(&path).map_err(|e| {
                    CartError::ConfigLoadFailed(format!("{}: {}", path.display(), e))
                })?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads configuration, falling back to defaults on any error.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!(error = %e, "Failed to load cart config, using defaults");
            Self::default()
        })
    }

    /// Validates the configuration.
    pub fn validate(&self) -> CartResult<()> {
        let namespace = self.storage.namespace.trim();

        if namespace.is_empty() {
            return Err(CartError::InvalidConfig(
                "storage.namespace must not be empty".into(),
            ));
        }

        if namespace.ends_with(':') {
            return Err(CartError::InvalidConfig(format!(
                "storage.namespace '{}' must not end with ':'",
                namespace
            )));
        }

        if self.storage.max_connections == 0 {
            return Err(CartError::InvalidConfig(
                "storage.max_connections must be greater than 0".into(),
            ));
        }

        if self.storage.connect_timeout_secs == 0 {
            return Err(CartError::InvalidConfig(
                "storage.connect_timeout_secs must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Applies overrides from any variable source.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(namespace) = lookup("GOMARKET_STORAGE_NAMESPACE") {
            debug!(namespace = %namespace, "Overriding storage namespace from environment");
            self.storage.namespace = namespace;
        }

        if let Some(path) = lookup("GOMARKET_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.storage.database_path = Some(PathBuf::from(path));
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "gomarket", "app")
            .map(|dirs| dirs.config_dir().join("cart.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// How long to wait for a database connection.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.storage.connect_timeout_secs)
    }

    /// The full key the cart is stored under.
    pub fn storage_key(&self) -> String {
        format!("{}:{}", self.storage.namespace.trim(), CART_STORAGE_SUFFIX)
    }

    /// Resolves the SQLite file path, creating the data directory if needed.
    pub fn database_path(&self) -> CartResult<PathBuf> {
        if let Some(path) = &self.storage.database_path {
            return Ok(path.clone());
        }

        let dirs = directories::ProjectDirs::from("com", "gomarket", "app").ok_or_else(|| {
            CartError::InvalidConfig("Could not determine app data directory".into())
        })?;

        let data_dir = dirs.data_dir();
        ensure_data_dir(data_dir)?;

        Ok(data_dir.join(DATABASE_FILE_NAME))
    }
}

/// Creates the directory that holds the database file. Failure is a storage
/// error.
fn ensure_data_dir(dir: &Path) -> CartResult<()> {
    std::fs::create_dir_all(dir).map_err(|e| {
        CartError::Storage(DbError::ConnectionFailed(format!(
            "cannot create data directory {}: {}",
            dir.display(),
            e
        )))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = CartConfig::default();

        assert_eq!(config.storage_key(), "@GoMarketPlace:cartProducts");
        assert_eq!(config.storage.max_connections, 1);
        assert!(config.persistence.flush_on_shutdown);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = CartConfig::default();

        config.storage.namespace = "   ".to_string();
        assert!(config.validate().is_err());

        config.storage.namespace = "@Shop:".to_string();
        assert!(config.validate().is_err());

        config.storage.namespace = "@Shop".to_string();
        config.storage.max_connections = 0;
        assert!(config.validate().is_err());

        config.storage.max_connections = 2;
        config.storage.connect_timeout_secs = 0;
        assert!(config.validate().is_err());

        config.storage.connect_timeout_secs = 5;
        assert!(config.validate().is_ok());
        assert_eq!(config.connect_timeout(), Duration::from_secs(5));
        assert_eq!(config.storage_key(), "@Shop:cartProducts");
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("GOMARKET_STORAGE_NAMESPACE", "@Staging"),
            ("GOMARKET_DB_PATH", "/tmp/staging.db"),
        ]
        .into_iter()
        .collect();

        let mut config = CartConfig::default();
        config.apply_overrides(|name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(config.storage_key(), "@Staging:cartProducts");
        assert_eq!(
            config.database_path().unwrap(),
            PathBuf::from("/tmp/staging.db")
        );
    }

    #[test]
    fn test_toml_partial_file_uses_defaults() {
        let config: CartConfig = toml::from_str(
            r#"
            [storage]
            namespace = "@Kiosk"
            "#,
        )
        .unwrap();

        assert_eq!(config.storage_key(), "@Kiosk:cartProducts");
        assert_eq!(config.storage.max_connections, 1);
        assert_eq!(config.storage.connect_timeout_secs, 30);
        assert!(config.storage.database_path.is_none());
        assert!(config.persistence.flush_on_shutdown);
    }

    #[test]
    fn test_toml_serialization() {
        let mut config = CartConfig::default();
        config.persistence.flush_on_shutdown = false;

        let text = toml::to_string(&config).unwrap();
        let parsed: CartConfig = toml::from_str(&text).unwrap();

        assert!(!parsed.persistence.flush_on_shutdown);
        assert_eq!(parsed.storage.namespace, config.storage.namespace);
    }

    #[test]
    fn test_data_dir_failure_is_storage_error() {
        let blocker = std::env::temp_dir().join(format!(
            "gomarket-cart-blocker-{}",
            std::process::id()
        ));
        std::fs::write(&blocker, "not a directory").unwrap();

        let result = ensure_data_dir(&blocker.join("data"));
        std::fs::remove_file(&blocker).unwrap();

        let err = result.unwrap_err();
        assert!(matches!(err, CartError::Storage(DbError::ConnectionFailed(_))));
        assert_eq!(err.code(), crate::error::ErrorCode::StorageError);
    }

    #[test]
    fn test_load_rejects_bad_file() {
        let path = std::env::temp_dir().join(format!(
            "gomarket-cart-config-{}.toml",
            std::process::id()
        ));
        std::fs::write(&path, "[storage]\nmax_connections = \"many\"\n").unwrap();

        let result = CartConfig::load(Some(path.clone()));
        std::fs::remove_file(&path).unwrap();

        assert!(matches!(result, Err(CartError::ConfigLoadFailed(_))));
    }
}
