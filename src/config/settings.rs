//! Application settings loading from config.toml
//!
//! Every section and field is optional; anything missing falls back to the
//! defaults below. A missing config file is not an error, a malformed one is.
//! `LISTEN_ADDR` and `DATABASE_URL` from the environment override the file.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

/// Environment variable naming an alternative config file path
pub const CONFIG_PATH_ENV: &str = "BUDGET_TRACKER_CONFIG";

/// Structure representing the entire config.toml file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// HTTP listener settings
    pub server: ServerSettings,
    /// Storage settings
    pub database: DatabaseSettings,
    /// Budget defaults
    pub budgets: BudgetSettings,
    /// Transaction listing limits
    pub transactions: TransactionSettings,
}

/// HTTP listener settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Socket address to bind, e.g. `127.0.0.1:5000`
    pub listen_addr: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:5000".to_string(),
        }
    }
}

/// Storage settings
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// Connection URL; `DATABASE_URL` takes precedence
    pub url: Option<String>,
}

/// Defaults applied to new budgets and budget detail views
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BudgetSettings {
    /// Alert threshold (percent) for budgets created without one
    pub default_alert_threshold: f64,
    /// How many matching transactions a budget detail view includes
    pub recent_transactions_limit: u64,
}

impl Default for BudgetSettings {
    fn default() -> Self {
        Self {
            default_alert_threshold: 80.0,
            recent_transactions_limit: 10,
        }
    }
}

/// Transaction listing limits
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TransactionSettings {
    /// Page size when the request gives none
    pub default_page_size: u64,
    /// Upper bound for a requested page size
    pub max_page_size: u64,
}

impl Default for TransactionSettings {
    fn default() -> Self {
        Self {
            default_page_size: 10,
            max_page_size: 100,
        }
    }
}

/// Parses settings from TOML text.
pub fn parse_settings(contents: &str) -> Result<Settings> {
    let settings: Settings = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })?;
    settings.validate()?;
    Ok(settings)
}

/// Loads settings from a TOML file, using defaults when the file does not exist.
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let path = path.as_ref();
    debug!("Attempting to load configuration from: {:?}", path);

    if !path.exists() {
        info!("No config file at {:?}, using defaults", path);
        return Ok(Settings::default());
    }

    let contents = std::fs::read_to_string(path).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path.display()),
    })?;
    parse_settings(&contents)
}

/// Loads settings from `$BUDGET_TRACKER_CONFIG` (or ./config.toml) and applies env overrides.
pub fn load_app_settings() -> Result<Settings> {
    let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| "config.toml".to_string());
    let mut settings = load_settings(path)?;

    if let Ok(addr) = std::env::var("LISTEN_ADDR") {
        settings.server.listen_addr = addr;
    }
    settings.database.url = Some(crate::config::database::get_database_url(
        settings.database.url.as_deref(),
    ));

    Ok(settings)
}

impl Settings {
    fn validate(&self) -> Result<()> {
        let threshold = self.budgets.default_alert_threshold;
        if !threshold.is_finite() || threshold <= 0.0 {
            return Err(Error::Config {
                message: format!(
                    "budgets.default_alert_threshold must be positive, got {threshold}"
                ),
            });
        }
        if self.transactions.default_page_size == 0 || self.transactions.max_page_size == 0 {
            return Err(Error::Config {
                message: "transaction page sizes must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
