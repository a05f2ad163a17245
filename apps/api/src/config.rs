//! # API Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     CAVEFIRE_PORT=8003                                                 │
//! │     CAVEFIRE_TAX_RATE=8.75                                             │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     $CAVEFIRE_CONFIG, or                                               │
//! │     ~/.config/cavefire-proposals/api.toml (Linux)                       │
//! │     ~/Library/Application Support/com.cavefire.proposals/api.toml      │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # api.toml
//! port = 8003
//! bind_addr = "0.0.0.0"
//! catalog_path = "seeds/add_ons.json"
//! tax_rate = 8.75               # percent; "8.875" as a string also works
//! rounding = "half_away_from_zero"
//! cors_allow_any = true
//! ```

use std::path::PathBuf;

use cavefire_core::validation::validate_tax_rate;
use cavefire_core::{Amount, Calculator, Rounding, TaxRate};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "CAVEFIRE_CONFIG";

// =============================================================================
// Config Error
// =============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

// =============================================================================
// Api Config
// =============================================================================

/// Settings of the compose/export HTTP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Listen port. The pricing UI posts to `localhost:8003`.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Bind address (default: 0.0.0.0 for all interfaces).
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Add-on catalog served at `/api/catalog` and used for composition.
    #[serde(default = "default_catalog_path")]
    pub catalog_path: PathBuf,

    /// Tax rate in percent applied to taxable lines.
    #[serde(default = "default_tax_rate")]
    pub tax_rate: Amount,

    /// Rounding policy for fractional cents.
    #[serde(default)]
    pub rounding: Rounding,

    /// Send `Access-Control-Allow-Origin: *`. The pricing UIs are served
    /// from a different origin than the API.
    #[serde(default = "default_true")]
    pub cors_allow_any: bool,
}

fn default_port() -> u16 {
    8003
}

fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_catalog_path() -> PathBuf {
    PathBuf::from("seeds/add_ons.json")
}

fn default_tax_rate() -> Amount {
    Amount::Number(8.75)
}

fn default_true() -> bool {
    true
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            port: default_port(),
            bind_addr: default_bind_addr(),
            catalog_path: default_catalog_path(),
            tax_rate: default_tax_rate(),
            rounding: Rounding::default(),
            cors_allow_any: default_true(),
        }
    }
}

impl ApiConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (`config_path`, `$CAVEFIRE_CONFIG`, or the platform dir)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        let path = config_path
            .or_else(|| std::env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from))
            .or_else(Self::default_config_path);

        if let Some(path) = path {
            if path.exists() {
                info!(?path, "Loading API config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::Invalid("port must be greater than 0".into()));
        }

        if self.bind_addr.trim().is_empty() {
            return Err(ConfigError::Invalid("bind_addr must not be empty".into()));
        }

        let rate = match &self.tax_rate {
            Amount::Number(n) if !n.is_finite() || *n < 0.0 => {
                return Err(ConfigError::Invalid(format!(
                    "tax_rate must be a non-negative number, got {}",
                    n
                )))
            }
            Amount::Number(n) => TaxRate::from_percentage(*n),
            Amount::Text(text) => TaxRate::parse_percentage(text).ok_or_else(|| {
                ConfigError::Invalid(format!("tax_rate is not a percentage: '{}'", text))
            })?,
        };
        validate_tax_rate(rate).map_err(|e| ConfigError::Invalid(e.to_string()))?;

        Ok(())
    }

    /// Applies `CAVEFIRE_*` overrides read through `lookup`.
    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("CAVEFIRE_PORT") {
            match port.parse::<u16>() {
                Ok(p) => {
                    debug!(port = p, "Overriding port from environment");
                    self.port = p;
                }
                Err(_) => warn!(port = %port, "Ignoring invalid CAVEFIRE_PORT"),
            }
        }

        if let Some(addr) = lookup("CAVEFIRE_BIND_ADDR") {
            self.bind_addr = addr;
        }

        if let Some(path) = lookup("CAVEFIRE_CATALOG") {
            debug!(path = %path, "Overriding catalog path from environment");
            self.catalog_path = PathBuf::from(path);
        }

        if let Some(rate) = lookup("CAVEFIRE_TAX_RATE") {
            self.tax_rate = Amount::Text(rate);
        }

        if let Some(mode) = lookup("CAVEFIRE_ROUNDING") {
            match mode.parse() {
                Ok(parsed) => self.rounding = parsed,
                Err(e) => warn!(error = %e, "Ignoring CAVEFIRE_ROUNDING"),
            }
        }

        if let Some(cors) = lookup("CAVEFIRE_CORS_ALLOW_ANY") {
            match cors.to_lowercase().as_str() {
                "1" | "true" | "yes" => self.cors_allow_any = true,
                "0" | "false" | "no" => self.cors_allow_any = false,
                _ => warn!(value = %cors, "Unknown CAVEFIRE_CORS_ALLOW_ANY value"),
            }
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "cavefire", "proposals")
            .map(|dirs| dirs.config_dir().join("api.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Returns the full bind address.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    /// The configured tax rate. Only meaningful after [`ApiConfig::validate`].
    pub fn tax_rate(&self) -> TaxRate {
        TaxRate::from_amount(&self.tax_rate)
    }

    pub fn calculator(&self) -> Calculator {
        Calculator::new(self.rounding)
    }
}
