//! Main application configuration
//!
//! This module defines the configuration structures of the rating tool,
//! including environment variable and TOML file loading and validation.

use crate::scoring::CategoryWeights;
use crate::types::{is_valid_rating, Category};
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceSettings,
    pub storage: StorageSettings,
    pub scoring: ScoringSettings,
}

/// Service-level settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Service name for logging
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

/// Where ratings and catalog data live
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// CSV file accumulating every submitted rating
    pub flat_file_path: PathBuf,
    /// Offline catalog file; lookups are unavailable when unset
    pub catalog_path: Option<PathBuf>,
}

/// Scoring and form settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringSettings {
    /// Initial value of every category slider
    pub default_rating: f64,
    /// Per-category weight overrides applied on top of the default table,
    /// keyed by category name
    pub weights: BTreeMap<String, f64>,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: "boardgame-rater".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            flat_file_path: PathBuf::from("ratings.csv"),
            catalog_path: None,
        }
    }
}

impl Default for ScoringSettings {
    fn default() -> Self {
        Self {
            default_rating: 7.0,
            weights: BTreeMap::new(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables with fallback to defaults
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Load configuration from a TOML file, then apply environment overrides
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let base = Self::from_toml_str(&contents)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        base.with_vars(|key| env::var(key).ok())
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Build configuration from defaults and a variable lookup
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Self::default().with_vars(lookup)
    }

    fn with_vars(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        // Service settings
        if let Some(name) = lookup("SERVICE_NAME") {
            self.service.name = name;
        }
        if let Some(log_level) = lookup("LOG_LEVEL") {
            self.service.log_level = log_level;
        }

        // Storage settings
        if let Some(path) = lookup("RATINGS_CSV_PATH") {
            self.storage.flat_file_path = PathBuf::from(path);
        }
        if let Some(path) = lookup("CATALOG_PATH") {
            self.storage.catalog_path = Some(PathBuf::from(path));
        }

        // Scoring settings
        if let Some(default_rating) = lookup("DEFAULT_RATING") {
            self.scoring.default_rating = default_rating
                .parse()
                .map_err(|_| anyhow!("Invalid DEFAULT_RATING value: {}", default_rating))?;
        }

        validate_config(&self)?;
        Ok(self)
    }

    /// Weight table with the configured overrides applied
    pub fn category_weights(&self) -> Result<CategoryWeights> {
        let overrides = self
            .scoring
            .weights
            .iter()
            .map(|(name, weight)| -> Result<(Category, f64)> {
                let category: Category = name
                    .parse()
                    .map_err(|e| anyhow!("Invalid [scoring.weights] entry: {}", e))?;
                Ok((category, *weight))
            })
            .collect::<Result<BTreeMap<_, _>>>()?;
        CategoryWeights::with_overrides(&overrides)
    }
}

/// Validate configuration values
pub fn validate_config(config: &AppConfig) -> Result<()> {
    // Validate log level
    match config.service.log_level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow!("Invalid log level: {}", config.service.log_level)),
    }

    if config.service.name.is_empty() {
        return Err(anyhow!("Service name cannot be empty"));
    }

    // Validate storage settings
    if config.storage.flat_file_path.as_os_str().is_empty() {
        return Err(anyhow!("Flat file path cannot be empty"));
    }

    // Validate scoring settings
    if !is_valid_rating(config.scoring.default_rating) {
        return Err(anyhow!(
            "Default rating must be between 1.0 and 10.0 in steps of 0.5, got {}",
            config.scoring.default_rating
        ));
    }
    config.category_weights()?;

    Ok(())
}
