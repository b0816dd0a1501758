//! Top-level gramlens configuration with layered resolution.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{ConstructionConfig, FacetConfig, MergeConfig, SessionConfig, StorageConfig};
use crate::constants::MAX_DIFFERENCE_LEVEL;
use crate::errors::ConfigError;

/// Name of the project-level config file.
pub const PROJECT_CONFIG_FILE: &str = "gramlens.toml";

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. CLI flags (applied via `apply_cli_overrides`)
/// 2. Environment variables (`GRAMLENS_*`)
/// 3. Project config (`gramlens.toml` in the project root)
/// 4. User config (`~/.gramlens/config.toml`)
/// 5. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GramlensConfig {
    pub storage: StorageConfig,
    pub facets: FacetConfig,
    pub merge: MergeConfig,
    pub construction: ConstructionConfig,
    pub session: SessionConfig,
}

/// CLI override arguments that can be applied to a config.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub db_path: Option<String>,
    pub min_frequency: Option<f64>,
    pub min_quantity: Option<u64>,
    pub timeout_ms: Option<u64>,
    pub top_k: Option<usize>,
}

impl GramlensConfig {
    /// Load configuration with layered resolution from the real user home
    /// and process environment.
    pub fn load(root: &Path, cli_overrides: Option<&CliOverrides>) -> Result<Self, ConfigError> {
        Self::resolve(
            root,
            Self::user_config_path().as_deref(),
            |key| std::env::var(key).ok(),
            cli_overrides,
        )
    }

    /// Layered resolution with an explicit user config path and environment
    /// lookup.
    pub fn resolve<F>(
        root: &Path,
        user_config_path: Option<&Path>,
        env: F,
        cli_overrides: Option<&CliOverrides>,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(user_config_path) = user_config_path {
            if user_config_path.exists() {
                match Self::merge_toml_file(&mut config, user_config_path) {
                    Ok(()) => {}
                    Err(e @ ConfigError::ParseError { .. }) => return Err(e),
                    Err(e) => {
                        tracing::warn!(error = %e, "ignoring unreadable user config");
                    }
                }
            }
        }

        let project_config_path = root.join(PROJECT_CONFIG_FILE);
        if project_config_path.exists() {
            Self::merge_toml_file(&mut config, &project_config_path)?;
        }

        Self::apply_env_overrides(&mut config, env);

        if let Some(cli) = cli_overrides {
            Self::apply_cli_overrides(&mut config, cli);
        }

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })
    }

    /// Validate the configuration values.
    pub fn validate(config: &GramlensConfig) -> Result<(), ConfigError> {
        if let Some(min_frequency) = config.facets.min_frequency {
            if !min_frequency.is_finite() || min_frequency < 0.0 {
                return Err(ConfigError::ValidationFailed {
                    field: "facets.min_frequency".to_string(),
                    message: "must be a finite value >= 0".to_string(),
                });
            }
        }
        if let Some(timeout) = config.facets.timeout_ms {
            if timeout == 0 {
                return Err(ConfigError::ValidationFailed {
                    field: "facets.timeout_ms".to_string(),
                    message: "must be greater than 0".to_string(),
                });
            }
        }
        if let Some(level) = config.merge.max_difference_level {
            if !(1..=MAX_DIFFERENCE_LEVEL).contains(&level) {
                return Err(ConfigError::ValidationFailed {
                    field: "merge.max_difference_level".to_string(),
                    message: format!("must be between 1 and {MAX_DIFFERENCE_LEVEL}"),
                });
            }
        }
        if let Some(0) = config.storage.read_pool_size {
            return Err(ConfigError::ValidationFailed {
                field: "storage.read_pool_size".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        if let Some(0) = config.construction.top_k {
            return Err(ConfigError::ValidationFailed {
                field: "construction.top_k".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        if let Some(0) = config.session.cache_capacity {
            return Err(ConfigError::ValidationFailed {
                field: "session.cache_capacity".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        Ok(())
    }

    /// Returns the user config path: `~/.gramlens/config.toml`.
    pub fn user_config_path() -> Option<PathBuf> {
        dirs_path().map(|d| d.join("config.toml"))
    }

    /// Merge a TOML file into the existing config.
    /// Unknown keys are silently ignored.
    fn merge_toml_file(config: &mut GramlensConfig, path: &Path) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;

        let file_config: GramlensConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        Self::merge(config, &file_config);
        Ok(())
    }

    /// Merge `other` into `base`; `Some` values in `other` win.
    fn merge(base: &mut GramlensConfig, other: &GramlensConfig) {
        // Storage
        if other.storage.db_path.is_some() {
            base.storage.db_path = other.storage.db_path.clone();
        }
        if other.storage.read_pool_size.is_some() {
            base.storage.read_pool_size = other.storage.read_pool_size;
        }
        if other.storage.busy_timeout_ms.is_some() {
            base.storage.busy_timeout_ms = other.storage.busy_timeout_ms;
        }

        // Facets
        if other.facets.min_frequency.is_some() {
            base.facets.min_frequency = other.facets.min_frequency;
        }
        if other.facets.min_quantity.is_some() {
            base.facets.min_quantity = other.facets.min_quantity;
        }
        if other.facets.timeout_ms.is_some() {
            base.facets.timeout_ms = other.facets.timeout_ms;
        }
        if other.facets.max_positions.is_some() {
            base.facets.max_positions = other.facets.max_positions;
        }

        // Merge
        if other.merge.max_difference_level.is_some() {
            base.merge.max_difference_level = other.merge.max_difference_level;
        }
        if other.merge.example_limit.is_some() {
            base.merge.example_limit = other.merge.example_limit;
        }
        if other.merge.timeout_ms.is_some() {
            base.merge.timeout_ms = other.merge.timeout_ms;
        }

        // Construction
        if other.construction.top_k.is_some() {
            base.construction.top_k = other.construction.top_k;
        }

        // Session
        if other.session.cache_capacity.is_some() {
            base.session.cache_capacity = other.session.cache_capacity;
        }
        if other.session.cache_ttl_secs.is_some() {
            base.session.cache_ttl_secs = other.session.cache_ttl_secs;
        }
    }

    /// Apply environment variable overrides.
    /// Pattern: `GRAMLENS_STORAGE_DB_PATH`, `GRAMLENS_FACETS_MIN_FREQUENCY`, etc.
    /// Unparseable values are ignored.
    fn apply_env_overrides<F>(config: &mut GramlensConfig, env: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = env("GRAMLENS_STORAGE_DB_PATH") {
            config.storage.db_path = Some(val);
        }
        if let Some(val) = env("GRAMLENS_STORAGE_READ_POOL_SIZE") {
            if let Ok(v) = val.parse::<usize>() {
                config.storage.read_pool_size = Some(v);
            }
        }
        if let Some(val) = env("GRAMLENS_FACETS_MIN_FREQUENCY") {
            if let Ok(v) = val.parse::<f64>() {
                config.facets.min_frequency = Some(v);
            }
        }
        if let Some(val) = env("GRAMLENS_FACETS_MIN_QUANTITY") {
            if let Ok(v) = val.parse::<u64>() {
                config.facets.min_quantity = Some(v);
            }
        }
        if let Some(val) = env("GRAMLENS_FACETS_TIMEOUT_MS") {
            if let Ok(v) = val.parse::<u64>() {
                config.facets.timeout_ms = Some(v);
            }
        }
        if let Some(val) = env("GRAMLENS_MERGE_MAX_DIFFERENCE_LEVEL") {
            if let Ok(v) = val.parse::<usize>() {
                config.merge.max_difference_level = Some(v);
            }
        }
        if let Some(val) = env("GRAMLENS_CONSTRUCTION_TOP_K") {
            if let Ok(v) = val.parse::<usize>() {
                config.construction.top_k = Some(v);
            }
        }
    }

    /// Apply CLI flag overrides (highest priority).
    fn apply_cli_overrides(config: &mut GramlensConfig, cli: &CliOverrides) {
        if let Some(ref db_path) = cli.db_path {
            config.storage.db_path = Some(db_path.clone());
        }
        if let Some(v) = cli.min_frequency {
            config.facets.min_frequency = Some(v);
        }
        if let Some(v) = cli.min_quantity {
            config.facets.min_quantity = Some(v);
        }
        if let Some(v) = cli.timeout_ms {
            config.facets.timeout_ms = Some(v);
        }
        if let Some(v) = cli.top_k {
            config.construction.top_k = Some(v);
        }
    }

    /// Serialize the config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            path: "<serialize>".to_string(),
            message: e.to_string(),
        })
    }
}

fn dirs_path() -> Option<PathBuf> {
    home_dir().map(|h| h.join(".gramlens"))
}

fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}
