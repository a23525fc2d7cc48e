//! Configuration loading and validation.
//!
//! Values come from an optional TOML file, then `MAHJONG__`-prefixed
//! environment variables (`MAHJONG__DATABASE__PATH=/srv/mahjong.db`).

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::calculate::{PointFormula, ScoringRules};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load config: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Failed to render config: {0}")]
    RenderError(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Database and pool configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite database file
    #[serde(default = "default_db_path")]
    pub path: PathBuf,

    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// How long a request waits for a free connection before failing
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_seconds: u64,

    /// How long a writer waits on SQLite's lock
    #[serde(default = "default_busy_timeout")]
    pub busy_timeout_ms: u64,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./data/mahjong.db")
}

fn default_min_connections() -> u32 {
    1
}

fn default_max_connections() -> u32 {
    5
}

fn default_acquire_timeout() -> u64 {
    30
}

fn default_busy_timeout() -> u64 {
    5000
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            min_connections: default_min_connections(),
            max_connections: default_max_connections(),
            acquire_timeout_seconds: default_acquire_timeout(),
            busy_timeout_ms: default_busy_timeout(),
        }
    }
}

/// Which point formula the leaderboard uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormulaKind {
    /// Normalized score plus placement bonus
    Uma,
    /// Raw score, unchanged
    Raw,
}

/// Scoring configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Required sum of the four raw scores
    #[serde(default = "default_target_total")]
    pub target_total: i64,

    /// Starting score subtracted before scaling
    #[serde(default = "default_starting_points")]
    pub starting_points: i64,

    #[serde(default = "default_scale")]
    pub scale: f64,

    /// Bonus for 1st..4th place
    #[serde(default = "default_placement_bonus")]
    pub placement_bonus: [f64; 4],

    #[serde(default = "default_formula")]
    pub formula: FormulaKind,
}

fn default_target_total() -> i64 {
    100_000
}

fn default_starting_points() -> i64 {
    25_000
}

fn default_scale() -> f64 {
    1000.0
}

fn default_placement_bonus() -> [f64; 4] {
    [15.0, 5.0, -5.0, -15.0]
}

fn default_formula() -> FormulaKind {
    FormulaKind::Uma
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            target_total: default_target_total(),
            starting_points: default_starting_points(),
            scale: default_scale(),
            placement_bonus: default_placement_bonus(),
            formula: default_formula(),
        }
    }
}

impl ScoringConfig {
    pub fn rules(&self) -> ScoringRules {
        let formula = match self.formula {
            FormulaKind::Uma => PointFormula::Uma {
                starting_points: self.starting_points,
                scale: self.scale,
                placement_bonus: self.placement_bonus,
            },
            FormulaKind::Raw => PointFormula::RawScore,
        };

        ScoringRules {
            target_total: self.target_total,
            formula,
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_cors_origin() -> String {
    "*".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub scoring: ScoringConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            database: DatabaseConfig::default(),
            scoring: ScoringConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load from an optional TOML file plus environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(
                config::File::from(path)
                    .format(config::FileFormat::Toml)
                    .required(false),
            );
        }
        let settings = builder
            .add_source(
                config::Environment::with_prefix("MAHJONG")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML document directly, without environment overrides.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(contents, config::FileFormat::Toml))
            .build()?;
        let config: AppConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Render the effective configuration as TOML.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let db = &self.database;
        if db.max_connections == 0 {
            return Err(ConfigError::ValidationError(
                "Pool max_connections must be greater than 0".to_string(),
            ));
        }

        if db.min_connections > db.max_connections {
            return Err(ConfigError::ValidationError(format!(
                "Pool min_connections ({}) exceeds max_connections ({})",
                db.min_connections, db.max_connections
            )));
        }

        if db.acquire_timeout_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "Pool acquire timeout must be greater than 0".to_string(),
            ));
        }

        if self.scoring.scale == 0.0 || !self.scoring.scale.is_finite() {
            return Err(ConfigError::ValidationError(
                "Scoring scale must be a non-zero number".to_string(),
            ));
        }

        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "Server port must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        assert_eq!(config.database.path, PathBuf::from("./data/mahjong.db"));
        assert_eq!(config.log_level, "info");
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.scoring.target_total, 100_000);
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_default_rules() {
        let rules = ScoringConfig::default().rules();
        assert_eq!(rules, ScoringRules::default());
    }

    #[test]
    fn test_raw_formula_rules() {
        let scoring = ScoringConfig {
            target_total: 10_000,
            formula: FormulaKind::Raw,
            ..ScoringConfig::default()
        };
        let rules = scoring.rules();
        assert_eq!(rules.target_total, 10_000);
        assert_eq!(rules.formula, PointFormula::RawScore);
    }

    #[test]
    fn test_config_validation_ok() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_bad_pool() {
        let mut config = AppConfig::default();
        config.database.max_connections = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.database.min_connections = 6;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.database.acquire_timeout_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_bad_scale() {
        let mut config = AppConfig::default();
        config.scoring.scale = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_bad_port() {
        let mut config = AppConfig::default();
        config.server.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_toml() {
        let config = AppConfig::from_toml_str(
            r#"
            [database]
            path = "/tmp/club.db"
            max_connections = 3

            [scoring]
            target_total = 10000
            formula = "raw"
            "#,
        )
        .unwrap();

        assert_eq!(config.database.path, PathBuf::from("/tmp/club.db"));
        assert_eq!(config.database.max_connections, 3);
        assert_eq!(config.database.min_connections, 1);
        assert_eq!(config.scoring.target_total, 10_000);
        assert_eq!(config.scoring.formula, FormulaKind::Raw);
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_config_from_toml_rejects_invalid() {
        let result = AppConfig::from_toml_str("[server]\nport = 0\n");
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml_str = config.to_toml_string().unwrap();

        // Should be parseable
        let parsed = AppConfig::from_toml_str(&toml_str).unwrap();
        assert_eq!(config.database.path, parsed.database.path);
        assert_eq!(config.scoring.placement_bonus, parsed.scoring.placement_bonus);
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = AppConfig::load(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config.scoring.starting_points, 25_000);
    }
}
