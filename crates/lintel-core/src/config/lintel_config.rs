//! Top-level lintel configuration with 3-layer resolution.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. Environment variables (`LINTEL_*`)
/// 2. Project config (`lintel.toml` in the working directory)
/// 3. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LintelConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub evaluator: EvaluatorConfig,
    pub retention: RetentionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address, e.g. `127.0.0.1:8080`.
    pub bind_addr: Option<String>,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> &str {
        self.bind_addr.as_deref().unwrap_or("127.0.0.1:8080")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    pub path: Option<PathBuf>,
}

impl DatabaseConfig {
    pub fn path(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(|| PathBuf::from("lintel.db"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AuthConfig {
    /// HS256 signing secret. Required to start the server; never logged.
    pub jwt_secret: Option<String>,
    /// Clock-skew leeway for `exp` validation, in seconds.
    pub leeway_secs: Option<u64>,
}

impl AuthConfig {
    pub fn leeway_secs(&self) -> u64 {
        self.leeway_secs.unwrap_or(30)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EvaluatorConfig {
    /// Wall-clock budget for one validation cycle; exceeding it yields
    /// the `failed` terminal state.
    pub cycle_timeout_secs: Option<u64>,
}

impl EvaluatorConfig {
    pub fn cycle_timeout_secs(&self) -> u64 {
        self.cycle_timeout_secs.unwrap_or(60)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RetentionConfig {
    /// Resolved issues older than this are purged.
    pub resolved_issue_days: Option<u32>,
    /// Expired exceptions older than their expiry by this much are purged.
    pub expired_exception_days: Option<u32>,
    /// Matrix rows not recomputed within this window are purged.
    pub matrix_days: Option<u32>,
}

impl RetentionConfig {
    pub fn resolved_issue_days(&self) -> u32 {
        self.resolved_issue_days.unwrap_or(30)
    }

    pub fn expired_exception_days(&self) -> u32 {
        self.expired_exception_days.unwrap_or(90)
    }

    pub fn matrix_days(&self) -> u32 {
        self.matrix_days.unwrap_or(30)
    }
}

impl LintelConfig {
    /// Load configuration with 3-layer resolution.
    ///
    /// Resolution order (highest priority first):
    /// 1. Environment variables (`LINTEL_*`)
    /// 2. Project config (`lintel.toml` in `root`)
    /// 3. Compiled defaults
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        let project_config_path = root.join("lintel.toml");
        if project_config_path.exists() {
            Self::merge_toml_file(&mut config, &project_config_path)?;
        }

        Self::apply_env_overrides(&mut config);
        Self::validate(&config)?;

        Ok(config)
    }

    /// Load configuration from a TOML string (for testing).
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })?;
        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate the configuration values.
    pub fn validate(config: &LintelConfig) -> Result<(), ConfigError> {
        if let Some(timeout) = config.evaluator.cycle_timeout_secs {
            if timeout == 0 {
                return Err(ConfigError::ValidationFailed {
                    field: "evaluator.cycle_timeout_secs".to_string(),
                    message: "must be greater than 0".to_string(),
                });
            }
        }
        if let Some(leeway) = config.auth.leeway_secs {
            if leeway > 3600 {
                return Err(ConfigError::ValidationFailed {
                    field: "auth.leeway_secs".to_string(),
                    message: "must be at most 3600".to_string(),
                });
            }
        }
        for (field, value) in [
            ("retention.resolved_issue_days", config.retention.resolved_issue_days),
            ("retention.expired_exception_days", config.retention.expired_exception_days),
            ("retention.matrix_days", config.retention.matrix_days),
        ] {
            if value == Some(0) {
                return Err(ConfigError::ValidationFailed {
                    field: field.to_string(),
                    message: "must be greater than 0".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Merge a TOML file into the existing config.
    /// Unknown keys are silently ignored (forward-compatible).
    fn merge_toml_file(config: &mut LintelConfig, path: &Path) -> Result<(), ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
                path: path.display().to_string(),
            })?;

        let file_config: LintelConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        Self::merge(config, &file_config);
        Ok(())
    }

    /// Merge `other` into `base`; `other` wins only where it has a `Some`.
    fn merge(base: &mut LintelConfig, other: &LintelConfig) {
        if other.server.bind_addr.is_some() {
            base.server.bind_addr = other.server.bind_addr.clone();
        }
        if other.database.path.is_some() {
            base.database.path = other.database.path.clone();
        }
        if other.auth.jwt_secret.is_some() {
            base.auth.jwt_secret = other.auth.jwt_secret.clone();
        }
        if other.auth.leeway_secs.is_some() {
            base.auth.leeway_secs = other.auth.leeway_secs;
        }
        if other.evaluator.cycle_timeout_secs.is_some() {
            base.evaluator.cycle_timeout_secs = other.evaluator.cycle_timeout_secs;
        }
        if other.retention.resolved_issue_days.is_some() {
            base.retention.resolved_issue_days = other.retention.resolved_issue_days;
        }
        if other.retention.expired_exception_days.is_some() {
            base.retention.expired_exception_days = other.retention.expired_exception_days;
        }
        if other.retention.matrix_days.is_some() {
            base.retention.matrix_days = other.retention.matrix_days;
        }
    }

    /// Apply environment variable overrides.
    /// Pattern: `LINTEL_SERVER_BIND_ADDR`, `LINTEL_AUTH_JWT_SECRET`, etc.
    fn apply_env_overrides(config: &mut LintelConfig) {
        if let Ok(val) = std::env::var("LINTEL_SERVER_BIND_ADDR") {
            config.server.bind_addr = Some(val);
        }
        if let Ok(val) = std::env::var("LINTEL_DATABASE_PATH") {
            config.database.path = Some(PathBuf::from(val));
        }
        if let Ok(val) = std::env::var("LINTEL_AUTH_JWT_SECRET") {
            config.auth.jwt_secret = Some(val);
        }
        if let Ok(val) = std::env::var("LINTEL_AUTH_LEEWAY_SECS") {
            if let Ok(v) = val.parse::<u64>() {
                config.auth.leeway_secs = Some(v);
            }
        }
        if let Ok(val) = std::env::var("LINTEL_EVALUATOR_CYCLE_TIMEOUT_SECS") {
            if let Ok(v) = val.parse::<u64>() {
                config.evaluator.cycle_timeout_secs = Some(v);
            }
        }
        if let Ok(val) = std::env::var("LINTEL_RETENTION_RESOLVED_ISSUE_DAYS") {
            if let Ok(v) = val.parse::<u32>() {
                config.retention.resolved_issue_days = Some(v);
            }
        }
        if let Ok(val) = std::env::var("LINTEL_RETENTION_EXPIRED_EXCEPTION_DAYS") {
            if let Ok(v) = val.parse::<u32>() {
                config.retention.expired_exception_days = Some(v);
            }
        }
        if let Ok(val) = std::env::var("LINTEL_RETENTION_MATRIX_DAYS") {
            if let Ok(v) = val.parse::<u32>() {
                config.retention.matrix_days = Some(v);
            }
        }
    }

    /// Serialize the config back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            path: "<serialization>".to_string(),
            message: e.to_string(),
        })
    }
}
