use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

// ============================================================================
// Application Configuration
// ============================================================================
//
// Optional TOML file named by ENROLLMENT_CONFIG, then ENROLLMENT_* variables
// on top. Every field has a default so an empty environment is valid.
//
// ============================================================================

pub const CONFIG_PATH_ENV: &str = "ENROLLMENT_CONFIG";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid value for {field}: {value} ({reason})")]
    InvalidValue {
        field: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Upper bound for one notification gateway call
    pub notification_timeout_ms: u64,
    pub metrics_enabled: bool,
    pub metrics_port: u16,
    /// tracing EnvFilter directive, used when RUST_LOG is unset
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            notification_timeout_ms: 5_000,
            metrics_enabled: true,
            metrics_port: 9090,
            log_filter: "info,course_enrollment=debug".to_string(),
        }
    }
}

impl AppConfig {
    /// Load from the file named by ENROLLMENT_CONFIG (if any) and the environment
    pub fn load() -> Result<Self, ConfigError> {
        let config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::from_file(path)?,
            Err(_) => Self::default(),
        };
        config.with_overrides(|key| std::env::var(key).ok())
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Apply ENROLLMENT_* overrides read through `lookup`, then validate
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("ENROLLMENT_NOTIFICATION_TIMEOUT_MS") {
            self.notification_timeout_ms = parse_field("notification_timeout_ms", &value)?;
        }
        if let Some(value) = lookup("ENROLLMENT_METRICS_ENABLED") {
            self.metrics_enabled = parse_field("metrics_enabled", &value)?;
        }
        if let Some(value) = lookup("ENROLLMENT_METRICS_PORT") {
            self.metrics_port = parse_field("metrics_port", &value)?;
        }
        if let Some(value) = lookup("ENROLLMENT_LOG_FILTER") {
            self.log_filter = value;
        }

        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.notification_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "notification_timeout_ms",
                value: "0".to_string(),
                reason: "timeout must be at least 1ms".to_string(),
            });
        }
        if self.metrics_enabled && self.metrics_port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "metrics_port",
                value: "0".to_string(),
                reason: "port required when metrics are enabled".to_string(),
            });
        }
        Ok(())
    }

    pub fn notification_timeout(&self) -> Duration {
        Duration::from_millis(self.notification_timeout_ms)
    }
}

fn parse_field<T>(field: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        field,
        value: value.to_string(),
        reason: e.to_string(),
    })
}
