//! Configuration sections.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Credential handling.
///
/// ```
/// use bastion_config::AuthConfig;
///
/// let auth = AuthConfig::default();
/// assert_eq!(auth.token_query_param, "token");
/// assert_eq!(auth.api_key_header, "x-api-key");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    /// HMAC secret for session tokens. When unset a random secret is
    /// generated at startup and tokens do not survive a restart.
    #[serde(default)]
    pub jwt_secret: Option<String>,

    /// Session token lifetime in seconds.
    #[serde(default = "default_jwt_ttl")]
    pub jwt_ttl_secs: u64,

    /// Query parameter accepted as a secondary bearer token channel.
    #[serde(default = "default_token_query_param")]
    pub token_query_param: String,

    /// Header (and case-insensitive query parameter) carrying API keys.
    #[serde(default = "default_api_key_header")]
    pub api_key_header: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            jwt_ttl_secs: default_jwt_ttl(),
            token_query_param: default_token_query_param(),
            api_key_header: default_api_key_header(),
        }
    }
}

impl AuthConfig {
    /// Session token lifetime.
    pub fn jwt_ttl(&self) -> Duration {
        Duration::from_secs(self.jwt_ttl_secs)
    }
}

fn default_jwt_ttl() -> u64 {
    8 * 60 * 60
}

fn default_token_query_param() -> String {
    "token".to_string()
}

fn default_api_key_header() -> String {
    "x-api-key".to_string()
}

/// API key service settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ApiKeyConfig {
    /// Maximum number of cached digest lookups.
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,

    /// Minimum seconds between two persisted last-used updates of a key.
    #[serde(default = "default_last_used_refresh")]
    pub last_used_refresh_secs: u64,
}

impl Default for ApiKeyConfig {
    fn default() -> Self {
        Self {
            cache_capacity: default_cache_capacity(),
            last_used_refresh_secs: default_last_used_refresh(),
        }
    }
}

impl From<&ApiKeyConfig> for bastion_apikey::ServiceConfig {
    fn from(config: &ApiKeyConfig) -> Self {
        Self {
            cache_capacity: config.cache_capacity,
            last_used_refresh: Duration::from_secs(config.last_used_refresh_secs),
        }
    }
}

fn default_cache_capacity() -> usize {
    1024
}

fn default_last_used_refresh() -> u64 {
    60
}

/// Log format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON formatted logs (production).
    #[default]
    Json,
    /// Human-readable pretty format (development).
    Pretty,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Enable logging.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Log level or `EnvFilter` directive.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Include source file and line in logs.
    #[serde(default)]
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::default(),
            include_location: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Prometheus metrics configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct MetricsConfig {
    /// Enable metrics collection.
    #[serde(default)]
    pub enabled: bool,

    /// Scrape listener address. Unset keeps metrics in-process only.
    #[serde(default)]
    pub addr: Option<String>,
}

/// Telemetry section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct TelemetrySection {
    /// Deployment environment; `production` tightens validation.
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Metrics configuration.
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl Default for TelemetrySection {
    fn default() -> Self {
        Self {
            environment: default_environment(),
            logging: LoggingConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl TelemetrySection {
    /// Whether the production rules apply.
    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }
}

impl From<&TelemetrySection> for bastion_telemetry::TelemetryConfig {
    fn from(section: &TelemetrySection) -> Self {
        Self {
            logging: bastion_telemetry::LogConfig {
                enabled: section.logging.enabled,
                level: section.logging.level.clone(),
                json_format: section.logging.format == LogFormat::Json,
                file_line_info: section.logging.include_location,
                include_target: true,
            },
            metrics: bastion_telemetry::MetricsConfig {
                enabled: section.metrics.enabled,
                addr: section.metrics.addr.clone(),
            },
        }
    }
}

fn default_environment() -> String {
    "development".to_string()
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_config_default() {
        let auth = AuthConfig::default();
        assert!(auth.jwt_secret.is_none());
        assert_eq!(auth.jwt_ttl(), Duration::from_secs(28_800));
    }

    #[test]
    fn test_auth_config_unknown_field_rejected() {
        let result: Result<AuthConfig, _> = toml::from_str("jwt_secrets = \"x\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_api_key_config_into_service_config() {
        let config = ApiKeyConfig {
            cache_capacity: 16,
            last_used_refresh_secs: 5,
        };
        let service: bastion_apikey::ServiceConfig = (&config).into();
        assert_eq!(service.cache_capacity, 16);
        assert_eq!(service.last_used_refresh, Duration::from_secs(5));
    }

    #[test]
    fn test_log_format_deserialize() {
        let logging: LoggingConfig = toml::from_str("format = \"pretty\"").unwrap();
        assert_eq!(logging.format, LogFormat::Pretty);
        assert!(logging.enabled);
    }

    #[test]
    fn test_telemetry_section_into_runtime_config() {
        let section = TelemetrySection {
            metrics: MetricsConfig {
                enabled: true,
                addr: Some("127.0.0.1:9100".to_string()),
            },
            ..TelemetrySection::default()
        };
        let runtime: bastion_telemetry::TelemetryConfig = (&section).into();
        assert!(runtime.logging.json_format);
        assert!(runtime.metrics.enabled);
        assert_eq!(runtime.metrics.addr.as_deref(), Some("127.0.0.1:9100"));
        assert!(!section.is_production());
    }
}
