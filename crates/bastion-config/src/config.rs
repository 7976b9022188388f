//! Root configuration type.

use serde::{Deserialize, Serialize};

use crate::{ApiKeyConfig, AuthConfig, ConfigError, LogFormat, TelemetrySection};

/// Minimum JWT secret length accepted in production.
pub const MIN_PRODUCTION_SECRET_LEN: usize = 32;

/// Complete Bastion configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load it from files and
/// environment variables.
///
/// ```
/// use bastion_config::BastionConfig;
///
/// let config = BastionConfig::default();
/// assert_eq!(config.api_keys.cache_capacity, 1024);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct BastionConfig {
    /// Credential handling.
    #[serde(default)]
    pub auth: AuthConfig,

    /// API key service.
    #[serde(default)]
    pub api_keys: ApiKeyConfig,

    /// Logging and metrics.
    #[serde(default)]
    pub telemetry: TelemetrySection,
}

impl BastionConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` when:
    /// - the JWT secret is set but empty
    /// - the environment is production and the secret is missing or shorter
    ///   than [`MIN_PRODUCTION_SECRET_LEN`] bytes
    /// - the token lifetime or cache capacity is zero
    /// - a header or query parameter name is empty
    /// - the metrics address is not a socket address
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.auth.jwt_secret.as_deref() {
            Some("") => {
                return Err(ConfigError::invalid_value(
                    "auth.jwt_secret",
                    "must not be empty",
                ))
            }
            Some(secret)
                if self.telemetry.is_production()
                    && secret.len() < MIN_PRODUCTION_SECRET_LEN =>
            {
                return Err(ConfigError::invalid_value(
                    "auth.jwt_secret",
                    format!("must be at least {MIN_PRODUCTION_SECRET_LEN} bytes in production"),
                ));
            }
            None if self.telemetry.is_production() => {
                return Err(ConfigError::invalid_value(
                    "auth.jwt_secret",
                    "must be set in production",
                ));
            }
            _ => {}
        }

        if self.auth.jwt_ttl_secs == 0 {
            return Err(ConfigError::invalid_value(
                "auth.jwt_ttl_secs",
                "must be positive",
            ));
        }

        if self.auth.token_query_param.is_empty() {
            return Err(ConfigError::invalid_value(
                "auth.token_query_param",
                "must not be empty",
            ));
        }

        if self.auth.api_key_header.is_empty() {
            return Err(ConfigError::invalid_value(
                "auth.api_key_header",
                "must not be empty",
            ));
        }

        if self.api_keys.cache_capacity == 0 {
            return Err(ConfigError::invalid_value(
                "api_keys.cache_capacity",
                "must be positive",
            ));
        }

        if let Some(addr) = &self.telemetry.metrics.addr {
            if addr.parse::<std::net::SocketAddr>().is_err() {
                return Err(ConfigError::invalid_value(
                    "telemetry.metrics.addr",
                    format!("invalid socket address: {addr}"),
                ));
            }
        }

        Ok(())
    }

    /// Debug logs with pretty formatting.
    ///
    /// ```
    /// use bastion_config::BastionConfig;
    ///
    /// let config = BastionConfig::development();
    /// assert_eq!(config.telemetry.logging.level, "debug");
    /// ```
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();
        config.telemetry.environment = "development".to_string();
        config.telemetry.logging.level = "debug".to_string();
        config.telemetry.logging.format = LogFormat::Pretty;
        config.telemetry.logging.include_location = true;
        config
    }

    /// JSON logs, metrics on, and a larger key cache.
    ///
    /// The production preset does not carry a JWT secret; one must be
    /// supplied by file or environment before [`validate`](Self::validate)
    /// passes.
    #[must_use]
    pub fn production() -> Self {
        let mut config = Self::default();
        config.telemetry.environment = "production".to_string();
        config.telemetry.logging.level = "info".to_string();
        config.telemetry.logging.format = LogFormat::Json;
        config.telemetry.metrics.enabled = true;
        config.api_keys.cache_capacity = 10_000;
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(BastionConfig::default().validate().is_ok());
        assert!(BastionConfig::development().validate().is_ok());
    }

    #[test]
    fn test_production_requires_secret() {
        let mut config = BastionConfig::production();
        assert!(config.validate().is_err());

        config.auth.jwt_secret = Some("short".to_string());
        assert!(config.validate().is_err());

        config.auth.jwt_secret = Some("x".repeat(MIN_PRODUCTION_SECRET_LEN));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_secret_rejected() {
        let mut config = BastionConfig::default();
        config.auth.jwt_secret = Some(String::new());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("auth.jwt_secret"));
    }

    #[test]
    fn test_zero_values_rejected() {
        let mut config = BastionConfig::default();
        config.auth.jwt_ttl_secs = 0;
        assert!(config.validate().is_err());

        let mut config = BastionConfig::default();
        config.api_keys.cache_capacity = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_metrics_addr_rejected() {
        let mut config = BastionConfig::default();
        config.telemetry.metrics.addr = Some("not-an-addr".to_string());
        assert!(config.validate().is_err());
    }
}
