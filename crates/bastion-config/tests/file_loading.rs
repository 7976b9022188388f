//! Loading configuration files from disk.

use std::io::Write;

use bastion_config::{BastionConfig, ConfigError, ConfigLoader, LogFormat};
use tempfile::Builder;

fn write_temp(suffix: &str, content: &str) -> tempfile::NamedTempFile {
    let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn complete_toml_file() {
    let file = write_temp(
        ".toml",
        r#"
            [auth]
            jwt_secret = "0123456789abcdef0123456789abcdef"
            jwt_ttl_secs = 3600

            [api_keys]
            cache_capacity = 256
            last_used_refresh_secs = 30

            [telemetry]
            environment = "production"

            [telemetry.logging]
            level = "warn"
            format = "json"

            [telemetry.metrics]
            enabled = true
            addr = "127.0.0.1:9090"
        "#,
    );

    let config = ConfigLoader::new().with_file(file.path()).unwrap().load().unwrap();

    assert_eq!(config.auth.jwt_ttl_secs, 3600);
    assert_eq!(config.auth.token_query_param, "token");
    assert_eq!(config.api_keys.cache_capacity, 256);
    assert!(config.telemetry.is_production());
    assert_eq!(config.telemetry.logging.format, LogFormat::Json);
    assert_eq!(config.telemetry.metrics.addr.as_deref(), Some("127.0.0.1:9090"));
}

#[test]
fn json_file() {
    let file = write_temp(".json", r#"{"auth": {"token_query_param": "access_token"}}"#);
    let config = ConfigLoader::new().with_file(file.path()).unwrap().load().unwrap();
    assert_eq!(config.auth.token_query_param, "access_token");
}

#[test]
fn unknown_field_is_rejected() {
    let file = write_temp(".toml", "[auth]\njwt_secert = \"typo\"\n");
    let result = ConfigLoader::new().with_file(file.path());
    assert!(matches!(result, Err(ConfigError::TomlError(_))));
}

#[test]
fn unsupported_extension_is_rejected() {
    let file = write_temp(".yaml", "auth: {}\n");
    let result = ConfigLoader::new().with_file(file.path());
    assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
}

#[test]
fn short_production_secret_fails_validation() {
    let file = write_temp(
        ".toml",
        "[auth]\njwt_secret = \"short\"\n[telemetry]\nenvironment = \"production\"\n",
    );
    let err = ConfigLoader::new()
        .with_file(file.path())
        .unwrap()
        .load()
        .unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { .. }));
}

#[test]
fn empty_file_yields_defaults() {
    let file = write_temp(".toml", "");
    let config = ConfigLoader::new().with_file(file.path()).unwrap().load().unwrap();
    assert_eq!(config, BastionConfig::default());
}
