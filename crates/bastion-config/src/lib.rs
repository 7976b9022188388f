//! Typed configuration for Bastion.
//!
//! Configuration is layered, later layers overriding earlier ones:
//! defaults, then a TOML or JSON file, then `BASTION__SECTION__KEY`
//! environment variables (optionally seeded from a `.env` file). Unknown
//! fields are rejected.
//!
//! ```no_run
//! use bastion_config::ConfigLoader;
//!
//! # fn main() -> Result<(), bastion_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_optional_file("bastion.toml")?
//!     .with_dotenv()?
//!     .with_env_prefix("BASTION")
//!     .load()?;
//! # let _ = config;
//! # Ok(())
//! # }
//! ```
//!
//! # File format
//!
//! ```toml
//! [auth]
//! jwt_secret = "change-me-to-at-least-thirty-two-bytes"
//! jwt_ttl_secs = 28800
//! token_query_param = "token"
//! api_key_header = "x-api-key"
//!
//! [api_keys]
//! cache_capacity = 1024
//! last_used_refresh_secs = 60
//!
//! [telemetry]
//! environment = "production"
//!
//! [telemetry.logging]
//! level = "info"
//! format = "json"
//!
//! [telemetry.metrics]
//! enabled = true
//! addr = "0.0.0.0:9090"
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::{BastionConfig, MIN_PRODUCTION_SECRET_LEN};
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::*;
