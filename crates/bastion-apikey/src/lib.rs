//! # Bastion API Keys
//!
//! API key credentials for the Bastion gateway.
//!
//! - [`hash_raw`] - SHA-256 digest of a raw key, the only persisted form
//! - [`ApiKeyCache`] - digest to (owner, key) cache behind a read/write lock
//! - [`ApiKeyService`] - issuance, lookup, rotation and deletion
//!
//! Raw keys look like `ptr_<base64 of 32 random bytes>`. The first seven
//! characters are kept as a display prefix.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod cache;
mod config;
mod error;
mod hash;
mod service;

pub use cache::{ApiKeyCache, CacheStats};
pub use config::ServiceConfig;
pub use error::{ApiKeyError, ApiKeyResult};
pub use hash::hash_raw;
pub use service::ApiKeyService;
