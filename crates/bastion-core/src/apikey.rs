//! Persisted API key record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::{ApiKeyId, UserId};

/// Literal marker every raw API key starts with.
pub const API_KEY_PREFIX: &str = "ptr_";

/// Number of leading raw-key characters kept for display.
pub const API_KEY_DISPLAY_PREFIX_LEN: usize = 7;

/// An issued API key. Only the digest of the secret is kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiKey {
    /// Key identifier, assigned by the repository on create.
    pub id: ApiKeyId,
    /// Owning user.
    pub user_id: UserId,
    /// SHA-256 digest of the full raw key. Never serialized outward.
    #[serde(skip_serializing, default)]
    pub digest: Vec<u8>,
    /// First characters of the raw key, for display only.
    pub prefix: String,
    /// Free-form description supplied at creation.
    pub description: String,
    /// Creation time.
    pub date_created: DateTime<Utc>,
    /// Last time the key authenticated a request, refreshed lazily.
    pub last_used: Option<DateTime<Utc>>,
}
