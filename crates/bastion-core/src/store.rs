//! Collaborator contracts consumed by the gateway.
//!
//! The gateway never owns persistence. Identity, membership, license and
//! API key data are read through these traits, which implementations must
//! make safe for concurrent reads.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::apikey::ApiKey;
use crate::identity::{ApiKeyId, EndpointGroupId, TeamMembership, User, UserId};
use crate::resource::EndpointGroup;

/// Result alias for collaborator calls.
pub type StoreResult<T> = Result<T, StoreError>;

/// Failure reported by a collaborator.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The requested object does not exist.
    #[error("object not found: {0}")]
    NotFound(String),

    /// The backing store could not serve the request.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Creates a not-found error.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// Creates an unavailable error.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable(reason.into())
    }

    /// Returns `true` for [`StoreError::NotFound`].
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Identity store.
pub trait UserStore: Send + Sync {
    /// Reads a user by identifier.
    fn user(&self, id: UserId) -> StoreResult<User>;
}

/// Team membership store.
pub trait TeamMembershipStore: Send + Sync {
    /// All memberships of a user.
    fn memberships_by_user_id(&self, user_id: UserId) -> StoreResult<Vec<TeamMembership>>;
}

/// Environment group store.
pub trait EndpointGroupStore: Send + Sync {
    /// Reads an environment group by identifier.
    fn endpoint_group(&self, id: EndpointGroupId) -> StoreResult<EndpointGroup>;
}

/// Snapshot of license state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseInfo {
    /// Whether the installation is currently licensed.
    pub valid: bool,
}

/// License information provider.
pub trait LicenseService: Send + Sync {
    /// Current license state. Never cached by the gateway.
    fn info(&self) -> StoreResult<LicenseInfo>;
}

/// API key persistence.
pub trait ApiKeyRepository: Send + Sync {
    /// Persists a new key and assigns its identifier.
    fn create_api_key(&self, key: &mut ApiKey) -> StoreResult<()>;
    /// Reads a key by identifier.
    fn api_key(&self, id: ApiKeyId) -> StoreResult<ApiKey>;
    /// Overwrites an existing key.
    fn update_api_key(&self, key: &ApiKey) -> StoreResult<()>;
    /// Deletes a key.
    fn delete_api_key(&self, id: ApiKeyId) -> StoreResult<()>;
    /// Looks a key up by its digest.
    fn api_key_by_digest(&self, digest: &[u8]) -> StoreResult<ApiKey>;
    /// All keys of a user.
    fn api_keys_by_user_id(&self, user_id: UserId) -> StoreResult<Vec<ApiKey>>;
}
