//! Request identifiers and the restricted request context.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::identity::{TeamId, TeamMembership, TokenData, UserId};

/// Unique identifier for a request.
///
/// Uses UUID v7 so identifiers are time-ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Creates a new unique request ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Wraps an existing UUID, e.g. one propagated by a trusted proxy.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity context handed to business handlers.
///
/// Built once per request from [`TokenData`] and immutable afterwards.
/// Administrators never have their memberships loaded, so
/// `user_memberships` is empty for them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestrictedRequestContext {
    /// Caller is a platform administrator.
    pub is_admin: bool,
    /// Caller leads at least one team.
    pub is_team_leader: bool,
    /// Caller identifier.
    pub user_id: UserId,
    /// Team memberships of the caller (empty for administrators).
    pub user_memberships: Vec<TeamMembership>,
}

impl RestrictedRequestContext {
    /// Context for an administrator; memberships are not consulted.
    #[must_use]
    pub const fn admin(user_id: UserId) -> Self {
        Self {
            is_admin: true,
            is_team_leader: false,
            user_id,
            user_memberships: Vec::new(),
        }
    }

    /// Context for a non-admin user with their loaded memberships.
    #[must_use]
    pub fn member(user_id: UserId, memberships: Vec<TeamMembership>) -> Self {
        Self {
            is_admin: false,
            is_team_leader: memberships.iter().any(TeamMembership::is_leader),
            user_id,
            user_memberships: memberships,
        }
    }

    /// Builds the context for a token. Memberships are only used for non-admins.
    #[must_use]
    pub fn from_token(token: &TokenData, memberships: Vec<TeamMembership>) -> Self {
        if token.is_admin() {
            Self::admin(token.id)
        } else {
            Self::member(token.id, memberships)
        }
    }

    /// Whether the caller belongs to `team_id`.
    #[must_use]
    pub fn is_member_of(&self, team_id: TeamId) -> bool {
        self.user_memberships.iter().any(|m| m.team_id == team_id)
    }

    /// Whether the caller leads `team_id`.
    #[must_use]
    pub fn leads(&self, team_id: TeamId) -> bool {
        self.user_memberships
            .iter()
            .any(|m| m.team_id == team_id && m.is_leader())
    }
}
