//! Identities, roles and team memberships.
//!
//! Identifiers are thin newtypes over `u32` so a [`UserId`] can never be
//! passed where a [`TeamId`] is expected.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::authorization::{Authorization, Authorizations};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl $name {
            /// Returns the raw numeric identifier.
            #[must_use]
            pub const fn get(self) -> u32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u32> for $name {
            fn from(id: u32) -> Self {
                Self(id)
            }
        }
    };
}

define_id!(
    /// Identifier of a user account.
    UserId
);
define_id!(
    /// Identifier of a team.
    TeamId
);
define_id!(
    /// Identifier of a team membership record.
    MembershipId
);
define_id!(
    /// Identifier of an environment (endpoint).
    EndpointId
);
define_id!(
    /// Identifier of an environment group.
    EndpointGroupId
);
define_id!(
    /// Identifier of a container registry.
    RegistryId
);
define_id!(
    /// Identifier of an RBAC role.
    RoleId
);
define_id!(
    /// Identifier of an API key.
    ApiKeyId
);

/// Platform-level role of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Full administrator; bypasses every authorization check.
    Administrator,
    /// Administrator of edge environments. Not a platform administrator.
    EdgeAdmin,
    /// Regular user governed by their authorization sets.
    Standard,
}

impl Role {
    /// Whether this role short-circuits authorization checks.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Administrator)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Administrator => "administrator",
            Self::EdgeAdmin => "edge_admin",
            Self::Standard => "standard",
        };
        f.write_str(name)
    }
}

/// A persisted user account as seen by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// User identifier.
    pub id: UserId,
    /// Login name.
    pub username: String,
    /// Platform role.
    pub role: Role,
    /// Authorizations for native API operations.
    #[serde(default)]
    pub portainer_authorizations: Authorizations,
    /// Authorizations per environment, used for proxied operations.
    #[serde(default)]
    pub endpoint_authorizations: HashMap<EndpointId, Authorizations>,
}

impl User {
    /// Creates a user with empty authorization sets.
    pub fn new(id: impl Into<UserId>, username: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            role,
            portainer_authorizations: Authorizations::new(),
            endpoint_authorizations: HashMap::new(),
        }
    }

    /// Adds native API authorizations.
    pub fn with_portainer_authorizations(
        mut self,
        authorizations: impl IntoIterator<Item = Authorization>,
    ) -> Self {
        self.portainer_authorizations.extend(authorizations);
        self
    }

    /// Adds authorizations scoped to one environment.
    pub fn with_endpoint_authorizations(
        mut self,
        endpoint_id: impl Into<EndpointId>,
        authorizations: impl IntoIterator<Item = Authorization>,
    ) -> Self {
        self.endpoint_authorizations
            .entry(endpoint_id.into())
            .or_default()
            .extend(authorizations);
        self
    }

    /// Authorizations held for the given environment (empty when none).
    pub fn authorizations_for_endpoint(&self, endpoint_id: EndpointId) -> Authorizations {
        self.endpoint_authorizations
            .get(&endpoint_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Token claims derived from this account.
    pub fn token_data(&self) -> TokenData {
        TokenData {
            id: self.id,
            username: self.username.clone(),
            role: self.role,
        }
    }
}

/// Authenticated identity claims, valid for the duration of one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenData {
    /// User identifier.
    pub id: UserId,
    /// Login name.
    pub username: String,
    /// Platform role at the time the credential was validated.
    pub role: Role,
}

impl TokenData {
    /// Whether the identity bypasses authorization checks.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Role of a user inside a team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipRole {
    /// Team leader; may manage the team.
    Leader,
    /// Regular member.
    Member,
}

/// Membership of a user in a team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMembership {
    /// Membership identifier.
    pub id: MembershipId,
    /// Member.
    pub user_id: UserId,
    /// Team.
    pub team_id: TeamId,
    /// Role inside the team.
    pub role: MembershipRole,
}

impl TeamMembership {
    /// Whether this membership makes the user a leader of its team.
    #[must_use]
    pub fn is_leader(&self) -> bool {
        self.role == MembershipRole::Leader
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_administrator_is_admin() {
        assert!(Role::Administrator.is_admin());
        assert!(!Role::EdgeAdmin.is_admin());
        assert!(!Role::Standard.is_admin());
    }

    #[test]
    fn test_endpoint_authorizations_lookup() {
        let user = User::new(UserId(3), "alice", Role::Standard)
            .with_endpoint_authorizations(EndpointId(1), [Authorization::DockerContainerList]);

        assert!(user
            .authorizations_for_endpoint(EndpointId(1))
            .contains(&Authorization::DockerContainerList));
        assert!(user.authorizations_for_endpoint(EndpointId(2)).is_empty());
    }

    #[test]
    fn test_token_data_from_user() {
        let user = User::new(UserId(9), "bob", Role::Administrator);
        let token = user.token_data();
        assert_eq!(token.id, UserId(9));
        assert_eq!(token.username, "bob");
        assert!(token.is_admin());
    }

    #[test]
    fn test_ids_serialize_as_numbers() {
        assert_eq!(serde_json::to_string(&TeamId(4)).unwrap(), "4");
        assert_eq!(EndpointId(12).to_string(), "12");
    }
}
