//! Ownership records and access policies attached to managed resources.
#![allow(missing_docs)]

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::identity::{EndpointGroupId, EndpointId, RegistryId, RoleId, TeamId, UserId};

/// Kind of resource a [`ResourceControl`] protects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceControlType {
    Container,
    Service,
    Volume,
    Network,
    Secret,
    Config,
    Stack,
    ContainerGroup,
}

/// A user granted access by a resource control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserResourceAccess {
    pub user_id: UserId,
}

/// A team granted access by a resource control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamResourceAccess {
    pub team_id: TeamId,
}

/// Ownership record for a managed resource.
///
/// `public` overrides every other restriction. `administrators_only`
/// excludes all non-admins regardless of the access lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceControl {
    pub resource_id: String,
    #[serde(default)]
    pub sub_resource_ids: Vec<String>,
    #[serde(rename = "type")]
    pub resource_type: ResourceControlType,
    #[serde(default)]
    pub public: bool,
    #[serde(default)]
    pub administrators_only: bool,
    #[serde(default)]
    pub user_accesses: Vec<UserResourceAccess>,
    #[serde(default)]
    pub team_accesses: Vec<TeamResourceAccess>,
}

impl ResourceControl {
    /// A private resource control with no grants.
    pub fn new(resource_id: impl Into<String>, resource_type: ResourceControlType) -> Self {
        Self {
            resource_id: resource_id.into(),
            sub_resource_ids: Vec::new(),
            resource_type,
            public: false,
            administrators_only: false,
            user_accesses: Vec::new(),
            team_accesses: Vec::new(),
        }
    }

    /// Grants access to a user.
    pub fn with_user(mut self, user_id: impl Into<UserId>) -> Self {
        self.user_accesses.push(UserResourceAccess {
            user_id: user_id.into(),
        });
        self
    }

    /// Grants access to a team.
    pub fn with_team(mut self, team_id: impl Into<TeamId>) -> Self {
        self.team_accesses.push(TeamResourceAccess {
            team_id: team_id.into(),
        });
        self
    }

    /// Marks the resource public.
    pub fn public(mut self) -> Self {
        self.public = true;
        self
    }

    /// Restricts the resource to administrators.
    pub fn administrators_only(mut self) -> Self {
        self.administrators_only = true;
        self
    }
}

/// Access policy entry. Presence in a policy map grants access; the role
/// only matters to the RBAC layer that derives authorization sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AccessPolicy {
    #[serde(default)]
    pub role_id: Option<RoleId>,
}

/// Per-user access policies.
pub type UserAccessPolicies = HashMap<UserId, AccessPolicy>;
/// Per-team access policies.
pub type TeamAccessPolicies = HashMap<TeamId, AccessPolicy>;

/// Deployment type of an environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndpointType {
    Docker,
    AgentOnDocker,
    Azure,
    EdgeAgentOnDocker,
    KubernetesLocal,
    AgentOnKubernetes,
    EdgeAgentOnKubernetes,
}

impl EndpointType {
    /// Whether the environment is reached through an edge agent.
    #[must_use]
    pub const fn is_edge(self) -> bool {
        matches!(self, Self::EdgeAgentOnDocker | Self::EdgeAgentOnKubernetes)
    }
}

/// A managed environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub id: EndpointId,
    pub name: String,
    pub group_id: EndpointGroupId,
    #[serde(rename = "type")]
    pub endpoint_type: EndpointType,
    /// Identifier the edge agent presents; `None` until the agent registers.
    #[serde(default)]
    pub edge_id: Option<String>,
    #[serde(default)]
    pub user_access_policies: UserAccessPolicies,
    #[serde(default)]
    pub team_access_policies: TeamAccessPolicies,
}

impl Endpoint {
    /// Creates an environment with empty policies.
    pub fn new(
        id: impl Into<EndpointId>,
        name: impl Into<String>,
        group_id: impl Into<EndpointGroupId>,
        endpoint_type: EndpointType,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            group_id: group_id.into(),
            endpoint_type,
            edge_id: None,
            user_access_policies: UserAccessPolicies::new(),
            team_access_policies: TeamAccessPolicies::new(),
        }
    }
}

/// A group of environments sharing access policies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointGroup {
    pub id: EndpointGroupId,
    pub name: String,
    #[serde(default)]
    pub user_access_policies: UserAccessPolicies,
    #[serde(default)]
    pub team_access_policies: TeamAccessPolicies,
}

impl EndpointGroup {
    /// Creates a group with empty policies.
    pub fn new(id: impl Into<EndpointGroupId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            user_access_policies: UserAccessPolicies::new(),
            team_access_policies: TeamAccessPolicies::new(),
        }
    }
}

/// Access policies of a registry within one environment.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RegistryAccessPolicies {
    #[serde(default)]
    pub user_access_policies: UserAccessPolicies,
    #[serde(default)]
    pub team_access_policies: TeamAccessPolicies,
}

/// A container registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registry {
    pub id: RegistryId,
    pub name: String,
    /// Policies keyed by the environment the registry is used from.
    #[serde(default)]
    pub registry_accesses: HashMap<EndpointId, RegistryAccessPolicies>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_types() {
        assert!(EndpointType::EdgeAgentOnDocker.is_edge());
        assert!(EndpointType::EdgeAgentOnKubernetes.is_edge());
        assert!(!EndpointType::AgentOnDocker.is_edge());
        assert!(!EndpointType::Azure.is_edge());
    }

    #[test]
    fn test_resource_control_builder() {
        let rc = ResourceControl::new("abc", ResourceControlType::Container)
            .with_user(7)
            .with_team(2);
        assert_eq!(rc.user_accesses, vec![UserResourceAccess { user_id: UserId(7) }]);
        assert_eq!(rc.team_accesses, vec![TeamResourceAccess { team_id: TeamId(2) }]);
        assert!(!rc.public);
    }

    #[test]
    fn test_resource_control_json_defaults() {
        let rc: ResourceControl =
            serde_json::from_str(r#"{"resource_id":"x","type":"volume"}"#).unwrap();
        assert_eq!(rc.resource_type, ResourceControlType::Volume);
        assert!(rc.user_accesses.is_empty());
        assert!(!rc.administrators_only);
    }
}
