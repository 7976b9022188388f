//! Default authorization sets of the built-in roles.
//!
//! Environment roles grant proxied (Docker, agent, Kubernetes, Azure)
//! operations inside one environment. [`portainer_user`] is the native API
//! set every non-admin user holds.
//!
//! Settings inspect/update and schedule operations appear in no set, so
//! they stay administrator-only.

#![allow(clippy::enum_glob_use)]

use bastion_core::Authorization::{self, *};
use bastion_core::Authorizations;
use strum::IntoEnumIterator;

/// Built-in environment roles, from most to least privileged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnvironmentRole {
    /// Full control over an environment.
    EndpointAdministrator,
    /// Read-only view of every resource in an environment.
    Helpdesk,
    /// Day-to-day operation of owned resources.
    StandardUser,
    /// Read-only view of owned resources.
    ReadonlyUser,
}

impl EnvironmentRole {
    /// The role's authorization set.
    pub fn authorizations(self) -> Authorizations {
        match self {
            Self::EndpointAdministrator => endpoint_administrator(),
            Self::Helpdesk => helpdesk(),
            Self::StandardUser => standard_user(),
            Self::ReadonlyUser => readonly_user(),
        }
    }
}

const READ_ONLY: &[Authorization] = &[
    DockerContainerArchiveInfo,
    DockerContainerList,
    DockerContainerChanges,
    DockerContainerInspect,
    DockerContainerTop,
    DockerContainerLogs,
    DockerContainerStats,
    DockerImageList,
    DockerImageSearch,
    DockerImageGetAll,
    DockerImageGet,
    DockerImageHistory,
    DockerImageInspect,
    DockerNetworkList,
    DockerNetworkInspect,
    DockerVolumeList,
    DockerVolumeInspect,
    DockerSwarmInspect,
    DockerNodeList,
    DockerNodeInspect,
    DockerServiceList,
    DockerServiceInspect,
    DockerServiceLogs,
    DockerSecretList,
    DockerSecretInspect,
    DockerConfigList,
    DockerConfigInspect,
    DockerTaskList,
    DockerTaskInspect,
    DockerTaskLogs,
    DockerPluginList,
    DockerDistributionInspect,
    DockerPing,
    DockerInfo,
    DockerVersion,
    DockerSystem,
    DockerAgentPing,
    DockerAgentList,
    DockerAgentHostInfo,
    DockerAgentBrowseGet,
    DockerAgentBrowseList,
    PortainerStackList,
    PortainerStackInspect,
    PortainerStackFile,
    PortainerWebhookList,
    K8sResourcePoolsR,
    K8sResourcePoolDetailsR,
    K8sIngressControllersR,
    K8sClusterR,
    K8sClusterNodeR,
    AzureSubscriptionsList,
    AzureSubscriptionGet,
    AzureProviderGet,
    AzureResourceGroupsList,
    AzureResourceGroupGet,
    AzureContainerGroupsList,
    AzureContainerGroupGet,
    PortainerRegistryInternalInspect,
];

/// Environment-level operations reserved to environment administrators.
const CLUSTER_MANAGEMENT: &[Authorization] = &[
    DockerSwarmUnlockKey,
    DockerSwarmInit,
    DockerSwarmJoin,
    DockerSwarmLeave,
    DockerSwarmUpdate,
    DockerSwarmUnlock,
    DockerNodeUpdate,
    DockerNodeDelete,
    DockerPluginPrivileges,
    DockerPluginPull,
    DockerPluginCreate,
    DockerPluginEnable,
    DockerPluginDisable,
    DockerPluginPush,
    DockerPluginUpgrade,
    DockerPluginSet,
    DockerPluginDelete,
    K8sResourcePoolsW,
    K8sResourcePoolDetailsW,
    K8sIngressControllersW,
    EndpointResourcesAccess,
];

/// Native API operations usable inside an environment.
const ENVIRONMENT_NATIVE: &[Authorization] = &[
    PortainerResourceControlCreate,
    PortainerResourceControlUpdate,
    PortainerStackList,
    PortainerStackInspect,
    PortainerStackFile,
    PortainerStackCreate,
    PortainerStackMigrate,
    PortainerStackUpdate,
    PortainerStackDelete,
    PortainerWebsocketExec,
    PortainerWebsocketAttach,
    PortainerWebhookList,
    PortainerWebhookCreate,
    PortainerWebhookDelete,
    PortainerRegistryInternalInspect,
    PortainerRegistryInternalUpdate,
    PortainerRegistryInternalDelete,
];

fn is_proxied(authorization: Authorization) -> bool {
    let name = authorization.as_str();
    name.starts_with("Docker") || name.starts_with("K8s") || name.starts_with("Azure")
}

/// Every proxied operation plus environment-level native operations.
pub fn endpoint_administrator() -> Authorizations {
    Authorization::iter()
        .filter(|a| is_proxied(*a) && !a.is_undefined())
        .chain(ENVIRONMENT_NATIVE.iter().copied())
        .chain([EndpointResourcesAccess])
        .collect()
}

/// Read-only operations across every resource of an environment.
pub fn helpdesk() -> Authorizations {
    READ_ONLY
        .iter()
        .copied()
        .chain([EndpointResourcesAccess])
        .collect()
}

/// Environment administrator minus cluster management.
pub fn standard_user() -> Authorizations {
    let mut set = endpoint_administrator();
    for authorization in CLUSTER_MANAGEMENT {
        set.remove(authorization);
    }
    set
}

/// Read-only operations on resources the user can see.
pub fn readonly_user() -> Authorizations {
    READ_ONLY.iter().copied().collect()
}

/// Native API operations every non-admin user holds.
pub fn portainer_user() -> Authorizations {
    [
        PortainerDockerHubInspect,
        PortainerEndpointGroupList,
        PortainerEndpointList,
        PortainerEndpointInspect,
        PortainerEndpointExtensionAdd,
        PortainerEndpointExtensionRemove,
        PortainerExtensionList,
        PortainerMOTD,
        PortainerRegistryList,
        PortainerRegistryInspect,
        PortainerRegistryInternalInspect,
        PortainerTagList,
        PortainerTeamList,
        PortainerTemplateList,
        PortainerTemplateInspect,
        PortainerUserList,
        PortainerUserInspect,
        PortainerUserMemberships,
        PortainerUserListToken,
        PortainerUserCreateToken,
        PortainerUserRevokeToken,
        PortainerUserUpdatePassword,
        PortainerWebsocketExec,
        PortainerWebsocketAttach,
    ]
    .into_iter()
    .collect()
}
