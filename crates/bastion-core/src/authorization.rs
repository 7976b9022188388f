//! Fine-grained permission tokens.
//!
//! Every inbound API call is classified into exactly one [`Authorization`].
//! Non-admin identities hold a finite set of these tokens and a call
//! proceeds only when the classified token is a member of that set.
//!
//! Each proxied domain has an `*Undefined` sentinel returned for routes the
//! classifier does not recognise. Sentinels are never granted to anyone,
//! so unmapped routes are denied to non-admins.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// A set of granted authorizations.
pub type Authorizations = HashSet<Authorization>;

/// Canonical permission token.
///
/// The string form (`Display`, `FromStr`, serde) is the variant name,
/// e.g. `DockerContainerList`, and is stable across releases.
#[allow(missing_docs)]
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
pub enum Authorization {
    // Docker: containers
    DockerContainerArchiveInfo,
    DockerContainerList,
    DockerContainerExport,
    DockerContainerChanges,
    DockerContainerInspect,
    DockerContainerTop,
    DockerContainerLogs,
    DockerContainerStats,
    DockerContainerAttachWebsocket,
    DockerContainerArchive,
    DockerContainerCreate,
    DockerContainerPrune,
    DockerContainerKill,
    DockerContainerPause,
    DockerContainerUnpause,
    DockerContainerRestart,
    DockerContainerStart,
    DockerContainerStop,
    DockerContainerWait,
    DockerContainerResize,
    DockerContainerAttach,
    DockerContainerExec,
    DockerContainerRename,
    DockerContainerUpdate,
    DockerContainerPutContainerArchive,
    DockerContainerDelete,

    // Docker: images
    DockerImageList,
    DockerImageSearch,
    DockerImageGetAll,
    DockerImageGet,
    DockerImageHistory,
    DockerImageInspect,
    DockerImageLoad,
    DockerImageCreate,
    DockerImagePrune,
    DockerImagePush,
    DockerImageTag,
    DockerImageDelete,
    DockerImageCommit,
    DockerImageBuild,

    // Docker: networks
    DockerNetworkList,
    DockerNetworkInspect,
    DockerNetworkCreate,
    DockerNetworkConnect,
    DockerNetworkDisconnect,
    DockerNetworkPrune,
    DockerNetworkDelete,

    // Docker: volumes
    DockerVolumeList,
    DockerVolumeInspect,
    DockerVolumeCreate,
    DockerVolumePrune,
    DockerVolumeDelete,

    // Docker: exec
    DockerExecInspect,
    DockerExecStart,
    DockerExecResize,

    // Docker: swarm
    DockerSwarmInspect,
    DockerSwarmUnlockKey,
    DockerSwarmInit,
    DockerSwarmJoin,
    DockerSwarmLeave,
    DockerSwarmUpdate,
    DockerSwarmUnlock,

    // Docker: nodes
    DockerNodeList,
    DockerNodeInspect,
    DockerNodeUpdate,
    DockerNodeDelete,

    // Docker: services
    DockerServiceList,
    DockerServiceInspect,
    DockerServiceLogs,
    DockerServiceCreate,
    DockerServiceUpdate,
    DockerServiceDelete,

    // Docker: secrets
    DockerSecretList,
    DockerSecretInspect,
    DockerSecretCreate,
    DockerSecretUpdate,
    DockerSecretDelete,

    // Docker: configs
    DockerConfigList,
    DockerConfigInspect,
    DockerConfigCreate,
    DockerConfigUpdate,
    DockerConfigDelete,

    // Docker: tasks
    DockerTaskList,
    DockerTaskInspect,
    DockerTaskLogs,

    // Docker: plugins
    DockerPluginList,
    DockerPluginPrivileges,
    DockerPluginInspect,
    DockerPluginPull,
    DockerPluginCreate,
    DockerPluginEnable,
    DockerPluginDisable,
    DockerPluginPush,
    DockerPluginUpgrade,
    DockerPluginSet,
    DockerPluginDelete,

    // Docker: daemon level
    DockerSessionStart,
    DockerDistributionInspect,
    DockerBuildPrune,
    DockerBuildCancel,
    DockerPing,
    DockerInfo,
    DockerEvents,
    DockerSystem,
    DockerVersion,
    DockerUndefined,

    // Docker agent
    DockerAgentPing,
    DockerAgentList,
    DockerAgentHostInfo,
    DockerAgentBrowseDelete,
    DockerAgentBrowseGet,
    DockerAgentBrowseList,
    DockerAgentBrowsePut,
    DockerAgentBrowseRename,
    DockerAgentUndefined,

    // Native API: dockerhub
    PortainerDockerHubInspect,
    PortainerDockerHubUpdate,

    // Native API: endpoint groups
    PortainerEndpointGroupCreate,
    PortainerEndpointGroupList,
    PortainerEndpointGroupDelete,
    PortainerEndpointGroupInspect,
    PortainerEndpointGroupUpdate,
    PortainerEndpointGroupAccess,

    // Native API: endpoints
    PortainerEndpointList,
    PortainerEndpointInspect,
    PortainerEndpointCreate,
    PortainerEndpointJob,
    PortainerEndpointSnapshots,
    PortainerEndpointSnapshot,
    PortainerEndpointUpdate,
    PortainerEndpointUpdateAccess,
    PortainerEndpointUpdateSettings,
    PortainerEndpointDelete,
    PortainerEndpointExtensionAdd,
    PortainerEndpointExtensionRemove,

    // Native API: extensions
    PortainerExtensionList,
    PortainerExtensionInspect,
    PortainerExtensionCreate,
    PortainerExtensionUpdate,
    PortainerExtensionDelete,

    // Native API: motd and misc
    PortainerMOTD,

    // Native API: registries
    PortainerRegistryList,
    PortainerRegistryInspect,
    PortainerRegistryCreate,
    PortainerRegistryConfigure,
    PortainerRegistryUpdate,
    PortainerRegistryUpdateAccess,
    PortainerRegistryDelete,
    PortainerRegistryInternalUpdate,
    PortainerRegistryInternalDelete,
    PortainerRegistryInternalInspect,

    // Native API: resource controls
    PortainerResourceControlCreate,
    PortainerResourceControlUpdate,
    PortainerResourceControlDelete,

    // Native API: roles
    PortainerRoleList,
    PortainerRoleInspect,
    PortainerRoleCreate,
    PortainerRoleUpdate,
    PortainerRoleDelete,

    // Native API: schedules (held by no default role)
    PortainerScheduleList,
    PortainerScheduleInspect,
    PortainerScheduleFile,
    PortainerScheduleTasks,
    PortainerScheduleCreate,
    PortainerScheduleUpdate,
    PortainerScheduleDelete,

    // Native API: edge update schedules
    PortainerEdgeUpdateScheduleList,
    PortainerEdgeUpdateScheduleInspect,
    PortainerEdgeUpdateScheduleCreate,
    PortainerEdgeUpdateScheduleUpdate,
    PortainerEdgeUpdateScheduleDelete,

    // Native API: settings (inspect and update held by no default role)
    PortainerSettingsInspect,
    PortainerSettingsUpdate,
    PortainerSettingsLDAPCheck,

    // Native API: stacks
    PortainerStackList,
    PortainerStackInspect,
    PortainerStackFile,
    PortainerStackCreate,
    PortainerStackMigrate,
    PortainerStackUpdate,
    PortainerStackDelete,

    // Native API: tags
    PortainerTagList,
    PortainerTagCreate,
    PortainerTagDelete,

    // Native API: team memberships
    PortainerTeamMembershipList,
    PortainerTeamMembershipCreate,
    PortainerTeamMembershipUpdate,
    PortainerTeamMembershipDelete,

    // Native API: teams
    PortainerTeamList,
    PortainerTeamInspect,
    PortainerTeamMemberships,
    PortainerTeamCreate,
    PortainerTeamUpdate,
    PortainerTeamDelete,

    // Native API: templates
    PortainerTemplateList,
    PortainerTemplateInspect,
    PortainerTemplateCreate,
    PortainerTemplateUpdate,
    PortainerTemplateDelete,

    // Native API: uploads
    PortainerUploadTLS,

    // Native API: users
    PortainerUserList,
    PortainerUserInspect,
    PortainerUserMemberships,
    PortainerUserCreate,
    PortainerUserUpdate,
    PortainerUserUpdatePassword,
    PortainerUserDelete,
    PortainerUserListToken,
    PortainerUserCreateToken,
    PortainerUserRevokeToken,

    // Native API: websocket
    PortainerWebsocketExec,
    PortainerWebsocketAttach,

    // Native API: webhooks
    PortainerWebhookList,
    PortainerWebhookCreate,
    PortainerWebhookDelete,

    PortainerUndefined,

    // Endpoint-wide grant used by registry access checks
    EndpointResourcesAccess,

    // Kubernetes
    K8sResourcePoolsR,
    K8sResourcePoolsW,
    K8sResourcePoolDetailsR,
    K8sResourcePoolDetailsW,
    K8sIngressControllersR,
    K8sIngressControllersW,
    K8sClusterR,
    K8sClusterNodeR,
    K8sUndefined,

    // Azure container instances
    AzureSubscriptionsList,
    AzureSubscriptionGet,
    AzureProviderGet,
    AzureResourceGroupsList,
    AzureResourceGroupGet,
    AzureContainerGroupsList,
    AzureContainerGroupGet,
    AzureContainerGroupCreate,
    AzureContainerGroupDelete,
    AzureUndefined,
}

impl Authorization {
    /// Returns `true` for the per-domain "no specific permission" sentinels.
    #[must_use]
    pub const fn is_undefined(self) -> bool {
        matches!(
            self,
            Self::DockerUndefined
                | Self::DockerAgentUndefined
                | Self::PortainerUndefined
                | Self::K8sUndefined
                | Self::AzureUndefined
        )
    }

    /// Stable string name of the token.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}
