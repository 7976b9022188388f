//! Native management API, keyed by the first path segment.

#![allow(clippy::enum_glob_use)]

use bastion_core::Authorization::{self, *};

use super::{Crud, Route};

/// Action prefixes of registry routes proxied to the registry itself.
/// These are usable by non-admin roles, unlike registry CRUD.
const REGISTRY_INTERNAL_PREFIXES: [&str; 3] = ["v2/", "proxies/gitlab/", "ecr/"];

pub(crate) fn authorization(path: &str, method: &str) -> Authorization {
    let route = Route::parse(path);
    let resolved = match route.base {
        "dockerhub" => dockerhub(method),
        "endpoint_groups" => endpoint_groups(&route, method),
        "endpoints" => endpoints(&route, method),
        "extensions" => extensions(&route, method),
        "motd" if method == "GET" => Some(PortainerMOTD),
        "registries" => registries(&route, method),
        "resource_controls" => RESOURCE_CONTROLS.resolve(&route, method),
        "roles" => ROLES.resolve(&route, method),
        "schedules" => schedules(&route, method),
        "edge_update_schedules" => EDGE_UPDATE_SCHEDULES.resolve(&route, method),
        "settings" => settings(&route, method),
        "stacks" => stacks(&route, method),
        "tags" => TAGS.resolve(&route, method),
        "team_memberships" => TEAM_MEMBERSHIPS.resolve(&route, method),
        "teams" => teams(&route, method),
        "templates" => TEMPLATES.resolve(&route, method),
        "upload" if method == "POST" && route.resource == "tls" => Some(PortainerUploadTLS),
        "users" => users(&route, method),
        "websocket" => websocket(&route, method),
        "webhooks" => WEBHOOKS.resolve(&route, method),
        _ => None,
    };
    resolved.unwrap_or(PortainerUndefined)
}

const RESOURCE_CONTROLS: Crud = Crud {
    list: None,
    inspect: None,
    create: Some(PortainerResourceControlCreate),
    update: Some(PortainerResourceControlUpdate),
    delete: Some(PortainerResourceControlDelete),
};

const ROLES: Crud = Crud {
    list: Some(PortainerRoleList),
    inspect: Some(PortainerRoleInspect),
    create: Some(PortainerRoleCreate),
    update: Some(PortainerRoleUpdate),
    delete: Some(PortainerRoleDelete),
};

const EDGE_UPDATE_SCHEDULES: Crud = Crud {
    list: Some(PortainerEdgeUpdateScheduleList),
    inspect: Some(PortainerEdgeUpdateScheduleInspect),
    create: Some(PortainerEdgeUpdateScheduleCreate),
    update: Some(PortainerEdgeUpdateScheduleUpdate),
    delete: Some(PortainerEdgeUpdateScheduleDelete),
};

const TAGS: Crud = Crud {
    list: Some(PortainerTagList),
    inspect: None,
    create: Some(PortainerTagCreate),
    update: None,
    delete: Some(PortainerTagDelete),
};

const TEAM_MEMBERSHIPS: Crud = Crud {
    list: Some(PortainerTeamMembershipList),
    inspect: None,
    create: Some(PortainerTeamMembershipCreate),
    update: Some(PortainerTeamMembershipUpdate),
    delete: Some(PortainerTeamMembershipDelete),
};

const TEMPLATES: Crud = Crud {
    list: Some(PortainerTemplateList),
    inspect: Some(PortainerTemplateInspect),
    create: Some(PortainerTemplateCreate),
    update: Some(PortainerTemplateUpdate),
    delete: Some(PortainerTemplateDelete),
};

const WEBHOOKS: Crud = Crud {
    list: Some(PortainerWebhookList),
    inspect: None,
    create: Some(PortainerWebhookCreate),
    update: None,
    delete: Some(PortainerWebhookDelete),
};

fn dockerhub(method: &str) -> Option<Authorization> {
    match method {
        "GET" => Some(PortainerDockerHubInspect),
        "PUT" => Some(PortainerDockerHubUpdate),
        _ => None,
    }
}

fn endpoint_groups(route: &Route<'_>, method: &str) -> Option<Authorization> {
    const GROUPS: Crud = Crud {
        list: Some(PortainerEndpointGroupList),
        inspect: Some(PortainerEndpointGroupInspect),
        create: Some(PortainerEndpointGroupCreate),
        update: Some(PortainerEndpointGroupUpdate),
        delete: Some(PortainerEndpointGroupDelete),
    };

    match (method, route.action) {
        ("PUT", "access") => Some(PortainerEndpointGroupAccess),
        ("PUT" | "DELETE", action) if action.starts_with("endpoints/") => {
            Some(PortainerEndpointGroupUpdate)
        }
        _ => GROUPS.resolve(route, method),
    }
}

fn endpoints(route: &Route<'_>, method: &str) -> Option<Authorization> {
    const ENDPOINTS: Crud = Crud {
        list: Some(PortainerEndpointList),
        inspect: Some(PortainerEndpointInspect),
        create: Some(PortainerEndpointCreate),
        update: Some(PortainerEndpointUpdate),
        delete: Some(PortainerEndpointDelete),
    };

    if let Some(rest) = route.action.strip_prefix("dockerhub") {
        return dockerhub(method).filter(|_| rest.is_empty() || rest.starts_with('/'));
    }
    if let Some(rest) = route.action.strip_prefix("registries/") {
        return registries(&Route::parse(&format!("/registries/{rest}")), method);
    }

    match (method, route.resource, route.action) {
        ("POST", "snapshot", "") => Some(PortainerEndpointSnapshots),
        ("POST", _, "snapshot") => Some(PortainerEndpointSnapshot),
        ("POST", _, "job") => Some(PortainerEndpointJob),
        ("POST", _, "extensions") => Some(PortainerEndpointExtensionAdd),
        ("DELETE", _, action) if action.starts_with("extensions/") => {
            Some(PortainerEndpointExtensionRemove)
        }
        ("PUT", _, "access") => Some(PortainerEndpointUpdateAccess),
        ("PUT", _, "settings") => Some(PortainerEndpointUpdateSettings),
        _ => ENDPOINTS.resolve(route, method),
    }
}

fn extensions(route: &Route<'_>, method: &str) -> Option<Authorization> {
    const EXTENSIONS: Crud = Crud {
        list: Some(PortainerExtensionList),
        inspect: Some(PortainerExtensionInspect),
        create: Some(PortainerExtensionCreate),
        update: None,
        delete: Some(PortainerExtensionDelete),
    };

    if method == "POST" && route.action == "update" {
        return Some(PortainerExtensionUpdate);
    }
    EXTENSIONS.resolve(route, method)
}

fn registries(route: &Route<'_>, method: &str) -> Option<Authorization> {
    const REGISTRIES: Crud = Crud {
        list: Some(PortainerRegistryList),
        inspect: Some(PortainerRegistryInspect),
        create: Some(PortainerRegistryCreate),
        update: Some(PortainerRegistryUpdate),
        delete: Some(PortainerRegistryDelete),
    };

    if REGISTRY_INTERNAL_PREFIXES
        .iter()
        .any(|prefix| route.action.starts_with(prefix))
    {
        return match method {
            "GET" | "HEAD" => Some(PortainerRegistryInternalInspect),
            "DELETE" => Some(PortainerRegistryInternalDelete),
            "POST" | "PUT" | "PATCH" => Some(PortainerRegistryInternalUpdate),
            _ => None,
        };
    }

    match (method, route.action) {
        ("POST", "configure") => Some(PortainerRegistryConfigure),
        ("PUT", "access") => Some(PortainerRegistryUpdateAccess),
        _ => REGISTRIES.resolve(route, method),
    }
}

fn schedules(route: &Route<'_>, method: &str) -> Option<Authorization> {
    const SCHEDULES: Crud = Crud {
        list: Some(PortainerScheduleList),
        inspect: Some(PortainerScheduleInspect),
        create: Some(PortainerScheduleCreate),
        update: Some(PortainerScheduleUpdate),
        delete: Some(PortainerScheduleDelete),
    };

    match (method, route.action) {
        ("GET", "file") => Some(PortainerScheduleFile),
        ("GET", "tasks") => Some(PortainerScheduleTasks),
        _ => SCHEDULES.resolve(route, method),
    }
}

fn settings(route: &Route<'_>, method: &str) -> Option<Authorization> {
    match (method, route.resource, route.action) {
        ("GET", "", "") => Some(PortainerSettingsInspect),
        ("PUT", "", "") => Some(PortainerSettingsUpdate),
        ("PUT", "authentication", "checkLDAP") => Some(PortainerSettingsLDAPCheck),
        _ => None,
    }
}

fn stacks(route: &Route<'_>, method: &str) -> Option<Authorization> {
    const STACKS: Crud = Crud {
        list: Some(PortainerStackList),
        inspect: Some(PortainerStackInspect),
        create: Some(PortainerStackCreate),
        update: Some(PortainerStackUpdate),
        delete: Some(PortainerStackDelete),
    };

    match (method, route.action) {
        ("GET", "file") => Some(PortainerStackFile),
        ("POST", "migrate") => Some(PortainerStackMigrate),
        _ => STACKS.resolve(route, method),
    }
}

fn teams(route: &Route<'_>, method: &str) -> Option<Authorization> {
    const TEAMS: Crud = Crud {
        list: Some(PortainerTeamList),
        inspect: Some(PortainerTeamInspect),
        create: Some(PortainerTeamCreate),
        update: Some(PortainerTeamUpdate),
        delete: Some(PortainerTeamDelete),
    };

    if method == "GET" && route.action == "memberships" {
        return Some(PortainerTeamMemberships);
    }
    TEAMS.resolve(route, method)
}

fn users(route: &Route<'_>, method: &str) -> Option<Authorization> {
    const USERS: Crud = Crud {
        list: Some(PortainerUserList),
        inspect: Some(PortainerUserInspect),
        create: Some(PortainerUserCreate),
        update: Some(PortainerUserUpdate),
        delete: Some(PortainerUserDelete),
    };

    match (method, route.action) {
        ("GET", "memberships") => Some(PortainerUserMemberships),
        ("GET", "tokens") => Some(PortainerUserListToken),
        ("POST", "tokens") => Some(PortainerUserCreateToken),
        ("PUT", "passwd") => Some(PortainerUserUpdatePassword),
        ("DELETE", action) if action.starts_with("tokens/") => Some(PortainerUserRevokeToken),
        _ => USERS.resolve(route, method),
    }
}

fn websocket(route: &Route<'_>, method: &str) -> Option<Authorization> {
    match (method, route.resource) {
        ("GET", "exec") => Some(PortainerWebsocketExec),
        ("GET", "attach") => Some(PortainerWebsocketAttach),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_and_item_rules() {
        assert_eq!(authorization("/endpoints", "GET"), PortainerEndpointList);
        assert_eq!(authorization("/endpoints/5", "GET"), PortainerEndpointInspect);
        assert_eq!(authorization("/endpoints", "POST"), PortainerEndpointCreate);
        assert_eq!(authorization("/endpoints/5", "PUT"), PortainerEndpointUpdate);
        assert_eq!(authorization("/endpoints/5", "DELETE"), PortainerEndpointDelete);
        assert_eq!(authorization("/roles", "GET"), PortainerRoleList);
        assert_eq!(authorization("/tags/2", "DELETE"), PortainerTagDelete);
    }

    #[test]
    fn test_endpoint_actions() {
        assert_eq!(authorization("/endpoints/snapshot", "POST"), PortainerEndpointSnapshots);
        assert_eq!(authorization("/endpoints/5/snapshot", "POST"), PortainerEndpointSnapshot);
        assert_eq!(authorization("/endpoints/5/job", "POST"), PortainerEndpointJob);
        assert_eq!(authorization("/endpoints/5/access", "PUT"), PortainerEndpointUpdateAccess);
        assert_eq!(
            authorization("/endpoints/5/extensions/1", "DELETE"),
            PortainerEndpointExtensionRemove
        );
    }

    #[test]
    fn test_endpoint_recursion() {
        assert_eq!(authorization("/endpoints/5/dockerhub", "GET"), PortainerDockerHubInspect);
        assert_eq!(authorization("/endpoints/5/dockerhub/2", "GET"), PortainerDockerHubInspect);
        assert_eq!(authorization("/endpoints/5/registries/3", "PUT"), PortainerRegistryUpdate);
        assert_eq!(
            authorization("/endpoints/5/registries/3/v2/library/nginx/manifests/latest", "GET"),
            PortainerRegistryInternalInspect
        );
    }

    #[test]
    fn test_registry_internal_operations() {
        assert_eq!(
            authorization("/registries/1/v2/myrepo/tags/list", "GET"),
            PortainerRegistryInternalInspect
        );
        assert_eq!(
            authorization("/registries/1/v2/myrepo/manifests/sha256:abc", "DELETE"),
            PortainerRegistryInternalDelete
        );
        assert_eq!(
            authorization("/registries/1/proxies/gitlab/api/v4/projects", "POST"),
            PortainerRegistryInternalUpdate
        );
        assert_eq!(
            authorization("/registries/1/ecr/repositories/app", "DELETE"),
            PortainerRegistryInternalDelete
        );
        assert_eq!(authorization("/registries/1", "DELETE"), PortainerRegistryDelete);
        assert_eq!(authorization("/registries/1/configure", "POST"), PortainerRegistryConfigure);
    }

    #[test]
    fn test_user_routes() {
        assert_eq!(authorization("/users/4/memberships", "GET"), PortainerUserMemberships);
        assert_eq!(authorization("/users/4/passwd", "PUT"), PortainerUserUpdatePassword);
        assert_eq!(authorization("/users/4/tokens", "POST"), PortainerUserCreateToken);
        assert_eq!(authorization("/users/4/tokens/9", "DELETE"), PortainerUserRevokeToken);
    }

    #[test]
    fn test_settings_and_misc() {
        assert_eq!(authorization("/settings", "GET"), PortainerSettingsInspect);
        assert_eq!(authorization("/settings", "PUT"), PortainerSettingsUpdate);
        assert_eq!(authorization("/settings/public", "GET"), PortainerUndefined);
        assert_eq!(authorization("/websocket/exec", "GET"), PortainerWebsocketExec);
        assert_eq!(authorization("/upload/tls/ca", "POST"), PortainerUploadTLS);
        assert_eq!(authorization("/motd", "GET"), PortainerMOTD);
    }

    #[test]
    fn test_unknown_is_undefined() {
        assert_eq!(authorization("/nonexistent", "GET"), PortainerUndefined);
        assert_eq!(authorization("/endpoints", "PATCH"), PortainerUndefined);
        assert_eq!(authorization("/tags/1", "PUT"), PortainerUndefined);
    }
}
