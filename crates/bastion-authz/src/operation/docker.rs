//! Docker Engine API proxy.

#![allow(clippy::enum_glob_use)]

use std::sync::LazyLock;

use bastion_core::Authorization::{self, *};
use regex::Regex;

use super::Route;

static VERSION_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/v\d+(?:\.\d+)?(?P<rest>/.*)?$").expect("valid regex"));

pub(crate) fn authorization(path: &str, method: &str) -> Authorization {
    let path = VERSION_PREFIX
        .captures(path)
        .map_or(path, |caps| caps.name("rest").map_or("/", |m| m.as_str()));
    let route = Route::parse(path);

    let resolved = match route.base {
        "_ping" | "ping" => ping(method),
        "containers" => containers(&route, method),
        "images" => images(&route, method),
        "networks" => networks(&route, method),
        "volumes" => volumes(&route, method),
        "exec" => exec(&route, method),
        "swarm" => swarm(&route, method),
        "nodes" => nodes(&route, method),
        "services" => services(&route, method),
        "secrets" => secrets(&route, method),
        "configs" => configs(&route, method),
        "tasks" => tasks(&route, method),
        "plugins" => plugins(&route, method),
        "session" if method == "POST" => Some(DockerSessionStart),
        "distribution" if method == "GET" && route.last_segment() == "json" => {
            Some(DockerDistributionInspect)
        }
        "commit" if method == "POST" => Some(DockerImageCommit),
        "build" => build(&route, method),
        "info" if method == "GET" => Some(DockerInfo),
        "events" if method == "GET" => Some(DockerEvents),
        "system" if method == "GET" && route.resource == "df" => Some(DockerSystem),
        "version" if method == "GET" => Some(DockerVersion),
        _ => None,
    };
    resolved.unwrap_or(DockerUndefined)
}

fn ping(method: &str) -> Option<Authorization> {
    matches!(method, "GET" | "HEAD").then_some(DockerPing)
}

fn containers(route: &Route<'_>, method: &str) -> Option<Authorization> {
    match method {
        "GET" => {
            if route.resource == "json" && route.action.is_empty() {
                return Some(DockerContainerList);
            }
            match route.action {
                "json" => Some(DockerContainerInspect),
                "archive" => Some(DockerContainerArchive),
                "export" => Some(DockerContainerExport),
                "changes" => Some(DockerContainerChanges),
                "top" => Some(DockerContainerTop),
                "logs" => Some(DockerContainerLogs),
                "stats" => Some(DockerContainerStats),
                "attach/ws" => Some(DockerContainerAttachWebsocket),
                _ => None,
            }
        }
        "HEAD" => (route.action == "archive").then_some(DockerContainerArchiveInfo),
        "POST" => {
            if route.is_item() {
                return match route.resource {
                    "create" => Some(DockerContainerCreate),
                    "prune" => Some(DockerContainerPrune),
                    _ => None,
                };
            }
            match route.action {
                "kill" => Some(DockerContainerKill),
                "pause" => Some(DockerContainerPause),
                "unpause" => Some(DockerContainerUnpause),
                "restart" => Some(DockerContainerRestart),
                "start" => Some(DockerContainerStart),
                "stop" => Some(DockerContainerStop),
                "wait" => Some(DockerContainerWait),
                "resize" => Some(DockerContainerResize),
                "attach" => Some(DockerContainerAttach),
                "exec" => Some(DockerContainerExec),
                "rename" => Some(DockerContainerRename),
                "update" => Some(DockerContainerUpdate),
                _ => None,
            }
        }
        "PUT" => (route.action == "archive").then_some(DockerContainerPutContainerArchive),
        "DELETE" => route.is_item().then_some(DockerContainerDelete),
        _ => None,
    }
}

// Image names may contain slashes, so actions are read from the last segment.
fn images(route: &Route<'_>, method: &str) -> Option<Authorization> {
    match method {
        "GET" => {
            if route.is_item() {
                match route.resource {
                    "json" => return Some(DockerImageList),
                    "search" => return Some(DockerImageSearch),
                    "get" => return Some(DockerImageGetAll),
                    _ => {}
                }
            }
            match route.last_segment() {
                "get" => Some(DockerImageGet),
                "history" => Some(DockerImageHistory),
                "json" => Some(DockerImageInspect),
                _ => None,
            }
        }
        "POST" => {
            if route.is_item() {
                match route.resource {
                    "load" => return Some(DockerImageLoad),
                    "create" => return Some(DockerImageCreate),
                    "prune" => return Some(DockerImagePrune),
                    _ => {}
                }
            }
            match route.last_segment() {
                "push" => Some(DockerImagePush),
                "tag" => Some(DockerImageTag),
                _ => None,
            }
        }
        "DELETE" => (!route.resource.is_empty()).then_some(DockerImageDelete),
        _ => None,
    }
}

fn networks(route: &Route<'_>, method: &str) -> Option<Authorization> {
    match method {
        "GET" if route.is_collection() => Some(DockerNetworkList),
        "GET" if route.is_item() => Some(DockerNetworkInspect),
        "POST" if route.is_item() => match route.resource {
            "create" => Some(DockerNetworkCreate),
            "prune" => Some(DockerNetworkPrune),
            _ => None,
        },
        "POST" => match route.action {
            "connect" => Some(DockerNetworkConnect),
            "disconnect" => Some(DockerNetworkDisconnect),
            _ => None,
        },
        "DELETE" if route.is_item() => Some(DockerNetworkDelete),
        _ => None,
    }
}

fn volumes(route: &Route<'_>, method: &str) -> Option<Authorization> {
    match method {
        "GET" if route.is_collection() => Some(DockerVolumeList),
        "GET" if route.is_item() => Some(DockerVolumeInspect),
        "POST" if route.is_item() => match route.resource {
            "create" => Some(DockerVolumeCreate),
            "prune" => Some(DockerVolumePrune),
            _ => None,
        },
        "DELETE" if route.is_item() => Some(DockerVolumeDelete),
        _ => None,
    }
}

fn exec(route: &Route<'_>, method: &str) -> Option<Authorization> {
    match (method, route.action) {
        ("GET", "json") => Some(DockerExecInspect),
        ("POST", "start") => Some(DockerExecStart),
        ("POST", "resize") => Some(DockerExecResize),
        _ => None,
    }
}

fn swarm(route: &Route<'_>, method: &str) -> Option<Authorization> {
    if !route.action.is_empty() {
        return None;
    }
    match (method, route.resource) {
        ("GET", "") => Some(DockerSwarmInspect),
        ("GET", "unlockkey") => Some(DockerSwarmUnlockKey),
        ("POST", "init") => Some(DockerSwarmInit),
        ("POST", "join") => Some(DockerSwarmJoin),
        ("POST", "leave") => Some(DockerSwarmLeave),
        ("POST", "update") => Some(DockerSwarmUpdate),
        ("POST", "unlock") => Some(DockerSwarmUnlock),
        _ => None,
    }
}

fn nodes(route: &Route<'_>, method: &str) -> Option<Authorization> {
    match method {
        "GET" if route.is_collection() => Some(DockerNodeList),
        "GET" if route.is_item() => Some(DockerNodeInspect),
        "POST" if route.action == "update" => Some(DockerNodeUpdate),
        "DELETE" if route.is_item() => Some(DockerNodeDelete),
        _ => None,
    }
}

fn services(route: &Route<'_>, method: &str) -> Option<Authorization> {
    match method {
        "GET" if route.is_collection() => Some(DockerServiceList),
        "GET" if route.is_item() => Some(DockerServiceInspect),
        "GET" if route.action == "logs" => Some(DockerServiceLogs),
        "POST" if route.is_item() && route.resource == "create" => Some(DockerServiceCreate),
        "POST" if route.action == "update" => Some(DockerServiceUpdate),
        "DELETE" if route.is_item() => Some(DockerServiceDelete),
        _ => None,
    }
}

fn secrets(route: &Route<'_>, method: &str) -> Option<Authorization> {
    match method {
        "GET" if route.is_collection() => Some(DockerSecretList),
        "GET" if route.is_item() => Some(DockerSecretInspect),
        "POST" if route.is_item() && route.resource == "create" => Some(DockerSecretCreate),
        "POST" if route.action == "update" => Some(DockerSecretUpdate),
        "DELETE" if route.is_item() => Some(DockerSecretDelete),
        _ => None,
    }
}

fn configs(route: &Route<'_>, method: &str) -> Option<Authorization> {
    match method {
        "GET" if route.is_collection() => Some(DockerConfigList),
        "GET" if route.is_item() => Some(DockerConfigInspect),
        "POST" if route.is_item() && route.resource == "create" => Some(DockerConfigCreate),
        "POST" if route.action == "update" => Some(DockerConfigUpdate),
        "DELETE" if route.is_item() => Some(DockerConfigDelete),
        _ => None,
    }
}

fn tasks(route: &Route<'_>, method: &str) -> Option<Authorization> {
    match method {
        "GET" if route.is_collection() => Some(DockerTaskList),
        "GET" if route.is_item() => Some(DockerTaskInspect),
        "GET" if route.action == "logs" => Some(DockerTaskLogs),
        _ => None,
    }
}

// Plugin names may contain slashes and tags (`vieux/sshfs:latest`).
fn plugins(route: &Route<'_>, method: &str) -> Option<Authorization> {
    match method {
        "GET" if route.is_collection() => Some(DockerPluginList),
        "GET" if route.is_item() && route.resource == "privileges" => {
            Some(DockerPluginPrivileges)
        }
        "GET" if route.last_segment() == "json" => Some(DockerPluginInspect),
        "POST" if route.is_item() && route.resource == "pull" => Some(DockerPluginPull),
        "POST" if route.is_item() && route.resource == "create" => Some(DockerPluginCreate),
        "POST" => match route.last_segment() {
            "enable" => Some(DockerPluginEnable),
            "disable" => Some(DockerPluginDisable),
            "push" => Some(DockerPluginPush),
            "upgrade" => Some(DockerPluginUpgrade),
            "set" => Some(DockerPluginSet),
            _ => None,
        },
        "DELETE" if !route.resource.is_empty() => Some(DockerPluginDelete),
        _ => None,
    }
}

fn build(route: &Route<'_>, method: &str) -> Option<Authorization> {
    if method != "POST" {
        return None;
    }
    match route.resource {
        "" => Some(DockerImageBuild),
        "prune" => Some(DockerBuildPrune),
        "cancel" => Some(DockerBuildCancel),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_container_lifecycle_actions_are_lexical() {
        assert_eq!(authorization("/containers/abc/kill", "POST"), DockerContainerKill);
        assert_eq!(authorization("/containers/abc/pause", "POST"), DockerContainerPause);
        assert_eq!(authorization("/containers/abc/restart", "POST"), DockerContainerRestart);
        assert_eq!(authorization("/containers/xyz/restart", "POST"), DockerContainerRestart);
    }

    #[test]
    fn test_container_list_and_inspect() {
        assert_eq!(authorization("/containers/json", "GET"), DockerContainerList);
        assert_eq!(authorization("/containers/abc123/json", "GET"), DockerContainerInspect);
        assert_eq!(authorization("/containers/abc123", "DELETE"), DockerContainerDelete);
        assert_eq!(authorization("/containers/abc/archive", "HEAD"), DockerContainerArchiveInfo);
    }

    #[test]
    fn test_version_prefix_is_stripped() {
        assert_eq!(authorization("/v1.41/containers/json", "GET"), DockerContainerList);
        assert_eq!(authorization("/v1.41/_ping", "HEAD"), DockerPing);
        assert_eq!(authorization("/volumes", "GET"), DockerVolumeList);
    }

    #[test]
    fn test_images_with_slashes() {
        assert_eq!(authorization("/images/json", "GET"), DockerImageList);
        assert_eq!(authorization("/images/library/nginx/json", "GET"), DockerImageInspect);
        assert_eq!(authorization("/images/myorg/app/push", "POST"), DockerImagePush);
        assert_eq!(authorization("/images/create", "POST"), DockerImageCreate);
        assert_eq!(authorization("/images/myorg/app", "DELETE"), DockerImageDelete);
    }

    #[test]
    fn test_networks_and_volumes() {
        assert_eq!(authorization("/networks", "GET"), DockerNetworkList);
        assert_eq!(authorization("/networks/n1", "GET"), DockerNetworkInspect);
        assert_eq!(authorization("/networks/create", "POST"), DockerNetworkCreate);
        assert_eq!(authorization("/networks/n1/connect", "POST"), DockerNetworkConnect);
        assert_eq!(authorization("/volumes/prune", "POST"), DockerVolumePrune);
    }

    #[test]
    fn test_swarm_services_and_plugins() {
        assert_eq!(authorization("/swarm", "GET"), DockerSwarmInspect);
        assert_eq!(authorization("/swarm/init", "POST"), DockerSwarmInit);
        assert_eq!(authorization("/services/web/update", "POST"), DockerServiceUpdate);
        assert_eq!(authorization("/services/web/logs", "GET"), DockerServiceLogs);
        assert_eq!(authorization("/plugins/vieux/sshfs:latest/enable", "POST"), DockerPluginEnable);
    }

    #[test]
    fn test_unknown_routes_are_undefined() {
        assert_eq!(authorization("/containers/abc/teleport", "POST"), DockerUndefined);
        assert_eq!(authorization("/containers/json", "PATCH"), DockerUndefined);
        assert_eq!(authorization("/unknown", "GET"), DockerUndefined);
        assert_eq!(authorization("/", "GET"), DockerUndefined);
    }
}
