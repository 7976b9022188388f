//! Docker agent API.

#![allow(clippy::enum_glob_use)]

use bastion_core::Authorization::{self, *};

use super::Route;

pub(crate) fn authorization(path: &str, method: &str) -> Authorization {
    let route = Route::parse(path);
    let resolved = match route.base {
        "ping" => Some(DockerAgentPing),
        "agents" if method == "GET" && route.is_collection() => Some(DockerAgentList),
        "host" if method == "GET" && route.resource == "info" => Some(DockerAgentHostInfo),
        "browse" => browse(&route, method),
        _ => None,
    };
    resolved.unwrap_or(DockerAgentUndefined)
}

// Browse routes exist both as `/browse/<op>` and `/browse/<volume>/<op>`.
fn browse(route: &Route<'_>, method: &str) -> Option<Authorization> {
    match (method, route.last_segment()) {
        ("GET", "ls") => Some(DockerAgentBrowseList),
        ("GET", "get") => Some(DockerAgentBrowseGet),
        ("DELETE", "delete" | "remove") => Some(DockerAgentBrowseDelete),
        ("POST", "put") => Some(DockerAgentBrowsePut),
        ("PUT", "rename") => Some(DockerAgentBrowseRename),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_routes() {
        assert_eq!(authorization("/ping", "GET"), DockerAgentPing);
        assert_eq!(authorization("/agents", "GET"), DockerAgentList);
        assert_eq!(authorization("/host/info", "GET"), DockerAgentHostInfo);
    }

    #[test]
    fn test_browse_routes() {
        assert_eq!(authorization("/browse/ls", "GET"), DockerAgentBrowseList);
        assert_eq!(authorization("/browse/vol1/get", "GET"), DockerAgentBrowseGet);
        assert_eq!(authorization("/browse/vol1/delete", "DELETE"), DockerAgentBrowseDelete);
        assert_eq!(authorization("/browse/put", "POST"), DockerAgentBrowsePut);
        assert_eq!(authorization("/browse/rename", "PUT"), DockerAgentBrowseRename);
    }

    #[test]
    fn test_unknown_is_undefined() {
        assert_eq!(authorization("/browse/ls", "DELETE"), DockerAgentUndefined);
        assert_eq!(authorization("/reboot", "POST"), DockerAgentUndefined);
    }
}
