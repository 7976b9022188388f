//! Operation classification.
//!
//! [`classify`] maps an HTTP method and URL path to exactly one
//! [`Authorization`]. It is total: paths nobody has classified yet map to
//! the `*Undefined` sentinel of their domain, which no identity is ever
//! granted.
//!
//! Dispatch runs in a fixed order:
//!
//! | Pattern | Resolver |
//! |---------|----------|
//! | `/<id>/docker/<rest>` | Docker proxy |
//! | `/<id>/kubernetes/<rest>` | fixed `K8sResourcePoolsR` |
//! | `/<id>/azure/<rest>` | Azure proxy |
//! | `/kubernetes/<id>/<rest>` | native Kubernetes routes |
//! | `/<id>/agent/<rest>` | Docker agent |
//! | anything else | native API |

mod agent;
mod azure;
mod docker;
mod kubernetes;
mod native;

use std::sync::LazyLock;

use bastion_core::Authorization;
use http::Method;
use regex::Regex;

static DOCKER_RULE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/\d+/docker(?P<rest>/.*)?$").expect("valid regex"));
static KUBERNETES_PROXY_RULE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/\d+/kubernetes(?:/.*)?$").expect("valid regex"));
static AZURE_RULE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/\d+/azure(?P<rest>/.*)?$").expect("valid regex"));
static KUBERNETES_RULE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/kubernetes/\d+(?P<rest>/.*)?$").expect("valid regex"));
static AGENT_RULE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/\d+/agent(?P<rest>/.*)?$").expect("valid regex"));

/// Classifies a request into the authorization it requires.
///
/// `path` may carry a query string and an `/api` mount prefix; both are
/// ignored.
///
/// # Example
///
/// ```
/// use bastion_authz::classify;
/// use bastion_core::Authorization;
/// use http::Method;
///
/// assert_eq!(
///     classify("/5/docker/containers/create", &Method::POST),
///     Authorization::DockerContainerCreate
/// );
/// assert_eq!(classify("/endpoints", &Method::GET), Authorization::PortainerEndpointList);
/// ```
pub fn classify(path: &str, method: &Method) -> Authorization {
    let path = strip_api_prefix(strip_query(path));
    let method = method.as_str();

    if let Some(caps) = DOCKER_RULE.captures(path) {
        return docker::authorization(rest(&caps), method);
    }
    if KUBERNETES_PROXY_RULE.is_match(path) {
        // Per-verb checks for the Kubernetes proxy belong to the namespace
        // level RBAC layer.
        return Authorization::K8sResourcePoolsR;
    }
    if let Some(caps) = AZURE_RULE.captures(path) {
        return azure::authorization(rest(&caps), method);
    }
    if let Some(caps) = KUBERNETES_RULE.captures(path) {
        return kubernetes::authorization(rest(&caps), method);
    }
    if let Some(caps) = AGENT_RULE.captures(path) {
        return agent::authorization(rest(&caps), method);
    }
    native::authorization(path, method)
}

fn rest<'a>(caps: &regex::Captures<'a>) -> &'a str {
    caps.name("rest").map_or("/", |m| m.as_str())
}

fn strip_query(path: &str) -> &str {
    path.split_once('?').map_or(path, |(path, _)| path)
}

fn strip_api_prefix(path: &str) -> &str {
    match path.strip_prefix("/api") {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
        _ => path,
    }
}

/// A path split as `/<base>/<resource>/<action>`.
///
/// `action` keeps any further slashes (`attach/ws`, `v2/library/nginx`).
/// A trailing slash is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Route<'a> {
    pub base: &'a str,
    pub resource: &'a str,
    pub action: &'a str,
}

impl<'a> Route<'a> {
    pub(crate) fn parse(path: &'a str) -> Self {
        let path = path.trim_start_matches('/');
        let (base, remainder) = path.split_once('/').unwrap_or((path, ""));
        let (resource, action) = remainder.split_once('/').unwrap_or((remainder, ""));
        Self {
            base,
            resource,
            action: action.trim_end_matches('/'),
        }
    }

    /// `/<base>` with nothing after it.
    pub(crate) fn is_collection(&self) -> bool {
        self.resource.is_empty() && self.action.is_empty()
    }

    /// `/<base>/<resource>` with no action.
    pub(crate) fn is_item(&self) -> bool {
        !self.resource.is_empty() && self.action.is_empty()
    }

    /// Last non-empty segment after the base.
    ///
    /// Used where resource names may themselves contain slashes
    /// (`/images/library/nginx/json`).
    pub(crate) fn last_segment(&self) -> &'a str {
        if self.action.is_empty() {
            self.resource
        } else {
            self.action.rsplit('/').next().unwrap_or(self.action)
        }
    }
}

/// Tokens for a plain collection/item resource.
///
/// `GET /x` lists, `GET /x/{id}` inspects, `POST /x` creates,
/// `PUT /x/{id}` updates and `DELETE /x/{id}` deletes.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct Crud {
    pub list: Option<Authorization>,
    pub inspect: Option<Authorization>,
    pub create: Option<Authorization>,
    pub update: Option<Authorization>,
    pub delete: Option<Authorization>,
}

impl Crud {
    pub(crate) fn resolve(&self, route: &Route<'_>, method: &str) -> Option<Authorization> {
        match method {
            "GET" if route.is_collection() => self.list,
            "GET" if route.is_item() => self.inspect,
            "POST" if route.is_collection() => self.create,
            "PUT" if route.is_item() => self.update,
            "DELETE" if route.is_item() => self.delete,
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_parse() {
        let route = Route::parse("/containers/abc123/json");
        assert_eq!(route.base, "containers");
        assert_eq!(route.resource, "abc123");
        assert_eq!(route.action, "json");

        let route = Route::parse("/containers/abc123/attach/ws");
        assert_eq!(route.action, "attach/ws");

        let route = Route::parse("/endpoints");
        assert!(route.is_collection());

        let route = Route::parse("/endpoints/");
        assert!(route.is_collection());

        let route = Route::parse("/endpoints/4/");
        assert!(route.is_item());
    }

    #[test]
    fn test_last_segment() {
        assert_eq!(Route::parse("/images/library/nginx/json").last_segment(), "json");
        assert_eq!(Route::parse("/images/nginx").last_segment(), "nginx");
    }

    #[test]
    fn test_strip_helpers() {
        assert_eq!(strip_query("/endpoints?limit=10"), "/endpoints");
        assert_eq!(strip_api_prefix("/api/endpoints"), "/endpoints");
        assert_eq!(strip_api_prefix("/apis/thing"), "/apis/thing");
        assert_eq!(strip_api_prefix("/api"), "");
    }

    #[test]
    fn test_dispatch_priority() {
        assert_eq!(
            classify("/1/docker/containers/json", &Method::GET),
            Authorization::DockerContainerList
        );
        assert_eq!(
            classify("/1/kubernetes/api/v1/pods", &Method::DELETE),
            Authorization::K8sResourcePoolsR
        );
        assert_eq!(
            classify("/kubernetes/1/namespaces/system", &Method::PUT),
            Authorization::K8sResourcePoolDetailsW
        );
        assert_eq!(classify("/1/agent/ping", &Method::GET), Authorization::DockerAgentPing);
        assert_eq!(classify("/teams", &Method::GET), Authorization::PortainerTeamList);
    }

    #[test]
    fn test_endpoint_scoped_proxy_paths() {
        assert_eq!(
            classify("/api/endpoints/3/docker/containers/abc/json", &Method::GET),
            Authorization::DockerContainerInspect
        );
        assert_eq!(
            classify("/endpoints/3/azure/subscriptions?api-version=2016-06-01", &Method::GET),
            Authorization::AzureSubscriptionsList
        );
    }

    #[test]
    fn test_empty_path_is_undefined() {
        assert_eq!(classify("", &Method::GET), Authorization::PortainerUndefined);
        assert_eq!(classify("/", &Method::GET), Authorization::PortainerUndefined);
    }
}
