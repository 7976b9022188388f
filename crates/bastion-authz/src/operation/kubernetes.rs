//! Native Kubernetes management routes (`/kubernetes/<id>/...`).
//!
//! Lookups go through a table keyed by base resource, action and method.
//! Any combination missing from the table is undefined.

use bastion_core::Authorization;

const RULES: &[(&str, &str, &str, Authorization)] = &[
    ("namespaces", "system", "PUT", Authorization::K8sResourcePoolDetailsW),
    ("ingresscontrollers", "", "GET", Authorization::K8sIngressControllersR),
    ("ingresscontrollers", "", "PUT", Authorization::K8sIngressControllersW),
    ("nodes_limits", "", "GET", Authorization::K8sClusterNodeR),
    ("config", "", "GET", Authorization::K8sClusterR),
];

pub(crate) fn authorization(path: &str, method: &str) -> Authorization {
    let path = path.trim_matches('/');
    let (base, action) = path.split_once('/').unwrap_or((path, ""));

    RULES
        .iter()
        .find(|(b, a, m, _)| *b == base && *a == action && *m == method)
        .map_or(Authorization::K8sUndefined, |(_, _, _, token)| *token)
}
