//! Azure Container Instances proxy.
//!
//! Azure Resource Manager paths are case-insensitive, so segments are
//! compared lowercased.

#![allow(clippy::enum_glob_use)]

use bastion_core::Authorization::{self, *};

pub(crate) fn authorization(path: &str, method: &str) -> Authorization {
    let segments: Vec<String> = path
        .split('/')
        .filter(|s| !s.is_empty())
        .map(str::to_ascii_lowercase)
        .collect();
    let segments: Vec<&str> = segments.iter().map(String::as_str).collect();

    let resolved = match (method, segments.as_slice()) {
        ("GET", ["subscriptions"]) => Some(AzureSubscriptionsList),
        ("GET", ["subscriptions", _]) => Some(AzureSubscriptionGet),
        ("GET", ["subscriptions", _, "providers", _]) => Some(AzureProviderGet),
        ("GET", ["subscriptions", _, "providers", _, "containergroups"]) => {
            Some(AzureContainerGroupsList)
        }
        ("GET", ["subscriptions", _, "resourcegroups"]) => Some(AzureResourceGroupsList),
        ("GET", ["subscriptions", _, "resourcegroups", _]) => Some(AzureResourceGroupGet),
        (method, ["subscriptions", _, "resourcegroups", _, "providers", _, "containergroups", _]) => {
            match method {
                "GET" => Some(AzureContainerGroupGet),
                "PUT" => Some(AzureContainerGroupCreate),
                "DELETE" => Some(AzureContainerGroupDelete),
                _ => None,
            }
        }
        _ => None,
    };
    resolved.unwrap_or(AzureUndefined)
}

#[cfg(test)]
mod tests {
    use super::*;

    const GROUP: &str =
        "/subscriptions/s1/resourceGroups/rg1/providers/Microsoft.ContainerInstance/containerGroups/web";

    #[test]
    fn test_subscription_routes() {
        assert_eq!(authorization("/subscriptions", "GET"), AzureSubscriptionsList);
        assert_eq!(authorization("/subscriptions/s1", "GET"), AzureSubscriptionGet);
        assert_eq!(
            authorization("/subscriptions/s1/providers/Microsoft.ContainerInstance", "GET"),
            AzureProviderGet
        );
        assert_eq!(
            authorization(
                "/subscriptions/s1/providers/Microsoft.ContainerInstance/containerGroups",
                "GET"
            ),
            AzureContainerGroupsList
        );
    }

    #[test]
    fn test_resource_group_routes_are_case_insensitive() {
        assert_eq!(
            authorization("/subscriptions/s1/resourcegroups", "GET"),
            AzureResourceGroupsList
        );
        assert_eq!(
            authorization("/subscriptions/s1/resourceGroups/rg1", "GET"),
            AzureResourceGroupGet
        );
    }

    #[test]
    fn test_container_group_verbs() {
        assert_eq!(authorization(GROUP, "GET"), AzureContainerGroupGet);
        assert_eq!(authorization(GROUP, "PUT"), AzureContainerGroupCreate);
        assert_eq!(authorization(GROUP, "DELETE"), AzureContainerGroupDelete);
        assert_eq!(authorization(GROUP, "PATCH"), AzureUndefined);
    }

    #[test]
    fn test_unknown_is_undefined() {
        assert_eq!(authorization("/", "GET"), AzureUndefined);
        assert_eq!(authorization("/subscriptions", "DELETE"), AzureUndefined);
    }
}
