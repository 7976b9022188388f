//! Bastion Authorization - operation classification and access policies
//!
//! # Overview
//!
//! - [`classify`] maps an HTTP method and path to the [`Authorization`]
//!   it requires, across the native API and the Docker, Kubernetes, Azure
//!   and agent proxies.
//! - [`policy`] decides whether an identity holds that authorization, and
//!   evaluates ownership records and access policies.
//! - [`defaults`] holds the authorization sets of the built-in roles.
//!
//! ```text
//!   method + path
//!        │
//!   ┌────▼──────────┐      ┌────────────────────┐
//!   │   classify    │─────►│ authorized_operation│◄── caller's Authorizations
//!   └───────────────┘      └─────────┬──────────┘
//!                                    ▼
//!                              allow / deny
//! ```
//!
//! # Example
//!
//! ```
//! use bastion_authz::{authorized_operation, ApiOperationAuthorizationRequest};
//! use bastion_core::{Authorization, Authorizations};
//! use http::Method;
//!
//! let granted: Authorizations = [Authorization::DockerContainerList].into();
//! let request = ApiOperationAuthorizationRequest {
//!     path: "/1/docker/containers/json",
//!     method: &Method::GET,
//!     authorizations: &granted,
//! };
//! assert!(authorized_operation(&request));
//! ```
//!
//! [`Authorization`]: bastion_core::Authorization

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod defaults;
mod operation;
pub mod policy;

pub use defaults::EnvironmentRole;
pub use operation::classify;
pub use policy::{
    authorized_access, authorized_endpoint_access, authorized_endpoint_group_access,
    authorized_operation, authorized_registry_access, authorized_resource_control_access,
    authorized_resource_control_update, authorized_team_leader, authorized_team_management,
    authorized_user_management, bypasses_authorization, find_resource_control,
    ApiOperationAuthorizationRequest,
};
