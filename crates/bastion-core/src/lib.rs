//! # Bastion Core
//!
//! Domain model and collaborator contracts for the Bastion gateway.
//!
//! - [`Authorization`] - Canonical permission tokens
//! - [`User`], [`TokenData`], [`TeamMembership`] - Identities
//! - [`RestrictedRequestContext`] - Identity context handed to handlers
//! - [`ResourceControl`], [`Endpoint`], [`Registry`] - Ownership and access policies
//! - [`ApiKey`] - Persisted API key record
//! - [`UserStore`], [`TeamMembershipStore`], [`EndpointGroupStore`], [`LicenseService`],
//!   [`ApiKeyRepository`] - Collaborators
//! - [`BastionError`] - Standard error type

#![doc(html_root_url = "https://docs.rs/bastion-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod apikey;
mod authorization;
mod context;
mod error;
pub mod fixtures;
mod identity;
mod resource;
mod store;

pub use apikey::{ApiKey, API_KEY_DISPLAY_PREFIX_LEN, API_KEY_PREFIX};
pub use authorization::{Authorization, Authorizations};
pub use context::{RequestId, RestrictedRequestContext};
pub use error::{
    BastionError, BastionResult, ErrorCategory, ErrorEnvelope, ACCESS_DENIED_MESSAGE,
    AUTHORIZATION_REQUIRED_MESSAGE, INVALID_LICENSE_MESSAGE, MISSING_TOKEN_DETAILS,
    UNAUTHORIZED_MESSAGE,
};
pub use identity::{
    ApiKeyId, EndpointGroupId, EndpointId, MembershipId, MembershipRole, RegistryId, Role,
    RoleId, TeamId, TeamMembership, TokenData, User, UserId,
};
pub use resource::{
    AccessPolicy, Endpoint, EndpointGroup, EndpointType, Registry, RegistryAccessPolicies,
    ResourceControl, ResourceControlType, TeamAccessPolicies, TeamResourceAccess,
    UserAccessPolicies, UserResourceAccess,
};
pub use store::{
    ApiKeyRepository, EndpointGroupStore, LicenseInfo, LicenseService, StoreError, StoreResult, TeamMembershipStore,
    UserStore,
};
