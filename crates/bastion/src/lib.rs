//! # Bastion
//!
//! **Authentication and authorization gateway for container management APIs**
//!
//! Every API request, including requests proxied verbatim to Docker,
//! Kubernetes, Azure or an agent, is classified into one fine-grained
//! permission token and checked against the caller's grants before its
//! handler runs.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use bastion::prelude::*;
//!
//! let config = ConfigLoader::new().with_file("bastion.toml")?.load()?;
//! bastion::telemetry::init_telemetry(&(&config.telemetry).into())?;
//!
//! let bouncer = bastion::build_bouncer(&config, stores);
//! let response = bouncer
//!     .restricted()
//!     .process(RequestState::new(), request, handler)
//!     .await;
//! ```
//!
//! ## Architecture
//!
//! ```text
//! Request → RequestId → SecurityHeaders → Authentication → License → Authorization → ContextUpgrade → Handler
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod gateway;

pub use gateway::{build_bouncer, Stores};

// Domain model and collaborator traits
pub use bastion_core as core;

// Operation classifier and access policy evaluator
pub use bastion_authz as authz;

// API key credentials
pub use bastion_apikey as apikey;

// Request bouncer
pub use bastion_middleware as middleware;

// Configuration
pub use bastion_config as config;

// Logging and metrics
pub use bastion_telemetry as telemetry;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust,ignore
/// use bastion::prelude::*;
/// ```
pub mod prelude {
    pub use bastion_core::{
        Authorization, Authorizations, BastionError, BastionResult, Endpoint, RequestId,
        RestrictedRequestContext, Role, TokenData, User, UserId,
    };

    pub use bastion_authz::{
        authorized_endpoint_access, authorized_operation, authorized_resource_control_access,
        classify, ApiOperationAuthorizationRequest,
    };

    pub use bastion_apikey::{ApiKeyError, ApiKeyService};

    pub use bastion_middleware::{
        BoxFuture, CredentialSettings, HmacJwtService, JwtService, Middleware, Pipeline, Request,
        RequestBouncer, RequestState, Response, ResponseExt,
    };

    pub use bastion_config::{BastionConfig, ConfigLoader};

    pub use crate::{build_bouncer, Stores};
}
