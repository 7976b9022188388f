//! # Bastion Middleware
//!
//! The request bouncer: a chain of gates every API request passes before its
//! handler runs.
//!
//! ## Gates
//!
//! 1. **Request ID**: assigns a UUID v7 and opens the request span
//! 2. **Security headers**: hardening headers on every response
//! 3. **Authentication**: session token or API key, identity re-read from the store
//! 4. **License**: non-administrators are refused while the license is invalid
//! 5. **Authorization**: the classified operation must be held, or the caller
//!    must be an administrator or team leader depending on the level
//! 6. **Context upgrade**: builds the [`RestrictedRequestContext`](bastion_core::RestrictedRequestContext)
//!
//! ## Example
//!
//! ```ignore
//! let bouncer = RequestBouncer::new(collaborators, CredentialSettings::default());
//!
//! let response = bouncer
//!     .restricted()
//!     .process(RequestState::new(), request, |state, _request| {
//!         let caller = state.token_data().map(|t| t.id);
//!         Box::pin(async move { /* handler */ })
//!     })
//!     .await;
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod bouncer;
pub mod context;
pub mod jwt;
pub mod middleware;
pub mod pipeline;
pub mod stages;
pub mod types;

pub use bouncer::{Collaborators, RequestBouncer, EDGE_ID_HEADER};
pub use context::RequestState;
pub use jwt::{HmacJwtService, JwtError, JwtService};
pub use middleware::{BoxFuture, Middleware, Next};
pub use pipeline::{BoxedMiddleware, Pipeline, PipelineBuilder};
pub use stages::{CredentialSettings, REQUEST_ID_HEADER};
pub use types::{Request, Response, ResponseExt};
