//! Request gates.
//!
//! | Gate | Purpose |
//! |------|---------|
//! | [`request_id`] | Assign the request ID and open the request span |
//! | [`security_headers`] | Add browser hardening headers |
//! | [`authentication`] | Resolve the caller from a session token or API key |
//! | [`license`] | Refuse non-administrators while the license is invalid |
//! | [`authorization`] | Require the classified operation, or the administrator role |
//! | [`team_leader`] | Require team leadership |
//! | [`context_upgrade`] | Build the handler's identity context |

pub mod authentication;
pub mod authorization;
pub mod context_upgrade;
pub mod license;
pub mod request_id;
pub mod security_headers;
pub mod team_leader;

pub use authentication::{AuthenticationMiddleware, CredentialSettings};
pub use authorization::{AdminOnlyMiddleware, OperationAuthorizationMiddleware};
pub use context_upgrade::ContextUpgradeMiddleware;
pub use license::LicenseMiddleware;
pub use request_id::{RequestIdMiddleware, REQUEST_ID_HEADER};
pub use security_headers::SecurityHeadersMiddleware;
pub use team_leader::TeamLeaderMiddleware;
