//! License gate.

use std::sync::Arc;

use bastion_core::{BastionError, LicenseService};
use bastion_telemetry::{record_auth_decision, AuthOutcome};
use tracing::{error, warn};

use crate::context::RequestState;
use crate::middleware::{BoxFuture, Middleware, Next};
use crate::types::{Request, Response, ResponseExt};

/// Layer name used in logs and metrics.
pub const LAYER: &str = "license";

/// Refuses non-administrators while the license is invalid.
///
/// The license is queried on every request; a denial is never cached.
pub struct LicenseMiddleware {
    license: Arc<dyn LicenseService>,
}

impl LicenseMiddleware {
    /// Creates the gate.
    pub fn new(license: Arc<dyn LicenseService>) -> Self {
        Self { license }
    }
}

impl Middleware for LicenseMiddleware {
    fn name(&self) -> &'static str {
        LAYER
    }

    fn process<'a>(
        &'a self,
        state: &'a mut RequestState,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            let token_data = match state.token_data() {
                Ok(token_data) => token_data,
                Err(err) => return Response::from_error(&err),
            };
            if token_data.is_admin() {
                return next.run(state, request).await;
            }

            match self.license.info() {
                Ok(info) if info.valid => {
                    record_auth_decision(LAYER, AuthOutcome::Allowed);
                    next.run(state, request).await
                }
                Ok(_) => {
                    warn!(user_id = %token_data.id, "Request refused: license is not valid");
                    record_auth_decision(LAYER, AuthOutcome::Denied);
                    Response::from_error(&BastionError::InvalidLicense)
                }
                Err(err) => {
                    error!(error = %err, "Unable to read license information");
                    record_auth_decision(LAYER, AuthOutcome::Error);
                    Response::from_error(&BastionError::internal_with_source(
                        "Unable to retrieve license information",
                        err,
                    ))
                }
            }
        })
    }
}
