//! Authentication gate.
//!
//! Credentials are looked up in a fixed order and the first channel that
//! yields an identity wins:
//!
//! 1. `Authorization: Bearer <jwt>`
//! 2. `?token=<jwt>`, removed from the URI whenever present
//! 3. `X-API-KEY` header
//! 4. a query parameter named `x-api-key` in any letter case
//!
//! A JWT that fails verification counts as no credential from that channel.
//! The identity found is then re-read from the identity store; a vanished
//! account is rejected with 401. The claims handed to later gates carry the
//! stored role, not the one the token was issued with.

use std::sync::Arc;

use bastion_apikey::{ApiKeyError, ApiKeyService};
use bastion_core::{BastionError, BastionResult, TokenData, User, UserId, UserStore};
use bastion_telemetry::{record_auth_decision, AuthOutcome};
use chrono::Utc;
use http::uri::PathAndQuery;
use http::Uri;
use tracing::{debug, error, warn};

use crate::context::RequestState;
use crate::jwt::JwtService;
use crate::middleware::{BoxFuture, Middleware, Next};
use crate::types::{Request, Response, ResponseExt};

/// Layer name used in logs and metrics.
pub const LAYER: &str = "authentication";

/// Names of the credential-carrying header and query parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialSettings {
    /// Query parameter carrying a session token.
    pub token_query_param: String,
    /// Header, and case-insensitive query parameter, carrying an API key.
    pub api_key_header: String,
}

impl Default for CredentialSettings {
    fn default() -> Self {
        Self {
            token_query_param: "token".to_string(),
            api_key_header: "x-api-key".to_string(),
        }
    }
}

/// Resolves the caller from a session token or an API key.
pub struct AuthenticationMiddleware {
    jwt: Arc<dyn JwtService>,
    api_keys: Arc<ApiKeyService>,
    users: Arc<dyn UserStore>,
    settings: CredentialSettings,
}

impl AuthenticationMiddleware {
    /// Creates the gate.
    pub fn new(
        jwt: Arc<dyn JwtService>,
        api_keys: Arc<ApiKeyService>,
        users: Arc<dyn UserStore>,
        settings: CredentialSettings,
    ) -> Self {
        Self {
            jwt,
            api_keys,
            users,
            settings,
        }
    }

    fn jwt_lookup(&self, request: &mut Request) -> Option<TokenData> {
        // Stripped even when the header wins so the token never travels on.
        let from_query = take_query_param(request, |name| name == self.settings.token_query_param);
        let raw = bearer_token(request).or(from_query)?;

        match self.jwt.parse_and_verify_token(&raw) {
            Ok(token_data) => Some(token_data),
            Err(err) => {
                debug!(error = %err, "Session token rejected");
                None
            }
        }
    }

    fn api_key_lookup(&self, request: &Request) -> BastionResult<Option<UserId>> {
        let header = self.settings.api_key_header.as_str();
        let raw = request
            .headers()
            .get(header)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .or_else(|| query_param(request, |name| name.eq_ignore_ascii_case(header)));

        let Some(raw) = raw.filter(|k| !k.is_empty()) else {
            return Ok(None);
        };

        let digest = self.api_keys.hash_raw(&raw);
        let (owner, key) = match self.api_keys.get_digest_user_and_key(&digest) {
            Ok(found) => found,
            Err(err @ (ApiKeyError::NotFound | ApiKeyError::OwnerNotFound(_))) => {
                debug!(error = %err, "API key rejected");
                return Ok(None);
            }
            Err(err) => return Err(err.into()),
        };

        if let Err(err) = self.api_keys.refresh_last_used(&key, Utc::now()) {
            warn!(api_key_prefix = %key.prefix, error = %err, "Failed to record API key use");
        }

        Ok(Some(owner.id))
    }

    /// Resolves the caller's id, then re-reads the account.
    ///
    /// The returned claims are built from the account as stored, so a role
    /// change takes effect on the next request whatever the credential says.
    fn authenticate(&self, request: &mut Request) -> BastionResult<(TokenData, User)> {
        let user_id = match self.jwt_lookup(request) {
            Some(token_data) => token_data.id,
            None => match self.api_key_lookup(request)? {
                Some(user_id) => user_id,
                None => return Err(BastionError::Unauthorized),
            },
        };

        let user = self
            .users
            .user(user_id)
            .map_err(BastionError::from_identity_lookup)?;
        Ok((user.token_data(), user))
    }
}

impl Middleware for AuthenticationMiddleware {
    fn name(&self) -> &'static str {
        LAYER
    }

    fn process<'a>(
        &'a self,
        state: &'a mut RequestState,
        mut request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            match self.authenticate(&mut request) {
                Ok((token_data, user)) => {
                    debug!(user_id = %token_data.id, "Authenticated");
                    record_auth_decision(LAYER, AuthOutcome::Allowed);
                    state.set_token_data(token_data);
                    state.set_user(user);
                    next.run(state, request).await
                }
                Err(err) => {
                    if err.status_code().is_server_error() {
                        error!(
                            request_id = %state.request_id(),
                            error = ?err,
                            "Authentication lookup failed"
                        );
                        record_auth_decision(LAYER, AuthOutcome::Error);
                    } else {
                        warn!(
                            request_id = %state.request_id(),
                            http.path = request.uri().path(),
                            "Request rejected without valid credential"
                        );
                        record_auth_decision(LAYER, AuthOutcome::Denied);
                    }
                    Response::from_error(&err)
                }
            }
        })
    }
}

fn bearer_token(request: &Request) -> Option<String> {
    let value = request
        .headers()
        .get(http::header::AUTHORIZATION)?
        .to_str()
        .ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then(|| token.to_string())
}

fn query_pairs(request: &Request) -> Vec<(String, String)> {
    request
        .uri()
        .query()
        .and_then(|q| serde_urlencoded::from_str::<Vec<(String, String)>>(q).ok())
        .unwrap_or_default()
}

fn query_param(request: &Request, matches: impl Fn(&str) -> bool) -> Option<String> {
    query_pairs(request)
        .into_iter()
        .find(|(name, value)| matches(name.as_str()) && !value.is_empty())
        .map(|(_, value)| value)
}

/// Reads a query parameter and removes every occurrence of it from the URI.
fn take_query_param(request: &mut Request, matches: impl Fn(&str) -> bool) -> Option<String> {
    let pairs = query_pairs(request);
    let (taken, kept): (Vec<_>, Vec<_>) = pairs
        .into_iter()
        .partition(|(name, _)| matches(name.as_str()));
    let value = taken.into_iter().map(|(_, v)| v).find(|v| !v.is_empty())?;

    let path = request.uri().path().to_string();
    let path_and_query = match serde_urlencoded::to_string(&kept) {
        Ok(query) if !query.is_empty() => format!("{path}?{query}"),
        _ => path,
    };

    let mut parts = request.uri().clone().into_parts();
    match path_and_query.parse::<PathAndQuery>() {
        Ok(pq) => parts.path_and_query = Some(pq),
        Err(err) => {
            warn!(error = %err, "Unable to rebuild request URI without token");
            return Some(value);
        }
    }
    if let Ok(uri) = Uri::from_parts(parts) {
        *request.uri_mut() = uri;
    }
    Some(value)
}
