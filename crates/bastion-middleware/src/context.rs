//! Request-scoped state.
//!
//! [`RequestState`] flows through the gates of a pipeline. The
//! authentication gate stores the caller's [`TokenData`] and the context
//! upgrade gate stores the [`RestrictedRequestContext`]; handlers read both
//! through the accessors and treat them as read-only.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::time::Instant;

use bastion_core::{BastionError, BastionResult, RequestId, RestrictedRequestContext, TokenData, User};

/// State carried through the pipeline for one request.
///
/// ```
/// use bastion_core::{Role, TokenData, UserId};
/// use bastion_middleware::RequestState;
///
/// let mut state = RequestState::new();
/// assert!(state.token_data().is_err());
///
/// state.set_token_data(TokenData { id: UserId(3), username: "ops".into(), role: Role::Standard });
/// assert_eq!(state.token_data().unwrap().id, UserId(3));
/// ```
#[derive(Debug)]
pub struct RequestState {
    request_id: RequestId,
    token_data: Option<TokenData>,
    user: Option<User>,
    restricted: Option<RestrictedRequestContext>,
    started_at: Instant,
    extensions: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl RequestState {
    /// Creates state with a fresh request ID.
    #[must_use]
    pub fn new() -> Self {
        Self::with_request_id(RequestId::new())
    }

    /// Creates state with a specific request ID.
    #[must_use]
    pub fn with_request_id(request_id: RequestId) -> Self {
        Self {
            request_id,
            token_data: None,
            user: None,
            restricted: None,
            started_at: Instant::now(),
            extensions: HashMap::new(),
        }
    }

    /// Returns the request ID.
    #[must_use]
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Replaces the request ID.
    pub fn set_request_id(&mut self, request_id: RequestId) {
        self.request_id = request_id;
    }

    /// Claims of the authenticated caller.
    ///
    /// # Errors
    ///
    /// Internal error when no authentication gate ran for this request.
    pub fn token_data(&self) -> BastionResult<&TokenData> {
        self.token_data.as_ref().ok_or_else(|| {
            BastionError::internal("Unable to retrieve user details from authentication token")
        })
    }

    /// Stores the authenticated caller's claims.
    pub fn set_token_data(&mut self, token_data: TokenData) {
        self.token_data = Some(token_data);
    }

    /// The caller's account as read during authentication, if any.
    #[must_use]
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub(crate) fn set_user(&mut self, user: User) {
        self.user = Some(user);
    }

    /// Identity context for handlers.
    ///
    /// # Errors
    ///
    /// Internal error when no context upgrade gate ran for this request.
    pub fn restricted_context(&self) -> BastionResult<&RestrictedRequestContext> {
        self.restricted
            .as_ref()
            .ok_or_else(|| BastionError::internal("Unable to retrieve info from request context"))
    }

    /// Stores the identity context.
    pub fn set_restricted_context(&mut self, context: RestrictedRequestContext) {
        self.restricted = Some(context);
    }

    /// Time since the state was created.
    #[must_use]
    pub fn elapsed(&self) -> std::time::Duration {
        self.started_at.elapsed()
    }

    /// Stores a typed extension value.
    pub fn set_extension<T: Send + Sync + 'static>(&mut self, value: T) {
        self.extensions.insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Retrieves a typed extension value.
    #[must_use]
    pub fn get_extension<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.extensions
            .get(&TypeId::of::<T>())
            .and_then(|v| v.downcast_ref())
    }

    /// Removes and returns a typed extension value.
    pub fn remove_extension<T: Send + Sync + 'static>(&mut self) -> Option<T> {
        self.extensions
            .remove(&TypeId::of::<T>())
            .and_then(|v| v.downcast().ok())
            .map(|b| *b)
    }
}

impl Default for RequestState {
    fn default() -> Self {
        Self::new()
    }
}
