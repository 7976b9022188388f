//! Request ID propagation.
//!
//! Every request gets a UUID v7 identifier, echoed back in `X-Request-ID`
//! and attached to the tracing span covering the rest of the chain.

use bastion_core::RequestId;
use http::HeaderValue;
use tracing::{info_span, Instrument};
use uuid::Uuid;

use crate::context::RequestState;
use crate::middleware::{BoxFuture, Middleware, Next};
use crate::types::{Request, Response};

/// Header name for request ID propagation.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Assigns the request ID and opens the request span.
#[derive(Debug, Clone, Default)]
pub struct RequestIdMiddleware {
    trust_incoming: bool,
}

impl RequestIdMiddleware {
    /// Always generates a fresh ID.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reuses a valid incoming `X-Request-ID`, e.g. behind a trusted proxy.
    #[must_use]
    pub fn trust_incoming() -> Self {
        Self {
            trust_incoming: true,
        }
    }

    fn incoming(&self, request: &Request) -> Option<RequestId> {
        if !self.trust_incoming {
            return None;
        }
        request
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|s| Uuid::parse_str(s).ok())
            .map(RequestId::from_uuid)
    }
}

impl Middleware for RequestIdMiddleware {
    fn name(&self) -> &'static str {
        "request_id"
    }

    fn process<'a>(
        &'a self,
        state: &'a mut RequestState,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response> {
        if let Some(request_id) = self.incoming(&request) {
            state.set_request_id(request_id);
        }
        let request_id = state.request_id();
        let span = info_span!(
            "request",
            request_id = %request_id,
            http.method = %request.method(),
            http.path = request.uri().path(),
        );

        Box::pin(
            async move {
                let mut response = next.run(state, request).await;
                if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
                    response.headers_mut().insert(REQUEST_ID_HEADER, value);
                }
                response
            }
            .instrument(span),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http_body_util::Full;

    #[test]
    fn test_incoming_ignored_unless_trusted() {
        let id = Uuid::now_v7();
        let request: Request = http::Request::builder()
            .uri("/")
            .header(REQUEST_ID_HEADER, id.to_string())
            .body(Full::new(Bytes::new()))
            .unwrap();

        assert!(RequestIdMiddleware::new().incoming(&request).is_none());
        assert_eq!(
            RequestIdMiddleware::trust_incoming().incoming(&request),
            Some(RequestId::from_uuid(id))
        );
    }
}
