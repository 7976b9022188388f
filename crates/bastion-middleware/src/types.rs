//! HTTP types used throughout the middleware pipeline.

use bastion_core::BastionError;
use bytes::Bytes;
use http_body_util::Full;

/// The HTTP request type used in the middleware pipeline.
pub type Request = http::Request<Full<Bytes>>;

/// The HTTP response type used in the middleware pipeline.
pub type Response = http::Response<Full<Bytes>>;

/// Extension trait for building failure responses.
pub trait ResponseExt {
    /// JSON `{ "message", "details" }` response with the given status.
    fn json_error(status: http::StatusCode, message: &str, details: &str) -> Response;

    /// Renders a [`BastionError`] with its category's status code.
    fn from_error(err: &BastionError) -> Response;
}

impl ResponseExt for Response {
    fn json_error(status: http::StatusCode, message: &str, details: &str) -> Response {
        let body = serde_json::json!({
            "message": message,
            "details": details,
        });

        http::Response::builder()
            .status(status)
            .header(http::header::CONTENT_TYPE, "application/json")
            .body(Full::new(Bytes::from(body.to_string())))
            .expect("failed to build JSON error response")
    }

    fn from_error(err: &BastionError) -> Response {
        let envelope = err.to_envelope();
        Self::json_error(err.status_code(), &envelope.message, &envelope.details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;
    use http_body_util::BodyExt;

    #[tokio::test]
    async fn test_json_error_body() {
        let response = Response::json_error(StatusCode::FORBIDDEN, "Access denied", "nope");
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            response.headers().get(http::header::CONTENT_TYPE).unwrap(),
            "application/json"
        );

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["message"], "Access denied");
        assert_eq!(json["details"], "nope");
    }

    #[test]
    fn test_from_error_uses_category_status() {
        let response = Response::from_error(&BastionError::Unauthorized);
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = Response::from_error(&BastionError::internal("boom"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
