use axum::{
    body::Body,
    extract::Request,
    http::{header, HeaderName, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

const CORS_HEADERS: [(HeaderName, &str); 4] = [
    (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
    (
        header::ACCESS_CONTROL_ALLOW_METHODS,
        "GET, POST, PUT, DELETE, OPTIONS",
    ),
    (
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        "Content-Type, Authorization",
    ),
    (header::ACCESS_CONTROL_MAX_AGE, "86400"),
];

const SECURITY_HEADERS: [(HeaderName, &str); 5] = [
    (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
    (header::X_FRAME_OPTIONS, "DENY"),
    (header::X_XSS_PROTECTION, "1; mode=block"),
    (header::REFERRER_POLICY, "strict-origin-when-cross-origin"),
    (header::CONTENT_SECURITY_POLICY, "default-src 'self'"),
];

/// Reject bodies that are not JSON or exceed `max_request_size` bytes
pub async fn request_validation_middleware(
    max_request_size: usize,
    request: Request<Body>,
    next: Next,
) -> Response {
    if let Err(response) = validate_content_type(&request) {
        return response;
    }
    if let Err(response) = validate_request_size(&request, max_request_size) {
        return response;
    }

    next.run(request).await
}

fn error_response(status: StatusCode, error: &str, message: String) -> Response {
    (
        status,
        Json(json!({
            "error": error,
            "message": message,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        })),
    )
        .into_response()
}

fn content_length(request: &Request<Body>) -> Option<u64> {
    request
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse().ok())
}

/// Bodies on POST/PUT/PATCH must be JSON; body-less admin actions pass through
fn validate_content_type(request: &Request<Body>) -> Result<(), Response> {
    if ![Method::POST, Method::PUT, Method::PATCH].contains(request.method()) {
        return Ok(());
    }

    match request.headers().get(header::CONTENT_TYPE) {
        Some(content_type) => {
            let content_type = content_type.to_str().unwrap_or("");
            if content_type.starts_with("application/json") {
                Ok(())
            } else {
                crate::warn_with_trace!("Invalid content type: {}", content_type);
                Err(error_response(
                    StatusCode::UNSUPPORTED_MEDIA_TYPE,
                    "Unsupported media type",
                    "Content-Type must be application/json".to_string(),
                ))
            }
        }
        None if content_length(request).unwrap_or(0) > 0 => {
            crate::warn_with_trace!("Missing content type header");
            Err(error_response(
                StatusCode::BAD_REQUEST,
                "Missing content type",
                "Content-Type header is required for requests with body".to_string(),
            ))
        }
        None => Ok(()),
    }
}

fn validate_request_size(request: &Request<Body>, max_request_size: usize) -> Result<(), Response> {
    match content_length(request) {
        Some(length) if length > max_request_size as u64 => {
            crate::error_with_trace!("Request too large: {} bytes", length);
            Err(error_response(
                StatusCode::PAYLOAD_TOO_LARGE,
                "Request too large",
                format!(
                    "Request size {} bytes exceeds maximum of {} bytes",
                    length, max_request_size
                ),
            ))
        }
        _ => Ok(()),
    }
}

/// CORS middleware for handling cross-origin requests
pub async fn cors_middleware(request: Request<Body>, next: Next) -> Response {
    let mut response = next.run(request).await;
    insert_static_headers(&mut response, &CORS_HEADERS);
    response
}

/// Security headers middleware
pub async fn security_headers_middleware(request: Request<Body>, next: Next) -> Response {
    let mut response = next.run(request).await;
    insert_static_headers(&mut response, &SECURITY_HEADERS);
    response
}

fn insert_static_headers(response: &mut Response, headers: &[(HeaderName, &'static str)]) {
    let target = response.headers_mut();
    for (name, value) in headers {
        target.insert(name.clone(), HeaderValue::from_static(*value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{middleware, routing::post, Router};
    use tower::ServiceExt;

    fn app(max_request_size: usize) -> Router {
        Router::new()
            .route("/echo", post(|| async { "ok" }))
            .layer(middleware::from_fn(security_headers_middleware))
            .layer(middleware::from_fn(cors_middleware))
            .layer(middleware::from_fn(move |req, next| {
                request_validation_middleware(max_request_size, req, next)
            }))
    }

    fn post_request(content_type: Option<&str>, body: &'static str) -> Request<Body> {
        let mut builder = Request::post("/echo").header(header::CONTENT_LENGTH, body.len());
        if let Some(content_type) = content_type {
            builder = builder.header(header::CONTENT_TYPE, content_type);
        }
        builder.body(Body::from(body)).unwrap()
    }

    #[tokio::test]
    async fn test_json_body_passes_with_headers() {
        let response = app(1024)
            .oneshot(post_request(Some("application/json"), "{}"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["access-control-allow-origin"], "*");
        assert_eq!(response.headers()["x-frame-options"], "DENY");
    }

    #[tokio::test]
    async fn test_non_json_body_rejected() {
        let response = app(1024)
            .oneshot(post_request(Some("text/plain"), "hello"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[tokio::test]
    async fn test_body_without_content_type_rejected() {
        let response = app(1024)
            .oneshot(post_request(None, "{}"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_empty_post_without_content_type_allowed() {
        let response = app(1024).oneshot(post_request(None, "")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_oversized_body_rejected() {
        let response = app(4)
            .oneshot(post_request(Some("application/json"), r#"{"a": 1}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
