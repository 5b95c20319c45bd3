use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use opentelemetry::trace::TraceContextExt;
use std::{future::Future, sync::Arc, time::Instant};
use tracing::{error, info, warn, Instrument};
use tracing_opentelemetry::OpenTelemetrySpanExt;

use super::Metrics;
use crate::models::{ServiceError, ServiceResult};

/// Middleware for automatic request tracing and metrics collection
pub async fn observability_middleware(
    metrics: Arc<Metrics>,
    request: Request,
    next: Next,
) -> Response {
    let start_time = Instant::now();
    let method = request.method().to_string();
    let uri = request.uri().to_string();

    let user_agent = request
        .headers()
        .get("user-agent")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    // First hop of X-Forwarded-For, then X-Real-IP
    let client_ip = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .or_else(|| {
            request
                .headers()
                .get("x-real-ip")
                .and_then(|value| value.to_str().ok())
        })
        .unwrap_or("unknown")
        .trim()
        .to_string();

    // Matched route keeps metric label cardinality bounded
    let endpoint = request
        .extensions()
        .get::<MatchedPath>()
        .map(|matched_path| matched_path.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let span_name = format!("{} {}", method, endpoint);

    let span = tracing::info_span!(
        target: "plumbing_booking::http",
        "{}", span_name,
        otel.name = %span_name,
        otel.kind = "server",
        http.method = %method,
        http.route = %endpoint,
        http.url = %uri,
        http.user_agent = %user_agent,
        client.address = %client_ip,
        http.response.status_code = tracing::field::Empty,
        http.response_time_ms = tracing::field::Empty,
    );

    async {
        metrics.increment_in_flight(&method, &endpoint);

        let trace_id = tracing::Span::current()
            .context()
            .span()
            .span_context()
            .trace_id()
            .to_string();

        info!(trace_id = %trace_id, method = %method, path = %endpoint, "Processing request");

        let response = next.run(request).await;

        let duration = start_time.elapsed();
        let duration_ms = duration.as_millis();
        let status_code = response.status().as_u16();

        let current_span = tracing::Span::current();
        current_span.record("http.response.status_code", status_code);
        current_span.record("http.response_time_ms", duration_ms);

        let span_context = current_span.context();
        let otel_span = span_context.span();
        if status_code >= 500 {
            otel_span.set_status(opentelemetry::trace::Status::error("HTTP server error"));
        } else {
            otel_span.set_status(opentelemetry::trace::Status::Ok);
        }

        metrics.record_http_request(&method, &endpoint, status_code, duration.as_secs_f64());
        metrics.decrement_in_flight(&method, &endpoint);

        if status_code >= 500 {
            error!(
                trace_id = %trace_id,
                method = %method,
                path = %endpoint,
                status_code = status_code,
                duration_ms = duration_ms,
                client_ip = %client_ip,
                "Request failed"
            );
        } else if status_code >= 400 {
            warn!(
                trace_id = %trace_id,
                method = %method,
                path = %endpoint,
                status_code = status_code,
                duration_ms = duration_ms,
                client_ip = %client_ip,
                "Request rejected"
            );
        } else {
            info!(
                trace_id = %trace_id,
                method = %method,
                path = %endpoint,
                status_code = status_code,
                duration_ms = duration_ms,
                "Request completed successfully"
            );
        }

        response
    }
    .instrument(span)
    .await
}

/// Wraps store calls in a PostgreSQL client span and records database metrics
#[derive(Clone)]
pub struct DatabaseTracingMiddleware {
    metrics: Arc<Metrics>,
}

impl DatabaseTracingMiddleware {
    pub fn new(metrics: Arc<Metrics>) -> Self {
        Self { metrics }
    }

    pub async fn trace_operation<F, T, E>(
        &self,
        operation: &str,
        table: &str,
        future: F,
    ) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let span = tracing::info_span!(
            "PostgreSQL",
            "db.system" = "postgresql",
            "db.operation" = operation,
            "db.sql.table" = table,
            "otel.kind" = "client",
            "otel.name" = format!("PostgreSQL.{} {}", operation, table),
            "component" = "sqlx",
        );

        let start_time = Instant::now();
        let result = future.instrument(span.clone()).await;
        let duration = start_time.elapsed();

        self.metrics.record_database_operation(
            operation,
            table,
            result.is_ok(),
            duration.as_secs_f64(),
        );

        if let Err(ref error) = result {
            span.in_scope(|| {
                error!(
                    error = %error,
                    duration_ms = duration.as_millis(),
                    "Database operation failed"
                );
            });
        }

        result
    }
}

/// Traces booking, catalogue and admin operations and records their outcome
#[derive(Clone)]
pub struct BusinessTracingMiddleware {
    metrics: Arc<Metrics>,
}

impl BusinessTracingMiddleware {
    pub fn new(metrics: Arc<Metrics>) -> Self {
        Self { metrics }
    }

    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }

    /// Outcome label: `success`, `rejected` for caller mistakes, `error` for store failures
    pub fn outcome<T>(result: &ServiceResult<T>) -> &'static str {
        match result {
            Ok(_) => "success",
            Err(ServiceError::Repository { .. }) => "error",
            Err(_) => "rejected",
        }
    }

    pub async fn trace_operation<F, T>(&self, operation: &str, future: F) -> ServiceResult<T>
    where
        F: Future<Output = ServiceResult<T>>,
    {
        let span = tracing::info_span!("business_operation", operation = %operation);
        let start_time = Instant::now();

        let result = future.instrument(span).await;
        let outcome = Self::outcome(&result);
        self.metrics.record_booking_operation(operation, outcome);

        match &result {
            Ok(_) => info!(
                operation = %operation,
                duration_ms = start_time.elapsed().as_millis(),
                "Operation completed successfully"
            ),
            Err(err) if outcome == "rejected" => warn!(
                operation = %operation,
                error = %err,
                "Operation rejected"
            ),
            Err(err) => error!(
                operation = %operation,
                error = %err,
                duration_ms = start_time.elapsed().as_millis(),
                "Operation failed"
            ),
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RepositoryError;
    use axum::{
        body::Body,
        http::{Method, Request, StatusCode},
        middleware,
        routing::get,
        Router,
    };
    use tower::ServiceExt;

    async fn test_handler() -> &'static str {
        "test response"
    }

    async fn error_handler() -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    fn app(metrics: Arc<Metrics>) -> Router {
        Router::new()
            .route("/test", get(test_handler))
            .route("/error", get(error_handler))
            .layer(middleware::from_fn(move |req, next| {
                observability_middleware(metrics.clone(), req, next)
            }))
    }

    #[tokio::test]
    async fn test_observability_middleware_success() {
        let metrics = Arc::new(Metrics::new().unwrap());

        let request = Request::builder()
            .method(Method::GET)
            .uri("/test")
            .header("user-agent", "test-client/1.0")
            .body(Body::empty())
            .unwrap();

        let response = app(metrics.clone()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let encoded = metrics.encode().unwrap();
        assert!(encoded.contains("http_requests_total"));
        assert!(encoded.contains("endpoint=\"/test\""));
    }

    #[tokio::test]
    async fn test_observability_middleware_error() {
        let metrics = Arc::new(Metrics::new().unwrap());

        let request = Request::builder()
            .method(Method::GET)
            .uri("/error")
            .body(Body::empty())
            .unwrap();

        let response = app(metrics.clone()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let encoded = metrics.encode().unwrap();
        assert!(encoded.contains("status_code=\"500\""));
    }

    #[tokio::test]
    async fn test_database_tracing_middleware() {
        let metrics = Arc::new(Metrics::new().unwrap());
        let middleware = DatabaseTracingMiddleware::new(metrics.clone());

        let result = middleware
            .trace_operation("SELECT", "customers", async { Ok::<_, String>(1) })
            .await;
        assert_eq!(result, Ok(1));

        let result = middleware
            .trace_operation("INSERT", "appointments", async {
                Err::<i32, _>("constraint".to_string())
            })
            .await;
        assert!(result.is_err());

        let failures = metrics
            .database_operations_total
            .with_label_values(&["INSERT", "appointments", "error"])
            .get();
        assert_eq!(failures, 1.0);
    }

    #[tokio::test]
    async fn test_business_tracing_outcomes() {
        let metrics = Arc::new(Metrics::new().unwrap());
        let middleware = BusinessTracingMiddleware::new(metrics.clone());

        let _ = middleware
            .trace_operation("book", async { Ok::<_, ServiceError>(()) })
            .await;
        let _ = middleware
            .trace_operation("book", async {
                Err::<(), _>(ServiceError::Validation {
                    message: "Email or phone required".to_string(),
                })
            })
            .await;
        let _ = middleware
            .trace_operation("book", async {
                Err::<(), _>(ServiceError::from(RepositoryError::ConnectionFailed))
            })
            .await;

        for status in ["success", "rejected", "error"] {
            let count = metrics
                .booking_operations_total
                .with_label_values(&["book", status])
                .get();
            assert_eq!(count, 1.0, "status {}", status);
        }
    }
}
