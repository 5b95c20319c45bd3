pub mod admin;
pub mod api;
pub mod health;
pub mod metrics;
pub mod middleware;

pub use admin::*;
pub use api::*;
pub use health::*;
pub use metrics::*;
pub use middleware::*;

use axum::{
    extract::{DefaultBodyLimit, FromRef},
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use std::{sync::Arc, time::Duration};
use tower_http::timeout::TimeoutLayer;

use crate::observability::{observability_middleware, BusinessTracingMiddleware, Metrics};
use crate::services::{
    AdminService, AppointmentService, BookingService, CatalogService, MessageService,
};

/// Shared application state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub booking_service: Arc<BookingService>,
    pub catalog_service: Arc<CatalogService>,
    pub appointment_service: Arc<AppointmentService>,
    pub admin_service: Arc<AdminService>,
    pub message_service: Arc<MessageService>,
    pub business: BusinessTracingMiddleware,
    pub metrics: Arc<Metrics>,
    /// Bearer token guarding `/api/admin/*`; `None` locks the admin routes
    pub admin_token: Option<Arc<str>>,
}

impl FromRef<AppState> for Arc<Metrics> {
    fn from_ref(state: &AppState) -> Self {
        state.metrics.clone()
    }
}

/// Request limits applied by the outer middleware stack
#[derive(Debug, Clone, Copy)]
pub struct HttpLimits {
    pub request_timeout: Duration,
    pub max_request_size: usize,
}

/// Build the full router: public API, admin API, health and metrics
pub fn create_app(state: AppState, limits: HttpLimits) -> Router {
    let metrics_for_middleware = state.metrics.clone();
    let max_request_size = limits.max_request_size;

    let admin_routes = Router::new()
        .route("/api/admin/stats", get(admin::get_stats))
        .route("/api/admin/clients", get(admin::list_clients))
        .route("/api/admin/seed", post(admin::seed_services))
        .route("/api/admin/setup-tables", post(admin::setup_tables))
        .route(
            "/api/admin/services/:id",
            put(admin::update_service).delete(admin::delete_service),
        )
        .route("/api/admin/messages", get(admin::list_messages))
        .route(
            "/api/admin/messages/:id",
            get(admin::get_message)
                .put(admin::update_message)
                .delete(admin::delete_message),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            admin_auth_middleware,
        ));

    Router::new()
        .route("/health/status", get(health_check))
        .route("/api/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .route("/api/book", post(api::create_booking))
        .route("/api/contact", post(api::submit_contact))
        .route(
            "/api/services",
            get(api::list_services).post(api::create_service),
        )
        .route("/api/services/:id", get(api::get_service))
        .route(
            "/api/appointments",
            get(api::list_appointments).post(api::create_appointment),
        )
        .merge(admin_routes)
        .with_state(state)
        // Bounds bodies without a Content-Length header, e.g. chunked uploads
        .layer(DefaultBodyLimit::max(max_request_size))
        // Each layer wraps the ones above it; observability ends up outermost
        .layer(TimeoutLayer::new(limits.request_timeout))
        .layer(axum_middleware::from_fn(security_headers_middleware))
        .layer(axum_middleware::from_fn(cors_middleware))
        .layer(axum_middleware::from_fn(move |req, next| {
            request_validation_middleware(max_request_size, req, next)
        }))
        .layer(axum_middleware::from_fn(move |req, next| {
            observability_middleware(metrics_for_middleware.clone(), req, next)
        }))
}
