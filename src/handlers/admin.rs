use axum::{
    extract::{rejection::JsonRejection, Path, Query, Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use subtle::ConstantTimeEq;
use tracing::instrument;

use super::{
    api::{rejection_to_response, service_error_to_response},
    AppState,
};
use crate::models::{
    AdminStats, ClientPage, ClientQuery, Message, MessageInbox, MessageUpdate, Service,
    UpdateServiceRequest,
};

type ApiError = (StatusCode, Json<Value>);

/// Query parameters for the client list
#[derive(Debug, Default, Deserialize)]
pub struct ClientListQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub search: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub stats: AdminStats,
}

/// Response for seeding operations
#[derive(Debug, Serialize)]
pub struct SeedResponse {
    pub message: String,
    pub services_created: usize,
    pub timestamp: String,
}

/// Response for table setup operations
#[derive(Debug, Serialize)]
pub struct SetupTablesResponse {
    pub message: String,
    pub timestamp: String,
}

/// Query parameters for the message inbox
#[derive(Debug, Default, Deserialize)]
pub struct MessageListQuery {
    pub is_read: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: Message,
}

#[derive(Debug, Serialize)]
pub struct ServiceUpdateResponse {
    pub success: bool,
    pub message: String,
    pub service: Service,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
}

/// Bearer-token guard for the admin routes
pub async fn admin_auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let presented = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim);

    match (state.admin_token.as_deref(), presented) {
        (Some(expected), Some(token)) if tokens_match(expected, token) => next.run(request).await,
        (None, _) => {
            crate::warn_with_trace!("Admin request rejected: no admin token configured");
            unauthorized()
        }
        _ => {
            crate::warn_with_trace!("Admin request rejected: invalid or missing token");
            unauthorized()
        }
    }
}

/// Token equality in constant time over the presented bytes
fn tokens_match(expected: &str, presented: &str) -> bool {
    expected.as_bytes().ct_eq(presented.as_bytes()).into()
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        [(header::WWW_AUTHENTICATE, "Bearer")],
        Json(json!({ "error": "Unauthorized" })),
    )
        .into_response()
}

#[instrument(name = "admin_stats", skip(state))]
pub async fn get_stats(
    State(state): State<AppState>,
) -> Result<Json<StatsResponse>, ApiError> {
    state
        .admin_service
        .stats()
        .await
        .map(|stats| Json(StatsResponse { stats }))
        .map_err(service_error_to_response)
}

#[instrument(name = "admin_clients", skip(state), fields(
    page = query.page,
    per_page = query.per_page,
    search = query.search.as_deref(),
))]
pub async fn list_clients(
    State(state): State<AppState>,
    Query(query): Query<ClientListQuery>,
) -> Result<Json<ClientPage>, ApiError> {
    let query = ClientQuery::new(query.search, query.page, query.per_page);

    state
        .admin_service
        .list_clients(query)
        .await
        .map(Json)
        .map_err(service_error_to_response)
}

/// Install the default service catalogue
#[instrument(name = "seed_services", skip(state))]
pub async fn seed_services(
    State(state): State<AppState>,
) -> Result<Json<SeedResponse>, ApiError> {
    let timestamp = chrono::Utc::now().to_rfc3339();

    crate::info_with_trace!("Seeding default services");

    let services_created = state
        .business
        .trace_operation("seed_services", state.catalog_service.seed_defaults())
        .await
        .map_err(service_error_to_response)?;

    Ok(Json(SeedResponse {
        message: format!("Seeded {} services", services_created),
        services_created,
        timestamp,
    }))
}

/// Apply pending schema migrations
#[instrument(name = "setup_tables", skip(state))]
pub async fn setup_tables(
    State(state): State<AppState>,
) -> Result<Json<SetupTablesResponse>, ApiError> {
    let timestamp = chrono::Utc::now().to_rfc3339();

    state
        .business
        .trace_operation("setup_tables", state.admin_service.setup_tables())
        .await
        .map_err(service_error_to_response)?;

    crate::info_with_trace!("Database schema is ready");

    Ok(Json(SetupTablesResponse {
        message: "Database tables are ready".to_string(),
        timestamp,
    }))
}

// =============================================================================
// SERVICE MANAGEMENT
// =============================================================================

#[instrument(name = "update_service", skip(state, payload), fields(id = %id))]
pub async fn update_service(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Result<Json<UpdateServiceRequest>, JsonRejection>,
) -> Result<Json<ServiceUpdateResponse>, ApiError> {
    let Json(request) = payload.map_err(rejection_to_response)?;

    let service = state
        .business
        .trace_operation("update_service", state.catalog_service.update(id, request))
        .await
        .map_err(service_error_to_response)?;

    Ok(Json(ServiceUpdateResponse {
        success: true,
        message: "Service updated successfully".to_string(),
        service,
    }))
}

/// Delete a service; refused while appointments still refer to it
#[instrument(name = "delete_service", skip(state), fields(id = %id))]
pub async fn delete_service(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<DeleteResponse>, ApiError> {
    state
        .business
        .trace_operation("delete_service", state.catalog_service.delete(id))
        .await
        .map_err(service_error_to_response)?;

    Ok(Json(DeleteResponse {
        success: true,
        message: "Service deleted successfully".to_string(),
    }))
}

// =============================================================================
// MESSAGE INBOX
// =============================================================================

#[instrument(name = "list_messages", skip(state), fields(is_read = ?query.is_read))]
pub async fn list_messages(
    State(state): State<AppState>,
    Query(query): Query<MessageListQuery>,
) -> Result<Json<MessageInbox>, ApiError> {
    state
        .message_service
        .inbox(query.is_read)
        .await
        .map(Json)
        .map_err(service_error_to_response)
}

/// Open one message, marking it read
#[instrument(name = "get_message", skip(state), fields(id = %id))]
pub async fn get_message(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .message_service
        .open(id)
        .await
        .map(|message| Json(MessageResponse { message }))
        .map_err(service_error_to_response)
}

#[instrument(name = "update_message", skip(state, payload), fields(id = %id))]
pub async fn update_message(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Result<Json<MessageUpdate>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(update) = payload.map_err(rejection_to_response)?;

    state
        .business
        .trace_operation("update_message", state.message_service.update(id, update))
        .await
        .map(|message| Json(MessageResponse { message }))
        .map_err(service_error_to_response)
}

#[instrument(name = "delete_message", skip(state), fields(id = %id))]
pub async fn delete_message(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<DeleteResponse>, ApiError> {
    state
        .business
        .trace_operation("delete_message", state.message_service.delete(id))
        .await
        .map_err(service_error_to_response)?;

    Ok(Json(DeleteResponse {
        success: true,
        message: "Message deleted successfully".to_string(),
    }))
}
