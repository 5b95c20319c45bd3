use axum::{extract::State, response::Json};
use serde_json::{json, Value};
use tracing::instrument;

use super::AppState;

/// Health check endpoint handler; always 200, reports the store separately
#[instrument(name = "health_check", skip(state))]
pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let database = if state.admin_service.store_reachable().await {
        "connected"
    } else {
        "unreachable"
    };

    Json(json!({
        "status": "healthy",
        "service": "plumbing-booking",
        "version": env!("CARGO_PKG_VERSION"),
        "database": database,
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}
