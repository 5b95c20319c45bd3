use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::Json,
};
use serde_json::{json, Value};
use tracing::instrument;

use super::AppState;
use crate::models::{
    Appointment, AppointmentDetails, BookingRequest, BookingResponse, ContactRequest,
    ContactResponse, CreateAppointmentRequest, CreateServiceRequest, Service, ServiceError,
    BOOKING_FAILED_MESSAGE,
};

type ApiError = (StatusCode, Json<Value>);

// =============================================================================
// BOOKING INTAKE
// =============================================================================

/// Public booking form submission
#[instrument(name = "create_booking", skip(state, payload))]
pub async fn create_booking(
    State(state): State<AppState>,
    payload: Result<Json<BookingRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<BookingResponse>), ApiError> {
    let Json(request) = payload.map_err(rejection_to_response)?;

    crate::info_with_trace!(service = ?request.service, "Received booking request");

    let result = state
        .business
        .trace_operation("book", state.booking_service.book(request))
        .await;

    match result {
        Ok(outcome) => {
            state
                .metrics
                .record_service_resolution(outcome.service_fallback);
            Ok((
                StatusCode::CREATED,
                Json(BookingResponse::created(outcome.appointment)),
            ))
        }
        Err(err) if err.is_client_error() => Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": client_message(&err) })),
        )),
        Err(err) => {
            crate::error_with_trace!(error = %err, "Failed to create booking");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "success": false,
                    "message": BOOKING_FAILED_MESSAGE,
                })),
            ))
        }
    }
}

// =============================================================================
// CONTACT FORM
// =============================================================================

/// Public contact form submission, stored for the admin inbox
#[instrument(name = "submit_contact", skip(state, payload))]
pub async fn submit_contact(
    State(state): State<AppState>,
    payload: Result<Json<ContactRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ContactResponse>), ApiError> {
    let Json(request) = payload.map_err(rejection_to_response)?;

    state
        .business
        .trace_operation("submit_contact", state.message_service.submit_contact(request))
        .await
        .map(|message| (StatusCode::CREATED, Json(ContactResponse::received(&message))))
        .map_err(service_error_to_response)
}

// =============================================================================
// SERVICE CATALOGUE
// =============================================================================

/// Active services ordered by name
#[instrument(name = "list_services", skip(state))]
pub async fn list_services(State(state): State<AppState>) -> Result<Json<Vec<Service>>, ApiError> {
    state
        .business
        .trace_operation("list_services", state.catalog_service.list_active())
        .await
        .map(Json)
        .map_err(service_error_to_response)
}

#[instrument(name = "get_service", skip(state), fields(id = %id))]
pub async fn get_service(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Service>, ApiError> {
    state
        .catalog_service
        .get(id)
        .await
        .map(Json)
        .map_err(service_error_to_response)
}

#[instrument(name = "create_service", skip(state, payload))]
pub async fn create_service(
    State(state): State<AppState>,
    payload: Result<Json<CreateServiceRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Service>), ApiError> {
    let Json(request) = payload.map_err(rejection_to_response)?;

    state
        .business
        .trace_operation("create_service", state.catalog_service.create(request))
        .await
        .map(|service| (StatusCode::CREATED, Json(service)))
        .map_err(service_error_to_response)
}

// =============================================================================
// APPOINTMENTS
// =============================================================================

/// Every appointment with its customer and service
#[instrument(name = "list_appointments", skip(state))]
pub async fn list_appointments(
    State(state): State<AppState>,
) -> Result<Json<Vec<AppointmentDetails>>, ApiError> {
    state
        .appointment_service
        .list_with_details()
        .await
        .map(Json)
        .map_err(service_error_to_response)
}

#[instrument(name = "create_appointment", skip(state, payload))]
pub async fn create_appointment(
    State(state): State<AppState>,
    payload: Result<Json<CreateAppointmentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Appointment>), ApiError> {
    let Json(request) = payload.map_err(rejection_to_response)?;

    state
        .business
        .trace_operation(
            "create_appointment",
            state.appointment_service.create(request),
        )
        .await
        .map(|appointment| (StatusCode::CREATED, Json(appointment)))
        .map_err(service_error_to_response)
}

/// Malformed or mistyped JSON bodies never reach business logic.
/// Oversized bodies keep their 413; every other rejection is a 400.
pub(crate) fn rejection_to_response(rejection: JsonRejection) -> ApiError {
    crate::warn_with_trace!(error = %rejection.body_text(), "Rejected request body");
    let status = match rejection.status() {
        StatusCode::PAYLOAD_TOO_LARGE => StatusCode::PAYLOAD_TOO_LARGE,
        _ => StatusCode::BAD_REQUEST,
    };
    (status, Json(json!({ "error": rejection.body_text() })))
}

/// Message shown to the caller for a rejected request
fn client_message(err: &ServiceError) -> String {
    match err {
        ServiceError::Validation { message } | ServiceError::Configuration { message } => {
            message.clone()
        }
        other => other.to_string(),
    }
}

/// Convert ServiceError to HTTP response
pub(crate) fn service_error_to_response(err: ServiceError) -> ApiError {
    let (status, message) = match &err {
        ServiceError::Validation { .. } | ServiceError::Configuration { .. } => {
            (StatusCode::BAD_REQUEST, client_message(&err))
        }
        ServiceError::ServiceNotFound { .. } | ServiceError::MessageNotFound { .. } => {
            (StatusCode::NOT_FOUND, err.to_string())
        }
        ServiceError::Repository { .. } => {
            crate::error_with_trace!(error = %err, "Request failed on the data store");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            )
        }
    };

    (status, Json(json!({ "error": message })))
}
