// handler/consultations.rs
use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    response::IntoResponse,
    routing::{get, post, put},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dtos::{
        consultationdtos::*,
        ApiResponse,
    },
    error::HttpError,
    middleware::{AuthContext, UserRole},
    AppState,
};

pub fn consultation_handler() -> Router {
    Router::new()
        .route("/", post(book_consultation))
        .route("/mine", get(list_my_consultations))
        .route("/availability", put(set_availability))
        .route("/availability/:lawyer_id", get(get_availability))
        .route("/availability/:lawyer_id/slots", get(get_available_slots))
        .route("/:consultation_id", get(get_consultation))
        .route("/:consultation_id/confirm", post(confirm_consultation))
        .route("/:consultation_id/cancel", post(cancel_consultation))
        .route("/:consultation_id/complete", post(complete_consultation))
        .route("/:consultation_id/no-show", post(mark_no_show))
        .route("/:consultation_id/reschedule", post(reschedule_consultation))
}

pub async fn set_availability(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Json(body): Json<AvailabilityDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let availability = app_state
        .consultation_service
        .set_availability(auth.user_id, body)
        .await?;
    Ok(Json(ApiResponse::ok(availability)))
}

pub async fn get_availability(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(lawyer_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let availability = app_state
        .consultation_service
        .get_availability(lawyer_id)
        .await?
        .ok_or_else(|| HttpError::not_found("No availability configured".to_string()))?;
    Ok(Json(ApiResponse::ok(availability)))
}

pub async fn get_available_slots(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(lawyer_id): Path<Uuid>,
    Query(query): Query<SlotsQuery>,
) -> Result<impl IntoResponse, HttpError> {
    let slots = app_state
        .consultation_service
        .get_available_slots(lawyer_id, query.date)
        .await?;
    Ok(Json(ApiResponse::ok(slots)))
}

pub async fn book_consultation(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Json(body): Json<BookConsultationDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let consultation = app_state
        .consultation_service
        .book_consultation(auth.user_id, body)
        .await?;
    Ok(Json(ApiResponse::ok(consultation)))
}

pub async fn list_my_consultations(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
) -> Result<impl IntoResponse, HttpError> {
    let consultations = match auth.role {
        UserRole::Lawyer => {
            app_state
                .consultation_service
                .list_for_lawyer(auth.user_id)
                .await?
        }
        _ => {
            app_state
                .consultation_service
                .list_for_client(auth.user_id)
                .await?
        }
    };
    Ok(Json(ApiResponse::ok(consultations)))
}

pub async fn get_consultation(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Path(consultation_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let consultation = app_state
        .consultation_service
        .get_consultation(consultation_id)
        .await?;
    if consultation.lawyer_id != auth.user_id
        && consultation.client_id != auth.user_id
        && !auth.role.is_admin()
    {
        return Err(HttpError::unauthorized(
            "You are not a party to this consultation".to_string(),
        ));
    }
    Ok(Json(ApiResponse::ok(consultation)))
}

pub async fn confirm_consultation(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Path(consultation_id): Path<Uuid>,
    Json(body): Json<ConfirmConsultationDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let consultation = app_state
        .consultation_service
        .confirm_consultation(consultation_id, auth.user_id, body.meeting_link)
        .await?;
    Ok(Json(ApiResponse::ok(consultation)))
}

pub async fn cancel_consultation(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Path(consultation_id): Path<Uuid>,
    Json(body): Json<CancelConsultationDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let consultation = app_state
        .consultation_service
        .cancel_consultation(consultation_id, auth.user_id, body.reason)
        .await?;
    Ok(Json(ApiResponse::ok(consultation)))
}

pub async fn complete_consultation(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Path(consultation_id): Path<Uuid>,
    Json(body): Json<CompleteConsultationDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let consultation = app_state
        .consultation_service
        .complete_consultation(consultation_id, auth.user_id, body.notes)
        .await?;
    Ok(Json(ApiResponse::ok(consultation)))
}

pub async fn mark_no_show(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Path(consultation_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let consultation = app_state
        .consultation_service
        .mark_no_show(consultation_id, auth.user_id)
        .await?;
    Ok(Json(ApiResponse::ok(consultation)))
}

pub async fn reschedule_consultation(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Path(consultation_id): Path<Uuid>,
    Json(body): Json<RescheduleConsultationDto>,
) -> Result<impl IntoResponse, HttpError> {
    let consultation = app_state
        .consultation_service
        .reschedule_consultation(consultation_id, auth.user_id, body.new_scheduled_at)
        .await?;
    Ok(Json(ApiResponse::ok(consultation)))
}
