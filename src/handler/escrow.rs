// handler/escrow.rs
use std::sync::Arc;

use axum::{
    extract::Path,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dtos::{
        escrowdtos::{FundEscrowDto, ResolveDisputeDto},
        ApiResponse,
    },
    error::HttpError,
    middleware::{AuthContext, UserRole},
    AppState,
};

pub fn escrow_handler() -> Router {
    Router::new()
        .route("/cases/:case_id", get(get_escrow).post(create_escrow))
        .route("/cases/:case_id/fund", post(fund_escrow))
        .route("/cases/:case_id/confirm", post(confirm_case_clear))
        .route("/cases/:case_id/dispute", post(raise_dispute))
        .route("/cases/:case_id/dispute/resolve", post(resolve_dispute))
        .route("/cases/:case_id/refund", post(refund_escrow))
}

pub async fn create_escrow(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Path(case_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let escrow = app_state
        .escrow_service
        .create_escrow(case_id, auth.user_id)
        .await?;
    Ok(Json(ApiResponse::ok(escrow)))
}

pub async fn get_escrow(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Path(case_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let escrow = app_state.escrow_service.get_escrow(case_id).await?;
    if escrow.client_id != auth.user_id
        && escrow.lawyer_id != auth.user_id
        && !auth.role.is_admin()
    {
        return Err(HttpError::unauthorized(
            "You are not a party to this escrow".to_string(),
        ));
    }
    Ok(Json(ApiResponse::ok(escrow)))
}

pub async fn fund_escrow(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Path(case_id): Path<Uuid>,
    Json(body): Json<FundEscrowDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let escrow = app_state
        .escrow_service
        .fund_escrow(case_id, auth.user_id, body.payment_reference)
        .await?;
    Ok(Json(ApiResponse::ok(escrow)))
}

/// Which side of the dual confirmation a caller supplies is determined by
/// their role header; the service still verifies they are that party.
pub async fn confirm_case_clear(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Path(case_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let escrow = match auth.role {
        UserRole::Lawyer => {
            app_state
                .escrow_service
                .lawyer_confirm_case_clear(case_id, auth.user_id)
                .await?
        }
        UserRole::Client => {
            app_state
                .escrow_service
                .client_confirm_case_clear(case_id, auth.user_id)
                .await?
        }
        UserRole::Admin => {
            return Err(HttpError::bad_request(
                "Only the case parties may confirm clearance".to_string(),
            ))
        }
    };
    Ok(Json(ApiResponse::ok(escrow)))
}

pub async fn raise_dispute(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Path(case_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let escrow = app_state
        .escrow_service
        .raise_dispute(case_id, auth.user_id)
        .await?;
    Ok(Json(ApiResponse::ok(escrow)))
}

pub async fn resolve_dispute(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Path(case_id): Path<Uuid>,
    Json(body): Json<ResolveDisputeDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let escrow = app_state
        .escrow_service
        .resolve_dispute(
            case_id,
            body.client_percent,
            body.lawyer_percent,
            auth.role.is_admin(),
        )
        .await?;
    Ok(Json(ApiResponse::ok(escrow)))
}

pub async fn refund_escrow(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Path(case_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let escrow = app_state
        .escrow_service
        .refund_escrow(case_id, auth.role.is_admin())
        .await?;
    Ok(Json(ApiResponse::ok(escrow)))
}
