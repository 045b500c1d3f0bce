// handler/wallet.rs
use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dtos::{
        earningdtos::{FailPayoutDto, ProcessPayoutDto, RequestPayoutDto, SummaryQuery},
        ApiResponse,
    },
    error::HttpError,
    middleware::AuthContext,
    AppState,
};

pub fn wallet_handler() -> Router {
    Router::new()
        .route("/", get(get_wallet))
        .route("/earnings", get(list_earnings))
        .route("/earnings/summary", get(earnings_summary))
        .route("/earnings/:earning_id/release", post(release_earning))
        .route("/earnings/:earning_id/hold", post(hold_earning))
        .route("/earnings/:earning_id/unhold", post(unhold_earning))
        .route("/payouts", get(list_payouts).post(request_payout))
        .route("/payouts/:payout_id/cancel", post(cancel_payout))
        .route("/payouts/:payout_id/processing", post(mark_payout_processing))
        .route("/payouts/:payout_id/complete", post(complete_payout))
        .route("/payouts/:payout_id/fail", post(fail_payout))
}

pub async fn get_wallet(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
) -> Result<impl IntoResponse, HttpError> {
    let wallet = app_state.earnings_service.get_wallet(auth.user_id).await?;
    Ok(Json(ApiResponse::ok(wallet)))
}

pub async fn list_earnings(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
) -> Result<impl IntoResponse, HttpError> {
    let earnings = app_state
        .earnings_service
        .list_earnings(auth.user_id)
        .await?;
    Ok(Json(ApiResponse::ok(earnings)))
}

pub async fn earnings_summary(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<SummaryQuery>,
) -> Result<impl IntoResponse, HttpError> {
    let summary = app_state
        .earnings_service
        .get_earnings_summary(auth.user_id, query.from, query.to)
        .await?;
    Ok(Json(ApiResponse::ok(summary)))
}

/// Admin lever for releasing a specific due earning ahead of the sweep.
pub async fn release_earning(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Path(earning_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    if !auth.role.is_admin() {
        return Err(HttpError::unauthorized("Admin access required".to_string()));
    }
    let earning = app_state
        .earnings_service
        .release_pending_earning(earning_id)
        .await?;
    Ok(Json(ApiResponse::ok(earning)))
}

pub async fn hold_earning(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Path(earning_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let earning = app_state
        .earnings_service
        .hold_earning(earning_id, auth.role.is_admin())
        .await?;
    Ok(Json(ApiResponse::ok(earning)))
}

pub async fn unhold_earning(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Path(earning_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let earning = app_state
        .earnings_service
        .unhold_earning(earning_id, auth.role.is_admin())
        .await?;
    Ok(Json(ApiResponse::ok(earning)))
}

pub async fn request_payout(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Json(body): Json<RequestPayoutDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let payout = app_state
        .earnings_service
        .request_payout(auth.user_id, body)
        .await?;
    Ok(Json(ApiResponse::ok(payout)))
}

pub async fn list_payouts(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
) -> Result<impl IntoResponse, HttpError> {
    let payouts = app_state
        .earnings_service
        .list_payouts(auth.user_id)
        .await?;
    Ok(Json(ApiResponse::ok(payouts)))
}

pub async fn cancel_payout(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Path(payout_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let payout = app_state
        .earnings_service
        .cancel_payout_request(payout_id, auth.user_id)
        .await?;
    Ok(Json(ApiResponse::ok(payout)))
}

pub async fn mark_payout_processing(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Path(payout_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let payout = app_state
        .earnings_service
        .mark_payout_processing(payout_id, auth.role.is_admin())
        .await?;
    Ok(Json(ApiResponse::ok(payout)))
}

pub async fn complete_payout(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Path(payout_id): Path<Uuid>,
    Json(body): Json<ProcessPayoutDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let payout = app_state
        .earnings_service
        .process_payout(payout_id, body.external_transaction_id, auth.role.is_admin())
        .await?;
    Ok(Json(ApiResponse::ok(payout)))
}

pub async fn fail_payout(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Path(payout_id): Path<Uuid>,
    Json(body): Json<FailPayoutDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let payout = app_state
        .earnings_service
        .fail_payout(payout_id, body.reason, auth.role.is_admin())
        .await?;
    Ok(Json(ApiResponse::ok(payout)))
}
