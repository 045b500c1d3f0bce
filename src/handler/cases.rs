// handler/cases.rs
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
        casedtos::{AssignLawyerDto, CreateBidDto, CreateCaseDto, RejectBidDto, UpdateCaseStatusDto},
        ApiResponse,
    },
    error::HttpError,
    middleware::AuthContext,
    AppState,
};

pub fn case_handler() -> Router {
    Router::new()
        .route("/", post(create_case))
        .route("/open", get(list_open_cases))
        .route("/mine", get(list_my_cases))
        .route("/bids/mine", get(list_my_bids))
        .route("/bids/:bid_id/accept", post(accept_bid))
        .route("/bids/:bid_id/reject", post(reject_bid))
        .route("/bids/:bid_id/withdraw", post(withdraw_bid))
        .route("/:case_id", get(get_case))
        .route("/:case_id/post", post(post_case))
        .route("/:case_id/status", post(update_case_status))
        .route("/:case_id/assign", post(assign_lawyer))
        .route("/:case_id/cancel", post(cancel_case))
        .route("/:case_id/bids", get(list_bids_for_case).post(create_bid))
}

pub async fn create_case(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Json(body): Json<CreateCaseDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let case = app_state
        .case_service
        .create_case(auth.user_id, body)
        .await?;

    Ok(Json(ApiResponse::ok(case)))
}

pub async fn get_case(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(case_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let case = app_state.case_service.get_case(case_id).await?;
    Ok(Json(ApiResponse::ok(case)))
}

pub async fn list_open_cases(
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let cases = app_state.case_service.list_open_cases().await?;
    Ok(Json(ApiResponse::ok(cases)))
}

pub async fn list_my_cases(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
) -> Result<impl IntoResponse, HttpError> {
    let cases = app_state
        .case_service
        .list_cases_by_client(auth.user_id)
        .await?;
    Ok(Json(ApiResponse::ok(cases)))
}

pub async fn post_case(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Path(case_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let case = app_state
        .case_service
        .post_case(case_id, auth.user_id)
        .await?;
    Ok(Json(ApiResponse::ok(case)))
}

/// Admin lever for transitions without a dedicated operation, e.g. moving a
/// posted case into matching.
pub async fn update_case_status(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Path(case_id): Path<Uuid>,
    Json(body): Json<UpdateCaseStatusDto>,
) -> Result<impl IntoResponse, HttpError> {
    if !auth.role.is_admin() {
        return Err(HttpError::unauthorized("Admin access required".to_string()));
    }
    let case = app_state
        .case_service
        .update_status(case_id, body.status)
        .await?;
    Ok(Json(ApiResponse::ok(case)))
}

/// Direct assignment outside the bidding flow, e.g. a fee negotiated
/// off-platform. The client who owns the case sets lawyer and fee.
pub async fn assign_lawyer(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Path(case_id): Path<Uuid>,
    Json(body): Json<AssignLawyerDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let case = app_state.case_service.get_case(case_id).await?;
    if case.client_id != auth.user_id && !auth.role.is_admin() {
        return Err(HttpError::unauthorized(
            "Only the case owner may assign a lawyer".to_string(),
        ));
    }

    let case = app_state
        .case_service
        .assign_lawyer(
            case_id,
            body.lawyer_id,
            crate::utils::currency::to_minor_units(body.agreed_fee),
        )
        .await?;
    Ok(Json(ApiResponse::ok(case)))
}

pub async fn cancel_case(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Path(case_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let case = app_state
        .case_service
        .cancel_case(case_id, auth.user_id)
        .await?;
    Ok(Json(ApiResponse::ok(case)))
}

pub async fn create_bid(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Path(case_id): Path<Uuid>,
    Json(body): Json<CreateBidDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let bid = app_state
        .bid_service
        .create_bid(auth.user_id, case_id, body)
        .await?;

    Ok(Json(ApiResponse::ok(bid)))
}

pub async fn list_bids_for_case(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Path(case_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let bids = app_state
        .bid_service
        .list_bids_for_case(case_id, auth.user_id)
        .await?;
    Ok(Json(ApiResponse::ok(bids)))
}

pub async fn list_my_bids(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
) -> Result<impl IntoResponse, HttpError> {
    let bids = app_state
        .bid_service
        .list_bids_by_lawyer(auth.user_id)
        .await?;
    Ok(Json(ApiResponse::ok(bids)))
}

pub async fn accept_bid(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Path(bid_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let (bid, case) = app_state
        .bid_service
        .accept_bid(bid_id, auth.user_id)
        .await?;
    Ok(Json(ApiResponse::ok(serde_json::json!({
        "bid": bid,
        "case": case,
    }))))
}

pub async fn reject_bid(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Path(bid_id): Path<Uuid>,
    Json(body): Json<RejectBidDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let bid = app_state
        .bid_service
        .reject_bid(bid_id, auth.user_id, body.feedback)
        .await?;
    Ok(Json(ApiResponse::ok(bid)))
}

pub async fn withdraw_bid(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Path(bid_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let bid = app_state
        .bid_service
        .withdraw_bid(bid_id, auth.user_id)
        .await?;
    Ok(Json(ApiResponse::ok(bid)))
}
