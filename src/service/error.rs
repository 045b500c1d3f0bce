use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::{
    error::HttpError,
    models::{casemodel::*, consultationmodel::ConsultationStatus, earningmodel::*, escrowmodel::EscrowStatus},
};

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Case {0} not found")]
    CaseNotFound(Uuid),

    #[error("Bid {0} not found")]
    BidNotFound(Uuid),

    #[error("No escrow exists for case {0}")]
    EscrowNotFound(Uuid),

    #[error("Earning {0} not found")]
    EarningNotFound(Uuid),

    #[error("Payout request {0} not found")]
    PayoutNotFound(Uuid),

    #[error("Consultation {0} not found")]
    ConsultationNotFound(Uuid),

    #[error("Case {0} is in status {1:?}")]
    InvalidCaseStatus(Uuid, CaseStatus),

    #[error("Bid {0} is in status {1:?}")]
    InvalidBidStatus(Uuid, BidStatus),

    #[error("Escrow for case {0} is in status {1:?}")]
    InvalidEscrowStatus(Uuid, EscrowStatus),

    #[error("Payout request {0} is in status {1:?}")]
    InvalidPayoutStatus(Uuid, PayoutStatus),

    #[error("Earning {0} is in status {1:?}")]
    InvalidEarningStatus(Uuid, EarningStatus),

    #[error("Consultation {0} is in status {1:?}")]
    InvalidConsultationStatus(Uuid, ConsultationStatus),

    #[error("User {0} is not authorized to perform this action on case {1}")]
    UnauthorizedCaseAccess(Uuid, Uuid),

    #[error("User {0} is not authorized to perform this action on bid {1}")]
    UnauthorizedBidAccess(Uuid, Uuid),

    #[error("User {0} is not authorized to perform this action on consultation {1}")]
    UnauthorizedConsultationAccess(Uuid, Uuid),

    #[error("User {0} is not authorized to perform this action on payout {1}")]
    UnauthorizedPayoutAccess(Uuid, Uuid),

    #[error("This action requires an admin")]
    AdminRequired,

    #[error("Insufficient funds: requested {requested}, available {available}")]
    InsufficientFunds { requested: i64, available: i64 },

    #[error("The requested slot at {0} is not available")]
    SlotUnavailable(DateTime<Utc>),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::CaseNotFound(_)
            | ServiceError::BidNotFound(_)
            | ServiceError::EscrowNotFound(_)
            | ServiceError::EarningNotFound(_)
            | ServiceError::PayoutNotFound(_)
            | ServiceError::ConsultationNotFound(_) => StatusCode::NOT_FOUND,

            ServiceError::InvalidCaseStatus(_, _)
            | ServiceError::InvalidBidStatus(_, _)
            | ServiceError::InvalidEscrowStatus(_, _)
            | ServiceError::InvalidPayoutStatus(_, _)
            | ServiceError::InvalidEarningStatus(_, _)
            | ServiceError::InvalidConsultationStatus(_, _)
            | ServiceError::Validation(_) => StatusCode::BAD_REQUEST,

            ServiceError::SlotUnavailable(_) => StatusCode::CONFLICT,

            ServiceError::UnauthorizedCaseAccess(_, _)
            | ServiceError::UnauthorizedBidAccess(_, _)
            | ServiceError::UnauthorizedConsultationAccess(_, _)
            | ServiceError::UnauthorizedPayoutAccess(_, _)
            | ServiceError::AdminRequired => StatusCode::UNAUTHORIZED,

            ServiceError::InsufficientFunds { .. } => StatusCode::PAYMENT_REQUIRED,

            ServiceError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ServiceError> for HttpError {
    fn from(error: ServiceError) -> Self {
        let status = error.status_code();
        HttpError::new(error.to_string(), status)
    }
}
