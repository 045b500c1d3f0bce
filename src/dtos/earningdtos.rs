// dtos/earningdtos.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::earningmodel::PayoutMethod;

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct RequestPayoutDto {
    #[validate(range(min = 0.01, message = "Payout amount must be positive"))]
    pub amount: f64,

    pub method: PayoutMethod,

    #[validate(length(min = 2, max = 255, message = "Account name must be between 2-255 characters"))]
    pub account_name: String,

    #[validate(length(min = 6, max = 34, message = "Account number must be between 6-34 characters"))]
    pub account_number: String,

    #[validate(length(min = 2, max = 255, message = "Bank name must be between 2-255 characters"))]
    pub bank_name: Option<String>,
}

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct ProcessPayoutDto {
    #[validate(length(min = 1, message = "External transaction id is required"))]
    pub external_transaction_id: String,
}

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct FailPayoutDto {
    #[validate(length(min = 1, max = 1000, message = "Failure reason is required"))]
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryQuery {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}
