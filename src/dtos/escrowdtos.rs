// dtos/escrowdtos.rs
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct FundEscrowDto {
    #[validate(length(min = 1, message = "Payment reference is required"))]
    pub payment_reference: String,
}

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct ResolveDisputeDto {
    #[validate(range(min = 0, max = 100, message = "Client percent must be between 0-100"))]
    pub client_percent: i32,

    #[validate(range(min = 0, max = 100, message = "Lawyer percent must be between 0-100"))]
    pub lawyer_percent: i32,
}
