// dtos/casedtos.rs
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::casemodel::{CaseStatus, CaseUrgency, FeeType, LegalArea, ServiceType};

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct CreateCaseDto {
    #[validate(length(min = 5, max = 255, message = "Title must be between 5-255 characters"))]
    pub title: String,

    #[validate(length(min = 20, message = "Description must be at least 20 characters"))]
    pub description: String,

    pub legal_area: LegalArea,
    pub service_type: ServiceType,

    #[validate(range(min = 0.0, message = "Minimum budget cannot be negative"))]
    pub budget_min: f64,

    #[validate(range(min = 0.0, message = "Maximum budget cannot be negative"))]
    pub budget_max: f64,

    pub urgency: CaseUrgency,

    #[validate(length(min = 2, max = 255, message = "Location must be between 2-255 characters"))]
    pub location: Option<String>,
}

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct CreateBidDto {
    #[validate(range(min = 0.01, message = "Bid amount must be positive"))]
    pub amount: f64,

    pub fee_type: FeeType,

    #[validate(range(min = 1, max = 365, message = "Estimated days must be between 1-365"))]
    pub estimated_days: i32,

    #[validate(length(min = 20, message = "Proposal must be at least 20 characters"))]
    pub proposal: String,
}

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct RejectBidDto {
    #[validate(length(max = 1000, message = "Feedback cannot exceed 1000 characters"))]
    pub feedback: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateCaseStatusDto {
    pub status: CaseStatus,
}

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct AssignLawyerDto {
    pub lawyer_id: uuid::Uuid,

    #[validate(range(min = 0.01, message = "Agreed fee must be positive"))]
    pub agreed_fee: f64,
}
