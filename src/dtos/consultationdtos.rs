// dtos/consultationdtos.rs
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::consultationmodel::{ConsultationType, WeeklySchedule};

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityDto {
    pub weekly_schedule: WeeklySchedule,

    #[serde(default)]
    pub blocked_dates: Vec<NaiveDate>,

    #[validate(range(min = 15, max = 240, message = "Slot duration must be between 15-240 minutes"))]
    pub slot_duration_minutes: i32,

    #[validate(range(min = 0, max = 120, message = "Buffer must be between 0-120 minutes"))]
    pub buffer_minutes: i32,
}

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct BookConsultationDto {
    pub lawyer_id: Uuid,
    pub consultation_type: ConsultationType,
    pub scheduled_at: DateTime<Utc>,

    #[validate(range(min = 0.0, message = "Fee cannot be negative"))]
    pub fee: f64,
}

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmConsultationDto {
    #[validate(url(message = "Meeting link must be a valid URL"))]
    pub meeting_link: Option<String>,
}

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct CancelConsultationDto {
    #[validate(length(max = 1000, message = "Reason cannot exceed 1000 characters"))]
    pub reason: Option<String>,
}

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct CompleteConsultationDto {
    #[validate(length(max = 5000, message = "Notes cannot exceed 5000 characters"))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RescheduleConsultationDto {
    pub new_scheduled_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotsQuery {
    pub date: NaiveDate,
}
