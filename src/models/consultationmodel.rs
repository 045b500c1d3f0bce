// models/consultationmodel.rs
use chrono::{DateTime, NaiveDate, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "consultation_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ConsultationType {
    Video,
    Phone,
    InPerson,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "consultation_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ConsultationStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
    NoShow,
    Rescheduled,
}

impl ConsultationStatus {
    /// A consultation still occupying its slot.
    pub fn is_active(&self) -> bool {
        matches!(self, ConsultationStatus::Pending | ConsultationStatus::Confirmed)
    }

    pub fn can_transition_to(&self, to: ConsultationStatus) -> bool {
        matches!(
            (self, to),
            (ConsultationStatus::Pending, ConsultationStatus::Confirmed)
                | (ConsultationStatus::Pending, ConsultationStatus::Cancelled)
                | (ConsultationStatus::Pending, ConsultationStatus::Rescheduled)
                | (ConsultationStatus::Confirmed, ConsultationStatus::Completed)
                | (ConsultationStatus::Confirmed, ConsultationStatus::NoShow)
                | (ConsultationStatus::Confirmed, ConsultationStatus::Cancelled)
                | (ConsultationStatus::Confirmed, ConsultationStatus::Rescheduled)
        )
    }
}

/// One bookable window within a day, e.g. 09:00-12:30.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TimeWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DaySchedule {
    pub enabled: bool,
    #[serde(default)]
    pub windows: Vec<TimeWindow>,
}

/// Recurring weekly schedule, one entry per weekday.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WeeklySchedule {
    pub monday: DaySchedule,
    pub tuesday: DaySchedule,
    pub wednesday: DaySchedule,
    pub thursday: DaySchedule,
    pub friday: DaySchedule,
    pub saturday: DaySchedule,
    pub sunday: DaySchedule,
}

impl WeeklySchedule {
    pub fn for_weekday(&self, weekday: Weekday) -> &DaySchedule {
        match weekday {
            Weekday::Mon => &self.monday,
            Weekday::Tue => &self.tuesday,
            Weekday::Wed => &self.wednesday,
            Weekday::Thu => &self.thursday,
            Weekday::Fri => &self.friday,
            Weekday::Sat => &self.saturday,
            Weekday::Sun => &self.sunday,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct LawyerAvailability {
    pub id: Uuid,
    pub lawyer_id: Uuid,
    // Stored as JSONB; parse with `schedule()`.
    pub weekly_schedule: serde_json::Value,
    pub blocked_dates: Vec<NaiveDate>,
    pub slot_duration_minutes: i32,
    pub buffer_minutes: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LawyerAvailability {
    pub fn schedule(&self) -> Result<WeeklySchedule, serde_json::Error> {
        serde_json::from_value(self.weekly_schedule.clone())
    }

    pub fn is_date_blocked(&self, date: NaiveDate) -> bool {
        self.blocked_dates.contains(&date)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Consultation {
    pub id: Uuid,
    pub lawyer_id: Uuid,
    pub client_id: Uuid,
    pub consultation_type: ConsultationType,
    pub scheduled_at: DateTime<Utc>,
    pub duration_minutes: i32,
    pub fee: i64,
    pub status: ConsultationStatus,
    pub meeting_link: Option<String>,
    pub notes: Option<String>,
    pub cancelled_by: Option<Uuid>,
    pub cancellation_reason: Option<String>,
    pub conversation_id: Option<Uuid>,
    pub rescheduled_from: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Conversation {
    pub id: Uuid,
    pub participant_ids: Vec<Uuid>,
    pub case_id: Option<Uuid>,
    pub kind: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consultation_transitions() {
        assert!(ConsultationStatus::Pending.can_transition_to(ConsultationStatus::Confirmed));
        assert!(ConsultationStatus::Pending.can_transition_to(ConsultationStatus::Cancelled));
        assert!(ConsultationStatus::Confirmed.can_transition_to(ConsultationStatus::Completed));
        assert!(ConsultationStatus::Confirmed.can_transition_to(ConsultationStatus::NoShow));
        assert!(ConsultationStatus::Confirmed.can_transition_to(ConsultationStatus::Rescheduled));
    }

    #[test]
    fn test_consultation_pending_cannot_complete() {
        assert!(!ConsultationStatus::Pending.can_transition_to(ConsultationStatus::Completed));
        assert!(!ConsultationStatus::Pending.can_transition_to(ConsultationStatus::NoShow));
    }

    #[test]
    fn test_consultation_terminal_states() {
        for from in [
            ConsultationStatus::Completed,
            ConsultationStatus::Cancelled,
            ConsultationStatus::NoShow,
            ConsultationStatus::Rescheduled,
        ] {
            assert!(!from.is_active());
            assert!(!from.can_transition_to(ConsultationStatus::Confirmed));
            assert!(!from.can_transition_to(ConsultationStatus::Pending));
        }
    }
}
