// models/casemodel.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "legal_area", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum LegalArea {
    Family,
    Criminal,
    Corporate,
    Property,
    Employment,
    Immigration,
    IntellectualProperty,
    Tax,
    Civil,
    Other,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "service_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    FullRepresentation,
    Consultation,
    DocumentDrafting,
    LegalAdvice,
    Other,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "case_urgency", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CaseUrgency {
    Low,
    Medium,
    High,
    Urgent,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "case_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    Draft,
    Posted,
    Matching,
    Bidding,
    Assigned,
    InProgress,
    CaseClearPending,
    Completed,
    Disputed,
    Cancelled,
}

impl CaseStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, CaseStatus::Completed | CaseStatus::Cancelled)
    }

    /// Centralized transition table. `Disputed` and `Cancelled` are reachable
    /// from any non-terminal state; `Disputed` is recoverable.
    pub fn can_transition_to(&self, to: CaseStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        if matches!(to, CaseStatus::Disputed | CaseStatus::Cancelled) {
            return *self != to;
        }
        matches!(
            (self, to),
            (CaseStatus::Draft, CaseStatus::Posted)
                | (CaseStatus::Posted, CaseStatus::Matching)
                | (CaseStatus::Posted, CaseStatus::Bidding)
                | (CaseStatus::Matching, CaseStatus::Bidding)
                | (CaseStatus::Bidding, CaseStatus::Bidding)
                | (CaseStatus::Bidding, CaseStatus::Assigned)
                | (CaseStatus::Assigned, CaseStatus::InProgress)
                | (CaseStatus::InProgress, CaseStatus::CaseClearPending)
                | (CaseStatus::InProgress, CaseStatus::Completed)
                | (CaseStatus::CaseClearPending, CaseStatus::Completed)
                | (CaseStatus::Disputed, CaseStatus::Completed)
                | (CaseStatus::Disputed, CaseStatus::InProgress)
        )
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "bid_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BidStatus {
    Pending,
    Accepted,
    Rejected,
    Withdrawn,
}

impl BidStatus {
    /// Pending is the only live state; everything else is terminal.
    pub fn can_transition_to(&self, to: BidStatus) -> bool {
        *self == BidStatus::Pending && to != BidStatus::Pending
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "fee_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum FeeType {
    Fixed,
    Hourly,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Case {
    pub id: Uuid,
    pub client_id: Uuid,
    pub lawyer_id: Option<Uuid>,
    pub title: String,
    pub description: String,
    pub legal_area: LegalArea,
    pub service_type: ServiceType,
    pub budget_min: i64,
    pub budget_max: i64,
    pub urgency: CaseUrgency,
    pub location: Option<String>,
    pub status: CaseStatus,
    pub agreed_fee: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub assigned_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Bid {
    pub id: Uuid,
    pub case_id: Uuid,
    pub lawyer_id: Uuid,
    pub amount: i64,
    pub fee_type: FeeType,
    pub estimated_days: i32,
    pub proposal: String,
    pub status: BidStatus,
    pub feedback: Option<String>,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_happy_path_transitions() {
        let path = [
            CaseStatus::Draft,
            CaseStatus::Posted,
            CaseStatus::Bidding,
            CaseStatus::Assigned,
            CaseStatus::InProgress,
            CaseStatus::CaseClearPending,
            CaseStatus::Completed,
        ];
        for pair in path.windows(2) {
            assert!(pair[0].can_transition_to(pair[1]), "{:?} -> {:?}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_case_terminal_states_are_sinks() {
        for from in [CaseStatus::Completed, CaseStatus::Cancelled] {
            assert!(!from.can_transition_to(CaseStatus::InProgress));
            assert!(!from.can_transition_to(CaseStatus::Disputed));
            assert!(!from.can_transition_to(CaseStatus::Cancelled));
        }
    }

    #[test]
    fn test_case_dispute_reachable_from_active_states() {
        for from in [
            CaseStatus::Posted,
            CaseStatus::Bidding,
            CaseStatus::Assigned,
            CaseStatus::InProgress,
            CaseStatus::CaseClearPending,
        ] {
            assert!(from.can_transition_to(CaseStatus::Disputed));
            assert!(from.can_transition_to(CaseStatus::Cancelled));
        }
    }

    #[test]
    fn test_case_dispute_is_recoverable() {
        assert!(CaseStatus::Disputed.can_transition_to(CaseStatus::Completed));
        assert!(CaseStatus::Disputed.can_transition_to(CaseStatus::InProgress));
        assert!(CaseStatus::Disputed.can_transition_to(CaseStatus::Cancelled));
    }

    #[test]
    fn test_case_no_state_skips() {
        assert!(!CaseStatus::Draft.can_transition_to(CaseStatus::Assigned));
        assert!(!CaseStatus::Posted.can_transition_to(CaseStatus::Completed));
        assert!(!CaseStatus::Assigned.can_transition_to(CaseStatus::Completed));
    }

    #[test]
    fn test_only_open_cases_accept_assignment() {
        // Bid acceptance re-checks this under the case row lock, so a case
        // cancelled between the service check and the transaction stays
        // cancelled.
        assert!(CaseStatus::Bidding.can_transition_to(CaseStatus::Assigned));
        for from in [
            CaseStatus::Draft,
            CaseStatus::Posted,
            CaseStatus::Assigned,
            CaseStatus::InProgress,
            CaseStatus::Completed,
            CaseStatus::Disputed,
            CaseStatus::Cancelled,
        ] {
            assert!(!from.can_transition_to(CaseStatus::Assigned), "{:?}", from);
        }
    }

    #[test]
    fn test_bid_transitions() {
        assert!(BidStatus::Pending.can_transition_to(BidStatus::Accepted));
        assert!(BidStatus::Pending.can_transition_to(BidStatus::Rejected));
        assert!(BidStatus::Pending.can_transition_to(BidStatus::Withdrawn));
        assert!(!BidStatus::Accepted.can_transition_to(BidStatus::Rejected));
        assert!(!BidStatus::Rejected.can_transition_to(BidStatus::Accepted));
        assert!(!BidStatus::Withdrawn.can_transition_to(BidStatus::Pending));
    }
}
