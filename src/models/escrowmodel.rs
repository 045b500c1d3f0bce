// models/escrowmodel.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "escrow_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EscrowStatus {
    PendingPayment,
    Funded,
    Released,
    Refunded,
    Disputed,
}

impl EscrowStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, EscrowStatus::Released | EscrowStatus::Refunded)
    }

    pub fn can_transition_to(&self, to: EscrowStatus) -> bool {
        matches!(
            (self, to),
            (EscrowStatus::PendingPayment, EscrowStatus::Funded)
                | (EscrowStatus::PendingPayment, EscrowStatus::Refunded)
                | (EscrowStatus::Funded, EscrowStatus::Released)
                | (EscrowStatus::Funded, EscrowStatus::Refunded)
                | (EscrowStatus::Funded, EscrowStatus::Disputed)
                | (EscrowStatus::Disputed, EscrowStatus::Released)
                | (EscrowStatus::Disputed, EscrowStatus::Refunded)
        )
    }
}

/// Which side of the escrow is confirming case clearance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfirmingParty {
    Client,
    Lawyer,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Escrow {
    pub id: Uuid,
    pub case_id: Uuid,
    pub client_id: Uuid,
    pub lawyer_id: Uuid,
    pub total_amount: i64,
    pub escrow_amount: i64,
    pub status: EscrowStatus,
    pub client_confirmed: bool,
    pub lawyer_confirmed: bool,
    pub client_confirmed_at: Option<DateTime<Utc>>,
    pub lawyer_confirmed_at: Option<DateTime<Utc>>,
    pub release_amount: Option<i64>,
    pub refund_amount: Option<i64>,
    pub client_split_percent: Option<i32>,
    pub lawyer_split_percent: Option<i32>,
    pub payment_reference: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escrow_happy_path() {
        assert!(EscrowStatus::PendingPayment.can_transition_to(EscrowStatus::Funded));
        assert!(EscrowStatus::Funded.can_transition_to(EscrowStatus::Released));
    }

    #[test]
    fn test_escrow_dispute_paths() {
        assert!(EscrowStatus::Funded.can_transition_to(EscrowStatus::Disputed));
        assert!(EscrowStatus::Disputed.can_transition_to(EscrowStatus::Released));
        assert!(EscrowStatus::Disputed.can_transition_to(EscrowStatus::Refunded));
    }

    #[test]
    fn test_escrow_release_requires_funding() {
        assert!(!EscrowStatus::PendingPayment.can_transition_to(EscrowStatus::Released));
        assert!(!EscrowStatus::PendingPayment.can_transition_to(EscrowStatus::Disputed));
    }

    #[test]
    fn test_escrow_release_is_irreversible() {
        for to in [
            EscrowStatus::PendingPayment,
            EscrowStatus::Funded,
            EscrowStatus::Refunded,
            EscrowStatus::Disputed,
        ] {
            assert!(!EscrowStatus::Released.can_transition_to(to));
            assert!(!EscrowStatus::Refunded.can_transition_to(to));
        }
    }
}
