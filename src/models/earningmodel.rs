// models/earningmodel.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "earning_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EarningType {
    CasePayment,
    ConsultationFee,
    Bonus,
    RefundDeduction,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "earning_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EarningStatus {
    Pending,
    Available,
    Withdrawn,
    OnHold,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "payout_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PayoutStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    Cancelled,
}

impl PayoutStatus {
    pub fn can_transition_to(&self, to: PayoutStatus) -> bool {
        matches!(
            (self, to),
            (PayoutStatus::Pending, PayoutStatus::Processing)
                | (PayoutStatus::Pending, PayoutStatus::Completed)
                | (PayoutStatus::Pending, PayoutStatus::Failed)
                | (PayoutStatus::Pending, PayoutStatus::Cancelled)
                | (PayoutStatus::Processing, PayoutStatus::Completed)
                | (PayoutStatus::Processing, PayoutStatus::Failed)
        )
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "payout_method", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PayoutMethod {
    BankTransfer,
    MobileMoney,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Earning {
    pub id: Uuid,
    pub lawyer_id: Uuid,
    pub case_id: Option<Uuid>,
    pub consultation_id: Option<Uuid>,
    pub earning_type: EarningType,
    pub amount: i64,
    pub platform_fee: i64,
    pub net_amount: i64,
    pub status: EarningStatus,
    pub available_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub released_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct LawyerWallet {
    pub id: Uuid,
    pub lawyer_id: Uuid,
    pub available_balance: i64,
    pub pending_balance: i64,
    pub escrow_balance: i64,
    pub total_earned: i64,
    pub total_withdrawn: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PayoutRequest {
    pub id: Uuid,
    pub lawyer_id: Uuid,
    pub amount: i64,
    pub method: PayoutMethod,
    pub account_name: String,
    pub account_number: String,
    pub bank_name: Option<String>,
    pub status: PayoutStatus,
    pub external_transaction_id: Option<String>,
    pub failure_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct EarningsSummary {
    pub gross_amount: i64,
    pub total_fees: i64,
    pub net_amount: i64,
    pub pending_amount: i64,
    pub available_amount: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payout_live_transitions() {
        assert!(PayoutStatus::Pending.can_transition_to(PayoutStatus::Processing));
        assert!(PayoutStatus::Pending.can_transition_to(PayoutStatus::Cancelled));
        assert!(PayoutStatus::Processing.can_transition_to(PayoutStatus::Completed));
        assert!(PayoutStatus::Processing.can_transition_to(PayoutStatus::Failed));
    }

    #[test]
    fn test_payout_terminal_states() {
        for from in [PayoutStatus::Completed, PayoutStatus::Failed, PayoutStatus::Cancelled] {
            for to in [
                PayoutStatus::Pending,
                PayoutStatus::Processing,
                PayoutStatus::Completed,
                PayoutStatus::Failed,
                PayoutStatus::Cancelled,
            ] {
                assert!(!from.can_transition_to(to));
            }
        }
    }

    #[test]
    fn test_payout_cannot_cancel_once_processing() {
        assert!(!PayoutStatus::Processing.can_transition_to(PayoutStatus::Cancelled));
    }
}
