// service/notification_service.rs
//
// Notification collaborator: the engine's responsibility ends at recording
// the transition event; delivery (push, email) happens elsewhere. Recording
// is best-effort: the underlying operation has already committed by the time
// a notification is stored, so a failed insert is logged, never propagated.
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    db::db::DBClient,
    models::{casemodel::*, consultationmodel::Consultation, earningmodel::PayoutRequest, escrowmodel::Escrow},
};

#[derive(Debug, Clone)]
pub struct NotificationService {
    db_client: Arc<DBClient>,
}

impl NotificationService {
    pub fn new(db_client: Arc<DBClient>) -> Self {
        Self { db_client }
    }

    async fn store_notification(
        &self,
        user_id: Option<Uuid>,
        notification_type: &str,
        reference_id: Option<Uuid>,
        metadata: Option<serde_json::Value>,
        message: String,
    ) {
        let result = sqlx::query(
            r#"
            INSERT INTO notifications (user_id, notification_type, reference_id, metadata, message)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(user_id)
        .bind(notification_type)
        .bind(reference_id)
        .bind(metadata)
        .bind(message)
        .execute(&self.db_client.pool)
        .await;

        if let Err(e) = result {
            tracing::warn!("Failed to store {} notification: {}", notification_type, e);
        }
    }

    pub async fn notify_bid_received(&self, case: &Case, bid: &Bid) {
        tracing::info!("New bid {} on case {} for {}", bid.id, case.id, bid.amount);
        self.store_notification(
            Some(case.client_id),
            "bid_received",
            Some(bid.id),
            Some(serde_json::json!({ "case_id": case.id, "amount": bid.amount })),
            format!("New bid received on your case: {}", case.title),
        )
        .await
    }

    pub async fn notify_bid_accepted(&self, case: &Case, bid: &Bid) {
        tracing::info!("Bid {} accepted on case {}", bid.id, case.id);
        self.store_notification(
            Some(bid.lawyer_id),
            "bid_accepted",
            Some(bid.id),
            Some(serde_json::json!({ "case_id": case.id, "agreed_fee": bid.amount })),
            format!("Your bid was accepted for case: {}", case.title),
        )
        .await
    }

    pub async fn notify_bid_rejected(&self, bid: &Bid) {
        self.store_notification(
            Some(bid.lawyer_id),
            "bid_rejected",
            Some(bid.id),
            None,
            "Your bid was not selected".to_string(),
        )
        .await
    }

    pub async fn notify_escrow_funded(&self, escrow: &Escrow) {
        tracing::info!("Escrow for case {} funded", escrow.case_id);
        self.store_notification(
            Some(escrow.lawyer_id),
            "escrow_funded",
            Some(escrow.case_id),
            Some(serde_json::json!({ "escrow_amount": escrow.escrow_amount })),
            "Escrow has been funded; you may begin work".to_string(),
        )
        .await
    }

    pub async fn notify_escrow_released(&self, escrow: &Escrow) {
        tracing::info!(
            "Escrow for case {} released: {:?}",
            escrow.case_id,
            escrow.release_amount
        );
        self.store_notification(
            Some(escrow.lawyer_id),
            "escrow_released",
            Some(escrow.case_id),
            Some(serde_json::json!({ "release_amount": escrow.release_amount })),
            "Escrow released for your completed case".to_string(),
        )
        .await
    }

    pub async fn notify_dispute_raised(&self, escrow: &Escrow, raised_by: Uuid) {
        tracing::warn!("Dispute raised on case {} by {}", escrow.case_id, raised_by);
        let other_party = if raised_by == escrow.client_id {
            escrow.lawyer_id
        } else {
            escrow.client_id
        };
        self.store_notification(
            Some(other_party),
            "dispute_raised",
            Some(escrow.case_id),
            None,
            "A dispute was raised on your case".to_string(),
        )
        .await
    }

    pub async fn notify_payout_completed(&self, payout: &PayoutRequest) {
        tracing::info!("Payout {} completed for {}", payout.id, payout.amount);
        self.store_notification(
            Some(payout.lawyer_id),
            "payout_completed",
            Some(payout.id),
            Some(serde_json::json!({ "amount": payout.amount })),
            "Your payout has been processed".to_string(),
        )
        .await
    }

    pub async fn notify_consultation_booked(
        &self,
        consultation: &Consultation,
    ) {
        tracing::info!(
            "Consultation {} booked with lawyer {} at {}",
            consultation.id,
            consultation.lawyer_id,
            consultation.scheduled_at
        );
        self.store_notification(
            Some(consultation.lawyer_id),
            "consultation_booked",
            Some(consultation.id),
            Some(serde_json::json!({ "scheduled_at": consultation.scheduled_at })),
            "A new consultation was booked".to_string(),
        )
        .await
    }

    pub async fn notify_consultation_confirmed(
        &self,
        consultation: &Consultation,
    ) {
        self.store_notification(
            Some(consultation.client_id),
            "consultation_confirmed",
            Some(consultation.id),
            Some(serde_json::json!({ "scheduled_at": consultation.scheduled_at })),
            "Your consultation has been confirmed".to_string(),
        )
        .await
    }
}
