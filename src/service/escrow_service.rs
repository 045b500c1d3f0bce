// service/escrow_service.rs
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    config::Config,
    db::{
        casedb::CaseExt,
        db::DBClient,
        escrowdb::{ConfirmOutcome, EscrowExt, ReleaseTerms},
    },
    models::{casemodel::CaseStatus, escrowmodel::*},
    service::{error::ServiceError, notification_service::NotificationService},
    utils::currency::percent_of,
};

/// Fraction of the agreed fee held in escrow.
const ESCROW_PERCENT: i64 = 50;

#[derive(Debug, Clone)]
pub struct EscrowService {
    db_client: Arc<DBClient>,
    notification_service: Arc<NotificationService>,
    release_terms: ReleaseTerms,
}

impl EscrowService {
    pub fn new(
        db_client: Arc<DBClient>,
        notification_service: Arc<NotificationService>,
        config: &Config,
    ) -> Self {
        Self {
            db_client,
            notification_service,
            release_terms: ReleaseTerms {
                fee_percent: config.platform_fee_percent,
                hold_days: config.earnings_hold_days,
            },
        }
    }

    /// Create the custody record for an assigned case. A separate explicit
    /// step after bid acceptance, so payment capture can lag assignment.
    pub async fn create_escrow(&self, case_id: Uuid, client_id: Uuid) -> Result<Escrow, ServiceError> {
        let case = self
            .db_client
            .get_case_by_id(case_id)
            .await?
            .ok_or(ServiceError::CaseNotFound(case_id))?;

        if case.client_id != client_id {
            return Err(ServiceError::UnauthorizedCaseAccess(client_id, case_id));
        }
        let (Some(lawyer_id), Some(agreed_fee)) = (case.lawyer_id, case.agreed_fee) else {
            return Err(ServiceError::InvalidCaseStatus(case_id, case.status));
        };
        if self.db_client.get_escrow_by_case_id(case_id).await?.is_some() {
            return Err(ServiceError::Validation(
                "An escrow already exists for this case".to_string(),
            ));
        }

        let escrow_amount = percent_of(agreed_fee, ESCROW_PERCENT);
        let escrow = self
            .db_client
            .create_escrow(case_id, case.client_id, lawyer_id, agreed_fee, escrow_amount)
            .await?;

        Ok(escrow)
    }

    /// Record the external payment confirmation: `PendingPayment -> Funded`,
    /// case forced to `InProgress`.
    pub async fn fund_escrow(
        &self,
        case_id: Uuid,
        client_id: Uuid,
        payment_reference: String,
    ) -> Result<Escrow, ServiceError> {
        let escrow = self.get_escrow(case_id).await?;
        if escrow.client_id != client_id {
            return Err(ServiceError::UnauthorizedCaseAccess(client_id, case_id));
        }

        let funded = self
            .db_client
            .fund_escrow(case_id, payment_reference)
            .await?
            .ok_or(ServiceError::InvalidEscrowStatus(case_id, escrow.status))?;

        self.notification_service.notify_escrow_funded(&funded).await;

        Ok(funded)
    }

    pub async fn lawyer_confirm_case_clear(
        &self,
        case_id: Uuid,
        lawyer_id: Uuid,
    ) -> Result<Escrow, ServiceError> {
        let escrow = self.get_escrow(case_id).await?;
        if escrow.lawyer_id != lawyer_id {
            return Err(ServiceError::UnauthorizedCaseAccess(lawyer_id, case_id));
        }
        self.confirm(case_id, ConfirmingParty::Lawyer).await
    }

    pub async fn client_confirm_case_clear(
        &self,
        case_id: Uuid,
        client_id: Uuid,
    ) -> Result<Escrow, ServiceError> {
        let escrow = self.get_escrow(case_id).await?;
        if escrow.client_id != client_id {
            return Err(ServiceError::UnauthorizedCaseAccess(client_id, case_id));
        }
        self.confirm(case_id, ConfirmingParty::Client).await
    }

    /// Whichever confirmation observes both flags true performs the release;
    /// the observation, the transition and the earning credit share one
    /// row-locked transaction.
    async fn confirm(&self, case_id: Uuid, party: ConfirmingParty) -> Result<Escrow, ServiceError> {
        match self
            .db_client
            .confirm_case_clear(case_id, party, self.release_terms)
            .await?
        {
            ConfirmOutcome::NotFound => Err(ServiceError::EscrowNotFound(case_id)),
            ConfirmOutcome::NotFunded(status) => {
                Err(ServiceError::InvalidEscrowStatus(case_id, status))
            }
            ConfirmOutcome::AlreadyConfirmed => Err(ServiceError::Validation(
                "Case clearance already confirmed by this party".to_string(),
            )),
            ConfirmOutcome::Confirmed(escrow) => Ok(escrow),
            ConfirmOutcome::Released { escrow, earning, .. } => {
                tracing::info!(
                    "Escrow for case {} released; earning {} credited net {}",
                    case_id,
                    earning.id,
                    earning.net_amount
                );
                self.notification_service.notify_escrow_released(&escrow).await;
                Ok(escrow)
            }
        }
    }

    /// Either party may dispute a funded escrow; the case follows.
    pub async fn raise_dispute(&self, case_id: Uuid, caller_id: Uuid) -> Result<Escrow, ServiceError> {
        let escrow = self.get_escrow(case_id).await?;
        if escrow.client_id != caller_id && escrow.lawyer_id != caller_id {
            return Err(ServiceError::UnauthorizedCaseAccess(caller_id, case_id));
        }

        let (escrow, _case) = self
            .db_client
            .dispute_escrow(case_id)
            .await?
            .ok_or(ServiceError::InvalidEscrowStatus(case_id, escrow.status))?;

        self.notification_service
            .notify_dispute_raised(&escrow, caller_id)
            .await;

        Ok(escrow)
    }

    /// Admin-only split resolution. The two percentages must sum to 100; the
    /// split amounts partition `escrow_amount` exactly.
    pub async fn resolve_dispute(
        &self,
        case_id: Uuid,
        client_percent: i32,
        lawyer_percent: i32,
        is_admin: bool,
    ) -> Result<Escrow, ServiceError> {
        if !is_admin {
            return Err(ServiceError::AdminRequired);
        }
        if client_percent < 0 || lawyer_percent < 0 || client_percent + lawyer_percent != 100 {
            return Err(ServiceError::Validation(
                "Dispute split percentages must sum to 100".to_string(),
            ));
        }

        let escrow = self.get_escrow(case_id).await?;

        let release_amount = percent_of(escrow.escrow_amount, lawyer_percent as i64);
        let refund_amount = escrow.escrow_amount - release_amount;

        let (escrow, _case) = self
            .db_client
            .resolve_escrow_dispute(
                case_id,
                client_percent,
                lawyer_percent,
                refund_amount,
                release_amount,
                self.release_terms,
            )
            .await?
            .ok_or(ServiceError::InvalidEscrowStatus(case_id, escrow.status))?;

        tracing::info!(
            "Dispute on case {} resolved: {} released, {} refunded",
            case_id,
            release_amount,
            refund_amount
        );
        self.notification_service.notify_escrow_released(&escrow).await;

        Ok(escrow)
    }

    /// Admin-only full refund; the case is cancelled.
    pub async fn refund_escrow(&self, case_id: Uuid, is_admin: bool) -> Result<Escrow, ServiceError> {
        if !is_admin {
            return Err(ServiceError::AdminRequired);
        }

        let escrow = self.get_escrow(case_id).await?;

        let (escrow, case) = self
            .db_client
            .refund_escrow(case_id)
            .await?
            .ok_or(ServiceError::InvalidEscrowStatus(case_id, escrow.status))?;

        debug_assert_eq!(case.status, CaseStatus::Cancelled);
        tracing::info!(
            "Escrow for case {} refunded: {:?}",
            case_id,
            escrow.refund_amount
        );

        Ok(escrow)
    }

    pub async fn get_escrow(&self, case_id: Uuid) -> Result<Escrow, ServiceError> {
        self.db_client
            .get_escrow_by_case_id(case_id)
            .await?
            .ok_or(ServiceError::EscrowNotFound(case_id))
    }
}
