// service/earnings_service.rs
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::{
    config::Config,
    db::{
        db::DBClient,
        earningdb::{EarningExt, PayoutOutcome},
    },
    dtos::earningdtos::RequestPayoutDto,
    models::earningmodel::*,
    service::{error::ServiceError, notification_service::NotificationService},
    utils::currency,
};

#[derive(Debug, Clone)]
pub struct EarningsService {
    db_client: Arc<DBClient>,
    notification_service: Arc<NotificationService>,
    platform_fee_percent: i64,
    earnings_hold_days: i64,
    min_payout_amount: i64,
}

impl EarningsService {
    pub fn new(
        db_client: Arc<DBClient>,
        notification_service: Arc<NotificationService>,
        config: &Config,
    ) -> Self {
        Self {
            db_client,
            notification_service,
            platform_fee_percent: config.platform_fee_percent,
            earnings_hold_days: config.earnings_hold_days,
            min_payout_amount: config.min_payout_amount,
        }
    }

    /// Credit one financial event to a lawyer. Fee and hold window are fixed
    /// at creation; the wallet's pending balance moves by the net amount in
    /// the same transaction.
    pub async fn record_earning(
        &self,
        lawyer_id: Uuid,
        amount: i64,
        earning_type: EarningType,
        case_id: Option<Uuid>,
        consultation_id: Option<Uuid>,
    ) -> Result<Earning, ServiceError> {
        if amount <= 0 {
            return Err(ServiceError::Validation(
                "Earning amount must be positive".to_string(),
            ));
        }

        let platform_fee = currency::platform_fee(amount, self.platform_fee_percent);
        let net_amount = amount - platform_fee;
        let available_at = Utc::now() + Duration::days(self.earnings_hold_days);

        let earning = self
            .db_client
            .record_earning(
                lawyer_id,
                case_id,
                consultation_id,
                earning_type,
                amount,
                platform_fee,
                net_amount,
                available_at,
            )
            .await?;

        tracing::info!(
            "Recorded {:?} earning {} for lawyer {}: gross {}, net {}",
            earning_type,
            earning.id,
            lawyer_id,
            amount,
            net_amount
        );

        Ok(earning)
    }

    /// `Pending -> Available` once the hold has elapsed. The engine defines
    /// only the transition; the clock is an external trigger's problem.
    pub async fn release_pending_earning(&self, earning_id: Uuid) -> Result<Earning, ServiceError> {
        if let Some(earning) = self.db_client.release_pending_earning(earning_id).await? {
            return Ok(earning);
        }

        // The conditional update matched nothing; work out why.
        let earning = self
            .db_client
            .get_earning_by_id(earning_id)
            .await?
            .ok_or(ServiceError::EarningNotFound(earning_id))?;

        if earning.status != EarningStatus::Pending {
            return Err(ServiceError::InvalidEarningStatus(earning_id, earning.status));
        }
        Err(ServiceError::Validation(format!(
            "Earning is on hold until {}",
            earning.available_at
        )))
    }

    /// Sweep every due pending earning. Invoked by the periodic release job.
    pub async fn release_due_earnings(&self) -> Result<usize, ServiceError> {
        let due = self.db_client.list_due_earning_ids().await?;
        let mut released = 0;
        for earning_id in due {
            // Each release is its own transaction; a lost race with a
            // concurrent sweep is a no-op, not a double release.
            if self.db_client.release_pending_earning(earning_id).await?.is_some() {
                released += 1;
            }
        }
        if released > 0 {
            tracing::info!("Released {} due earnings", released);
        }
        Ok(released)
    }

    pub async fn hold_earning(&self, earning_id: Uuid, is_admin: bool) -> Result<Earning, ServiceError> {
        if !is_admin {
            return Err(ServiceError::AdminRequired);
        }
        self.db_client
            .set_earning_hold(earning_id, true)
            .await?
            .ok_or(ServiceError::EarningNotFound(earning_id))
    }

    pub async fn unhold_earning(&self, earning_id: Uuid, is_admin: bool) -> Result<Earning, ServiceError> {
        if !is_admin {
            return Err(ServiceError::AdminRequired);
        }
        self.db_client
            .set_earning_hold(earning_id, false)
            .await?
            .ok_or(ServiceError::EarningNotFound(earning_id))
    }

    pub async fn get_wallet(&self, lawyer_id: Uuid) -> Result<LawyerWallet, ServiceError> {
        Ok(self.db_client.get_or_create_wallet(lawyer_id).await?)
    }

    pub async fn list_earnings(&self, lawyer_id: Uuid) -> Result<Vec<Earning>, ServiceError> {
        Ok(self.db_client.list_earnings(lawyer_id).await?)
    }

    pub async fn get_earnings_summary(
        &self,
        lawyer_id: Uuid,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<EarningsSummary, ServiceError> {
        Ok(self.db_client.earnings_summary(lawyer_id, from, to).await?)
    }

    /// Places an optimistic hold on the available balance and creates the
    /// pending payout; the hold is refunded on cancel or failure.
    pub async fn request_payout(
        &self,
        lawyer_id: Uuid,
        data: RequestPayoutDto,
    ) -> Result<PayoutRequest, ServiceError> {
        let amount = currency::to_minor_units(data.amount);

        if amount < self.min_payout_amount {
            return Err(ServiceError::Validation(format!(
                "Minimum payout amount is {}",
                self.min_payout_amount
            )));
        }

        let outcome = self
            .db_client
            .create_payout_request(
                lawyer_id,
                amount,
                data.method,
                data.account_name,
                data.account_number,
                data.bank_name,
            )
            .await?;

        match outcome {
            PayoutOutcome::Created(payout) => {
                tracing::info!("Payout {} requested for {}", payout.id, payout.amount);
                Ok(payout)
            }
            PayoutOutcome::WalletNotFound => Err(ServiceError::InsufficientFunds {
                requested: amount,
                available: 0,
            }),
            PayoutOutcome::InsufficientFunds { available } => {
                Err(ServiceError::InsufficientFunds {
                    requested: amount,
                    available,
                })
            }
        }
    }

    pub async fn cancel_payout_request(
        &self,
        payout_id: Uuid,
        lawyer_id: Uuid,
    ) -> Result<PayoutRequest, ServiceError> {
        let payout = self
            .db_client
            .get_payout_by_id(payout_id)
            .await?
            .ok_or(ServiceError::PayoutNotFound(payout_id))?;

        if payout.lawyer_id != lawyer_id {
            return Err(ServiceError::UnauthorizedPayoutAccess(lawyer_id, payout_id));
        }

        self.db_client
            .cancel_payout(payout_id)
            .await?
            .ok_or(ServiceError::InvalidPayoutStatus(payout_id, payout.status))
    }

    pub async fn mark_payout_processing(
        &self,
        payout_id: Uuid,
        is_admin: bool,
    ) -> Result<PayoutRequest, ServiceError> {
        if !is_admin {
            return Err(ServiceError::AdminRequired);
        }
        let payout = self
            .db_client
            .get_payout_by_id(payout_id)
            .await?
            .ok_or(ServiceError::PayoutNotFound(payout_id))?;

        self.db_client
            .mark_payout_processing(payout_id)
            .await?
            .ok_or(ServiceError::InvalidPayoutStatus(payout_id, payout.status))
    }

    /// Completion is reported with an externally-sourced transaction id; the
    /// engine never talks to the payment rail itself.
    pub async fn process_payout(
        &self,
        payout_id: Uuid,
        external_transaction_id: String,
        is_admin: bool,
    ) -> Result<PayoutRequest, ServiceError> {
        if !is_admin {
            return Err(ServiceError::AdminRequired);
        }
        let payout = self
            .db_client
            .get_payout_by_id(payout_id)
            .await?
            .ok_or(ServiceError::PayoutNotFound(payout_id))?;

        let payout = self
            .db_client
            .complete_payout(payout_id, external_transaction_id)
            .await?
            .ok_or(ServiceError::InvalidPayoutStatus(payout_id, payout.status))?;

        self.notification_service
            .notify_payout_completed(&payout)
            .await;

        Ok(payout)
    }

    pub async fn fail_payout(
        &self,
        payout_id: Uuid,
        reason: String,
        is_admin: bool,
    ) -> Result<PayoutRequest, ServiceError> {
        if !is_admin {
            return Err(ServiceError::AdminRequired);
        }
        let payout = self
            .db_client
            .get_payout_by_id(payout_id)
            .await?
            .ok_or(ServiceError::PayoutNotFound(payout_id))?;

        self.db_client
            .fail_payout(payout_id, reason)
            .await?
            .ok_or(ServiceError::InvalidPayoutStatus(payout_id, payout.status))
    }

    pub async fn list_payouts(&self, lawyer_id: Uuid) -> Result<Vec<PayoutRequest>, ServiceError> {
        Ok(self.db_client.list_payouts(lawyer_id).await?)
    }
}
