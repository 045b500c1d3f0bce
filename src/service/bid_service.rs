// service/bid_service.rs
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    db::{
        casedb::{AcceptBidOutcome, CaseExt},
        db::{constraint_violated, DBClient},
    },
    dtos::casedtos::CreateBidDto,
    models::casemodel::*,
    service::{error::ServiceError, notification_service::NotificationService},
    utils::currency::to_minor_units,
};

#[derive(Debug, Clone)]
pub struct BidService {
    db_client: Arc<DBClient>,
    notification_service: Arc<NotificationService>,
}

impl BidService {
    pub fn new(db_client: Arc<DBClient>, notification_service: Arc<NotificationService>) -> Self {
        Self {
            db_client,
            notification_service,
        }
    }

    pub async fn create_bid(
        &self,
        lawyer_id: Uuid,
        case_id: Uuid,
        data: CreateBidDto,
    ) -> Result<Bid, ServiceError> {
        let case = self
            .db_client
            .get_case_by_id(case_id)
            .await?
            .ok_or(ServiceError::CaseNotFound(case_id))?;

        if case.client_id == lawyer_id {
            return Err(ServiceError::Validation(
                "A client cannot bid on their own case".to_string(),
            ));
        }
        if !matches!(
            case.status,
            CaseStatus::Posted | CaseStatus::Matching | CaseStatus::Bidding
        ) {
            return Err(ServiceError::InvalidCaseStatus(case_id, case.status));
        }
        if self.db_client.has_pending_bid(case_id, lawyer_id).await? {
            return Err(ServiceError::Validation(
                "You already have a pending bid on this case".to_string(),
            ));
        }

        let amount = to_minor_units(data.amount);
        let bid = match self
            .db_client
            .create_bid(
                case_id,
                lawyer_id,
                amount,
                data.fee_type,
                data.estimated_days,
                data.proposal,
            )
            .await
        {
            // Two requests can pass the pending-bid check together; the
            // partial unique index catches the loser.
            Err(e) if constraint_violated(&e, "idx_bids_one_pending") => {
                return Err(ServiceError::Validation(
                    "You already have a pending bid on this case".to_string(),
                ))
            }
            other => other?,
        };

        // A first bid moves the case out of posting/matching.
        if case.status != CaseStatus::Bidding {
            self.db_client
                .update_case_status(case_id, CaseStatus::Bidding)
                .await?;
        }

        self.notification_service
            .notify_bid_received(&case, &bid)
            .await;

        Ok(bid)
    }

    pub async fn withdraw_bid(&self, bid_id: Uuid, lawyer_id: Uuid) -> Result<Bid, ServiceError> {
        let bid = self
            .db_client
            .get_bid_by_id(bid_id)
            .await?
            .ok_or(ServiceError::BidNotFound(bid_id))?;

        if bid.lawyer_id != lawyer_id {
            return Err(ServiceError::UnauthorizedBidAccess(lawyer_id, bid_id));
        }
        if !bid.status.can_transition_to(BidStatus::Withdrawn) {
            return Err(ServiceError::InvalidBidStatus(bid_id, bid.status));
        }

        Ok(self
            .db_client
            .update_bid_status(bid_id, BidStatus::Withdrawn, None)
            .await?)
    }

    /// Accept this bid, reject every other pending bid on the case and assign
    /// the lawyer at the bid amount, atomically. Escrow creation is a
    /// separate explicit step, decoupling acceptance from payment capture.
    pub async fn accept_bid(
        &self,
        bid_id: Uuid,
        client_id: Uuid,
    ) -> Result<(Bid, Case), ServiceError> {
        let bid = self
            .db_client
            .get_bid_by_id(bid_id)
            .await?
            .ok_or(ServiceError::BidNotFound(bid_id))?;

        let case = self
            .db_client
            .get_case_by_id(bid.case_id)
            .await?
            .ok_or(ServiceError::CaseNotFound(bid.case_id))?;

        if case.client_id != client_id {
            return Err(ServiceError::UnauthorizedCaseAccess(client_id, case.id));
        }
        if !case.status.can_transition_to(CaseStatus::Assigned) {
            return Err(ServiceError::InvalidCaseStatus(case.id, case.status));
        }
        if bid.amount < case.budget_min || bid.amount > case.budget_max {
            return Err(ServiceError::Validation(format!(
                "Bid amount {} is outside the budget range [{}, {}]",
                bid.amount, case.budget_min, case.budget_max
            )));
        }

        let outcome = self
            .db_client
            .accept_bid_tx(bid_id)
            .await?
            .ok_or(ServiceError::BidNotFound(bid_id))?;

        match outcome {
            AcceptBidOutcome::NotPending(status) => {
                Err(ServiceError::InvalidBidStatus(bid_id, status))
            }
            AcceptBidOutcome::CaseNotOpen(status) => {
                Err(ServiceError::InvalidCaseStatus(case.id, status))
            }
            AcceptBidOutcome::Accepted { bid, case } => {
                self.notification_service
                    .notify_bid_accepted(&case, &bid)
                    .await;
                Ok((bid, case))
            }
        }
    }

    pub async fn reject_bid(
        &self,
        bid_id: Uuid,
        client_id: Uuid,
        feedback: Option<String>,
    ) -> Result<Bid, ServiceError> {
        let bid = self
            .db_client
            .get_bid_by_id(bid_id)
            .await?
            .ok_or(ServiceError::BidNotFound(bid_id))?;

        let case = self
            .db_client
            .get_case_by_id(bid.case_id)
            .await?
            .ok_or(ServiceError::CaseNotFound(bid.case_id))?;

        if case.client_id != client_id {
            return Err(ServiceError::UnauthorizedCaseAccess(client_id, case.id));
        }
        if !bid.status.can_transition_to(BidStatus::Rejected) {
            return Err(ServiceError::InvalidBidStatus(bid_id, bid.status));
        }

        let bid = self
            .db_client
            .update_bid_status(bid_id, BidStatus::Rejected, feedback)
            .await?;

        self.notification_service.notify_bid_rejected(&bid).await;

        Ok(bid)
    }

    /// Newest first; acceptance is always an explicit client action.
    pub async fn list_bids_for_case(
        &self,
        case_id: Uuid,
        caller_id: Uuid,
    ) -> Result<Vec<Bid>, ServiceError> {
        let case = self
            .db_client
            .get_case_by_id(case_id)
            .await?
            .ok_or(ServiceError::CaseNotFound(case_id))?;

        if case.client_id != caller_id && case.lawyer_id != Some(caller_id) {
            return Err(ServiceError::UnauthorizedCaseAccess(caller_id, case_id));
        }

        Ok(self.db_client.list_bids_for_case(case_id).await?)
    }

    pub async fn list_bids_by_lawyer(&self, lawyer_id: Uuid) -> Result<Vec<Bid>, ServiceError> {
        Ok(self.db_client.list_bids_by_lawyer(lawyer_id).await?)
    }
}
