// db/casedb.rs
use async_trait::async_trait;
use sqlx::Error;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::casemodel::*;

pub const CASE_COLUMNS: &str = r#"
    id, client_id, lawyer_id, title, description, legal_area, service_type,
    budget_min, budget_max, urgency, location, status, agreed_fee,
    created_at, updated_at, assigned_at, completed_at
"#;

const BID_COLUMNS: &str = r#"
    id, case_id, lawyer_id, amount, fee_type, estimated_days, proposal,
    status, feedback, created_at, resolved_at
"#;

/// Outcome of the transactional bid acceptance.
#[derive(Debug)]
pub enum AcceptBidOutcome {
    /// The bid won; every other pending bid on the case was rejected and the
    /// case was assigned in the same transaction.
    Accepted { bid: Bid, case: Case },
    /// The bid was no longer pending when the row lock was taken.
    NotPending(BidStatus),
    /// The case left the open states before the lock was taken, e.g. a
    /// concurrent cancellation.
    CaseNotOpen(CaseStatus),
}

#[async_trait]
pub trait CaseExt {
    async fn create_case(
        &self,
        client_id: Uuid,
        title: String,
        description: String,
        legal_area: LegalArea,
        service_type: ServiceType,
        budget_min: i64,
        budget_max: i64,
        urgency: CaseUrgency,
        location: Option<String>,
    ) -> Result<Case, Error>;

    async fn get_case_by_id(&self, case_id: Uuid) -> Result<Option<Case>, Error>;

    async fn list_cases_by_client(&self, client_id: Uuid) -> Result<Vec<Case>, Error>;

    async fn list_open_cases(&self) -> Result<Vec<Case>, Error>;

    /// The single status mutation primitive. Stamps `assigned_at` /
    /// `completed_at` as a side effect of entering those states.
    async fn update_case_status(&self, case_id: Uuid, status: CaseStatus) -> Result<Case, Error>;

    async fn assign_lawyer(
        &self,
        case_id: Uuid,
        lawyer_id: Uuid,
        agreed_fee: i64,
    ) -> Result<Case, Error>;

    async fn create_bid(
        &self,
        case_id: Uuid,
        lawyer_id: Uuid,
        amount: i64,
        fee_type: FeeType,
        estimated_days: i32,
        proposal: String,
    ) -> Result<Bid, Error>;

    async fn get_bid_by_id(&self, bid_id: Uuid) -> Result<Option<Bid>, Error>;

    /// Newest first.
    async fn list_bids_for_case(&self, case_id: Uuid) -> Result<Vec<Bid>, Error>;

    async fn list_bids_by_lawyer(&self, lawyer_id: Uuid) -> Result<Vec<Bid>, Error>;

    async fn has_pending_bid(&self, case_id: Uuid, lawyer_id: Uuid) -> Result<bool, Error>;

    async fn update_bid_status(
        &self,
        bid_id: Uuid,
        status: BidStatus,
        feedback: Option<String>,
    ) -> Result<Bid, Error>;

    /// Accept one bid, reject every other pending bid on the case and assign
    /// the lawyer, all inside one transaction. The case row is locked before
    /// the bid row, and both states are re-checked under their locks.
    async fn accept_bid_tx(&self, bid_id: Uuid) -> Result<Option<AcceptBidOutcome>, Error>;
}

#[async_trait]
impl CaseExt for DBClient {
    async fn create_case(
        &self,
        client_id: Uuid,
        title: String,
        description: String,
        legal_area: LegalArea,
        service_type: ServiceType,
        budget_min: i64,
        budget_max: i64,
        urgency: CaseUrgency,
        location: Option<String>,
    ) -> Result<Case, Error> {
        sqlx::query_as::<_, Case>(&format!(
            r#"
            INSERT INTO cases
                (client_id, title, description, legal_area, service_type,
                 budget_min, budget_max, urgency, location)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {CASE_COLUMNS}
            "#
        ))
        .bind(client_id)
        .bind(title)
        .bind(description)
        .bind(legal_area)
        .bind(service_type)
        .bind(budget_min)
        .bind(budget_max)
        .bind(urgency)
        .bind(location)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_case_by_id(&self, case_id: Uuid) -> Result<Option<Case>, Error> {
        sqlx::query_as::<_, Case>(&format!("SELECT {CASE_COLUMNS} FROM cases WHERE id = $1"))
            .bind(case_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn list_cases_by_client(&self, client_id: Uuid) -> Result<Vec<Case>, Error> {
        sqlx::query_as::<_, Case>(&format!(
            "SELECT {CASE_COLUMNS} FROM cases WHERE client_id = $1 ORDER BY created_at DESC"
        ))
        .bind(client_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn list_open_cases(&self) -> Result<Vec<Case>, Error> {
        sqlx::query_as::<_, Case>(&format!(
            r#"
            SELECT {CASE_COLUMNS} FROM cases
            WHERE status IN ('posted', 'matching', 'bidding')
            ORDER BY created_at DESC
            "#
        ))
        .fetch_all(&self.pool)
        .await
    }

    async fn update_case_status(&self, case_id: Uuid, status: CaseStatus) -> Result<Case, Error> {
        sqlx::query_as::<_, Case>(&format!(
            r#"
            UPDATE cases
            SET status = $2,
                assigned_at = CASE WHEN $2 = 'assigned'::case_status
                    THEN NOW() ELSE assigned_at END,
                completed_at = CASE WHEN $2 = 'completed'::case_status
                    THEN NOW() ELSE completed_at END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {CASE_COLUMNS}
            "#
        ))
        .bind(case_id)
        .bind(status)
        .fetch_one(&self.pool)
        .await
    }

    async fn assign_lawyer(
        &self,
        case_id: Uuid,
        lawyer_id: Uuid,
        agreed_fee: i64,
    ) -> Result<Case, Error> {
        sqlx::query_as::<_, Case>(&format!(
            r#"
            UPDATE cases
            SET lawyer_id = $2,
                agreed_fee = $3,
                status = 'assigned',
                assigned_at = NOW(),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {CASE_COLUMNS}
            "#
        ))
        .bind(case_id)
        .bind(lawyer_id)
        .bind(agreed_fee)
        .fetch_one(&self.pool)
        .await
    }

    async fn create_bid(
        &self,
        case_id: Uuid,
        lawyer_id: Uuid,
        amount: i64,
        fee_type: FeeType,
        estimated_days: i32,
        proposal: String,
    ) -> Result<Bid, Error> {
        sqlx::query_as::<_, Bid>(&format!(
            r#"
            INSERT INTO bids (case_id, lawyer_id, amount, fee_type, estimated_days, proposal)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {BID_COLUMNS}
            "#
        ))
        .bind(case_id)
        .bind(lawyer_id)
        .bind(amount)
        .bind(fee_type)
        .bind(estimated_days)
        .bind(proposal)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_bid_by_id(&self, bid_id: Uuid) -> Result<Option<Bid>, Error> {
        sqlx::query_as::<_, Bid>(&format!("SELECT {BID_COLUMNS} FROM bids WHERE id = $1"))
            .bind(bid_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn list_bids_for_case(&self, case_id: Uuid) -> Result<Vec<Bid>, Error> {
        sqlx::query_as::<_, Bid>(&format!(
            "SELECT {BID_COLUMNS} FROM bids WHERE case_id = $1 ORDER BY created_at DESC"
        ))
        .bind(case_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn list_bids_by_lawyer(&self, lawyer_id: Uuid) -> Result<Vec<Bid>, Error> {
        sqlx::query_as::<_, Bid>(&format!(
            "SELECT {BID_COLUMNS} FROM bids WHERE lawyer_id = $1 ORDER BY created_at DESC"
        ))
        .bind(lawyer_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn has_pending_bid(&self, case_id: Uuid, lawyer_id: Uuid) -> Result<bool, Error> {
        let row: (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM bids
                WHERE case_id = $1 AND lawyer_id = $2 AND status = 'pending'
            )
            "#,
        )
        .bind(case_id)
        .bind(lawyer_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.0)
    }

    async fn update_bid_status(
        &self,
        bid_id: Uuid,
        status: BidStatus,
        feedback: Option<String>,
    ) -> Result<Bid, Error> {
        sqlx::query_as::<_, Bid>(&format!(
            r#"
            UPDATE bids
            SET status = $2, feedback = COALESCE($3, feedback), resolved_at = NOW()
            WHERE id = $1
            RETURNING {BID_COLUMNS}
            "#
        ))
        .bind(bid_id)
        .bind(status)
        .bind(feedback)
        .fetch_one(&self.pool)
        .await
    }

    async fn accept_bid_tx(&self, bid_id: Uuid) -> Result<Option<AcceptBidOutcome>, Error> {
        let mut tx = self.pool.begin().await?;

        // Unlocked read just to find the case; the authoritative checks run
        // below under the row locks.
        let bid = sqlx::query_as::<_, Bid>(&format!(
            "SELECT {BID_COLUMNS} FROM bids WHERE id = $1"
        ))
        .bind(bid_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(bid) = bid else {
            return Ok(None);
        };

        // Case lock first, bid lock second. Acceptances racing on sibling
        // bids take the locks in the same order and serialize on the case.
        let case = sqlx::query_as::<_, Case>(&format!(
            "SELECT {CASE_COLUMNS} FROM cases WHERE id = $1 FOR UPDATE"
        ))
        .bind(bid.case_id)
        .fetch_one(&mut *tx)
        .await?;

        if !case.status.can_transition_to(CaseStatus::Assigned) {
            return Ok(Some(AcceptBidOutcome::CaseNotOpen(case.status)));
        }

        let bid = sqlx::query_as::<_, Bid>(&format!(
            "SELECT {BID_COLUMNS} FROM bids WHERE id = $1 FOR UPDATE"
        ))
        .bind(bid_id)
        .fetch_one(&mut *tx)
        .await?;

        if bid.status != BidStatus::Pending {
            return Ok(Some(AcceptBidOutcome::NotPending(bid.status)));
        }

        let accepted = sqlx::query_as::<_, Bid>(&format!(
            r#"
            UPDATE bids SET status = 'accepted', resolved_at = NOW()
            WHERE id = $1
            RETURNING {BID_COLUMNS}
            "#
        ))
        .bind(bid_id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE bids SET status = 'rejected', resolved_at = NOW()
            WHERE case_id = $1 AND id <> $2 AND status = 'pending'
            "#,
        )
        .bind(bid.case_id)
        .bind(bid_id)
        .execute(&mut *tx)
        .await?;

        let case = sqlx::query_as::<_, Case>(&format!(
            r#"
            UPDATE cases
            SET lawyer_id = $2,
                agreed_fee = $3,
                status = 'assigned',
                assigned_at = NOW(),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {CASE_COLUMNS}
            "#
        ))
        .bind(bid.case_id)
        .bind(bid.lawyer_id)
        .bind(bid.amount)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Some(AcceptBidOutcome::Accepted { bid: accepted, case }))
    }
}
