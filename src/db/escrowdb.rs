// db/escrowdb.rs
use async_trait::async_trait;
use chrono::{Duration, Utc};
use sqlx::Error;
use uuid::Uuid;

use super::casedb::CASE_COLUMNS;
use super::db::DBClient;
use super::earningdb::{insert_earning, NewEarning};
use crate::models::casemodel::Case;
use crate::models::earningmodel::{Earning, EarningType};
use crate::models::escrowmodel::*;
use crate::utils::currency::platform_fee;

const ESCROW_COLUMNS: &str = r#"
    id, case_id, client_id, lawyer_id, total_amount, escrow_amount, status,
    client_confirmed, lawyer_confirmed, client_confirmed_at, lawyer_confirmed_at,
    release_amount, refund_amount, client_split_percent, lawyer_split_percent,
    payment_reference, created_at, updated_at, resolved_at
"#;

/// Outcome of a case-clear confirmation, decided under the escrow row lock.
#[derive(Debug)]
pub enum ConfirmOutcome {
    NotFound,
    /// Confirmation requires a funded escrow.
    NotFunded(EscrowStatus),
    /// This party already confirmed.
    AlreadyConfirmed,
    /// Flag recorded; waiting on the other party.
    Confirmed(Escrow),
    /// Both flags observed true: escrow released, case completed and the
    /// lawyer's earning credited in the same transaction.
    Released {
        escrow: Escrow,
        case: Case,
        earning: Earning,
    },
}

/// Fee and hold terms applied when a release credits the lawyer. Supplied by
/// the service layer, which owns the configuration.
#[derive(Debug, Clone, Copy)]
pub struct ReleaseTerms {
    pub fee_percent: i64,
    pub hold_days: i64,
}

#[async_trait]
pub trait EscrowExt {
    async fn create_escrow(
        &self,
        case_id: Uuid,
        client_id: Uuid,
        lawyer_id: Uuid,
        total_amount: i64,
        escrow_amount: i64,
    ) -> Result<Escrow, Error>;

    async fn get_escrow_by_case_id(&self, case_id: Uuid) -> Result<Option<Escrow>, Error>;

    /// `PendingPayment -> Funded`, guarded in the UPDATE itself. Returns
    /// `None` when the escrow is missing or not awaiting payment.
    async fn fund_escrow(
        &self,
        case_id: Uuid,
        payment_reference: String,
    ) -> Result<Option<Escrow>, Error>;

    /// Record one party's confirmation and release when both flags are set.
    /// The whole observe-and-transition runs inside one transaction keyed on
    /// the escrow row, closing the check-then-act gap between the two
    /// independent confirmation calls. When the release fires, the lawyer's
    /// earning is credited in the same transaction under `terms`.
    async fn confirm_case_clear(
        &self,
        case_id: Uuid,
        party: ConfirmingParty,
        terms: ReleaseTerms,
    ) -> Result<ConfirmOutcome, Error>;

    /// `Funded -> Disputed`, case forced to `Disputed` in the same transaction.
    async fn dispute_escrow(&self, case_id: Uuid) -> Result<Option<(Escrow, Case)>, Error>;

    /// Admin split resolution of a disputed escrow; case forced `Completed`
    /// and the lawyer's share credited as an earning in the same transaction.
    async fn resolve_escrow_dispute(
        &self,
        case_id: Uuid,
        client_percent: i32,
        lawyer_percent: i32,
        refund_amount: i64,
        release_amount: i64,
        terms: ReleaseTerms,
    ) -> Result<Option<(Escrow, Case)>, Error>;

    /// Admin full refund; case forced `Cancelled`.
    async fn refund_escrow(&self, case_id: Uuid) -> Result<Option<(Escrow, Case)>, Error>;
}

#[async_trait]
impl EscrowExt for DBClient {
    async fn create_escrow(
        &self,
        case_id: Uuid,
        client_id: Uuid,
        lawyer_id: Uuid,
        total_amount: i64,
        escrow_amount: i64,
    ) -> Result<Escrow, Error> {
        sqlx::query_as::<_, Escrow>(&format!(
            r#"
            INSERT INTO escrows (case_id, client_id, lawyer_id, total_amount, escrow_amount)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {ESCROW_COLUMNS}
            "#
        ))
        .bind(case_id)
        .bind(client_id)
        .bind(lawyer_id)
        .bind(total_amount)
        .bind(escrow_amount)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_escrow_by_case_id(&self, case_id: Uuid) -> Result<Option<Escrow>, Error> {
        sqlx::query_as::<_, Escrow>(&format!(
            "SELECT {ESCROW_COLUMNS} FROM escrows WHERE case_id = $1"
        ))
        .bind(case_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn fund_escrow(
        &self,
        case_id: Uuid,
        payment_reference: String,
    ) -> Result<Option<Escrow>, Error> {
        let mut tx = self.pool.begin().await?;

        let escrow = sqlx::query_as::<_, Escrow>(&format!(
            r#"
            UPDATE escrows
            SET status = 'funded', payment_reference = $2, updated_at = NOW()
            WHERE case_id = $1 AND status = 'pending_payment'
            RETURNING {ESCROW_COLUMNS}
            "#
        ))
        .bind(case_id)
        .bind(payment_reference)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(escrow) = escrow else {
            return Ok(None);
        };

        sqlx::query(
            "UPDATE cases SET status = 'in_progress', updated_at = NOW() WHERE id = $1",
        )
        .bind(case_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(escrow))
    }

    async fn confirm_case_clear(
        &self,
        case_id: Uuid,
        party: ConfirmingParty,
        terms: ReleaseTerms,
    ) -> Result<ConfirmOutcome, Error> {
        let mut tx = self.pool.begin().await?;

        let escrow = sqlx::query_as::<_, Escrow>(&format!(
            "SELECT {ESCROW_COLUMNS} FROM escrows WHERE case_id = $1 FOR UPDATE"
        ))
        .bind(case_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(escrow) = escrow else {
            return Ok(ConfirmOutcome::NotFound);
        };

        if escrow.status != EscrowStatus::Funded {
            return Ok(ConfirmOutcome::NotFunded(escrow.status));
        }

        let already = match party {
            ConfirmingParty::Client => escrow.client_confirmed,
            ConfirmingParty::Lawyer => escrow.lawyer_confirmed,
        };
        if already {
            return Ok(ConfirmOutcome::AlreadyConfirmed);
        }

        let flag_column = match party {
            ConfirmingParty::Client => "client_confirmed",
            ConfirmingParty::Lawyer => "lawyer_confirmed",
        };
        let stamp_column = match party {
            ConfirmingParty::Client => "client_confirmed_at",
            ConfirmingParty::Lawyer => "lawyer_confirmed_at",
        };

        let escrow = sqlx::query_as::<_, Escrow>(&format!(
            r#"
            UPDATE escrows
            SET {flag_column} = TRUE, {stamp_column} = NOW(), updated_at = NOW()
            WHERE id = $1
            RETURNING {ESCROW_COLUMNS}
            "#
        ))
        .bind(escrow.id)
        .fetch_one(&mut *tx)
        .await?;

        if !(escrow.client_confirmed && escrow.lawyer_confirmed) {
            // First confirmation parks the case until the other party agrees.
            sqlx::query(
                r#"
                UPDATE cases SET status = 'case_clear_pending', updated_at = NOW()
                WHERE id = $1 AND status = 'in_progress'
                "#,
            )
            .bind(case_id)
            .execute(&mut *tx)
            .await?;

            tx.commit().await?;
            return Ok(ConfirmOutcome::Confirmed(escrow));
        }

        // Both parties confirmed under this lock: release.
        let escrow = sqlx::query_as::<_, Escrow>(&format!(
            r#"
            UPDATE escrows
            SET status = 'released',
                release_amount = escrow_amount,
                resolved_at = NOW(),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {ESCROW_COLUMNS}
            "#
        ))
        .bind(escrow.id)
        .fetch_one(&mut *tx)
        .await?;

        let case = sqlx::query_as::<_, Case>(&format!(
            r#"
            UPDATE cases
            SET status = 'completed', completed_at = NOW(), updated_at = NOW()
            WHERE id = $1
            RETURNING {CASE_COLUMNS}
            "#
        ))
        .bind(case_id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO lawyer_profiles (lawyer_id, completed_cases)
            VALUES ($1, 1)
            ON CONFLICT (lawyer_id)
            DO UPDATE SET completed_cases = lawyer_profiles.completed_cases + 1,
                          updated_at = NOW()
            "#,
        )
        .bind(escrow.lawyer_id)
        .execute(&mut *tx)
        .await?;

        // Credit the release before committing, so a released escrow always
        // has its matching earning row.
        let release_amount = escrow.release_amount.unwrap_or(escrow.escrow_amount);
        let fee = platform_fee(release_amount, terms.fee_percent);
        let earning = insert_earning(
            &mut tx,
            &NewEarning {
                lawyer_id: escrow.lawyer_id,
                case_id: Some(case_id),
                consultation_id: None,
                earning_type: EarningType::CasePayment,
                amount: release_amount,
                platform_fee: fee,
                net_amount: release_amount - fee,
                available_at: Utc::now() + Duration::days(terms.hold_days),
            },
        )
        .await?;

        tx.commit().await?;
        Ok(ConfirmOutcome::Released {
            escrow,
            case,
            earning,
        })
    }

    async fn dispute_escrow(&self, case_id: Uuid) -> Result<Option<(Escrow, Case)>, Error> {
        let mut tx = self.pool.begin().await?;

        let escrow = sqlx::query_as::<_, Escrow>(&format!(
            r#"
            UPDATE escrows
            SET status = 'disputed', updated_at = NOW()
            WHERE case_id = $1 AND status = 'funded'
            RETURNING {ESCROW_COLUMNS}
            "#
        ))
        .bind(case_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(escrow) = escrow else {
            return Ok(None);
        };

        let case = sqlx::query_as::<_, Case>(&format!(
            r#"
            UPDATE cases SET status = 'disputed', updated_at = NOW()
            WHERE id = $1
            RETURNING {CASE_COLUMNS}
            "#
        ))
        .bind(case_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some((escrow, case)))
    }

    async fn resolve_escrow_dispute(
        &self,
        case_id: Uuid,
        client_percent: i32,
        lawyer_percent: i32,
        refund_amount: i64,
        release_amount: i64,
        terms: ReleaseTerms,
    ) -> Result<Option<(Escrow, Case)>, Error> {
        let mut tx = self.pool.begin().await?;

        let escrow = sqlx::query_as::<_, Escrow>(&format!(
            r#"
            UPDATE escrows
            SET status = 'released',
                client_split_percent = $2,
                lawyer_split_percent = $3,
                refund_amount = $4,
                release_amount = $5,
                resolved_at = NOW(),
                updated_at = NOW()
            WHERE case_id = $1 AND status = 'disputed'
            RETURNING {ESCROW_COLUMNS}
            "#
        ))
        .bind(case_id)
        .bind(client_percent)
        .bind(lawyer_percent)
        .bind(refund_amount)
        .bind(release_amount)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(escrow) = escrow else {
            return Ok(None);
        };

        let case = sqlx::query_as::<_, Case>(&format!(
            r#"
            UPDATE cases
            SET status = 'completed', completed_at = NOW(), updated_at = NOW()
            WHERE id = $1
            RETURNING {CASE_COLUMNS}
            "#
        ))
        .bind(case_id)
        .fetch_one(&mut *tx)
        .await?;

        if release_amount > 0 {
            let fee = platform_fee(release_amount, terms.fee_percent);
            insert_earning(
                &mut tx,
                &NewEarning {
                    lawyer_id: escrow.lawyer_id,
                    case_id: Some(case_id),
                    consultation_id: None,
                    earning_type: EarningType::CasePayment,
                    amount: release_amount,
                    platform_fee: fee,
                    net_amount: release_amount - fee,
                    available_at: Utc::now() + Duration::days(terms.hold_days),
                },
            )
            .await?;
        }

        tx.commit().await?;
        Ok(Some((escrow, case)))
    }

    async fn refund_escrow(&self, case_id: Uuid) -> Result<Option<(Escrow, Case)>, Error> {
        let mut tx = self.pool.begin().await?;

        let escrow = sqlx::query_as::<_, Escrow>(&format!(
            r#"
            UPDATE escrows
            SET status = 'refunded',
                refund_amount = escrow_amount,
                resolved_at = NOW(),
                updated_at = NOW()
            WHERE case_id = $1 AND status IN ('funded', 'disputed')
            RETURNING {ESCROW_COLUMNS}
            "#
        ))
        .bind(case_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(escrow) = escrow else {
            return Ok(None);
        };

        let case = sqlx::query_as::<_, Case>(&format!(
            r#"
            UPDATE cases SET status = 'cancelled', updated_at = NOW()
            WHERE id = $1
            RETURNING {CASE_COLUMNS}
            "#
        ))
        .bind(case_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some((escrow, case)))
    }
}
