// db/earningdb.rs
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Error;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::earningmodel::*;

const EARNING_COLUMNS: &str = r#"
    id, lawyer_id, case_id, consultation_id, earning_type, amount,
    platform_fee, net_amount, status, available_at, created_at, released_at
"#;

const WALLET_COLUMNS: &str = r#"
    id, lawyer_id, available_balance, pending_balance, escrow_balance,
    total_earned, total_withdrawn, created_at, updated_at
"#;

const PAYOUT_COLUMNS: &str = r#"
    id, lawyer_id, amount, method, account_name, account_number, bank_name,
    status, external_transaction_id, failure_reason, created_at, updated_at,
    completed_at
"#;

/// Outcome of a payout request, decided by the conditional balance decrement.
#[derive(Debug)]
pub enum PayoutOutcome {
    Created(PayoutRequest),
    WalletNotFound,
    InsufficientFunds { available: i64 },
}

/// Earning terms fixed at credit time.
pub struct NewEarning {
    pub lawyer_id: Uuid,
    pub case_id: Option<Uuid>,
    pub consultation_id: Option<Uuid>,
    pub earning_type: EarningType,
    pub amount: i64,
    pub platform_fee: i64,
    pub net_amount: i64,
    pub available_at: DateTime<Utc>,
}

/// Insert the earning and credit the wallet's pending balance inside the
/// caller's transaction, lazily creating the wallet. Escrow release uses this
/// so the credit commits or rolls back with the release itself.
pub(crate) async fn insert_earning(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    new: &NewEarning,
) -> Result<Earning, Error> {
    let earning = sqlx::query_as::<_, Earning>(&format!(
        r#"
        INSERT INTO earnings
            (lawyer_id, case_id, consultation_id, earning_type, amount,
             platform_fee, net_amount, available_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING {EARNING_COLUMNS}
        "#
    ))
    .bind(new.lawyer_id)
    .bind(new.case_id)
    .bind(new.consultation_id)
    .bind(new.earning_type)
    .bind(new.amount)
    .bind(new.platform_fee)
    .bind(new.net_amount)
    .bind(new.available_at)
    .fetch_one(&mut **tx)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO lawyer_wallets (lawyer_id, pending_balance, total_earned)
        VALUES ($1, $2, $2)
        ON CONFLICT (lawyer_id)
        DO UPDATE SET pending_balance = lawyer_wallets.pending_balance + $2,
                      total_earned = lawyer_wallets.total_earned + $2,
                      updated_at = NOW()
        "#,
    )
    .bind(new.lawyer_id)
    .bind(new.net_amount)
    .execute(&mut **tx)
    .await?;

    Ok(earning)
}

#[async_trait]
pub trait EarningExt {
    /// Insert the earning and credit `pending_balance`/`total_earned` by the
    /// net amount in one transaction, lazily creating the wallet.
    async fn record_earning(
        &self,
        lawyer_id: Uuid,
        case_id: Option<Uuid>,
        consultation_id: Option<Uuid>,
        earning_type: EarningType,
        amount: i64,
        platform_fee: i64,
        net_amount: i64,
        available_at: DateTime<Utc>,
    ) -> Result<Earning, Error>;

    async fn get_earning_by_id(&self, earning_id: Uuid) -> Result<Option<Earning>, Error>;

    async fn list_earnings(&self, lawyer_id: Uuid) -> Result<Vec<Earning>, Error>;

    /// `Pending -> Available` once the hold has elapsed; moves the net amount
    /// from pending to available in the same transaction. Returns `None` when
    /// the earning is missing, not pending, or not yet due — re-invocation is
    /// a no-op, never a double release.
    async fn release_pending_earning(&self, earning_id: Uuid) -> Result<Option<Earning>, Error>;

    /// Earnings whose hold has elapsed, for the external periodic trigger.
    async fn list_due_earning_ids(&self) -> Result<Vec<Uuid>, Error>;

    async fn set_earning_hold(&self, earning_id: Uuid, held: bool)
        -> Result<Option<Earning>, Error>;

    async fn earnings_summary(
        &self,
        lawyer_id: Uuid,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<EarningsSummary, Error>;

    async fn get_or_create_wallet(&self, lawyer_id: Uuid) -> Result<LawyerWallet, Error>;

    /// Holds the amount (conditional atomic decrement of available balance)
    /// and creates the pending payout in one transaction.
    async fn create_payout_request(
        &self,
        lawyer_id: Uuid,
        amount: i64,
        method: PayoutMethod,
        account_name: String,
        account_number: String,
        bank_name: Option<String>,
    ) -> Result<PayoutOutcome, Error>;

    async fn get_payout_by_id(&self, payout_id: Uuid) -> Result<Option<PayoutRequest>, Error>;

    async fn list_payouts(&self, lawyer_id: Uuid) -> Result<Vec<PayoutRequest>, Error>;

    /// `Pending -> Cancelled`, refunding the held amount.
    async fn cancel_payout(&self, payout_id: Uuid) -> Result<Option<PayoutRequest>, Error>;

    async fn mark_payout_processing(&self, payout_id: Uuid)
        -> Result<Option<PayoutRequest>, Error>;

    /// `Pending/Processing -> Completed`; credits `total_withdrawn` and
    /// consumes fully-covered available earnings oldest-first.
    async fn complete_payout(
        &self,
        payout_id: Uuid,
        external_transaction_id: String,
    ) -> Result<Option<PayoutRequest>, Error>;

    /// `Pending/Processing -> Failed`, refunding the held amount.
    async fn fail_payout(
        &self,
        payout_id: Uuid,
        reason: String,
    ) -> Result<Option<PayoutRequest>, Error>;
}

#[async_trait]
impl EarningExt for DBClient {
    async fn record_earning(
        &self,
        lawyer_id: Uuid,
        case_id: Option<Uuid>,
        consultation_id: Option<Uuid>,
        earning_type: EarningType,
        amount: i64,
        platform_fee: i64,
        net_amount: i64,
        available_at: DateTime<Utc>,
    ) -> Result<Earning, Error> {
        let mut tx = self.pool.begin().await?;

        let earning = insert_earning(
            &mut tx,
            &NewEarning {
                lawyer_id,
                case_id,
                consultation_id,
                earning_type,
                amount,
                platform_fee,
                net_amount,
                available_at,
            },
        )
        .await?;

        tx.commit().await?;
        Ok(earning)
    }

    async fn get_earning_by_id(&self, earning_id: Uuid) -> Result<Option<Earning>, Error> {
        sqlx::query_as::<_, Earning>(&format!(
            "SELECT {EARNING_COLUMNS} FROM earnings WHERE id = $1"
        ))
        .bind(earning_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn list_earnings(&self, lawyer_id: Uuid) -> Result<Vec<Earning>, Error> {
        sqlx::query_as::<_, Earning>(&format!(
            "SELECT {EARNING_COLUMNS} FROM earnings WHERE lawyer_id = $1 ORDER BY created_at DESC"
        ))
        .bind(lawyer_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn release_pending_earning(&self, earning_id: Uuid) -> Result<Option<Earning>, Error> {
        let mut tx = self.pool.begin().await?;

        let earning = sqlx::query_as::<_, Earning>(&format!(
            r#"
            UPDATE earnings
            SET status = 'available', released_at = NOW()
            WHERE id = $1 AND status = 'pending' AND available_at <= NOW()
            RETURNING {EARNING_COLUMNS}
            "#
        ))
        .bind(earning_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(earning) = earning else {
            return Ok(None);
        };

        sqlx::query(
            r#"
            UPDATE lawyer_wallets
            SET pending_balance = pending_balance - $2,
                available_balance = available_balance + $2,
                updated_at = NOW()
            WHERE lawyer_id = $1
            "#,
        )
        .bind(earning.lawyer_id)
        .bind(earning.net_amount)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(earning))
    }

    async fn list_due_earning_ids(&self) -> Result<Vec<Uuid>, Error> {
        let rows: Vec<(Uuid,)> = sqlx::query_as(
            "SELECT id FROM earnings WHERE status = 'pending' AND available_at <= NOW()",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|r| r.0).collect())
    }

    async fn set_earning_hold(
        &self,
        earning_id: Uuid,
        held: bool,
    ) -> Result<Option<Earning>, Error> {
        let (from, to) = if held {
            ("pending", "on_hold")
        } else {
            ("on_hold", "pending")
        };
        sqlx::query_as::<_, Earning>(&format!(
            r#"
            UPDATE earnings SET status = '{to}'
            WHERE id = $1 AND status = '{from}'
            RETURNING {EARNING_COLUMNS}
            "#
        ))
        .bind(earning_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn earnings_summary(
        &self,
        lawyer_id: Uuid,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<EarningsSummary, Error> {
        sqlx::query_as::<_, EarningsSummary>(
            r#"
            SELECT
                COALESCE(SUM(amount), 0)::BIGINT AS gross_amount,
                COALESCE(SUM(platform_fee), 0)::BIGINT AS total_fees,
                COALESCE(SUM(net_amount), 0)::BIGINT AS net_amount,
                COALESCE(SUM(net_amount) FILTER (WHERE status = 'pending'), 0)::BIGINT
                    AS pending_amount,
                COALESCE(SUM(net_amount) FILTER (WHERE status = 'available'), 0)::BIGINT
                    AS available_amount
            FROM earnings
            WHERE lawyer_id = $1
              AND ($2::TIMESTAMPTZ IS NULL OR created_at >= $2)
              AND ($3::TIMESTAMPTZ IS NULL OR created_at <= $3)
            "#,
        )
        .bind(lawyer_id)
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_or_create_wallet(&self, lawyer_id: Uuid) -> Result<LawyerWallet, Error> {
        sqlx::query_as::<_, LawyerWallet>(&format!(
            r#"
            INSERT INTO lawyer_wallets (lawyer_id)
            VALUES ($1)
            ON CONFLICT (lawyer_id) DO UPDATE SET updated_at = lawyer_wallets.updated_at
            RETURNING {WALLET_COLUMNS}
            "#
        ))
        .bind(lawyer_id)
        .fetch_one(&self.pool)
        .await
    }

    async fn create_payout_request(
        &self,
        lawyer_id: Uuid,
        amount: i64,
        method: PayoutMethod,
        account_name: String,
        account_number: String,
        bank_name: Option<String>,
    ) -> Result<PayoutOutcome, Error> {
        let mut tx = self.pool.begin().await?;

        // Optimistic hold: the guard in the UPDATE keeps the balance from
        // going negative under concurrent requests.
        let held: Option<(i64,)> = sqlx::query_as(
            r#"
            UPDATE lawyer_wallets
            SET available_balance = available_balance - $2, updated_at = NOW()
            WHERE lawyer_id = $1 AND available_balance >= $2
            RETURNING available_balance
            "#,
        )
        .bind(lawyer_id)
        .bind(amount)
        .fetch_optional(&mut *tx)
        .await?;

        if held.is_none() {
            let wallet: Option<(i64,)> = sqlx::query_as(
                "SELECT available_balance FROM lawyer_wallets WHERE lawyer_id = $1",
            )
            .bind(lawyer_id)
            .fetch_optional(&mut *tx)
            .await?;

            return Ok(match wallet {
                Some((available,)) => PayoutOutcome::InsufficientFunds { available },
                None => PayoutOutcome::WalletNotFound,
            });
        }

        let payout = sqlx::query_as::<_, PayoutRequest>(&format!(
            r#"
            INSERT INTO payout_requests
                (lawyer_id, amount, method, account_name, account_number, bank_name)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {PAYOUT_COLUMNS}
            "#
        ))
        .bind(lawyer_id)
        .bind(amount)
        .bind(method)
        .bind(account_name)
        .bind(account_number)
        .bind(bank_name)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(PayoutOutcome::Created(payout))
    }

    async fn get_payout_by_id(&self, payout_id: Uuid) -> Result<Option<PayoutRequest>, Error> {
        sqlx::query_as::<_, PayoutRequest>(&format!(
            "SELECT {PAYOUT_COLUMNS} FROM payout_requests WHERE id = $1"
        ))
        .bind(payout_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn list_payouts(&self, lawyer_id: Uuid) -> Result<Vec<PayoutRequest>, Error> {
        sqlx::query_as::<_, PayoutRequest>(&format!(
            r#"
            SELECT {PAYOUT_COLUMNS} FROM payout_requests
            WHERE lawyer_id = $1 ORDER BY created_at DESC
            "#
        ))
        .bind(lawyer_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn cancel_payout(&self, payout_id: Uuid) -> Result<Option<PayoutRequest>, Error> {
        let mut tx = self.pool.begin().await?;

        let payout = sqlx::query_as::<_, PayoutRequest>(&format!(
            r#"
            UPDATE payout_requests
            SET status = 'cancelled', updated_at = NOW()
            WHERE id = $1 AND status = 'pending'
            RETURNING {PAYOUT_COLUMNS}
            "#
        ))
        .bind(payout_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(payout) = payout else {
            return Ok(None);
        };

        sqlx::query(
            r#"
            UPDATE lawyer_wallets
            SET available_balance = available_balance + $2, updated_at = NOW()
            WHERE lawyer_id = $1
            "#,
        )
        .bind(payout.lawyer_id)
        .bind(payout.amount)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(payout))
    }

    async fn mark_payout_processing(
        &self,
        payout_id: Uuid,
    ) -> Result<Option<PayoutRequest>, Error> {
        sqlx::query_as::<_, PayoutRequest>(&format!(
            r#"
            UPDATE payout_requests
            SET status = 'processing', updated_at = NOW()
            WHERE id = $1 AND status = 'pending'
            RETURNING {PAYOUT_COLUMNS}
            "#
        ))
        .bind(payout_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn complete_payout(
        &self,
        payout_id: Uuid,
        external_transaction_id: String,
    ) -> Result<Option<PayoutRequest>, Error> {
        let mut tx = self.pool.begin().await?;

        let payout = sqlx::query_as::<_, PayoutRequest>(&format!(
            r#"
            UPDATE payout_requests
            SET status = 'completed',
                external_transaction_id = $2,
                completed_at = NOW(),
                updated_at = NOW()
            WHERE id = $1 AND status IN ('pending', 'processing')
            RETURNING {PAYOUT_COLUMNS}
            "#
        ))
        .bind(payout_id)
        .bind(external_transaction_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(payout) = payout else {
            return Ok(None);
        };

        sqlx::query(
            r#"
            UPDATE lawyer_wallets
            SET total_withdrawn = total_withdrawn + $2, updated_at = NOW()
            WHERE lawyer_id = $1
            "#,
        )
        .bind(payout.lawyer_id)
        .bind(payout.amount)
        .execute(&mut *tx)
        .await?;

        // Consume available earnings oldest-first; only earnings wholly
        // covered by the payout flip to withdrawn.
        let available = sqlx::query_as::<_, Earning>(&format!(
            r#"
            SELECT {EARNING_COLUMNS} FROM earnings
            WHERE lawyer_id = $1 AND status = 'available'
            ORDER BY created_at ASC
            FOR UPDATE
            "#
        ))
        .bind(payout.lawyer_id)
        .fetch_all(&mut *tx)
        .await?;

        let mut covered = 0i64;
        for earning in &available {
            if covered + earning.net_amount > payout.amount {
                break;
            }
            covered += earning.net_amount;
            sqlx::query("UPDATE earnings SET status = 'withdrawn' WHERE id = $1")
                .bind(earning.id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(Some(payout))
    }

    async fn fail_payout(
        &self,
        payout_id: Uuid,
        reason: String,
    ) -> Result<Option<PayoutRequest>, Error> {
        let mut tx = self.pool.begin().await?;

        let payout = sqlx::query_as::<_, PayoutRequest>(&format!(
            r#"
            UPDATE payout_requests
            SET status = 'failed', failure_reason = $2, updated_at = NOW()
            WHERE id = $1 AND status IN ('pending', 'processing')
            RETURNING {PAYOUT_COLUMNS}
            "#
        ))
        .bind(payout_id)
        .bind(reason)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(payout) = payout else {
            return Ok(None);
        };

        sqlx::query(
            r#"
            UPDATE lawyer_wallets
            SET available_balance = available_balance + $2, updated_at = NOW()
            WHERE lawyer_id = $1
            "#,
        )
        .bind(payout.lawyer_id)
        .bind(payout.amount)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(payout))
    }
}
