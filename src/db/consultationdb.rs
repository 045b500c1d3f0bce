// db/consultationdb.rs
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::Error;
use uuid::Uuid;

use super::db::{constraint_violated, DBClient};
use crate::models::consultationmodel::*;
use crate::utils::schedule::{has_conflict, BusyInterval};

const CONSULTATION_COLUMNS: &str = r#"
    id, lawyer_id, client_id, consultation_type, scheduled_at, duration_minutes,
    fee, status, meeting_link, notes, cancelled_by, cancellation_reason,
    conversation_id, rescheduled_from, created_at, updated_at
"#;

const AVAILABILITY_COLUMNS: &str = r#"
    id, lawyer_id, weekly_schedule, blocked_dates, slot_duration_minutes,
    buffer_minutes, created_at, updated_at
"#;

#[derive(Debug)]
pub enum BookOutcome {
    Booked(Consultation),
    /// An active consultation already occupies the buffered interval.
    SlotTaken,
}

pub struct NewConsultation {
    pub lawyer_id: Uuid,
    pub client_id: Uuid,
    pub consultation_type: ConsultationType,
    pub scheduled_at: DateTime<Utc>,
    pub duration_minutes: i32,
    pub fee: i64,
    pub conversation_id: Option<Uuid>,
    pub rescheduled_from: Option<Uuid>,
}

#[async_trait]
pub trait ConsultationExt {
    async fn upsert_availability(
        &self,
        lawyer_id: Uuid,
        weekly_schedule: serde_json::Value,
        blocked_dates: Vec<chrono::NaiveDate>,
        slot_duration_minutes: i32,
        buffer_minutes: i32,
    ) -> Result<LawyerAvailability, Error>;

    async fn get_availability(&self, lawyer_id: Uuid)
        -> Result<Option<LawyerAvailability>, Error>;

    async fn get_consultation_by_id(&self, id: Uuid) -> Result<Option<Consultation>, Error>;

    async fn list_consultations_for_lawyer(
        &self,
        lawyer_id: Uuid,
    ) -> Result<Vec<Consultation>, Error>;

    async fn list_consultations_for_client(
        &self,
        client_id: Uuid,
    ) -> Result<Vec<Consultation>, Error>;

    /// Pending/confirmed consultations with `scheduled_at` in `[from, to)`.
    async fn active_consultations_between(
        &self,
        lawyer_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Consultation>, Error>;

    /// Insert the consultation after re-checking the buffered conflict window
    /// under a row lock on the lawyer's active same-day bookings. The partial
    /// unique index on (lawyer_id, scheduled_at) backstops exact-time races.
    async fn book_consultation(
        &self,
        new: NewConsultation,
        buffer_minutes: i32,
    ) -> Result<BookOutcome, Error>;

    async fn confirm_consultation(
        &self,
        id: Uuid,
        meeting_link: Option<String>,
    ) -> Result<Option<Consultation>, Error>;

    async fn cancel_consultation(
        &self,
        id: Uuid,
        cancelled_by: Uuid,
        reason: Option<String>,
    ) -> Result<Option<Consultation>, Error>;

    async fn complete_consultation(
        &self,
        id: Uuid,
        notes: Option<String>,
    ) -> Result<Option<Consultation>, Error>;

    async fn mark_consultation_no_show(&self, id: Uuid) -> Result<Option<Consultation>, Error>;

    /// Mark the old consultation rescheduled and insert its replacement in one
    /// transaction, conflict-checked the same way as a fresh booking.
    async fn reschedule_consultation(
        &self,
        old_id: Uuid,
        new_scheduled_at: DateTime<Utc>,
        buffer_minutes: i32,
    ) -> Result<Option<BookOutcome>, Error>;
}

async fn locked_day_conflict(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    lawyer_id: Uuid,
    exclude: Option<Uuid>,
    scheduled_at: DateTime<Utc>,
    duration_minutes: i32,
    buffer_minutes: i32,
) -> Result<bool, Error> {
    // Serialize per lawyer on the availability row. The FOR UPDATE scan
    // below has nothing to contend on when the lawyer has no active
    // bookings yet, and two overlapping first bookings would both pass.
    sqlx::query("SELECT id FROM lawyer_availability WHERE lawyer_id = $1 FOR UPDATE")
        .bind(lawyer_id)
        .execute(&mut **tx)
        .await?;

    let day_start = scheduled_at - Duration::hours(24);
    let day_end = scheduled_at + Duration::hours(24);

    let busy = sqlx::query_as::<_, Consultation>(&format!(
        r#"
        SELECT {CONSULTATION_COLUMNS} FROM consultations
        WHERE lawyer_id = $1
          AND status IN ('pending', 'confirmed')
          AND scheduled_at >= $2 AND scheduled_at < $3
          AND ($4::UUID IS NULL OR id <> $4)
        FOR UPDATE
        "#
    ))
    .bind(lawyer_id)
    .bind(day_start)
    .bind(day_end)
    .bind(exclude)
    .fetch_all(&mut **tx)
    .await?;

    let intervals: Vec<BusyInterval> = busy
        .iter()
        .map(|c| BusyInterval {
            start: c.scheduled_at,
            duration_minutes: c.duration_minutes,
        })
        .collect();

    Ok(has_conflict(
        scheduled_at,
        duration_minutes,
        buffer_minutes,
        &intervals,
    ))
}

async fn insert_consultation(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    new: &NewConsultation,
) -> Result<Consultation, Error> {
    sqlx::query_as::<_, Consultation>(&format!(
        r#"
        INSERT INTO consultations
            (lawyer_id, client_id, consultation_type, scheduled_at,
             duration_minutes, fee, conversation_id, rescheduled_from)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING {CONSULTATION_COLUMNS}
        "#
    ))
    .bind(new.lawyer_id)
    .bind(new.client_id)
    .bind(new.consultation_type)
    .bind(new.scheduled_at)
    .bind(new.duration_minutes)
    .bind(new.fee)
    .bind(new.conversation_id)
    .bind(new.rescheduled_from)
    .fetch_one(&mut **tx)
    .await
}

#[async_trait]
impl ConsultationExt for DBClient {
    async fn upsert_availability(
        &self,
        lawyer_id: Uuid,
        weekly_schedule: serde_json::Value,
        blocked_dates: Vec<chrono::NaiveDate>,
        slot_duration_minutes: i32,
        buffer_minutes: i32,
    ) -> Result<LawyerAvailability, Error> {
        sqlx::query_as::<_, LawyerAvailability>(&format!(
            r#"
            INSERT INTO lawyer_availability
                (lawyer_id, weekly_schedule, blocked_dates,
                 slot_duration_minutes, buffer_minutes)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (lawyer_id)
            DO UPDATE SET weekly_schedule = $2,
                          blocked_dates = $3,
                          slot_duration_minutes = $4,
                          buffer_minutes = $5,
                          updated_at = NOW()
            RETURNING {AVAILABILITY_COLUMNS}
            "#
        ))
        .bind(lawyer_id)
        .bind(weekly_schedule)
        .bind(blocked_dates)
        .bind(slot_duration_minutes)
        .bind(buffer_minutes)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_availability(
        &self,
        lawyer_id: Uuid,
    ) -> Result<Option<LawyerAvailability>, Error> {
        sqlx::query_as::<_, LawyerAvailability>(&format!(
            "SELECT {AVAILABILITY_COLUMNS} FROM lawyer_availability WHERE lawyer_id = $1"
        ))
        .bind(lawyer_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_consultation_by_id(&self, id: Uuid) -> Result<Option<Consultation>, Error> {
        sqlx::query_as::<_, Consultation>(&format!(
            "SELECT {CONSULTATION_COLUMNS} FROM consultations WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn list_consultations_for_lawyer(
        &self,
        lawyer_id: Uuid,
    ) -> Result<Vec<Consultation>, Error> {
        sqlx::query_as::<_, Consultation>(&format!(
            r#"
            SELECT {CONSULTATION_COLUMNS} FROM consultations
            WHERE lawyer_id = $1 ORDER BY scheduled_at DESC
            "#
        ))
        .bind(lawyer_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn list_consultations_for_client(
        &self,
        client_id: Uuid,
    ) -> Result<Vec<Consultation>, Error> {
        sqlx::query_as::<_, Consultation>(&format!(
            r#"
            SELECT {CONSULTATION_COLUMNS} FROM consultations
            WHERE client_id = $1 ORDER BY scheduled_at DESC
            "#
        ))
        .bind(client_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn active_consultations_between(
        &self,
        lawyer_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Consultation>, Error> {
        sqlx::query_as::<_, Consultation>(&format!(
            r#"
            SELECT {CONSULTATION_COLUMNS} FROM consultations
            WHERE lawyer_id = $1
              AND status IN ('pending', 'confirmed')
              AND scheduled_at >= $2 AND scheduled_at < $3
            ORDER BY scheduled_at ASC
            "#
        ))
        .bind(lawyer_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await
    }

    async fn book_consultation(
        &self,
        new: NewConsultation,
        buffer_minutes: i32,
    ) -> Result<BookOutcome, Error> {
        let mut tx = self.pool.begin().await?;

        let conflict = locked_day_conflict(
            &mut tx,
            new.lawyer_id,
            None,
            new.scheduled_at,
            new.duration_minutes,
            buffer_minutes,
        )
        .await?;

        if conflict {
            return Ok(BookOutcome::SlotTaken);
        }

        let consultation = match insert_consultation(&mut tx, &new).await {
            // The partial unique index on (lawyer_id, scheduled_at) is the
            // backstop for exact-time races; losing it is a taken slot, not
            // a server error.
            Err(e) if constraint_violated(&e, "idx_consultations_slot") => {
                return Ok(BookOutcome::SlotTaken)
            }
            other => other?,
        };

        tx.commit().await?;
        Ok(BookOutcome::Booked(consultation))
    }

    async fn confirm_consultation(
        &self,
        id: Uuid,
        meeting_link: Option<String>,
    ) -> Result<Option<Consultation>, Error> {
        sqlx::query_as::<_, Consultation>(&format!(
            r#"
            UPDATE consultations
            SET status = 'confirmed', meeting_link = COALESCE($2, meeting_link),
                updated_at = NOW()
            WHERE id = $1 AND status = 'pending'
            RETURNING {CONSULTATION_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(meeting_link)
        .fetch_optional(&self.pool)
        .await
    }

    async fn cancel_consultation(
        &self,
        id: Uuid,
        cancelled_by: Uuid,
        reason: Option<String>,
    ) -> Result<Option<Consultation>, Error> {
        sqlx::query_as::<_, Consultation>(&format!(
            r#"
            UPDATE consultations
            SET status = 'cancelled', cancelled_by = $2, cancellation_reason = $3,
                updated_at = NOW()
            WHERE id = $1 AND status IN ('pending', 'confirmed')
            RETURNING {CONSULTATION_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(cancelled_by)
        .bind(reason)
        .fetch_optional(&self.pool)
        .await
    }

    async fn complete_consultation(
        &self,
        id: Uuid,
        notes: Option<String>,
    ) -> Result<Option<Consultation>, Error> {
        sqlx::query_as::<_, Consultation>(&format!(
            r#"
            UPDATE consultations
            SET status = 'completed', notes = COALESCE($2, notes), updated_at = NOW()
            WHERE id = $1 AND status = 'confirmed'
            RETURNING {CONSULTATION_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(notes)
        .fetch_optional(&self.pool)
        .await
    }

    async fn mark_consultation_no_show(&self, id: Uuid) -> Result<Option<Consultation>, Error> {
        sqlx::query_as::<_, Consultation>(&format!(
            r#"
            UPDATE consultations
            SET status = 'no_show', updated_at = NOW()
            WHERE id = $1 AND status = 'confirmed'
            RETURNING {CONSULTATION_COLUMNS}
            "#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn reschedule_consultation(
        &self,
        old_id: Uuid,
        new_scheduled_at: DateTime<Utc>,
        buffer_minutes: i32,
    ) -> Result<Option<BookOutcome>, Error> {
        let mut tx = self.pool.begin().await?;

        let old = sqlx::query_as::<_, Consultation>(&format!(
            r#"
            UPDATE consultations
            SET status = 'rescheduled', updated_at = NOW()
            WHERE id = $1 AND status IN ('pending', 'confirmed')
            RETURNING {CONSULTATION_COLUMNS}
            "#
        ))
        .bind(old_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(old) = old else {
            return Ok(None);
        };

        let conflict = locked_day_conflict(
            &mut tx,
            old.lawyer_id,
            Some(old.id),
            new_scheduled_at,
            old.duration_minutes,
            buffer_minutes,
        )
        .await?;

        if conflict {
            // Dropping the transaction rolls the old row back to its
            // previous status.
            return Ok(Some(BookOutcome::SlotTaken));
        }

        let replacement = NewConsultation {
            lawyer_id: old.lawyer_id,
            client_id: old.client_id,
            consultation_type: old.consultation_type,
            scheduled_at: new_scheduled_at,
            duration_minutes: old.duration_minutes,
            fee: old.fee,
            conversation_id: old.conversation_id,
            rescheduled_from: Some(old.id),
        };
        let new = match insert_consultation(&mut tx, &replacement).await {
            Err(e) if constraint_violated(&e, "idx_consultations_slot") => {
                return Ok(Some(BookOutcome::SlotTaken))
            }
            other => other?,
        };

        tx.commit().await?;
        Ok(Some(BookOutcome::Booked(new)))
    }
}
