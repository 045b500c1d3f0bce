// service/consultation_service.rs
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::{
    db::{
        consultationdb::{BookOutcome, ConsultationExt, NewConsultation},
        conversationdb::ConversationExt,
        db::DBClient,
    },
    dtos::consultationdtos::{AvailabilityDto, BookConsultationDto},
    models::{
        consultationmodel::*,
        earningmodel::EarningType,
    },
    service::{
        earnings_service::EarningsService, error::ServiceError,
        notification_service::NotificationService,
    },
    utils::{
        currency::{percent_of, to_minor_units},
        schedule::{fits_schedule, generate_day_slots, BusyInterval, Slot},
    },
};

/// Share of the fee still owed after a client no-show.
const NO_SHOW_FEE_PERCENT: i64 = 50;

#[derive(Debug, Clone)]
pub struct ConsultationService {
    db_client: Arc<DBClient>,
    earnings_service: Arc<EarningsService>,
    notification_service: Arc<NotificationService>,
}

impl ConsultationService {
    pub fn new(
        db_client: Arc<DBClient>,
        earnings_service: Arc<EarningsService>,
        notification_service: Arc<NotificationService>,
    ) -> Self {
        Self {
            db_client,
            earnings_service,
            notification_service,
        }
    }

    pub async fn set_availability(
        &self,
        lawyer_id: Uuid,
        data: AvailabilityDto,
    ) -> Result<LawyerAvailability, ServiceError> {
        for day in [
            &data.weekly_schedule.monday,
            &data.weekly_schedule.tuesday,
            &data.weekly_schedule.wednesday,
            &data.weekly_schedule.thursday,
            &data.weekly_schedule.friday,
            &data.weekly_schedule.saturday,
            &data.weekly_schedule.sunday,
        ] {
            for window in &day.windows {
                if window.start >= window.end {
                    return Err(ServiceError::Validation(
                        "Availability window start must precede its end".to_string(),
                    ));
                }
            }
        }

        let weekly_schedule = serde_json::to_value(&data.weekly_schedule)
            .map_err(|e| ServiceError::Validation(e.to_string()))?;

        Ok(self
            .db_client
            .upsert_availability(
                lawyer_id,
                weekly_schedule,
                data.blocked_dates,
                data.slot_duration_minutes,
                data.buffer_minutes,
            )
            .await?)
    }

    pub async fn get_availability(
        &self,
        lawyer_id: Uuid,
    ) -> Result<Option<LawyerAvailability>, ServiceError> {
        Ok(self.db_client.get_availability(lawyer_id).await?)
    }

    /// Generated slots for one calendar day. A lawyer with no configured
    /// availability, a blocked date or a disabled weekday all yield the empty
    /// list rather than an error.
    pub async fn get_available_slots(
        &self,
        lawyer_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<Slot>, ServiceError> {
        let Some(availability) = self.db_client.get_availability(lawyer_id).await? else {
            return Ok(Vec::new());
        };
        if availability.is_date_blocked(date) {
            return Ok(Vec::new());
        }

        let schedule = availability
            .schedule()
            .map_err(|e| ServiceError::Validation(e.to_string()))?;
        let day = schedule.for_weekday(chrono::Datelike::weekday(&date));
        if !day.enabled {
            return Ok(Vec::new());
        }

        let pad_minutes =
            (availability.slot_duration_minutes + availability.buffer_minutes) as i64;
        let busy = self
            .busy_intervals_for_day(lawyer_id, date, pad_minutes)
            .await?;

        Ok(generate_day_slots(
            day,
            date,
            availability.slot_duration_minutes,
            availability.buffer_minutes,
            &busy,
        ))
    }

    pub async fn book_consultation(
        &self,
        client_id: Uuid,
        data: BookConsultationDto,
    ) -> Result<Consultation, ServiceError> {
        if data.lawyer_id == client_id {
            return Err(ServiceError::Validation(
                "A lawyer cannot book a consultation with themselves".to_string(),
            ));
        }
        if data.scheduled_at <= Utc::now() {
            return Err(ServiceError::Validation(
                "Consultations must be scheduled in the future".to_string(),
            ));
        }

        let availability = self
            .db_client
            .get_availability(data.lawyer_id)
            .await?
            .ok_or_else(|| {
                ServiceError::Validation("This lawyer has no availability configured".to_string())
            })?;

        let date = data.scheduled_at.date_naive();
        if availability.is_date_blocked(date) {
            return Err(ServiceError::SlotUnavailable(data.scheduled_at));
        }
        let schedule = availability
            .schedule()
            .map_err(|e| ServiceError::Validation(e.to_string()))?;
        let day = schedule.for_weekday(chrono::Datelike::weekday(&date));
        if !fits_schedule(
            day,
            date,
            data.scheduled_at,
            availability.slot_duration_minutes,
        ) {
            return Err(ServiceError::SlotUnavailable(data.scheduled_at));
        }

        let conversation = self
            .db_client
            .create_conversation(
                vec![client_id, data.lawyer_id],
                None,
                "consultation".to_string(),
                format!("Consultation on {}", date),
            )
            .await?;

        let new = NewConsultation {
            lawyer_id: data.lawyer_id,
            client_id,
            consultation_type: data.consultation_type,
            scheduled_at: data.scheduled_at,
            duration_minutes: availability.slot_duration_minutes,
            fee: to_minor_units(data.fee),
            conversation_id: Some(conversation.id),
            rescheduled_from: None,
        };

        match self
            .db_client
            .book_consultation(new, availability.buffer_minutes)
            .await?
        {
            BookOutcome::SlotTaken => Err(ServiceError::SlotUnavailable(data.scheduled_at)),
            BookOutcome::Booked(consultation) => {
                self.notification_service
                    .notify_consultation_booked(&consultation)
                    .await;
                Ok(consultation)
            }
        }
    }

    pub async fn confirm_consultation(
        &self,
        consultation_id: Uuid,
        lawyer_id: Uuid,
        meeting_link: Option<String>,
    ) -> Result<Consultation, ServiceError> {
        let consultation = self.get_consultation(consultation_id).await?;
        if consultation.lawyer_id != lawyer_id {
            return Err(ServiceError::UnauthorizedConsultationAccess(
                lawyer_id,
                consultation_id,
            ));
        }

        let consultation = self
            .db_client
            .confirm_consultation(consultation_id, meeting_link)
            .await?
            .ok_or(ServiceError::InvalidConsultationStatus(
                consultation_id,
                consultation.status,
            ))?;

        self.notification_service
            .notify_consultation_confirmed(&consultation)
            .await;

        Ok(consultation)
    }

    pub async fn cancel_consultation(
        &self,
        consultation_id: Uuid,
        caller_id: Uuid,
        reason: Option<String>,
    ) -> Result<Consultation, ServiceError> {
        let consultation = self.get_consultation(consultation_id).await?;
        if consultation.lawyer_id != caller_id && consultation.client_id != caller_id {
            return Err(ServiceError::UnauthorizedConsultationAccess(
                caller_id,
                consultation_id,
            ));
        }

        self.db_client
            .cancel_consultation(consultation_id, caller_id, reason)
            .await?
            .ok_or(ServiceError::InvalidConsultationStatus(
                consultation_id,
                consultation.status,
            ))
    }

    /// `Confirmed -> Completed`; the full fee is credited as an earning.
    pub async fn complete_consultation(
        &self,
        consultation_id: Uuid,
        lawyer_id: Uuid,
        notes: Option<String>,
    ) -> Result<Consultation, ServiceError> {
        let consultation = self.get_consultation(consultation_id).await?;
        if consultation.lawyer_id != lawyer_id {
            return Err(ServiceError::UnauthorizedConsultationAccess(
                lawyer_id,
                consultation_id,
            ));
        }

        let consultation = self
            .db_client
            .complete_consultation(consultation_id, notes)
            .await?
            .ok_or(ServiceError::InvalidConsultationStatus(
                consultation_id,
                consultation.status,
            ))?;

        if consultation.fee > 0 {
            self.earnings_service
                .record_earning(
                    consultation.lawyer_id,
                    consultation.fee,
                    EarningType::ConsultationFee,
                    None,
                    Some(consultation.id),
                )
                .await?;
        }

        Ok(consultation)
    }

    /// A confirmed consultation the client skipped. Half the fee is still
    /// owed to the lawyer.
    pub async fn mark_no_show(
        &self,
        consultation_id: Uuid,
        lawyer_id: Uuid,
    ) -> Result<Consultation, ServiceError> {
        let consultation = self.get_consultation(consultation_id).await?;
        if consultation.lawyer_id != lawyer_id {
            return Err(ServiceError::UnauthorizedConsultationAccess(
                lawyer_id,
                consultation_id,
            ));
        }

        let consultation = self
            .db_client
            .mark_consultation_no_show(consultation_id)
            .await?
            .ok_or(ServiceError::InvalidConsultationStatus(
                consultation_id,
                consultation.status,
            ))?;

        let no_show_fee = percent_of(consultation.fee, NO_SHOW_FEE_PERCENT);
        if no_show_fee > 0 {
            self.earnings_service
                .record_earning(
                    consultation.lawyer_id,
                    no_show_fee,
                    EarningType::ConsultationFee,
                    None,
                    Some(consultation.id),
                )
                .await?;
        }

        Ok(consultation)
    }

    /// The original row is closed as `Rescheduled` and a replacement created,
    /// conflict-checked like a fresh booking.
    pub async fn reschedule_consultation(
        &self,
        consultation_id: Uuid,
        caller_id: Uuid,
        new_scheduled_at: chrono::DateTime<Utc>,
    ) -> Result<Consultation, ServiceError> {
        let consultation = self.get_consultation(consultation_id).await?;
        if consultation.lawyer_id != caller_id && consultation.client_id != caller_id {
            return Err(ServiceError::UnauthorizedConsultationAccess(
                caller_id,
                consultation_id,
            ));
        }
        if new_scheduled_at <= Utc::now() {
            return Err(ServiceError::Validation(
                "Consultations must be scheduled in the future".to_string(),
            ));
        }

        let availability = self
            .db_client
            .get_availability(consultation.lawyer_id)
            .await?
            .ok_or_else(|| {
                ServiceError::Validation("This lawyer has no availability configured".to_string())
            })?;

        let date = new_scheduled_at.date_naive();
        if availability.is_date_blocked(date) {
            return Err(ServiceError::SlotUnavailable(new_scheduled_at));
        }
        let schedule = availability
            .schedule()
            .map_err(|e| ServiceError::Validation(e.to_string()))?;
        let day = schedule.for_weekday(chrono::Datelike::weekday(&date));
        if !fits_schedule(day, date, new_scheduled_at, consultation.duration_minutes) {
            return Err(ServiceError::SlotUnavailable(new_scheduled_at));
        }

        match self
            .db_client
            .reschedule_consultation(
                consultation_id,
                new_scheduled_at,
                availability.buffer_minutes,
            )
            .await?
        {
            None => Err(ServiceError::InvalidConsultationStatus(
                consultation_id,
                consultation.status,
            )),
            Some(BookOutcome::SlotTaken) => Err(ServiceError::SlotUnavailable(new_scheduled_at)),
            Some(BookOutcome::Booked(replacement)) => {
                self.notification_service
                    .notify_consultation_booked(&replacement)
                    .await;
                Ok(replacement)
            }
        }
    }

    pub async fn get_consultation(
        &self,
        consultation_id: Uuid,
    ) -> Result<Consultation, ServiceError> {
        self.db_client
            .get_consultation_by_id(consultation_id)
            .await?
            .ok_or(ServiceError::ConsultationNotFound(consultation_id))
    }

    pub async fn list_for_lawyer(&self, lawyer_id: Uuid) -> Result<Vec<Consultation>, ServiceError> {
        Ok(self.db_client.list_consultations_for_lawyer(lawyer_id).await?)
    }

    pub async fn list_for_client(&self, client_id: Uuid) -> Result<Vec<Consultation>, ServiceError> {
        Ok(self.db_client.list_consultations_for_client(client_id).await?)
    }

    /// Active bookings whose buffered footprint can reach into the day. The
    /// query window extends past both midnights by `pad_minutes`, so a
    /// late-evening booking the previous day still masks the first slots.
    async fn busy_intervals_for_day(
        &self,
        lawyer_id: Uuid,
        date: NaiveDate,
        pad_minutes: i64,
    ) -> Result<Vec<BusyInterval>, ServiceError> {
        let day_start =
            chrono::TimeZone::from_utc_datetime(&Utc, &date.and_time(chrono::NaiveTime::MIN));
        let day_end = day_start + chrono::Duration::days(1);
        let pad = chrono::Duration::minutes(pad_minutes);

        let active = self
            .db_client
            .active_consultations_between(lawyer_id, day_start - pad, day_end + pad)
            .await?;

        Ok(active
            .iter()
            .map(|c| BusyInterval {
                start: c.scheduled_at,
                duration_minutes: c.duration_minutes,
            })
            .collect())
    }
}
