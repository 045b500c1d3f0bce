// service/case_service.rs
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    db::{casedb::CaseExt, db::DBClient},
    dtos::casedtos::CreateCaseDto,
    models::casemodel::*,
    service::error::ServiceError,
    utils::currency::to_minor_units,
};

#[derive(Debug, Clone)]
pub struct CaseService {
    db_client: Arc<DBClient>,
}

impl CaseService {
    pub fn new(db_client: Arc<DBClient>) -> Self {
        Self { db_client }
    }

    pub async fn create_case(
        &self,
        client_id: Uuid,
        data: CreateCaseDto,
    ) -> Result<Case, ServiceError> {
        let budget_min = to_minor_units(data.budget_min);
        let budget_max = to_minor_units(data.budget_max);
        if budget_min > budget_max {
            return Err(ServiceError::Validation(
                "Minimum budget cannot exceed maximum budget".to_string(),
            ));
        }

        let case = self
            .db_client
            .create_case(
                client_id,
                data.title,
                data.description,
                data.legal_area,
                data.service_type,
                budget_min,
                budget_max,
                data.urgency,
                data.location,
            )
            .await?;

        Ok(case)
    }

    /// `Draft -> Posted`, client ownership required.
    pub async fn post_case(&self, case_id: Uuid, client_id: Uuid) -> Result<Case, ServiceError> {
        let case = self
            .db_client
            .get_case_by_id(case_id)
            .await?
            .ok_or(ServiceError::CaseNotFound(case_id))?;

        if case.client_id != client_id {
            return Err(ServiceError::UnauthorizedCaseAccess(client_id, case_id));
        }
        if case.status != CaseStatus::Draft {
            return Err(ServiceError::InvalidCaseStatus(case_id, case.status));
        }

        Ok(self
            .db_client
            .update_case_status(case_id, CaseStatus::Posted)
            .await?)
    }

    /// The single status mutation primitive. Gated by the transition table;
    /// `assigned_at`/`completed_at` are stamped as entry side effects.
    pub async fn update_status(
        &self,
        case_id: Uuid,
        new_status: CaseStatus,
    ) -> Result<Case, ServiceError> {
        let case = self
            .db_client
            .get_case_by_id(case_id)
            .await?
            .ok_or(ServiceError::CaseNotFound(case_id))?;

        if !case.status.can_transition_to(new_status) {
            return Err(ServiceError::InvalidCaseStatus(case_id, case.status));
        }

        Ok(self.db_client.update_case_status(case_id, new_status).await?)
    }

    /// Sets lawyer + fee and forces `Assigned`. The agreed fee must fall
    /// inside the posted budget range.
    pub async fn assign_lawyer(
        &self,
        case_id: Uuid,
        lawyer_id: Uuid,
        agreed_fee: i64,
    ) -> Result<Case, ServiceError> {
        let case = self
            .db_client
            .get_case_by_id(case_id)
            .await?
            .ok_or(ServiceError::CaseNotFound(case_id))?;

        if !case.status.can_transition_to(CaseStatus::Assigned) {
            return Err(ServiceError::InvalidCaseStatus(case_id, case.status));
        }
        if agreed_fee < case.budget_min || agreed_fee > case.budget_max {
            return Err(ServiceError::Validation(format!(
                "Agreed fee {} is outside the budget range [{}, {}]",
                agreed_fee, case.budget_min, case.budget_max
            )));
        }

        Ok(self
            .db_client
            .assign_lawyer(case_id, lawyer_id, agreed_fee)
            .await?)
    }

    pub async fn get_case(&self, case_id: Uuid) -> Result<Case, ServiceError> {
        self.db_client
            .get_case_by_id(case_id)
            .await?
            .ok_or(ServiceError::CaseNotFound(case_id))
    }

    pub async fn list_cases_by_client(&self, client_id: Uuid) -> Result<Vec<Case>, ServiceError> {
        Ok(self.db_client.list_cases_by_client(client_id).await?)
    }

    pub async fn list_open_cases(&self) -> Result<Vec<Case>, ServiceError> {
        Ok(self.db_client.list_open_cases().await?)
    }

    /// Either party may cancel a case that has not yet reached a terminal
    /// state; cancellations after funding go through the escrow refund path.
    pub async fn cancel_case(&self, case_id: Uuid, caller_id: Uuid) -> Result<Case, ServiceError> {
        let case = self
            .db_client
            .get_case_by_id(case_id)
            .await?
            .ok_or(ServiceError::CaseNotFound(case_id))?;

        if case.client_id != caller_id && case.lawyer_id != Some(caller_id) {
            return Err(ServiceError::UnauthorizedCaseAccess(caller_id, case_id));
        }
        if !case.status.can_transition_to(CaseStatus::Cancelled) {
            return Err(ServiceError::InvalidCaseStatus(case_id, case.status));
        }

        Ok(self
            .db_client
            .update_case_status(case_id, CaseStatus::Cancelled)
            .await?)
    }
}
