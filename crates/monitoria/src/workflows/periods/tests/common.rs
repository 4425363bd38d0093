use std::sync::Arc;

use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::workflows::applications::domain::{
    Application, ApplicationId, ApplicationStatus, SlotPreference,
};
use crate::workflows::domain::{Term, UserId};
use crate::workflows::memory::{InMemoryApplicationStore, InMemoryPeriodStore};
use crate::workflows::periods::domain::{Period, PeriodDraft, PeriodId};
use crate::workflows::periods::repository::PeriodRepository;
use crate::workflows::periods::service::PeriodService;
use crate::workflows::projects::domain::ProjectId;
use crate::workflows::repository::RepositoryError;

pub(super) fn day(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid calendar day")
}

pub(super) fn march_draft(year: i32, term: Term) -> PeriodDraft {
    PeriodDraft {
        year,
        term,
        start_date: day(2025, 3, 10),
        end_date: day(2025, 3, 20),
        total_scholarships: None,
    }
}

pub(super) fn application_for_term(year: i32, term: Term) -> Application {
    Application {
        id: ApplicationId(900),
        project_id: ProjectId(77),
        student_id: UserId(31),
        period_id: PeriodId(1),
        year,
        term,
        desired_slot: SlotPreference::Any,
        status: ApplicationStatus::Submitted,
        final_score: None,
        scores: None,
        professor_feedback: None,
        updated_at: chrono::DateTime::UNIX_EPOCH,
    }
}

pub(super) fn build_service() -> (
    PeriodService<InMemoryPeriodStore, InMemoryApplicationStore>,
    Arc<InMemoryPeriodStore>,
    Arc<InMemoryApplicationStore>,
) {
    let periods = Arc::new(InMemoryPeriodStore::default());
    let applications = Arc::new(InMemoryApplicationStore::default());
    let service = PeriodService::new(periods.clone(), applications.clone());
    (service, periods, applications)
}

pub(super) struct UnavailablePeriodStore;

impl PeriodRepository for UnavailablePeriodStore {
    fn insert(&self, _period: Period) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _period: Period) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn remove(&self, _id: PeriodId) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: PeriodId) -> Result<Option<Period>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list(&self) -> Result<Vec<Period>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 4096)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
