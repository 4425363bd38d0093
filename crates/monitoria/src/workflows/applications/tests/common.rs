use std::sync::Arc;

use axum::response::Response;
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;

use crate::workflows::applications::domain::{Application, SlotPreference};
use crate::workflows::applications::service::ApplicationService;
use crate::workflows::domain::{Actor, DepartmentId, Term, UserId};
use crate::workflows::memory::{
    InMemoryApplicationStore, InMemoryPeriodStore, InMemoryProjectStore,
};
use crate::workflows::periods::domain::{Period, PeriodId};
use crate::workflows::periods::repository::PeriodRepository;
use crate::workflows::projects::domain::{Project, ProjectId, ProjectStatus};
use crate::workflows::projects::repository::ProjectRepository;

pub(super) type ApplicationSvc =
    ApplicationService<InMemoryPeriodStore, InMemoryProjectStore, InMemoryApplicationStore>;

pub(super) fn day(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid calendar day")
}

/// A date inside the seeded March window.
pub(super) fn mid_window() -> NaiveDate {
    day(2025, 3, 12)
}

pub(super) fn fixed_now() -> DateTime<Utc> {
    mid_window()
        .and_hms_opt(9, 0, 0)
        .expect("valid time")
        .and_utc()
}

pub(super) fn approved_project(id: u64, professor: u64) -> Project {
    Project {
        id: ProjectId(id),
        title: "Calculus I monitoring".to_string(),
        professor_id: UserId(professor),
        department_id: DepartmentId(3),
        year: 2025,
        term: Term::First,
        requested_scholarships: 2,
        requested_volunteers: 1,
        allocated_scholarships: Some(2),
        status: ProjectStatus::Approved,
        professor_signature: Some("assinatura".to_string()),
        admin_signature: None,
        admin_feedback: None,
        deleted_at: None,
        updated_at: fixed_now(),
    }
}

pub(super) fn march_window() -> Period {
    Period {
        id: PeriodId(70),
        year: 2025,
        term: Term::First,
        start_date: day(2025, 3, 10),
        end_date: day(2025, 3, 20),
        total_scholarships: Some(10),
    }
}

pub(super) fn build_service() -> (
    ApplicationSvc,
    Arc<InMemoryPeriodStore>,
    Arc<InMemoryProjectStore>,
    Arc<InMemoryApplicationStore>,
) {
    let periods = Arc::new(InMemoryPeriodStore::default());
    let projects = Arc::new(InMemoryProjectStore::default());
    let applications = Arc::new(InMemoryApplicationStore::default());
    let service = ApplicationService::new(periods.clone(), projects.clone(), applications.clone());
    (service, periods, projects, applications)
}

/// Approved project plus an open March window, ready to take candidacies.
pub(super) fn seeded_service() -> (
    ApplicationSvc,
    Arc<InMemoryPeriodStore>,
    Arc<InMemoryProjectStore>,
    Arc<InMemoryApplicationStore>,
) {
    let (service, periods, projects, applications) = build_service();
    periods.insert(march_window()).expect("window stored");
    projects
        .insert(approved_project(1, 9))
        .expect("project stored");
    (service, periods, projects, applications)
}

pub(super) fn submitted(
    service: &ApplicationSvc,
    student: u64,
    slot: SlotPreference,
) -> Application {
    service
        .submit_application(
            ProjectId(1),
            Actor::student(student),
            slot,
            mid_window(),
            fixed_now(),
        )
        .expect("application accepted")
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 4096)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
