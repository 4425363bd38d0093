use std::sync::Arc;

use axum::response::Response;
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;

use crate::workflows::allocation::policy::AllocationPolicy;
use crate::workflows::allocation::service::AllocationService;
use crate::workflows::domain::{DepartmentId, Term, UserId};
use crate::workflows::memory::{InMemoryPeriodStore, InMemoryProjectStore};
use crate::workflows::periods::domain::{Period, PeriodId};
use crate::workflows::projects::domain::{Project, ProjectId, ProjectStatus};

pub(super) fn day(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid calendar day")
}

pub(super) fn fixed_now() -> DateTime<Utc> {
    day(2025, 3, 12)
        .and_hms_opt(9, 0, 0)
        .expect("valid time")
        .and_utc()
}

pub(super) fn approved_project(id: u64, professor: u64) -> Project {
    Project {
        id: ProjectId(id),
        title: "Algorithms monitoring".to_string(),
        professor_id: UserId(professor),
        department_id: DepartmentId(4),
        year: 2025,
        term: Term::First,
        requested_scholarships: 5,
        requested_volunteers: 2,
        allocated_scholarships: Some(3),
        status: ProjectStatus::Approved,
        professor_signature: Some("assinatura".to_string()),
        admin_signature: None,
        admin_feedback: None,
        deleted_at: None,
        updated_at: fixed_now(),
    }
}

pub(super) fn march_period(pool: Option<u32>) -> Period {
    Period {
        id: PeriodId(50),
        year: 2025,
        term: Term::First,
        start_date: day(2025, 3, 10),
        end_date: day(2025, 3, 20),
        total_scholarships: pool,
    }
}

pub(super) fn build_service() -> (
    AllocationService<InMemoryPeriodStore, InMemoryProjectStore>,
    Arc<InMemoryPeriodStore>,
    Arc<InMemoryProjectStore>,
) {
    let periods = Arc::new(InMemoryPeriodStore::default());
    let projects = Arc::new(InMemoryProjectStore::default());
    let service = AllocationService::new(
        periods.clone(),
        projects.clone(),
        AllocationPolicy::default(),
    );
    (service, periods, projects)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 4096)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
