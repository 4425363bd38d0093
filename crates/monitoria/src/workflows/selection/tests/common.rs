use std::sync::Arc;

use axum::response::Response;
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::workflows::applications::domain::{
    Application, ApplicationId, ApplicationStatus, SlotKind, SlotPreference,
};
use crate::workflows::applications::repository::ApplicationRepository;
use crate::workflows::domain::{DepartmentId, Term, UserId};
use crate::workflows::memory::{
    InMemoryApplicationStore, InMemoryDirectory, InMemoryProjectStore, RecordingNotifier,
};
use crate::workflows::notifications::{DeliveryError, NotificationEvent, Notifier};
use crate::workflows::periods::domain::PeriodId;
use crate::workflows::projects::domain::{Project, ProjectId, ProjectStatus};
use crate::workflows::projects::repository::ProjectRepository;
use crate::workflows::selection::plan::SelectionEntry;
use crate::workflows::selection::service::SelectionService;

pub(super) type SelectionSvc = SelectionService<
    InMemoryProjectStore,
    InMemoryApplicationStore,
    InMemoryDirectory,
    RecordingNotifier,
>;

pub(super) fn fixed_now() -> DateTime<Utc> {
    chrono::NaiveDate::from_ymd_opt(2025, 3, 25)
        .expect("valid calendar day")
        .and_hms_opt(10, 0, 0)
        .expect("valid time")
        .and_utc()
}

/// Two scholarship slots, one volunteer slot.
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

pub(super) fn candidacy(
    id: u64,
    student: u64,
    slot: SlotPreference,
    score: Option<f64>,
) -> Application {
    Application {
        id: ApplicationId(id),
        project_id: ProjectId(1),
        student_id: UserId(student),
        period_id: PeriodId(70),
        year: 2025,
        term: Term::First,
        desired_slot: slot,
        status: ApplicationStatus::Submitted,
        final_score: score,
        scores: None,
        professor_feedback: None,
        updated_at: fixed_now(),
    }
}

pub(super) fn entry(id: u64, slot: SlotKind) -> SelectionEntry {
    SelectionEntry {
        application_id: ApplicationId(id),
        slot,
    }
}

pub(super) fn build_service() -> (
    SelectionSvc,
    Arc<InMemoryProjectStore>,
    Arc<InMemoryApplicationStore>,
    Arc<InMemoryDirectory>,
    Arc<RecordingNotifier>,
) {
    let projects = Arc::new(InMemoryProjectStore::default());
    let applications = Arc::new(InMemoryApplicationStore::default());
    let directory = Arc::new(InMemoryDirectory::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let service = SelectionService::new(
        projects.clone(),
        applications.clone(),
        directory.clone(),
        notifier.clone(),
    );
    (service, projects, applications, directory, notifier)
}

/// Project 1 with five graded candidacies and every student reachable.
pub(super) fn seeded_round() -> (
    SelectionSvc,
    Arc<InMemoryProjectStore>,
    Arc<InMemoryApplicationStore>,
    Arc<InMemoryDirectory>,
    Arc<RecordingNotifier>,
) {
    let (service, projects, applications, directory, notifier) = build_service();
    projects
        .insert(approved_project(1, 9))
        .expect("project stored");
    let rows = [
        candidacy(1, 101, SlotPreference::Scholarship, Some(9.5)),
        candidacy(2, 102, SlotPreference::Any, Some(9.0)),
        candidacy(3, 103, SlotPreference::Volunteer, Some(8.0)),
        candidacy(4, 104, SlotPreference::Any, Some(6.5)),
        candidacy(5, 105, SlotPreference::Scholarship, Some(5.0)),
    ];
    for row in rows {
        directory.register(row.student_id, &format!("student{}@uni.edu", row.student_id.0));
        applications.insert(row).expect("candidacy stored");
    }
    (service, projects, applications, directory, notifier)
}

/// Notifier double whose delivery always fails.
#[derive(Default)]
pub(super) struct RejectingNotifier;

impl Notifier for RejectingNotifier {
    fn send(&self, _event: &NotificationEvent) -> Result<(), DeliveryError> {
        Err(DeliveryError::Unavailable("smtp relay down".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 4096)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
