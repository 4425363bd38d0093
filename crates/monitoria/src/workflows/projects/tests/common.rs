use std::sync::Arc;

use axum::response::Response;
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::workflows::domain::{Actor, DepartmentId, Term, UserId};
use crate::workflows::memory::{
    InMemoryDirectory, InMemoryProjectStore, RecordingNotifier,
};
use crate::workflows::notifications::{DeliveryError, NotificationEvent, Notifier};
use crate::workflows::projects::domain::{Project, ProjectDraft};
use crate::workflows::projects::service::ProjectService;

pub(super) type ProjectSvc =
    ProjectService<InMemoryProjectStore, RecordingNotifier, InMemoryDirectory>;

pub(super) fn fixed_now() -> DateTime<Utc> {
    chrono::NaiveDate::from_ymd_opt(2025, 2, 10)
        .expect("valid calendar day")
        .and_hms_opt(14, 30, 0)
        .expect("valid time")
        .and_utc()
}

pub(super) fn calculus_draft() -> ProjectDraft {
    ProjectDraft {
        title: "Calculus I monitoring".to_string(),
        department_id: DepartmentId(3),
        year: 2025,
        term: Term::First,
        requested_scholarships: 2,
        requested_volunteers: 1,
    }
}

pub(super) fn build_service() -> (
    ProjectSvc,
    Arc<InMemoryProjectStore>,
    Arc<RecordingNotifier>,
    Arc<InMemoryDirectory>,
) {
    let projects = Arc::new(InMemoryProjectStore::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let directory = Arc::new(InMemoryDirectory::default());
    directory.register(UserId(9), "prof@uni.edu");
    directory.register_admin("coord@uni.edu");
    let service = ProjectService::new(projects.clone(), notifier.clone(), directory.clone());
    (service, projects, notifier, directory)
}

pub(super) fn draft_project(service: &ProjectSvc) -> Project {
    service
        .create_project(calculus_draft(), Actor::professor(9), fixed_now())
        .expect("draft opens")
}

pub(super) fn submitted_project(service: &ProjectSvc) -> Project {
    let project = draft_project(service);
    service
        .submit(project.id, Actor::professor(9), fixed_now())
        .expect("submission parks at the signature stage");
    service
        .sign(
            project.id,
            Actor::professor(9),
            "assinatura-prof".to_string(),
            fixed_now(),
        )
        .expect("signature recorded")
}

pub(super) struct FailingNotifier;

impl Notifier for FailingNotifier {
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
