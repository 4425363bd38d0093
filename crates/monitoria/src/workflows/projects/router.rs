use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use crate::workflows::access::AccessError;
use crate::workflows::allocation::policy::AllocationViolation;
use crate::workflows::domain::{Actor, DepartmentId, Term};
use crate::workflows::notifications::{Notifier, RecipientDirectory};
use crate::workflows::repository::RepositoryError;

use super::domain::{ProjectChanges, ProjectDraft, ProjectId};
use super::repository::ProjectRepository;
use super::service::{ProjectError, ProjectService};

/// Router builder exposing the project lifecycle.
pub fn project_router<J, N, D>(service: Arc<ProjectService<J, N, D>>) -> Router
where
    J: ProjectRepository + 'static,
    N: Notifier + 'static,
    D: RecipientDirectory + 'static,
{
    Router::new()
        .route("/api/v1/monitoria/projects", post(create_handler::<J, N, D>))
        .route(
            "/api/v1/monitoria/projects/:project_id",
            get(get_handler::<J, N, D>)
                .patch(update_handler::<J, N, D>)
                .delete(delete_handler::<J, N, D>),
        )
        .route(
            "/api/v1/monitoria/projects/:project_id/submit",
            post(submit_handler::<J, N, D>),
        )
        .route(
            "/api/v1/monitoria/projects/:project_id/sign",
            post(sign_handler::<J, N, D>),
        )
        .route(
            "/api/v1/monitoria/projects/:project_id/admin-signature",
            post(require_admin_signature_handler::<J, N, D>),
        )
        .route(
            "/api/v1/monitoria/projects/:project_id/approve",
            post(approve_handler::<J, N, D>),
        )
        .route(
            "/api/v1/monitoria/projects/:project_id/reject",
            post(reject_handler::<J, N, D>),
        )
        .route(
            "/api/v1/monitoria/projects/:project_id/revision",
            post(request_revision_handler::<J, N, D>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    pub actor: Actor,
    pub title: String,
    pub department_id: DepartmentId,
    pub year: i32,
    pub term: Term,
    pub requested_scholarships: u32,
    pub requested_volunteers: u32,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProjectRequest {
    pub actor: Actor,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub department_id: Option<DepartmentId>,
    #[serde(default)]
    pub requested_scholarships: Option<u32>,
    #[serde(default)]
    pub requested_volunteers: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct ActorRequest {
    pub actor: Actor,
}

#[derive(Debug, Deserialize)]
pub struct SignRequest {
    pub actor: Actor,
    pub signature: String,
}

#[derive(Debug, Deserialize)]
pub struct ApproveRequest {
    pub actor: Actor,
    #[serde(default)]
    pub allocated_scholarships: Option<i64>,
    #[serde(default)]
    pub signed_document: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RejectRequest {
    pub actor: Actor,
    pub reason: String,
}

#[derive(Debug, Deserialize)]
pub struct RevisionRequest {
    pub actor: Actor,
    pub feedback: String,
}

pub(crate) async fn create_handler<J, N, D>(
    State(service): State<Arc<ProjectService<J, N, D>>>,
    axum::Json(request): axum::Json<CreateProjectRequest>,
) -> Response
where
    J: ProjectRepository + 'static,
    N: Notifier + 'static,
    D: RecipientDirectory + 'static,
{
    let draft = ProjectDraft {
        title: request.title,
        department_id: request.department_id,
        year: request.year,
        term: request.term,
        requested_scholarships: request.requested_scholarships,
        requested_volunteers: request.requested_volunteers,
    };
    match service.create_project(draft, request.actor, Utc::now()) {
        Ok(project) => (StatusCode::CREATED, axum::Json(project)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn get_handler<J, N, D>(
    State(service): State<Arc<ProjectService<J, N, D>>>,
    Path(project_id): Path<u64>,
) -> Response
where
    J: ProjectRepository + 'static,
    N: Notifier + 'static,
    D: RecipientDirectory + 'static,
{
    match service.get(ProjectId(project_id)) {
        Ok(project) => (StatusCode::OK, axum::Json(project)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn update_handler<J, N, D>(
    State(service): State<Arc<ProjectService<J, N, D>>>,
    Path(project_id): Path<u64>,
    axum::Json(request): axum::Json<UpdateProjectRequest>,
) -> Response
where
    J: ProjectRepository + 'static,
    N: Notifier + 'static,
    D: RecipientDirectory + 'static,
{
    let changes = ProjectChanges {
        title: request.title,
        department_id: request.department_id,
        requested_scholarships: request.requested_scholarships,
        requested_volunteers: request.requested_volunteers,
    };
    match service.update_draft(ProjectId(project_id), changes, request.actor, Utc::now()) {
        Ok(project) => (StatusCode::OK, axum::Json(project)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn delete_handler<J, N, D>(
    State(service): State<Arc<ProjectService<J, N, D>>>,
    Path(project_id): Path<u64>,
    axum::Json(request): axum::Json<ActorRequest>,
) -> Response
where
    J: ProjectRepository + 'static,
    N: Notifier + 'static,
    D: RecipientDirectory + 'static,
{
    match service.delete_draft(ProjectId(project_id), request.actor, Utc::now()) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn submit_handler<J, N, D>(
    State(service): State<Arc<ProjectService<J, N, D>>>,
    Path(project_id): Path<u64>,
    axum::Json(request): axum::Json<ActorRequest>,
) -> Response
where
    J: ProjectRepository + 'static,
    N: Notifier + 'static,
    D: RecipientDirectory + 'static,
{
    match service.submit(ProjectId(project_id), request.actor, Utc::now()) {
        Ok(project) => (StatusCode::OK, axum::Json(project)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn sign_handler<J, N, D>(
    State(service): State<Arc<ProjectService<J, N, D>>>,
    Path(project_id): Path<u64>,
    axum::Json(request): axum::Json<SignRequest>,
) -> Response
where
    J: ProjectRepository + 'static,
    N: Notifier + 'static,
    D: RecipientDirectory + 'static,
{
    match service.sign(
        ProjectId(project_id),
        request.actor,
        request.signature,
        Utc::now(),
    ) {
        Ok(project) => (StatusCode::OK, axum::Json(project)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn require_admin_signature_handler<J, N, D>(
    State(service): State<Arc<ProjectService<J, N, D>>>,
    Path(project_id): Path<u64>,
    axum::Json(request): axum::Json<ActorRequest>,
) -> Response
where
    J: ProjectRepository + 'static,
    N: Notifier + 'static,
    D: RecipientDirectory + 'static,
{
    match service.require_admin_signature(ProjectId(project_id), request.actor, Utc::now()) {
        Ok(project) => (StatusCode::OK, axum::Json(project)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn approve_handler<J, N, D>(
    State(service): State<Arc<ProjectService<J, N, D>>>,
    Path(project_id): Path<u64>,
    axum::Json(request): axum::Json<ApproveRequest>,
) -> Response
where
    J: ProjectRepository + 'static,
    N: Notifier + 'static,
    D: RecipientDirectory + 'static,
{
    match service.approve(
        ProjectId(project_id),
        request.actor,
        request.allocated_scholarships,
        request.signed_document,
        Utc::now(),
    ) {
        Ok(project) => (StatusCode::OK, axum::Json(project)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn reject_handler<J, N, D>(
    State(service): State<Arc<ProjectService<J, N, D>>>,
    Path(project_id): Path<u64>,
    axum::Json(request): axum::Json<RejectRequest>,
) -> Response
where
    J: ProjectRepository + 'static,
    N: Notifier + 'static,
    D: RecipientDirectory + 'static,
{
    match service.reject(
        ProjectId(project_id),
        request.actor,
        request.reason,
        Utc::now(),
    ) {
        Ok(project) => (StatusCode::OK, axum::Json(project)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn request_revision_handler<J, N, D>(
    State(service): State<Arc<ProjectService<J, N, D>>>,
    Path(project_id): Path<u64>,
    axum::Json(request): axum::Json<RevisionRequest>,
) -> Response
where
    J: ProjectRepository + 'static,
    N: Notifier + 'static,
    D: RecipientDirectory + 'static,
{
    match service.request_revision(
        ProjectId(project_id),
        request.actor,
        request.feedback,
        Utc::now(),
    ) {
        Ok(project) => (StatusCode::OK, axum::Json(project)).into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: ProjectError) -> Response {
    let status = match &error {
        ProjectError::EmptyTitle
        | ProjectError::UnsupportedYear { .. }
        | ProjectError::Incomplete
        | ProjectError::EmptySignature
        | ProjectError::MissingSignedDocument
        | ProjectError::EmptyReason
        | ProjectError::EmptyFeedback => StatusCode::UNPROCESSABLE_ENTITY,
        ProjectError::NotFound => StatusCode::NOT_FOUND,
        ProjectError::IllegalTransition { .. } => StatusCode::CONFLICT,
        ProjectError::Allocation(
            AllocationViolation::Negative { .. } | AllocationViolation::OutOfRange { .. },
        ) => StatusCode::UNPROCESSABLE_ENTITY,
        ProjectError::Allocation(_) => StatusCode::CONFLICT,
        ProjectError::Access(AccessError::Forbidden { .. })
        | ProjectError::Access(AccessError::NotOwner) => StatusCode::FORBIDDEN,
        ProjectError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        ProjectError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        ProjectError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
