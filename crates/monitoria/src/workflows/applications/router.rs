use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::{Local, Utc};
use serde::Deserialize;
use serde_json::json;

use crate::workflows::domain::Actor;
use crate::workflows::periods::repository::PeriodRepository;
use crate::workflows::projects::domain::ProjectId;
use crate::workflows::projects::repository::ProjectRepository;
use crate::workflows::repository::RepositoryError;

use super::domain::{ApplicationId, ScoreBreakdown, SlotPreference};
use super::repository::ApplicationRepository;
use super::service::{ApplicationError, ApplicationService};

/// Router builder for candidacy intake, grading, and offer responses.
pub fn application_router<P, J, A>(service: Arc<ApplicationService<P, J, A>>) -> Router
where
    P: PeriodRepository + 'static,
    J: ProjectRepository + 'static,
    A: ApplicationRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/monitoria/applications",
            post(submit_handler::<P, J, A>),
        )
        .route(
            "/api/v1/monitoria/applications/:application_id",
            get(get_handler::<P, J, A>),
        )
        .route(
            "/api/v1/monitoria/applications/:application_id/evaluation",
            post(evaluation_handler::<P, J, A>),
        )
        .route(
            "/api/v1/monitoria/applications/:application_id/evaluation/components",
            post(component_evaluation_handler::<P, J, A>),
        )
        .route(
            "/api/v1/monitoria/applications/:application_id/response",
            post(response_handler::<P, J, A>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub struct SubmitApplicationRequest {
    pub actor: Actor,
    pub project_id: u64,
    pub desired_slot: SlotPreference,
}

#[derive(Debug, Deserialize)]
pub struct EvaluationRequest {
    pub actor: Actor,
    pub final_score: f64,
    #[serde(default)]
    pub feedback: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ComponentEvaluationRequest {
    pub actor: Actor,
    pub scores: ScoreBreakdown,
    #[serde(default)]
    pub feedback: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OfferResponseRequest {
    pub actor: Actor,
    pub accept: bool,
}

pub(crate) async fn submit_handler<P, J, A>(
    State(service): State<Arc<ApplicationService<P, J, A>>>,
    axum::Json(request): axum::Json<SubmitApplicationRequest>,
) -> Response
where
    P: PeriodRepository + 'static,
    J: ProjectRepository + 'static,
    A: ApplicationRepository + 'static,
{
    let today = Local::now().date_naive();
    match service.submit_application(
        ProjectId(request.project_id),
        request.actor,
        request.desired_slot,
        today,
        Utc::now(),
    ) {
        Ok(application) => (StatusCode::CREATED, axum::Json(application)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn get_handler<P, J, A>(
    State(service): State<Arc<ApplicationService<P, J, A>>>,
    Path(application_id): Path<u64>,
) -> Response
where
    P: PeriodRepository + 'static,
    J: ProjectRepository + 'static,
    A: ApplicationRepository + 'static,
{
    match service.get(ApplicationId(application_id)) {
        Ok(application) => (StatusCode::OK, axum::Json(application)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn evaluation_handler<P, J, A>(
    State(service): State<Arc<ApplicationService<P, J, A>>>,
    Path(application_id): Path<u64>,
    axum::Json(request): axum::Json<EvaluationRequest>,
) -> Response
where
    P: PeriodRepository + 'static,
    J: ProjectRepository + 'static,
    A: ApplicationRepository + 'static,
{
    match service.record_evaluation(
        ApplicationId(application_id),
        request.actor,
        request.final_score,
        request.feedback,
        Utc::now(),
    ) {
        Ok(application) => (StatusCode::OK, axum::Json(application)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn component_evaluation_handler<P, J, A>(
    State(service): State<Arc<ApplicationService<P, J, A>>>,
    Path(application_id): Path<u64>,
    axum::Json(request): axum::Json<ComponentEvaluationRequest>,
) -> Response
where
    P: PeriodRepository + 'static,
    J: ProjectRepository + 'static,
    A: ApplicationRepository + 'static,
{
    match service.record_component_evaluation(
        ApplicationId(application_id),
        request.actor,
        request.scores,
        request.feedback,
        Utc::now(),
    ) {
        Ok(application) => (StatusCode::OK, axum::Json(application)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn response_handler<P, J, A>(
    State(service): State<Arc<ApplicationService<P, J, A>>>,
    Path(application_id): Path<u64>,
    axum::Json(request): axum::Json<OfferResponseRequest>,
) -> Response
where
    P: PeriodRepository + 'static,
    J: ProjectRepository + 'static,
    A: ApplicationRepository + 'static,
{
    match service.respond_to_offer(
        ApplicationId(application_id),
        request.actor,
        request.accept,
        Utc::now(),
    ) {
        Ok(application) => (StatusCode::OK, axum::Json(application)).into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: ApplicationError) -> Response {
    let status = match &error {
        ApplicationError::GradeOutOfScale { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        ApplicationError::ProjectNotFound | ApplicationError::NotFound => StatusCode::NOT_FOUND,
        ApplicationError::ProjectNotApproved { .. }
        | ApplicationError::PeriodClosed { .. }
        | ApplicationError::Duplicate
        | ApplicationError::SlotUnavailable { .. }
        | ApplicationError::InvalidState { .. }
        | ApplicationError::ScholarshipHeld { .. } => StatusCode::CONFLICT,
        ApplicationError::Access(_) => StatusCode::FORBIDDEN,
        ApplicationError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        ApplicationError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        ApplicationError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
