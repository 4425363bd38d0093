use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use crate::workflows::applications::repository::ApplicationRepository;
use crate::workflows::domain::Actor;
use crate::workflows::notifications::{Notifier, RecipientDirectory};
use crate::workflows::projects::domain::ProjectId;
use crate::workflows::projects::repository::ProjectRepository;
use crate::workflows::repository::RepositoryError;

use super::plan::{SelectionEntry, SelectionViolation};
use super::service::{FinalizationResult, SelectionError, SelectionService};

/// Router builder for deciding and inspecting selection rounds.
pub fn selection_router<J, A, D, N>(service: Arc<SelectionService<J, A, D, N>>) -> Router
where
    J: ProjectRepository + 'static,
    A: ApplicationRepository + 'static,
    D: RecipientDirectory + 'static,
    N: Notifier + 'static,
{
    Router::new()
        .route(
            "/api/v1/monitoria/projects/:project_id/selection",
            post(finalize_handler::<J, A, D, N>).get(status_handler::<J, A, D, N>),
        )
        .route(
            "/api/v1/monitoria/projects/:project_id/selection/ranked",
            post(ranked_handler::<J, A, D, N>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub struct FinalizeRequest {
    pub actor: Actor,
    pub selections: Vec<SelectionEntry>,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RankedFinalizeRequest {
    pub actor: Actor,
    pub threshold: f64,
    #[serde(default)]
    pub note: Option<String>,
}

pub(crate) async fn finalize_handler<J, A, D, N>(
    State(service): State<Arc<SelectionService<J, A, D, N>>>,
    Path(project_id): Path<u64>,
    axum::Json(request): axum::Json<FinalizeRequest>,
) -> Response
where
    J: ProjectRepository + 'static,
    A: ApplicationRepository + 'static,
    D: RecipientDirectory + 'static,
    N: Notifier + 'static,
{
    match service.finalize_selection(
        ProjectId(project_id),
        request.selections,
        request.actor,
        request.note,
        Utc::now(),
    ) {
        Ok(result) => decided_response(&service, result),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn ranked_handler<J, A, D, N>(
    State(service): State<Arc<SelectionService<J, A, D, N>>>,
    Path(project_id): Path<u64>,
    axum::Json(request): axum::Json<RankedFinalizeRequest>,
) -> Response
where
    J: ProjectRepository + 'static,
    A: ApplicationRepository + 'static,
    D: RecipientDirectory + 'static,
    N: Notifier + 'static,
{
    match service.finalize_by_ranking(
        ProjectId(project_id),
        request.actor,
        request.threshold,
        request.note,
        Utc::now(),
    ) {
        Ok(result) => decided_response(&service, result),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn status_handler<J, A, D, N>(
    State(service): State<Arc<SelectionService<J, A, D, N>>>,
    Path(project_id): Path<u64>,
) -> Response
where
    J: ProjectRepository + 'static,
    A: ApplicationRepository + 'static,
    D: RecipientDirectory + 'static,
    N: Notifier + 'static,
{
    match service.get_selection_status(ProjectId(project_id)) {
        Ok(status) => (StatusCode::OK, axum::Json(status)).into_response(),
        Err(error) => error_response(error),
    }
}

/// Deliver the notices after the commit, then report tallies for both.
fn decided_response<J, A, D, N>(
    service: &SelectionService<J, A, D, N>,
    result: FinalizationResult,
) -> Response
where
    J: ProjectRepository + 'static,
    A: ApplicationRepository + 'static,
    D: RecipientDirectory + 'static,
    N: Notifier + 'static,
{
    let report = service.dispatch(&result.notifications);
    let payload = json!({
        "selected": result.selected,
        "rejected": result.rejected,
        "total": result.total,
        "dispatch": report,
    });
    (StatusCode::OK, axum::Json(payload)).into_response()
}

fn error_response(error: SelectionError) -> Response {
    let status = match &error {
        SelectionError::ProjectNotFound => StatusCode::NOT_FOUND,
        SelectionError::NotApproved { .. } | SelectionError::AlreadyFinalized => {
            StatusCode::CONFLICT
        }
        SelectionError::Plan(
            SelectionViolation::UnknownApplication { .. }
            | SelectionViolation::DuplicateEntry { .. },
        ) => StatusCode::UNPROCESSABLE_ENTITY,
        SelectionError::Plan(_) => StatusCode::CONFLICT,
        SelectionError::Access(_) => StatusCode::FORBIDDEN,
        SelectionError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        SelectionError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        SelectionError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
