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

use crate::workflows::access::AccessError;
use crate::workflows::domain::Actor;
use crate::workflows::periods::domain::PeriodId;
use crate::workflows::periods::repository::PeriodRepository;
use crate::workflows::projects::domain::ProjectId;
use crate::workflows::projects::repository::ProjectRepository;
use crate::workflows::repository::RepositoryError;

use super::policy::AllocationViolation;
use super::service::{AllocationError, AllocationService};

/// Router builder for slot adjustments and the term funding pool.
pub fn allocation_router<P, J>(service: Arc<AllocationService<P, J>>) -> Router
where
    P: PeriodRepository + 'static,
    J: ProjectRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/monitoria/projects/:project_id/allocation/scholarships",
            post(adjust_scholarships_handler::<P, J>),
        )
        .route(
            "/api/v1/monitoria/projects/:project_id/allocation/volunteers",
            post(adjust_volunteers_handler::<P, J>),
        )
        .route(
            "/api/v1/monitoria/periods/:period_id/pool",
            post(set_pool_handler::<P, J>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub struct AdjustmentRequest {
    pub actor: Actor,
    pub proposed: i64,
}

#[derive(Debug, Deserialize)]
pub struct PoolRequest {
    pub actor: Actor,
    pub total: u32,
}

pub(crate) async fn adjust_scholarships_handler<P, J>(
    State(service): State<Arc<AllocationService<P, J>>>,
    Path(project_id): Path<u64>,
    axum::Json(request): axum::Json<AdjustmentRequest>,
) -> Response
where
    P: PeriodRepository + 'static,
    J: ProjectRepository + 'static,
{
    match service.adjust_scholarships(
        ProjectId(project_id),
        request.actor,
        request.proposed,
        Utc::now(),
    ) {
        Ok(project) => (StatusCode::OK, axum::Json(project)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn adjust_volunteers_handler<P, J>(
    State(service): State<Arc<AllocationService<P, J>>>,
    Path(project_id): Path<u64>,
    axum::Json(request): axum::Json<AdjustmentRequest>,
) -> Response
where
    P: PeriodRepository + 'static,
    J: ProjectRepository + 'static,
{
    match service.adjust_volunteers(
        ProjectId(project_id),
        request.actor,
        request.proposed,
        Utc::now(),
    ) {
        Ok(project) => (StatusCode::OK, axum::Json(project)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn set_pool_handler<P, J>(
    State(service): State<Arc<AllocationService<P, J>>>,
    Path(period_id): Path<u64>,
    axum::Json(request): axum::Json<PoolRequest>,
) -> Response
where
    P: PeriodRepository + 'static,
    J: ProjectRepository + 'static,
{
    match service.set_term_pool(PeriodId(period_id), request.actor, request.total) {
        Ok(period) => (StatusCode::OK, axum::Json(period)).into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: AllocationError) -> Response {
    let status = match &error {
        AllocationError::ProjectNotFound | AllocationError::PeriodNotFound => {
            StatusCode::NOT_FOUND
        }
        AllocationError::NotApproved { .. } => StatusCode::CONFLICT,
        AllocationError::Policy(
            AllocationViolation::Negative { .. } | AllocationViolation::OutOfRange { .. },
        ) => StatusCode::UNPROCESSABLE_ENTITY,
        AllocationError::Policy(_) => StatusCode::CONFLICT,
        AllocationError::Access(AccessError::Forbidden { .. })
        | AllocationError::Access(AccessError::NotOwner) => StatusCode::FORBIDDEN,
        AllocationError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        AllocationError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        AllocationError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
