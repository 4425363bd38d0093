use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Router,
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use serde_json::json;

use crate::workflows::access::AccessError;
use crate::workflows::applications::repository::ApplicationRepository;
use crate::workflows::domain::{Actor, Term};
use crate::workflows::repository::RepositoryError;

use super::domain::{PeriodDraft, PeriodId, PeriodPatch};
use super::repository::PeriodRepository;
use super::service::{PeriodError, PeriodService};

/// Router builder exposing the enrollment-window calendar.
pub fn period_router<P, A>(service: Arc<PeriodService<P, A>>) -> Router
where
    P: PeriodRepository + 'static,
    A: ApplicationRepository + 'static,
{
    Router::new()
        .route("/api/v1/monitoria/periods", post(create_handler::<P, A>))
        .route(
            "/api/v1/monitoria/periods/active",
            get(active_handler::<P, A>),
        )
        .route(
            "/api/v1/monitoria/periods/:period_id",
            patch(update_handler::<P, A>).delete(delete_handler::<P, A>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub struct CreatePeriodRequest {
    pub actor: Actor,
    pub year: i32,
    pub term: Term,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub total_scholarships: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePeriodRequest {
    pub actor: Actor,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub total_scholarships: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct DeletePeriodRequest {
    pub actor: Actor,
}

#[derive(Debug, Deserialize)]
pub struct ActivePeriodQuery {
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub term: Option<Term>,
}

pub(crate) async fn create_handler<P, A>(
    State(service): State<Arc<PeriodService<P, A>>>,
    axum::Json(request): axum::Json<CreatePeriodRequest>,
) -> Response
where
    P: PeriodRepository + 'static,
    A: ApplicationRepository + 'static,
{
    let draft = PeriodDraft {
        year: request.year,
        term: request.term,
        start_date: request.start_date,
        end_date: request.end_date,
        total_scholarships: request.total_scholarships,
    };
    match service.create_period(draft, request.actor) {
        Ok(period) => (StatusCode::CREATED, axum::Json(period)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn update_handler<P, A>(
    State(service): State<Arc<PeriodService<P, A>>>,
    Path(period_id): Path<u64>,
    axum::Json(request): axum::Json<UpdatePeriodRequest>,
) -> Response
where
    P: PeriodRepository + 'static,
    A: ApplicationRepository + 'static,
{
    let patch = PeriodPatch {
        start_date: request.start_date,
        end_date: request.end_date,
        total_scholarships: request.total_scholarships,
    };
    match service.update_period(PeriodId(period_id), patch, request.actor) {
        Ok(period) => (StatusCode::OK, axum::Json(period)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn delete_handler<P, A>(
    State(service): State<Arc<PeriodService<P, A>>>,
    Path(period_id): Path<u64>,
    axum::Json(request): axum::Json<DeletePeriodRequest>,
) -> Response
where
    P: PeriodRepository + 'static,
    A: ApplicationRepository + 'static,
{
    match service.delete_period(PeriodId(period_id), request.actor) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn active_handler<P, A>(
    State(service): State<Arc<PeriodService<P, A>>>,
    Query(query): Query<ActivePeriodQuery>,
) -> Response
where
    P: PeriodRepository + 'static,
    A: ApplicationRepository + 'static,
{
    let today = Local::now().date_naive();
    match service.active_period(query.year, query.term, today) {
        Ok(Some(period)) => (StatusCode::OK, axum::Json(period)).into_response(),
        Ok(None) => {
            let payload = json!({
                "error": "no enrollment period is open today",
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

fn error_response(error: PeriodError) -> Response {
    let status = match &error {
        PeriodError::UnsupportedYear { .. } | PeriodError::EmptyWindow => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        PeriodError::Overlap { .. } | PeriodError::InUse { .. } => StatusCode::CONFLICT,
        PeriodError::NotFound => StatusCode::NOT_FOUND,
        PeriodError::Access(AccessError::Forbidden { .. }) | PeriodError::Access(AccessError::NotOwner) => {
            StatusCode::FORBIDDEN
        }
        PeriodError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        PeriodError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        PeriodError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
