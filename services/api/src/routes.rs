use crate::infra::{AppState, Engine};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use monitoria::workflows::allocation::allocation_router;
use monitoria::workflows::applications::application_router;
use monitoria::workflows::notifications::Notifier;
use monitoria::workflows::periods::period_router;
use monitoria::workflows::projects::project_router;
use monitoria::workflows::selection::selection_router;
use serde_json::json;

/// One router covering every workflow plus the operational endpoints.
pub(crate) fn with_workflow_routes<N>(engine: &Engine<N>) -> axum::Router
where
    N: Notifier + 'static,
{
    period_router(engine.enrollment.clone())
        .merge(project_router(engine.proposals.clone()))
        .merge(allocation_router(engine.allocations.clone()))
        .merge(application_router(engine.candidacies.clone()))
        .merge(selection_router(engine.selection.clone()))
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use monitoria::workflows::allocation::AllocationPolicy;
    use monitoria::workflows::memory::RecordingNotifier;
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn demo_engine() -> Engine<RecordingNotifier> {
        Engine::in_memory(
            Arc::new(RecordingNotifier::default()),
            AllocationPolicy::new(20),
        )
    }

    fn test_state(ready: bool) -> AppState {
        let recorder = PrometheusBuilder::new().build_recorder();
        AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(recorder.handle()),
        }
    }

    #[tokio::test]
    async fn healthcheck_reports_ok() {
        let Json(body) = healthcheck().await;
        assert_eq!(body, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn readiness_flips_with_the_flag() {
        let waiting = readiness_endpoint(Extension(test_state(false)))
            .await
            .into_response();
        assert_eq!(waiting.status(), StatusCode::SERVICE_UNAVAILABLE);

        let ready = readiness_endpoint(Extension(test_state(true)))
            .await
            .into_response();
        assert_eq!(ready.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn merged_router_serves_workflows_and_health() {
        let engine = demo_engine();
        let router = with_workflow_routes(&engine).layer(Extension(test_state(true)));

        let payload = json!({
            "actor": {"id": 1, "role": "admin"},
            "year": 2025,
            "term": "TERM_1",
            "start_date": "2025-03-10",
            "end_date": "2025-03-20",
            "total_scholarships": 10,
        });
        let created = router
            .clone()
            .oneshot(
                axum::http::Request::post("/api/v1/monitoria/periods")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(axum::body::Body::from(payload.to_string()))
                    .unwrap(),
            )
            .await
            .expect("route executes");
        assert_eq!(created.status(), StatusCode::CREATED);

        let health = router
            .oneshot(
                axum::http::Request::get("/health")
                    .body(axum::body::Body::empty())
                    .unwrap(),
            )
            .await
            .expect("route executes");
        assert_eq!(health.status(), StatusCode::OK);
    }
}
