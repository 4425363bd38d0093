use crate::cli::ServeArgs;
use crate::infra::{AppState, Engine};
use crate::routes::with_workflow_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use monitoria::config::AppConfig;
use monitoria::error::AppError;
use monitoria::telemetry;
use monitoria::workflows::allocation::AllocationPolicy;
use monitoria::workflows::notifications::TracingNotifier;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let policy = AllocationPolicy::new(config.program.volunteer_ceiling);
    let engine = Engine::in_memory(Arc::new(TracingNotifier), policy);

    let app = with_workflow_routes(&engine)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "monitoria selection engine ready");

    axum::serve(listener, app).await?;
    Ok(())
}
