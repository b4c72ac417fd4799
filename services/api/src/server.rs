use crate::cli::ServeArgs;
use crate::infra::{
    seed_repositories, AppState, InMemoryApplicationRepository, InMemoryNotificationPublisher,
};
use crate::routes::with_application_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use placement_portal::config::AppConfig;
use placement_portal::error::AppError;
use placement_portal::telemetry;
use placement_portal::workflows::placement::{PlacementApplicationService, SalaryGate};
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

    let (jobs, students) = seed_repositories(&config.placement)?;
    let salary_gate = SalaryGate::new(config.placement.salary_cap_multiplier);
    let application_service = Arc::new(PlacementApplicationService::new(
        Arc::new(jobs),
        Arc::new(students),
        Arc::new(InMemoryApplicationRepository::default()),
        Arc::new(InMemoryNotificationPublisher::default()),
        salary_gate,
    ));

    let app = with_application_routes(application_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        salary_cap_multiplier = salary_gate.multiplier(),
        "placement portal ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
