use crate::cli::ServeArgs;
use crate::infra::{load_lookups, load_users, AppState, InMemoryIntakeStore};
use crate::routes::with_intake_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use loan_intake::config::AppConfig;
use loan_intake::error::AppError;
use loan_intake::intake::customer::CustomerIntakeService;
use loan_intake::intake::start_grant::RequestIntakeService;
use loan_intake::telemetry;
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

    let lookups = load_lookups(&config.intake)?;
    let users = Arc::new(load_users(&config.intake)?);
    info!(users = users.len(), "reference data loaded");

    let store = Arc::new(InMemoryIntakeStore::new(lookups));
    let customer_service = Arc::new(CustomerIntakeService::new(store.clone()));
    let request_service = Arc::new(RequestIntakeService::new(store, users));

    let app = with_intake_routes(customer_service, request_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "loan intake service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
