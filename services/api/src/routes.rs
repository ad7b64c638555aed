use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::{Extension, Json, Router};
use loan_intake::intake::customer::{customer_router, CustomerIntakeService, CustomerRepository};
use loan_intake::intake::start_grant::{
    request_router, RequestIntakeService, RequestRepository, UserDirectory,
};
use serde_json::json;
use std::sync::Arc;

pub(crate) fn with_intake_routes<C, R, U>(
    customers: Arc<CustomerIntakeService<C>>,
    requests: Arc<RequestIntakeService<R, U>>,
) -> Router
where
    C: CustomerRepository + 'static,
    R: RequestRepository + 'static,
    U: UserDirectory + 'static,
{
    customer_router(customers)
        .merge(request_router(requests))
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
