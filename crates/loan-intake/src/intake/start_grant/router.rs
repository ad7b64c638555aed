use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use super::domain::{RequestId, UserId};
use super::repository::{RequestRepository, UserDirectory};
use super::service::RequestIntakeService;
use crate::intake::error::created_response;
use crate::intake::form::FormData;

/// Header carrying the authenticated user id, set by the upstream identity layer.
pub const USER_HEADER: &str = "x-user-id";

const RECENT_LIMIT: usize = 50;

/// Router builder exposing the loan request forms.
pub fn request_router<R, U>(service: Arc<RequestIntakeService<R, U>>) -> Router
where
    R: RequestRepository + 'static,
    U: UserDirectory + 'static,
{
    Router::new()
        .route(
            "/api/v1/requests",
            post(open_handler::<R, U>).get(recent_handler::<R, U>),
        )
        .route("/api/v1/requests/:request_id", get(fetch_handler::<R, U>))
        .route(
            "/api/v1/requests/:request_id/complete",
            post(complete_handler::<R, U>),
        )
        .route(
            "/api/v1/users/:user_id/requests",
            get(registered_handler::<R, U>),
        )
        .with_state(service)
}

pub(crate) async fn open_handler<R, U>(
    State(service): State<Arc<RequestIntakeService<R, U>>>,
    headers: HeaderMap,
    Json(form): Json<FormData>,
) -> Response
where
    R: RequestRepository + 'static,
    U: UserDirectory + 'static,
{
    let Some(user_id) = user_from_headers(&headers) else {
        let payload = json!({ "error": format!("missing or malformed {USER_HEADER} header") });
        return (StatusCode::UNAUTHORIZED, Json(payload)).into_response();
    };

    created_response(service.open_request(&form, user_id))
}

pub(crate) async fn complete_handler<R, U>(
    State(service): State<Arc<RequestIntakeService<R, U>>>,
    Path(request_id): Path<u64>,
    Json(mut form): Json<FormData>,
) -> Response
where
    R: RequestRepository + 'static,
    U: UserDirectory + 'static,
{
    form.insert("request_id", request_id.to_string());
    created_response(service.complete_request(&form))
}

pub(crate) async fn fetch_handler<R, U>(
    State(service): State<Arc<RequestIntakeService<R, U>>>,
    Path(request_id): Path<u64>,
) -> Response
where
    R: RequestRepository + 'static,
    U: UserDirectory + 'static,
{
    match service.get(RequestId(request_id)) {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn recent_handler<R, U>(
    State(service): State<Arc<RequestIntakeService<R, U>>>,
) -> Response
where
    R: RequestRepository + 'static,
    U: UserDirectory + 'static,
{
    match service.recent(RECENT_LIMIT) {
        Ok(requests) => (StatusCode::OK, Json(requests)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn registered_handler<R, U>(
    State(service): State<Arc<RequestIntakeService<R, U>>>,
    Path(user_id): Path<i64>,
) -> Response
where
    R: RequestRepository + 'static,
    U: UserDirectory + 'static,
{
    match service.registered_by(UserId(user_id)) {
        Ok(requests) => (StatusCode::OK, Json(requests)).into_response(),
        Err(error) => error.into_response(),
    }
}

fn user_from_headers(headers: &HeaderMap) -> Option<UserId> {
    headers
        .get(USER_HEADER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<i64>()
        .ok()
        .map(UserId)
}
