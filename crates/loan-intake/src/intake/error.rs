use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;

use super::form::FieldError;
use super::lookup::LookupRef;

/// Error enumeration for persistence failures shared by the intake repositories.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("{} #{} does not exist", .0.kind, .0.id)]
    UnresolvedReference(LookupRef),
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Error raised by the intake services.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntakeError {
    #[error(transparent)]
    Field(#[from] FieldError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("user {user_id} has no intake profile")]
    UnknownUser { user_id: i64 },
}

impl IntakeError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            IntakeError::Field(_) => StatusCode::UNPROCESSABLE_ENTITY,
            IntakeError::Repository(RepositoryError::UnresolvedReference(_)) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            IntakeError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
            IntakeError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
            IntakeError::Repository(RepositoryError::Unavailable(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            IntakeError::UnknownUser { .. } => StatusCode::UNAUTHORIZED,
        }
    }
}

impl IntoResponse for IntakeError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let payload = match &self {
            IntakeError::Field(error) => json!({
                "error": error.to_string(),
                "field": error.field(),
            }),
            IntakeError::Repository(RepositoryError::UnresolvedReference(reference)) => json!({
                "error": self.to_string(),
                "lookup": reference.kind.label(),
                "id": reference.id.0,
            }),
            other => json!({ "error": other.to_string() }),
        };
        (status, Json(payload)).into_response()
    }
}

/// `201 Created` with the stored record, or the error response.
pub(crate) fn created_response<T: Serialize>(result: Result<T, IntakeError>) -> Response {
    match result {
        Ok(record) => (StatusCode::CREATED, Json(record)).into_response(),
        Err(error) => error.into_response(),
    }
}
