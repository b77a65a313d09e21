use axum::{
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;

use crate::quiz::session::SessionError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Quiz session error: {0}")]
    Session(#[from] SessionError),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let (status, error_message) = match self {
            Error::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Error::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            Error::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            Error::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Error::Conflict(msg) => (StatusCode::CONFLICT, msg),
            Error::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            Error::Database(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
            Error::Json(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            Error::Session(err) => (session_status(&err), err.to_string()),
            Error::Anyhow(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
            Error::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            Error::Config(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An unexpected error occurred".to_string(),
            ),
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

// A "still loading" state and a hard failure must be distinguishable, so each
// engine error gets a definite status instead of a generic 500.
fn session_status(err: &SessionError) -> StatusCode {
    match err {
        SessionError::NoQuestions => StatusCode::NOT_FOUND,
        SessionError::UnknownAnswer
        | SessionError::NoAnswerSelected
        | SessionError::NotAnswered => StatusCode::BAD_REQUEST,
        SessionError::AlreadyAnswered | SessionError::Finished => StatusCode::CONFLICT,
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Error::NotFound("Resource not found".to_string()),
            other => Error::Database(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_errors_get_definite_statuses() {
        assert_eq!(session_status(&SessionError::NoQuestions), StatusCode::NOT_FOUND);
        assert_eq!(
            session_status(&SessionError::UnknownAnswer),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            session_status(&SessionError::NoAnswerSelected),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            session_status(&SessionError::NotAnswered),
            StatusCode::BAD_REQUEST
        );
        // repeat submits and repeat finishes are conflicts, not 500s
        assert_eq!(
            session_status(&SessionError::AlreadyAnswered),
            StatusCode::CONFLICT
        );
        assert_eq!(session_status(&SessionError::Finished), StatusCode::CONFLICT);
    }
}
