use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error as ThisError;

/// Failures a request handler can report. Every variant renders as a
/// plain-text body carrying the underlying message.
#[derive(ThisError, Debug)]
pub enum Error {
    #[error("Only POST requests allowed")]
    MethodNotAllowed,

    #[error("Could not understand JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Could not insert data: {0}")]
    Insert(#[source] sqlx::Error),

    #[error("Could not execute select: {0}")]
    Select(#[source] sqlx::Error),
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::MethodNotAllowed => StatusCode::FORBIDDEN,
            Error::Decode(_) | Error::Insert(_) | Error::Select(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match &self {
            Error::MethodNotAllowed => tracing::debug!("Rejected request: {}", self),
            _ => tracing::error!("Request failed: {}", self),
        }
        (self.status_code(), self.to_string()).into_response()
    }
}
