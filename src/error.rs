use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::credentials::CredentialError;

/// Failures of the gate's collaborators. None of these are recovered; they
/// end the request.
#[derive(Debug, Error)]
pub enum GateError {
    #[error("session unavailable: {0}")]
    Session(#[from] tower_sessions::session::Error),

    #[error("session layer is not installed")]
    SessionLayerMissing,

    #[error("request context was not loaded")]
    ContextMissing,

    #[error(transparent)]
    Credentials(#[from] CredentialError),

    #[error("credential lookup timed out after {0:?}")]
    CredentialTimeout(Duration),
}

impl GateError {
    pub fn status(&self) -> StatusCode {
        match self {
            GateError::CredentialTimeout(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GateError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "request failed in access gate");
        (self.status(), self.to_string()).into_response()
    }
}

/// Errors returned by route handlers.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("not found")]
    NotFound,

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("not acceptable")]
    NotAcceptable,

    #[error(transparent)]
    Gate(#[from] GateError),

    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

impl From<CredentialError> for AppError {
    fn from(err: CredentialError) -> Self {
        AppError::Gate(GateError::Credentials(err))
    }
}

impl From<tower_sessions::session::Error> for AppError {
    fn from(err: tower_sessions::session::Error) -> Self {
        AppError::Gate(GateError::Session(err))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::InvalidInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::NotAcceptable => StatusCode::NOT_ACCEPTABLE,
            AppError::Gate(gate) => gate.status(),
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        (status, self.to_string()).into_response()
    }
}
