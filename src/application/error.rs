use std::error::Error as StdError;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::{
    application::{auth::AuthError, repos::RepoError},
    cache::CacheError,
    domain::error::DomainError,
    infra::{cache_warmer::CacheWarmError, error::InfraError},
    presentation::views::LoginPromptView,
};

#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub source: &'static str,
    pub status: StatusCode,
    pub messages: Vec<String>,
}

impl ErrorReport {
    pub fn from_error(source: &'static str, status: StatusCode, error: &dyn StdError) -> Self {
        let mut messages = vec![error.to_string()];
        let mut current = error.source();
        while let Some(inner) = current {
            messages.push(inner.to_string());
            current = inner.source();
        }
        Self {
            source,
            status,
            messages,
        }
    }

    pub fn attach(self, response: &mut Response) {
        response.extensions_mut().insert(self);
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Repo(#[from] RepoError),
    #[error(transparent)]
    Cache(#[from] CacheError),
    #[error(transparent)]
    Warm(#[from] CacheWarmError),
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Domain(DomainError::NotFound { .. })
            | AppError::Repo(RepoError::NotFound) => StatusCode::NOT_FOUND,
            AppError::Auth(AuthError::InvalidCredentials) => StatusCode::UNAUTHORIZED,
            AppError::Auth(AuthError::PermissionDenied) => StatusCode::FORBIDDEN,
            AppError::Auth(AuthError::Repo(_))
            | AppError::Repo(_)
            | AppError::Auth(AuthError::Cache(CacheError::Backend(_)))
            | AppError::Cache(CacheError::Backend(_)) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Infra(InfraError::Database { .. }) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Auth(AuthError::Cache(_))
            | AppError::Cache(_)
            | AppError::Warm(_)
            | AppError::Infra(_)
            | AppError::Domain(DomainError::Invariant { .. })
            | AppError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn presentation_message(&self) -> &'static str {
        match self {
            AppError::Domain(DomainError::NotFound { .. })
            | AppError::Repo(RepoError::NotFound) => "Resource not found",
            AppError::Auth(AuthError::InvalidCredentials) => "Login failed",
            AppError::Auth(AuthError::PermissionDenied) => "Login required",
            AppError::Auth(AuthError::Repo(_)) | AppError::Repo(_) => {
                "Service temporarily unavailable"
            }
            AppError::Auth(AuthError::Cache(_)) | AppError::Cache(_) => "Cache unavailable",
            AppError::Warm(_) => "Cache population failed",
            AppError::Infra(InfraError::Database { .. }) => "Service temporarily unavailable",
            AppError::Infra(InfraError::Cache { .. }) => "Cache unavailable",
            AppError::Infra(InfraError::Configuration { .. }) => "Service misconfigured",
            AppError::Infra(InfraError::Telemetry(_)) => "Logging subsystem could not start",
            AppError::Infra(InfraError::Io(_)) => "I/O failure during request",
            AppError::Domain(DomainError::Invariant { .. }) | AppError::Unexpected(_) => {
                "Unexpected error occurred"
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.presentation_message();
        let report = ErrorReport::from_error("application::error::AppError", status, &self);
        let mut response = match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                (status, Json(LoginPromptView::new(message))).into_response()
            }
            _ => (status, message).into_response(),
        };
        report.attach(&mut response);
        response
    }
}
