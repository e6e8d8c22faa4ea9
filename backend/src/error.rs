//! Error types of the store, the layer cache and the query proxy.
//!
//! Handlers turn them into `{ "error": message }` bodies through
//! `actix_web::ResponseError`.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use common::model::style::StyleError;
use common::requests::ErrorResponse;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("{0}")]
    Invalid(String),
    #[error(transparent)]
    Style(#[from] StyleError),
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("corrupt stored JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("corrupt cache entry: {0}")]
    Json(#[from] serde_json::Error),
    #[error("cache task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("invalid identifier {name:?}: {reason}")]
    InvalidIdentifier { name: String, reason: &'static str },
    #[error("connection failed: {0}")]
    Connection(#[source] sqlx::Error),
    #[error("{0}")]
    Query(#[from] sqlx::Error),
    #[error("row conversion failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub(crate) fn error_body(status: StatusCode, message: String) -> HttpResponse {
    HttpResponse::build(status).json(ErrorResponse { error: message })
}

impl ResponseError for StoreError {
    fn status_code(&self) -> StatusCode {
        match self {
            StoreError::NotFound(_) => StatusCode::NOT_FOUND,
            StoreError::Invalid(_) | StoreError::Style(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        error_body(self.status_code(), self.to_string())
    }
}

impl ResponseError for CacheError {
    fn error_response(&self) -> HttpResponse {
        error_body(self.status_code(), self.to_string())
    }
}

impl ResponseError for ProxyError {
    fn status_code(&self) -> StatusCode {
        match self {
            ProxyError::InvalidIdentifier { .. } => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        error_body(self.status_code(), self.to_string())
    }
}
