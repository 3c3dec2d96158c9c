//! Error types for the progression service.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProgressError>;

#[derive(Error, Debug)]
pub enum ProgressError {
    #[error("Catalog unavailable: {0}")]
    CatalogUnavailable(String),

    #[error("Invalid catalog row {row}: {reason}")]
    InvalidRow { row: usize, reason: String },

    #[error("Unknown user: {0}")]
    UnknownUser(String),

    #[error("Unknown avatar: {0}")]
    UnknownAvatar(String),

    #[error("Invalid unit: {0}")]
    InvalidUnit(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ResponseError for ProgressError {
    fn status_code(&self) -> StatusCode {
        match self {
            ProgressError::UnknownUser(_) | ProgressError::UnknownAvatar(_) => StatusCode::NOT_FOUND,
            ProgressError::InvalidUnit(_) => StatusCode::BAD_REQUEST,
            ProgressError::CatalogUnavailable(_)
            | ProgressError::InvalidRow { .. }
            | ProgressError::Csv(_)
            | ProgressError::Io(_) => StatusCode::SERVICE_UNAVAILABLE,
            ProgressError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.to_string(),
        })
    }
}
