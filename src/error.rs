use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("can't download the feed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("feed responded with {0}")]
    Status(reqwest::StatusCode),
    #[error("can't parse the feed: {0}")]
    Parse(#[from] quick_xml::de::DeError),
}

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("invalid published date {0:?}, expected YYYY-MM-DD")]
    BadDate(String),
    #[error("invalid rate {rate:?} for {currency}")]
    BadRate { currency: String, rate: String },
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Errors surfaced to HTTP clients. Storage causes are logged where they
/// happen and collapse into `Internal`.
#[derive(Debug, Error, PartialEq)]
pub enum QueryError {
    #[error("missing date")]
    MissingDate,
    #[error("invalid date {0:?}")]
    InvalidDate(String),
    #[error("not found")]
    NotFound,
    #[error("internal server error")]
    Internal,
}

#[derive(Serialize)]
struct ErrorBody {
    message: &'static str,
}

impl ResponseError for QueryError {
    fn status_code(&self) -> StatusCode {
        match self {
            QueryError::MissingDate | QueryError::InvalidDate(_) | QueryError::NotFound => {
                StatusCode::NOT_FOUND
            }
            QueryError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self.status_code() {
            StatusCode::NOT_FOUND => "not found",
            _ => "internal server error",
        };

        HttpResponse::build(self.status_code()).json(ErrorBody { message })
    }
}
