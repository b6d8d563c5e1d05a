//! Custom error types for the API service

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::{bidding::BidError, jwt::TokenError};

/// Message returned with every 401 response
pub const UNAUTHORIZED_MESSAGE: &str = "unauthorized access!";

/// Custom error type for the API service
#[derive(Error, Debug)]
pub enum ApiError {
    /// Missing, invalid, or mismatched credential
    #[error("Unauthorized")]
    Unauthorized,

    /// The bidder already placed a bid on the job
    #[error("You have already placed a bid on this job")]
    DuplicateBid,

    /// Bad request with message
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Malformed document identifier
    #[error("invalid id: {0}")]
    InvalidId(String),

    /// Credential could not be issued
    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] common::error::DatabaseError),
}

impl From<BidError> for ApiError {
    fn from(err: BidError) -> Self {
        match err {
            BidError::Duplicate => ApiError::DuplicateBid,
            BidError::Missing(msg) => ApiError::BadRequest(msg.to_string()),
            BidError::Database(e) => ApiError::Database(e),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, UNAUTHORIZED_MESSAGE.to_string()),
            ApiError::DuplicateBid => {
                return (StatusCode::BAD_REQUEST, self.to_string()).into_response();
            }
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::InvalidId(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ApiError::Token(_) | ApiError::Database(_) => {
                error!("Request failed: {}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "message": message,
        }));

        (status, body).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;
