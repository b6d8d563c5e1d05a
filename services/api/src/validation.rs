//! Input validation utilities
//!
//! Requests are only checked for the presence of the fields the server acts
//! on; everything else is stored as sent.

use uuid::Uuid;

use crate::error::ApiError;

/// Require a non-blank value for a named field
pub fn validate_present(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::BadRequest(format!("{} is required", field)));
    }

    Ok(())
}

/// Parse a document identifier from a path segment
pub fn parse_id(id: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(id).map_err(|_| ApiError::InvalidId(id.to_string()))
}
