//! Input validation for form payloads.
//!
//! Everything here runs before a payload is handed to a gateway, so a
//! rejected form never produces a network call.

use crate::error::{TahfidzError, Result};
use chrono::NaiveDate;

/// Maximum allowed length for a display name.
pub const MAX_NAME_LENGTH: usize = 120;

/// Maximum allowed length for free-text notes.
pub const MAX_NOTES_LENGTH: usize = 2_000;

/// Maximum allowed length for a record ID.
pub const MAX_ID_LENGTH: usize = 64;

/// Highest verse number in any chapter (Al-Baqarah has 286).
pub const MAX_VERSE: u32 = 286;

/// Validates that a required text field is present.
pub fn validate_required(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(TahfidzError::Validation(format!("{} is required", field)));
    }
    Ok(())
}

/// Validates a display name (student or teacher).
pub fn validate_name(name: &str) -> Result<()> {
    validate_required("Name", name)?;
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(TahfidzError::Validation(format!(
            "Name exceeds maximum length of {} characters",
            MAX_NAME_LENGTH
        )));
    }
    Ok(())
}

/// Validates a verse range: both ends positive and `start <= end`.
pub fn validate_verse_range(start: u32, end: u32) -> Result<()> {
    if start == 0 {
        return Err(TahfidzError::Validation(
            "Starting verse must be a positive number".to_string(),
        ));
    }
    if end == 0 {
        return Err(TahfidzError::Validation(
            "Ending verse must be a positive number".to_string(),
        ));
    }
    if start > end {
        return Err(TahfidzError::Validation(format!(
            "Starting verse ({}) cannot be greater than ending verse ({})",
            start, end
        )));
    }
    if end > MAX_VERSE {
        return Err(TahfidzError::Validation(format!(
            "Ending verse ({}) exceeds {}",
            end, MAX_VERSE
        )));
    }
    Ok(())
}

/// Validates free-text notes.
pub fn validate_notes(notes: &str) -> Result<()> {
    if notes.len() > MAX_NOTES_LENGTH {
        return Err(TahfidzError::Validation(format!(
            "Notes exceed maximum length of {} characters",
            MAX_NOTES_LENGTH
        )));
    }
    Ok(())
}

/// Validates a record ID.
pub fn validate_id(id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(TahfidzError::Validation("ID cannot be empty".to_string()));
    }
    if id.len() > MAX_ID_LENGTH {
        return Err(TahfidzError::Validation(format!(
            "ID exceeds maximum length of {} characters",
            MAX_ID_LENGTH
        )));
    }
    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(TahfidzError::Validation(format!(
            "ID contains invalid characters: {}",
            id
        )));
    }
    Ok(())
}

/// Parses an ISO `YYYY-MM-DD` date.
pub fn parse_date(field: &str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        TahfidzError::Validation(format!("{} must be a date in YYYY-MM-DD form", field))
    })
}
