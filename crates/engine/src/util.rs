//! Internal helpers for input validation and model conversion.
//!
//! These utilities are **not** part of the public API.

use sea_orm::DbErr;
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// Trim a required text field, rejecting blank input.
pub(crate) fn normalize_required_text(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::Validation(format!("{label} must not be empty")));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// Keep only the last four characters of an account number.
pub(crate) fn mask_account_number(value: &str) -> ResultEngine<String> {
    let compact: Vec<char> = value.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return Err(EngineError::Validation(
            "account number must not be empty".to_string(),
        ));
    }
    let tail: String = compact[compact.len().saturating_sub(4)..].iter().collect();
    Ok(format!("****{tail}"))
}

/// Parse a UUID from storage. A malformed id is a storage fault.
pub(crate) fn parse_uuid(value: &str, label: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value).map_err(|err| {
        EngineError::Database(DbErr::Custom(format!(
            "stored {label} id \"{value}\" is not a uuid: {err}"
        )))
    })
}
