//! Input validation shared by the aggregate factories
//!
//! Validation failures are caught before any mutation; the aggregate is
//! never touched.

use crate::errors::{DomainError, DomainResult};

const TITLE_MIN: usize = 3;
const TITLE_MAX: usize = 200;
const DESCRIPTION_MAX: usize = 4000;
const REASON_MAX: usize = 1000;

pub(crate) fn title(value: String) -> DomainResult<String> {
    let trimmed = value.trim();
    if trimmed.chars().count() < TITLE_MIN {
        return Err(DomainError::validation(format!(
            "title must be at least {TITLE_MIN} characters"
        )));
    }
    if trimmed.chars().count() > TITLE_MAX {
        return Err(DomainError::validation(format!(
            "title must be at most {TITLE_MAX} characters"
        )));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn description(value: String) -> DomainResult<String> {
    if value.chars().count() > DESCRIPTION_MAX {
        return Err(DomainError::validation(format!(
            "description must be at most {DESCRIPTION_MAX} characters"
        )));
    }
    Ok(value)
}

pub(crate) fn required_text(value: String, what: &str) -> DomainResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(format!("a {what} is required")));
    }
    if trimmed.chars().count() > REASON_MAX {
        return Err(DomainError::validation(format!(
            "{what} must be at most {REASON_MAX} characters"
        )));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn required_reason(value: String) -> DomainResult<String> {
    required_text(value, "reason")
}

pub(crate) fn positive_hours(hours: f32) -> DomainResult<f32> {
    if !hours.is_finite() || hours <= 0.0 {
        return Err(DomainError::validation(
            "logged hours must be a positive number",
        ));
    }
    Ok(hours)
}
