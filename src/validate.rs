use crate::error::{AppError, AppResult};

/// Rejects blank values and values longer than `max` characters.
pub fn check_length(field: &str, value: &str, max: usize) -> AppResult<()> {
    let len = value.trim().chars().count();
    if len == 0 || value.chars().count() > max {
        return Err(AppError::BadRequest(format!(
            "{} must be between 1 and {} characters",
            field, max
        )));
    }
    Ok(())
}

pub fn check_optional_length(field: &str, value: Option<&str>, max: usize) -> AppResult<()> {
    match value {
        Some(v) => check_length(field, v, max),
        None => Ok(()),
    }
}
