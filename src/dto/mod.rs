pub mod auth;
pub mod availability;
pub mod categories;
pub mod checkout;
pub mod inventory;
pub mod orders;
pub mod products;
pub mod roles;
pub mod users;

use crate::error::{AppError, AppResult};

/// Field is present, non-blank and at most `max` characters.
pub(crate) fn require_text(field: &str, value: &str, max: usize) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::BadRequest(format!("{field} is required")));
    }
    limit_text(field, Some(value), max)
}

pub(crate) fn limit_text(field: &str, value: Option<&str>, max: usize) -> AppResult<()> {
    match value {
        Some(v) if v.chars().count() > max => Err(AppError::BadRequest(format!(
            "{field} must be at most {max} characters"
        ))),
        _ => Ok(()),
    }
}

pub(crate) fn require_positive(field: &str, value: i64) -> AppResult<()> {
    if value <= 0 {
        return Err(AppError::BadRequest(format!(
            "{field} must be greater than 0"
        )));
    }
    Ok(())
}

pub(crate) fn require_non_negative(field: &str, value: i64) -> AppResult<()> {
    if value < 0 {
        return Err(AppError::BadRequest(format!("{field} must not be negative")));
    }
    Ok(())
}

pub(crate) fn require_email(value: &str) -> AppResult<()> {
    require_text("email", value, 255)?;
    let valid = value
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if !valid {
        return Err(AppError::BadRequest("email is not a valid address".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_rules() {
        assert!(require_text("name", "Ficus", 50).is_ok());
        assert!(require_text("name", "   ", 50).is_err());
        assert!(require_text("name", &"a".repeat(51), 50).is_err());
        assert!(limit_text("color", None, 5).is_ok());
    }

    #[test]
    fn email_rules() {
        assert!(require_email("jan@example.com").is_ok());
        assert!(require_email("jan@localhost").is_err());
        assert!(require_email("@example.com").is_err());
    }

    #[test]
    fn number_rules() {
        assert!(require_positive("quantity", 1).is_ok());
        assert!(require_positive("quantity", 0).is_err());
        assert!(require_non_negative("stock", 0).is_ok());
        assert!(require_non_negative("stock", -1).is_err());
    }
}
