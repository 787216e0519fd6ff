//! Input checks shared by the core operations.
//!
//! These run before any unit of work is opened, so a rejected input never touches
//! the store.

use crate::{
    core::money::Money,
    errors::{Error, Result},
};

/// Trims `value` and rejects it when empty or longer than `max_chars`.
pub fn required_text(field: &str, value: &str, max_chars: usize) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::validation(format!("{field} cannot be empty")));
    }
    if trimmed.chars().count() > max_chars {
        return Err(Error::validation(format!(
            "{field} cannot be longer than {max_chars} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Trims an optional text field; blank values become `None`.
pub fn optional_text(
    field: &str,
    value: Option<&str>,
    max_chars: usize,
) -> Result<Option<String>> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(trimmed) if trimmed.chars().count() > max_chars => Err(Error::validation(format!(
            "{field} cannot be longer than {max_chars} characters"
        ))),
        Some(trimmed) => Ok(Some(trimmed.to_string())),
    }
}

/// Rejects amounts that are zero or negative.
pub fn positive_amount(amount: Money) -> Result<Money> {
    if amount.is_positive() {
        Ok(amount)
    } else {
        Err(Error::InvalidAmount { amount })
    }
}
