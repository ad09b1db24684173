// Input checks that run before any store access

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{AppError, AppResult};

static SLUG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("slug pattern compiles"));

/// Trimmed value of a required text field; blank input is rejected.
pub fn require_text<'a>(field: &str, value: &'a str) -> AppResult<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("{} is required", field)));
    }
    Ok(trimmed)
}

/// Parse a store identifier from form or path input.
pub fn parse_id(field: &str, raw: &str) -> AppResult<i64> {
    match raw.trim().parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(AppError::Validation(format!("{} must be a positive integer, got {:?}", field, raw))),
    }
}

/// Optional identifier: blank or absent means "not supplied".
pub fn parse_optional_id(field: &str, raw: Option<&str>) -> AppResult<Option<i64>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_id(field, value).map(Some),
    }
}

pub fn validate_slug(slug: &str) -> AppResult<&str> {
    let slug = require_text("slug", slug)?;
    if !SLUG_PATTERN.is_match(slug) {
        return Err(AppError::Validation(format!(
            "slug {:?} must be lowercase letters, digits and single dashes",
            slug
        )));
    }
    Ok(slug)
}
