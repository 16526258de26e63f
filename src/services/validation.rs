//! Input checks applied before records reach the tree or the store

use std::sync::LazyLock;

use regex::Regex;

use crate::services::CategoryTree;
use crate::types::{NewEntry, PunchcardError, Result};

static CATEGORY_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_\- ]+$").expect("valid regex"));

/// Category names may only hold letters, digits, spaces, underscores and hyphens
pub fn validate_category_name(name: &str) -> Result<()> {
    if CATEGORY_NAME.is_match(name) {
        Ok(())
    } else {
        Err(PunchcardError::Validation(
            "Name can only contain letters, numbers, spaces, underscores and hyphens".into(),
        ))
    }
}

pub fn validate_hours(hours: f64) -> Result<()> {
    if hours.is_finite() && hours >= 0.0 {
        Ok(())
    } else {
        Err(PunchcardError::Validation(format!(
            "hours must be a non-negative number, got {}",
            hours
        )))
    }
}

/// A new or edited entry needs finite, non-negative hours and an active category
pub fn validate_entry(entry: &NewEntry, tree: &CategoryTree) -> Result<()> {
    validate_hours(entry.hours)?;

    match tree.get(entry.category) {
        None => Err(PunchcardError::UnknownCategory(entry.category)),
        Some(category) if !category.active => Err(PunchcardError::Validation(format!(
            "category {} is inactive and cannot take new entries",
            entry.category
        ))),
        Some(_) => Ok(()),
    }
}
