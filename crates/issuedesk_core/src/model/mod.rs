//! Domain model for the issue tracker.
//!
//! # Responsibility
//! - Define canonical records for users, projects, contributors, issues and
//!   comments, plus the draft/patch payloads used to create and update them.
//! - Own field-format validation (`validate()`), independent of storage.
//!
//! # Invariants
//! - Every record is identified by a stable `Uuid`.
//! - `author` and parent links are write-once; patches may only restate them.
//! - Format errors name the offending field.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod comment;
pub mod contributor;
pub mod issue;
pub mod project;
pub mod user;

/// Field-level format error raised by draft/patch validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Payload field name as exposed on the wire.
    pub field: &'static str,
    /// Human-readable reason.
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl Error for ValidationError {}

/// Checks a required free-text field: non-blank and at most `max_chars`.
pub(crate) fn check_required_text(
    field: &'static str,
    value: &str,
    max_chars: usize,
) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "this field may not be blank"));
    }
    check_text_length(field, value, max_chars)
}

/// Checks an optional free-text field length.
pub(crate) fn check_text_length(
    field: &'static str,
    value: &str,
    max_chars: usize,
) -> Result<(), ValidationError> {
    if value.chars().count() > max_chars {
        return Err(ValidationError::new(
            field,
            format!("ensure this field has no more than {max_chars} characters"),
        ));
    }
    Ok(())
}
