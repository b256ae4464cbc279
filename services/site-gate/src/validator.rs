// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Input validation for the public write endpoints.
//!
//! - Required field presence (blank counts as missing)
//! - Email shape (`local@domain.tld`, no whitespace)
//! - Minimum comment length

use crate::models::{CommentRequest, ContactRequest, InterestRequest};
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;
use tracing::{debug, error};

/// Minimum trimmed length of a comment body.
pub const MIN_COMMENT_LEN: usize = 3;

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0}")]
    MissingFields(&'static str),

    #[error("Invalid email format")]
    InvalidEmail,

    #[error("Comment must be at least {min} characters")]
    CommentTooShort { min: usize },
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Whitespace as matched by `\s` in browser regular expressions: Unicode
/// `White_Space` minus U+0085, plus U+FEFF.
const SCRIPT_WHITESPACE: &str =
    r"\t\n\x0B\x0C\r \x{A0}\x{1680}\x{2000}-\x{200A}\x{2028}\x{2029}\x{202F}\x{205F}\x{3000}\x{FEFF}";

/// `^[^\s@]+@[^\s@]+\.[^\s@]+$`, with the site's notion of `\s`.
static EMAIL_PATTERN: LazyLock<Result<Regex, regex::Error>> = LazyLock::new(|| {
    let part = format!("[^{SCRIPT_WHITESPACE}@]+");
    Regex::new(&format!(r"^{part}@{part}\.{part}$"))
});

/// Check an email address has the shape `local@domain.tld`.
pub fn is_valid_email(email: &str) -> bool {
    match &*EMAIL_PATTERN {
        Ok(pattern) => pattern.is_match(email),
        Err(e) => {
            error!(error = %e, "Email pattern failed to compile");
            false
        }
    }
}

fn check_email(email: &str) -> Result<(), ValidationError> {
    if is_valid_email(email) {
        Ok(())
    } else {
        debug!("Rejected malformed email address");
        Err(ValidationError::InvalidEmail)
    }
}

/// Validate a contact form submission.
pub fn validate_contact(req: &ContactRequest) -> Result<(), ValidationError> {
    let (Some(_), Some(email), Some(_)) = (
        present(req.name.as_deref()),
        present(req.email.as_deref()),
        present(req.message.as_deref()),
    ) else {
        return Err(ValidationError::MissingFields(
            "Name, email, and message are required",
        ));
    };

    check_email(email)
}

/// Validate a product interest submission.
pub fn validate_interest(req: &InterestRequest) -> Result<(), ValidationError> {
    let (Some(_), Some(email)) = (present(req.name.as_deref()), present(req.email.as_deref()))
    else {
        return Err(ValidationError::MissingFields("Name and email are required"));
    };

    check_email(email)
}

/// Validate a new comment.
pub fn validate_comment(req: &CommentRequest) -> Result<(), ValidationError> {
    let len = req
        .content
        .as_deref()
        .map(|c| c.trim().chars().count())
        .unwrap_or(0);

    if len < MIN_COMMENT_LEN {
        return Err(ValidationError::CommentTooShort {
            min: MIN_COMMENT_LEN,
        });
    }

    Ok(())
}
