use lazy_static::lazy_static;
use regex::Regex;
use uuid::Uuid;

use crate::core::error::AppError;
use crate::shared::constants::MAX_FILENAME_LENGTH;

lazy_static! {
    /// Characters that may not appear in a stored filename: path separators and control characters
    pub static ref UNSAFE_FILENAME_CHARS: Regex = Regex::new(r"[/\\\x00-\x1f\x7f]").unwrap();

    /// Runs of whitespace, collapsed to a single underscore
    pub static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();
}

/// Normalize an uploaded filename so it can be used as a storage path segment.
///
/// Spaces become underscores. Names containing path separators, control
/// characters or consisting only of dots are rejected.
pub fn sanitize_filename(raw: &str) -> Result<String, AppError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::BadRequest("Filename is required".to_string()));
    }

    let filename = WHITESPACE_RUN.replace_all(trimmed, "_").into_owned();

    if UNSAFE_FILENAME_CHARS.is_match(&filename) {
        return Err(AppError::BadRequest(format!(
            "Invalid filename '{}'",
            filename
        )));
    }

    if filename.chars().all(|c| c == '.') {
        return Err(AppError::BadRequest(format!(
            "Invalid filename '{}'",
            filename
        )));
    }

    if filename.len() > MAX_FILENAME_LENGTH {
        return Err(AppError::BadRequest(format!(
            "Filename must not exceed {} bytes",
            MAX_FILENAME_LENGTH
        )));
    }

    Ok(filename)
}

/// Parse a user id taken from the request path
pub fn parse_user_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::BadRequest("Invalid user ID format".to_string()))
}

/// Escape LIKE wildcards so a search term matches literally
pub fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
