//! Loading and bounding of the validation log produced by the checker step.

use std::path::Path;

use crate::error::{FeedbackError, FeedbackResult};

pub const DEFAULT_MAX_LOG_CHARS: usize = 60_000;
pub const TRUNCATION_SUFFIX: &str = "... (truncated)";

#[derive(Debug, Clone, PartialEq, Eq)]
/// Validation output after size bounding.
pub struct ValidationReport {
    /// Log text as it will be rendered, suffix included when truncated.
    pub text: String,
    /// Character count of the log before bounding.
    pub original_chars: usize,
    pub truncated: bool,
}

/// Reads the log at `path` and bounds it to `max_chars` characters.
///
/// Bytes that are not valid UTF-8 are replaced rather than rejected.
pub fn load_validation_log(path: &Path, max_chars: usize) -> FeedbackResult<ValidationReport> {
    let raw = std::fs::read(path).map_err(|source| FeedbackError::ReadLog {
        path: path.to_path_buf(),
        source,
    })?;
    let text = String::from_utf8_lossy(&raw);
    Ok(bound_log_text(&text, max_chars))
}

pub fn bound_log_text(raw: &str, max_chars: usize) -> ValidationReport {
    let original_chars = raw.chars().count();
    if original_chars <= max_chars {
        return ValidationReport {
            text: raw.to_string(),
            original_chars,
            truncated: false,
        };
    }
    let end = raw
        .char_indices()
        .nth(max_chars)
        .map(|(index, _)| index)
        .unwrap_or(raw.len());
    ValidationReport {
        text: format!("{}\n{TRUNCATION_SUFFIX}", &raw[..end]),
        original_chars,
        truncated: true,
    }
}
