//! Rendering of the validation-status comment body.

use crate::validation_log::{bound_log_text, ValidationReport, TRUNCATION_SUFFIX};

/// Hidden token that identifies comments written by this tool.
pub const FEEDBACK_MARKER: &str = "<!-- pr-feedback:validation-status -->";
pub const DEFAULT_HEADING: &str = "❌ Plugin validation failed";
pub const DEFAULT_INSTRUCTIONS: &str =
    "Please fix the issues above and push an update to this pull request to re-run validation.";
pub const CLOSURE_NOTICE: &str = "Pull requests with failing checks and no activity for 7+ days are closed automatically. Comment or push to keep it alive; reopen if you'd like to continue.";

/// GitHub rejects comment bodies longer than this many characters.
pub const MAX_COMMENT_CHARS: usize = 65_536;
const MIN_FENCE_LEN: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Fixed strings the composer stitches around the log.
pub struct CommentTemplate {
    pub marker: String,
    pub heading: String,
    pub instructions: String,
    pub closure_notice: Option<String>,
}

impl Default for CommentTemplate {
    fn default() -> Self {
        Self {
            marker: FEEDBACK_MARKER.to_string(),
            heading: DEFAULT_HEADING.to_string(),
            instructions: DEFAULT_INSTRUCTIONS.to_string(),
            closure_notice: None,
        }
    }
}

impl CommentTemplate {
    pub fn with_closure_notice(mut self) -> Self {
        self.closure_notice = Some(CLOSURE_NOTICE.to_string());
        self
    }
}

/// Returns true when `marker` is a single-line HTML comment, which markdown
/// renderers hide.
pub fn is_hidden_marker(marker: &str) -> bool {
    let marker = marker.trim();
    marker.len() > "<!---->".len()
        && marker.starts_with("<!--")
        && marker.ends_with("-->")
        && !marker.contains('\n')
        && !marker["<!--".len()..marker.len() - "-->".len()].contains("-->")
}

/// Renders the full comment body: marker line, heading, fenced log, and
/// closing instructions. Pure; identical inputs give identical output.
///
/// The body stays within [`MAX_COMMENT_CHARS`] whenever the log limit is at
/// most [`max_log_chars_for`] the template. When the fence needed to enclose
/// the log would push it over, the log is cut further and ends with the
/// truncation suffix line.
pub fn render_feedback_comment(template: &CommentTemplate, report: &ValidationReport) -> String {
    let fence = code_fence_for(&report.text);
    let body = assemble_body(template, &report.text, &fence);
    if body.chars().count() <= MAX_COMMENT_CHARS {
        return body;
    }

    let kept = match report.text.strip_suffix(TRUNCATION_SUFFIX) {
        Some(text) if report.truncated => text.strip_suffix('\n').unwrap_or(text),
        _ => report.text.as_str(),
    };
    let budget = MAX_COMMENT_CHARS
        .saturating_sub(template_overhead_chars(template, fence.chars().count()))
        .saturating_sub(truncation_line_chars() + 1);
    let rebounded = bound_log_text(kept, budget);
    let fence = code_fence_for(&rebounded.text);
    assemble_body(template, &rebounded.text, &fence)
}

/// Largest log limit whose truncated body still fits in one comment when the
/// log needs only the shortest fence.
pub fn max_log_chars_for(template: &CommentTemplate) -> usize {
    MAX_COMMENT_CHARS
        .saturating_sub(template_overhead_chars(template, MIN_FENCE_LEN))
        .saturating_sub(truncation_line_chars() + 1)
}

/// Characters the template adds around the log for a fence of `fence_len`,
/// excluding the newline that closes an unterminated log.
fn template_overhead_chars(template: &CommentTemplate, fence_len: usize) -> usize {
    let empty_log = assemble_body(template, "\n", &"`".repeat(fence_len));
    empty_log.chars().count() - 1
}

fn truncation_line_chars() -> usize {
    TRUNCATION_SUFFIX.chars().count() + 1
}

fn assemble_body(template: &CommentTemplate, text: &str, fence: &str) -> String {
    let mut body = String::with_capacity(text.len() + 2 * fence.len() + 512);
    body.push_str(template.marker.trim());
    body.push('\n');
    body.push_str("## ");
    body.push_str(template.heading.trim());
    body.push_str("\n\n");
    body.push_str(fence);
    body.push('\n');
    body.push_str(text);
    if !text.ends_with('\n') {
        body.push('\n');
    }
    body.push_str(fence);
    body.push_str("\n\n");
    body.push_str(template.instructions.trim());
    if let Some(notice) = template
        .closure_notice
        .as_deref()
        .map(str::trim)
        .filter(|notice| !notice.is_empty())
    {
        body.push_str("\n\n");
        body.push_str(notice);
    }
    body.push('\n');
    body
}

/// Longest line made only of `fence_char` (surrounding whitespace ignored).
/// Only such lines can close a fenced block early.
fn longest_fence_line(text: &str, fence_char: char) -> usize {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && line.chars().all(|ch| ch == fence_char))
        .map(|line| line.chars().count())
        .max()
        .unwrap_or(0)
}

/// Picks the shorter of a backtick or tilde fence that no log line can close.
fn code_fence_for(text: &str) -> String {
    let fence_len = |fence_char| {
        longest_fence_line(text, fence_char)
            .saturating_add(1)
            .max(MIN_FENCE_LEN)
    };
    let backticks = fence_len('`');
    let tildes = fence_len('~');
    if backticks <= tildes {
        "`".repeat(backticks)
    } else {
        "~".repeat(tildes)
    }
}

fn is_fence_line(line: &str) -> bool {
    line.chars().count() >= MIN_FENCE_LEN
        && (line.chars().all(|ch| ch == '`') || line.chars().all(|ch| ch == '~'))
}

/// Extracts the text between the first fence pair of a rendered body.
///
/// Lossy at one point: the newline the renderer places before the closing
/// fence is dropped, so a log that ended in a newline comes back without it.
pub fn extract_fenced_log(body: &str) -> Option<&str> {
    let mut lines = body.split_inclusive('\n');
    let mut offset = 0usize;
    let fence = loop {
        let line = lines.next()?;
        offset += line.len();
        let trimmed = line.trim_end_matches(['\n', '\r']);
        if is_fence_line(trimmed) {
            break trimmed;
        }
    };
    let start = offset;
    for line in lines {
        if line.trim_end_matches(['\n', '\r']) == fence {
            let end = offset.saturating_sub(1).max(start);
            return Some(&body[start..end]);
        }
        offset += line.len();
    }
    None
}
