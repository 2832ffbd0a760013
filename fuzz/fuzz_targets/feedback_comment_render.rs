#![no_main]

use libfuzzer_sys::fuzz_target;
use pr_feedback::feedback_comment::{extract_fenced_log, MAX_COMMENT_CHARS};
use pr_feedback::validation_log::{bound_log_text, TRUNCATION_SUFFIX};
use pr_feedback::{render_feedback_comment, CommentTemplate, FEEDBACK_MARKER};

fuzz_target!(|data: &[u8]| {
    let Some((&limit, rest)) = data.split_first() else {
        return;
    };
    let max_chars = usize::from(limit).max(1);
    let raw = String::from_utf8_lossy(rest);

    let report = bound_log_text(&raw, max_chars);
    let suffix_chars = TRUNCATION_SUFFIX.chars().count() + 1;
    if report.truncated {
        assert_eq!(report.text.chars().count(), max_chars + suffix_chars);
        assert!(report.text.ends_with(TRUNCATION_SUFFIX));
    } else {
        assert_eq!(report.text, raw);
    }

    let body = render_feedback_comment(&CommentTemplate::default(), &report);
    assert_eq!(body.lines().next(), Some(FEEDBACK_MARKER));
    assert!(body.chars().count() <= MAX_COMMENT_CHARS);
    let expected = report.text.strip_suffix('\n').unwrap_or(&report.text);
    assert_eq!(extract_fenced_log(&body), Some(expected));
});
