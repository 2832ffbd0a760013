use crate::comment_platform::{CommentPlatform, ExistingComment, PullRequestRef};
use crate::error::FeedbackResult;

/// True for comments this tool wrote: automation-authored and carrying the
/// marker. Human comments that quote the marker never match.
pub fn is_feedback_comment(comment: &ExistingComment, marker: &str) -> bool {
    let marker = marker.trim();
    comment.author_kind.is_automation() && !marker.is_empty() && comment.body.contains(marker)
}

/// Returns the first marker comment in list order. Later duplicates are left
/// alone.
pub fn find_feedback_comment<'a>(
    comments: &'a [ExistingComment],
    marker: &str,
) -> Option<&'a ExistingComment> {
    comments
        .iter()
        .find(|comment| is_feedback_comment(comment, marker))
}

/// Fetches the full comment list of `request` and locates the prior status
/// comment, if any.
pub async fn locate_feedback_comment(
    platform: &dyn CommentPlatform,
    request: &PullRequestRef,
    marker: &str,
) -> FeedbackResult<Option<ExistingComment>> {
    let comments = platform.list_comments(request).await?;
    let matches = comments
        .iter()
        .filter(|comment| is_feedback_comment(comment, marker))
        .count();
    if matches > 1 {
        tracing::warn!(
            pr = request.number,
            matches,
            "multiple feedback comments found; updating the earliest"
        );
    }
    tracing::debug!(
        pr = request.number,
        scanned = comments.len(),
        matches,
        "scanned pull request comments"
    );
    Ok(find_feedback_comment(&comments, marker).cloned())
}
