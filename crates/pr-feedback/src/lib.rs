//! Idempotent validation-status comments for plugin submission pull requests.
//!
//! A validation run writes its findings to a log file; this crate loads that
//! log, renders it into a single marker-tagged comment, and creates or
//! updates that comment on the pull request so repeated runs converge on one
//! up-to-date status comment.

pub mod comment_locator;
pub mod comment_platform;
pub mod comment_upsert;
pub mod error;
pub mod feedback_comment;
pub mod feedback_runtime;
pub mod github_api_client;
mod github_transport_helpers;
pub mod validation_log;


pub use comment_locator::locate_feedback_comment;
pub use comment_platform::{
    AccountKind, CommentPlatform, ExistingComment, PostedComment, PullRequestRef,
};
pub use comment_upsert::{apply_upsert, plan_upsert, UpsertAction, UpsertPlan, UpsertResult};
pub use error::{FeedbackError, FeedbackResult};
pub use feedback_comment::{render_feedback_comment, CommentTemplate, FEEDBACK_MARKER};
pub use feedback_runtime::{
    run_validation_feedback, FeedbackConfig, FeedbackOutcome, FeedbackStage,
};
pub use github_api_client::{GithubApiClient, DEFAULT_GITHUB_API_BASE};
pub use validation_log::{load_validation_log, ValidationReport, DEFAULT_MAX_LOG_CHARS};
