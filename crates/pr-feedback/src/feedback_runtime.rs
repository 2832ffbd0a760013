//! One feedback invocation: load the log, render the comment, locate the
//! prior status comment, then create or update it.

use std::path::PathBuf;

use serde::Serialize;

use crate::comment_locator::locate_feedback_comment;
use crate::comment_platform::{CommentPlatform, PullRequestRef};
use crate::comment_upsert::{apply_upsert, plan_upsert, UpsertAction, UpsertResult};
use crate::error::{FeedbackError, FeedbackResult};
use crate::feedback_comment::{
    is_hidden_marker, max_log_chars_for, render_feedback_comment, CommentTemplate,
    MAX_COMMENT_CHARS,
};
use crate::validation_log::{load_validation_log, DEFAULT_MAX_LOG_CHARS};

#[derive(Debug, Clone)]
pub struct FeedbackConfig {
    pub log_path: PathBuf,
    pub request: PullRequestRef,
    pub template: CommentTemplate,
    pub max_log_chars: usize,
    pub dry_run: bool,
}

impl FeedbackConfig {
    pub fn new(log_path: impl Into<PathBuf>, request: PullRequestRef) -> Self {
        Self {
            log_path: log_path.into(),
            request,
            template: CommentTemplate::default(),
            max_log_chars: DEFAULT_MAX_LOG_CHARS,
            dry_run: false,
        }
    }

    fn validate(&self) -> FeedbackResult<()> {
        if !is_hidden_marker(&self.template.marker) {
            return Err(FeedbackError::InvalidConfig(format!(
                "marker '{}' must be a single-line HTML comment",
                self.template.marker
            )));
        }
        if self.max_log_chars == 0 {
            return Err(FeedbackError::InvalidConfig(
                "max log chars must be greater than 0".to_string(),
            ));
        }
        let limit = max_log_chars_for(&self.template);
        if self.max_log_chars > limit {
            return Err(FeedbackError::InvalidConfig(format!(
                "max log chars {} leaves no room for the comment template; \
                 at most {limit} fit in a {MAX_COMMENT_CHARS}-character comment",
                self.max_log_chars
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Progress of one invocation. `Failed` is terminal and reachable from any
/// earlier stage.
pub enum FeedbackStage {
    Unstarted,
    LogLoaded,
    Composed,
    Located,
    Created,
    Updated,
    Done,
    Failed,
}

impl FeedbackStage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unstarted => "unstarted",
            Self::LogLoaded => "log_loaded",
            Self::Composed => "composed",
            Self::Located => "located",
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }

    fn after_write(action: UpsertAction) -> Self {
        match action {
            UpsertAction::Created => Self::Created,
            UpsertAction::Updated => Self::Updated,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum FeedbackOutcome {
    /// The platform was written.
    Applied(UpsertResult),
    /// Dry run: what would have been written.
    Planned {
        action: UpsertAction,
        comment_id: Option<u64>,
        body: String,
    },
}

impl FeedbackOutcome {
    pub fn action(&self) -> UpsertAction {
        match self {
            Self::Applied(result) => result.action,
            Self::Planned { action, .. } => *action,
        }
    }
}

/// Stage history of one invocation, in transition order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct StageTrail {
    stages: Vec<FeedbackStage>,
}

impl StageTrail {
    fn new() -> Self {
        Self {
            stages: vec![FeedbackStage::Unstarted],
        }
    }

    pub(crate) fn current(&self) -> FeedbackStage {
        self.stages
            .last()
            .copied()
            .unwrap_or(FeedbackStage::Unstarted)
    }

    #[cfg(test)]
    pub(crate) fn stages(&self) -> &[FeedbackStage] {
        &self.stages
    }

    fn advance(&mut self, next: FeedbackStage) -> FeedbackStage {
        self.stages.push(next);
        next
    }
}

/// Runs the pipeline once. No step is retried; the first failure ends the
/// invocation and is returned as-is.
pub async fn run_validation_feedback(
    config: &FeedbackConfig,
    platform: &dyn CommentPlatform,
) -> FeedbackResult<FeedbackOutcome> {
    let (_, outcome) = run_with_trail(config, platform).await;
    outcome
}

pub(crate) async fn run_with_trail(
    config: &FeedbackConfig,
    platform: &dyn CommentPlatform,
) -> (StageTrail, FeedbackResult<FeedbackOutcome>) {
    let mut trail = StageTrail::new();
    let outcome = drive_stages(config, platform, &mut trail).await;
    match &outcome {
        Ok(_) => {
            let stage = trail.advance(FeedbackStage::Done);
            tracing::debug!(stage = stage.as_str(), "validation feedback finished");
        }
        Err(error) => {
            let failed_after = trail.current();
            let stage = trail.advance(FeedbackStage::Failed);
            tracing::error!(
                repo = %config.request.as_slug(),
                pr = config.request.number,
                failed_after = failed_after.as_str(),
                stage = stage.as_str(),
                %error,
                "validation feedback failed"
            );
        }
    }
    (trail, outcome)
}

async fn drive_stages(
    config: &FeedbackConfig,
    platform: &dyn CommentPlatform,
    trail: &mut StageTrail,
) -> FeedbackResult<FeedbackOutcome> {
    config.validate()?;
    let request = &config.request;

    let report = load_validation_log(&config.log_path, config.max_log_chars)?;
    let stage = trail.advance(FeedbackStage::LogLoaded);
    tracing::info!(
        stage = stage.as_str(),
        path = %config.log_path.display(),
        chars = report.original_chars,
        truncated = report.truncated,
        "validation log loaded"
    );

    let body = render_feedback_comment(&config.template, &report);
    let stage = trail.advance(FeedbackStage::Composed);
    tracing::debug!(
        stage = stage.as_str(),
        body_chars = body.chars().count(),
        "comment composed"
    );

    let existing = locate_feedback_comment(platform, request, &config.template.marker).await?;
    let stage = trail.advance(FeedbackStage::Located);
    tracing::info!(
        stage = stage.as_str(),
        repo = %request.as_slug(),
        pr = request.number,
        existing_comment_id = existing.as_ref().map(|comment| comment.id),
        "feedback comment lookup finished"
    );

    let plan = plan_upsert(existing.as_ref());
    if config.dry_run {
        tracing::info!(
            action = plan.action().as_str(),
            comment_id = plan.comment_id(),
            "dry run; skipping comment write"
        );
        return Ok(FeedbackOutcome::Planned {
            action: plan.action(),
            comment_id: plan.comment_id(),
            body,
        });
    }

    let result = apply_upsert(platform, request, &plan, &body).await?;
    let stage = trail.advance(FeedbackStage::after_write(result.action));
    tracing::info!(
        stage = stage.as_str(),
        action = result.action.as_str(),
        comment_id = result.comment_id,
        url = result.url.as_deref().unwrap_or(""),
        "feedback comment written"
    );
    Ok(FeedbackOutcome::Applied(result))
}
