use serde::{Deserialize, Serialize};

use crate::comment_platform::{CommentPlatform, ExistingComment, PullRequestRef};
use crate::error::FeedbackResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpsertAction {
    Created,
    Updated,
}

impl UpsertAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Write decided from the locator result, before touching the platform.
pub enum UpsertPlan {
    Create,
    Update {
        comment_id: u64,
        url: Option<String>,
    },
}

impl UpsertPlan {
    pub fn action(&self) -> UpsertAction {
        match self {
            Self::Create => UpsertAction::Created,
            Self::Update { .. } => UpsertAction::Updated,
        }
    }

    pub fn comment_id(&self) -> Option<u64> {
        match self {
            Self::Create => None,
            Self::Update { comment_id, .. } => Some(*comment_id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpsertResult {
    pub action: UpsertAction,
    pub comment_id: u64,
    pub url: Option<String>,
}

pub fn plan_upsert(existing: Option<&ExistingComment>) -> UpsertPlan {
    match existing {
        Some(comment) => UpsertPlan::Update {
            comment_id: comment.id,
            url: comment.url.clone(),
        },
        None => UpsertPlan::Create,
    }
}

/// Performs the planned write. Updates replace the whole body; nothing is
/// merged or appended.
pub async fn apply_upsert(
    platform: &dyn CommentPlatform,
    request: &PullRequestRef,
    plan: &UpsertPlan,
    body: &str,
) -> FeedbackResult<UpsertResult> {
    match plan {
        UpsertPlan::Create => {
            let posted = platform.create_comment(request, body).await?;
            Ok(UpsertResult {
                action: UpsertAction::Created,
                comment_id: posted.id,
                url: posted.url,
            })
        }
        UpsertPlan::Update { comment_id, url } => {
            let posted = platform.update_comment(request, *comment_id, body).await?;
            Ok(UpsertResult {
                action: UpsertAction::Updated,
                comment_id: *comment_id,
                url: posted.url.or_else(|| url.clone()),
            })
        }
    }
}
