//! Records exchanged with the hosting platform and the trait seam over its
//! comment endpoints.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{FeedbackError, FeedbackResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Identity of the pull request receiving feedback.
pub struct PullRequestRef {
    pub owner: String,
    pub repo: String,
    pub number: u64,
}

impl PullRequestRef {
    /// Builds a reference from an `owner/repo` slug and a request number.
    pub fn parse(slug: &str, number: u64) -> FeedbackResult<Self> {
        let trimmed = slug.trim();
        let invalid =
            || FeedbackError::InvalidConfig(format!("invalid repo '{slug}', expected owner/repo"));
        let (owner, repo) = trimmed.split_once('/').ok_or_else(invalid)?;
        let owner = owner.trim();
        let repo = repo.trim();
        if owner.is_empty() || repo.is_empty() || repo.contains('/') {
            return Err(invalid());
        }
        if number == 0 {
            return Err(FeedbackError::InvalidConfig(
                "pull request number must be greater than 0".to_string(),
            ));
        }
        Ok(Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
            number,
        })
    }

    pub fn as_slug(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
/// Kind of account that authored a comment.
pub enum AccountKind {
    Automation,
    Human,
    Unknown,
}

impl AccountKind {
    /// Maps the platform's author `type` field. Absent or unrecognised values
    /// are `Unknown`, which never counts as automation.
    pub fn from_platform_type(raw: Option<&str>) -> Self {
        match raw.map(|value| value.trim().to_ascii_lowercase()).as_deref() {
            Some("bot") => Self::Automation,
            Some("user") | Some("organization") => Self::Human,
            _ => Self::Unknown,
        }
    }

    pub fn is_automation(self) -> bool {
        matches!(self, Self::Automation)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Automation => "automation",
            Self::Human => "human",
            Self::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A comment already present on the pull request.
pub struct ExistingComment {
    pub id: u64,
    pub author_kind: AccountKind,
    pub body: String,
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Platform response for a created or updated comment.
pub struct PostedComment {
    pub id: u64,
    pub url: Option<String>,
}

#[async_trait]
/// Comment endpoints of the hosting platform.
pub trait CommentPlatform: Send + Sync {
    /// Returns every comment on the request, across all result pages, in the
    /// platform's order.
    async fn list_comments(
        &self,
        request: &PullRequestRef,
    ) -> FeedbackResult<Vec<ExistingComment>>;

    async fn create_comment(
        &self,
        request: &PullRequestRef,
        body: &str,
    ) -> FeedbackResult<PostedComment>;

    /// Replaces the body of `comment_id` in full.
    async fn update_comment(
        &self,
        request: &PullRequestRef,
        comment_id: u64,
        body: &str,
    ) -> FeedbackResult<PostedComment>;
}
