use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

use crate::comment_platform::{
    AccountKind, CommentPlatform, ExistingComment, PostedComment, PullRequestRef,
};
use crate::error::{FeedbackError, FeedbackResult};
use crate::github_transport_helpers::truncate_for_error;

pub const DEFAULT_GITHUB_API_BASE: &str = "https://api.github.com";
const COMMENTS_PER_PAGE: usize = 100;
const ERROR_BODY_MAX_CHARS: usize = 800;

#[derive(Debug, Clone, Deserialize)]
struct GithubUser {
    #[serde(rename = "type", default)]
    account_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct GithubIssueComment {
    id: u64,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    html_url: Option<String>,
    #[serde(default)]
    user: Option<GithubUser>,
}

impl From<GithubIssueComment> for ExistingComment {
    fn from(comment: GithubIssueComment) -> Self {
        let author_kind = AccountKind::from_platform_type(
            comment
                .user
                .as_ref()
                .and_then(|user| user.account_type.as_deref()),
        );
        Self {
            id: comment.id,
            author_kind,
            body: comment.body.unwrap_or_default(),
            url: comment.html_url,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct GithubCommentWriteResponse {
    id: u64,
    #[serde(default)]
    html_url: Option<String>,
}

impl From<GithubCommentWriteResponse> for PostedComment {
    fn from(response: GithubCommentWriteResponse) -> Self {
        Self {
            id: response.id,
            url: response.html_url,
        }
    }
}

#[derive(Clone)]
/// GitHub REST client for pull request (issue) comments.
///
/// Every request is sent once; failures surface to the caller unchanged.
pub struct GithubApiClient {
    http: reqwest::Client,
    api_base: String,
}

impl GithubApiClient {
    pub fn new(api_base: &str, token: &str) -> FeedbackResult<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_static("pr-feedback-validation-bot"),
        );
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "x-github-api-version",
            reqwest::header::HeaderValue::from_static("2022-11-28"),
        );
        let auth_header = format!("Bearer {}", token.trim());
        let mut auth_value = reqwest::header::HeaderValue::from_str(&auth_header).map_err(|_| {
            FeedbackError::InvalidConfig("invalid github authorization header".to_string())
        })?;
        auth_value.set_sensitive(true);
        headers.insert(reqwest::header::AUTHORIZATION, auth_value);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|source| FeedbackError::Transport {
                operation: "client setup",
                source,
            })?;
        Ok(Self {
            http,
            api_base: api_base.trim().trim_end_matches('/').to_string(),
        })
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    async fn request_json<T>(
        &self,
        operation: &'static str,
        request: reqwest::RequestBuilder,
    ) -> FeedbackResult<T>
    where
        T: DeserializeOwned,
    {
        let response = request
            .send()
            .await
            .map_err(|source| FeedbackError::Transport { operation, source })?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FeedbackError::HttpStatus {
                operation,
                status: status.as_u16(),
                body: truncate_for_error(&body, ERROR_BODY_MAX_CHARS),
            });
        }
        response
            .json::<T>()
            .await
            .map_err(|source| FeedbackError::Transport { operation, source })
    }
}

#[async_trait]
impl CommentPlatform for GithubApiClient {
    async fn list_comments(
        &self,
        request: &PullRequestRef,
    ) -> FeedbackResult<Vec<ExistingComment>> {
        let url = format!(
            "{}/repos/{}/{}/issues/{}/comments",
            self.api_base, request.owner, request.repo, request.number
        );
        let per_page = COMMENTS_PER_PAGE.to_string();
        let mut page = 1_u32;
        let mut rows = Vec::new();
        loop {
            let page_value = page.to_string();
            let chunk: Vec<GithubIssueComment> = self
                .request_json(
                    "list issue comments",
                    self.http.get(&url).query(&[
                        ("sort", "created"),
                        ("direction", "asc"),
                        ("per_page", per_page.as_str()),
                        ("page", page_value.as_str()),
                    ]),
                )
                .await?;
            let chunk_len = chunk.len();
            tracing::debug!(page, comments = chunk_len, "fetched comment page");
            rows.extend(chunk.into_iter().map(ExistingComment::from));
            if chunk_len < COMMENTS_PER_PAGE {
                break;
            }
            page = page.saturating_add(1);
        }
        Ok(rows)
    }

    async fn create_comment(
        &self,
        request: &PullRequestRef,
        body: &str,
    ) -> FeedbackResult<PostedComment> {
        let payload = json!({ "body": body });
        let response: GithubCommentWriteResponse = self
            .request_json(
                "create issue comment",
                self.http
                    .post(format!(
                        "{}/repos/{}/{}/issues/{}/comments",
                        self.api_base, request.owner, request.repo, request.number
                    ))
                    .json(&payload),
            )
            .await?;
        Ok(response.into())
    }

    async fn update_comment(
        &self,
        request: &PullRequestRef,
        comment_id: u64,
        body: &str,
    ) -> FeedbackResult<PostedComment> {
        let payload = json!({ "body": body });
        let response: GithubCommentWriteResponse = self
            .request_json(
                "update issue comment",
                self.http
                    .patch(format!(
                        "{}/repos/{}/{}/issues/comments/{}",
                        self.api_base, request.owner, request.repo, comment_id
                    ))
                    .json(&payload),
            )
            .await?;
        Ok(response.into())
    }
}
