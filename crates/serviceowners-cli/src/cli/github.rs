//! GitHub pull request comments.
//!
//! The action keeps a single comment per pull request up to date. The comment
//! is recognized by a hidden HTML marker in its body, so re-runs edit it in
//! place instead of posting a new one.

use async_trait::async_trait;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

/// Comments requested per page when searching for the marker.
pub const COMMENTS_PER_PAGE: u8 = 100;

/// Pages searched before giving up and creating a new comment.
pub const MAX_COMMENT_PAGES: u32 = 10;

/// Errors talking to the GitHub API.
#[derive(Debug, Error)]
pub enum GithubError {
    /// The token is missing permissions or invalid.
    #[error("GitHub API {operation} unauthorized (HTTP {status})")]
    Unauthorized { operation: String, status: u16 },

    /// The repository, pull request or comment does not exist.
    #[error("GitHub API {operation} failed: not found")]
    NotFound { operation: String },

    /// Any other API failure.
    #[error("GitHub API {operation} failed: {message}")]
    Api { operation: String, message: String },
}

/// An issue comment, reduced to what the upsert needs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IssueComment {
    pub id: u64,
    #[serde(default)]
    pub body: Option<String>,
}

/// The comment operations used by the action.
#[async_trait]
pub trait CommentClient: Send + Sync {
    /// Lists one page of comments on an issue or pull request.
    async fn list_comments(
        &self,
        owner: &str,
        repo: &str,
        issue: u64,
        page: u32,
    ) -> Result<Vec<IssueComment>, GithubError>;

    /// Creates a new comment.
    async fn create_comment(
        &self,
        owner: &str,
        repo: &str,
        issue: u64,
        body: &str,
    ) -> Result<u64, GithubError>;

    /// Replaces the body of an existing comment.
    async fn update_comment(
        &self,
        owner: &str,
        repo: &str,
        comment_id: u64,
        body: &str,
    ) -> Result<(), GithubError>;
}

/// What [`upsert_pr_comment`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created(u64),
    Updated(u64),
}

/// Finds the first comment whose body contains `marker`.
pub async fn find_marked_comment(
    client: &dyn CommentClient,
    owner: &str,
    repo: &str,
    issue: u64,
    marker: &str,
) -> Result<Option<u64>, GithubError> {
    for page in 1..=MAX_COMMENT_PAGES {
        let comments = client.list_comments(owner, repo, issue, page).await?;
        debug!("Fetched {} comments (page {})", comments.len(), page);

        if let Some(found) = comments
            .iter()
            .find(|c| c.body.as_deref().is_some_and(|b| b.contains(marker)))
        {
            return Ok(Some(found.id));
        }
        if comments.len() < usize::from(COMMENTS_PER_PAGE) {
            break;
        }
    }
    Ok(None)
}

/// Creates or updates the comment identified by `marker`.
pub async fn upsert_pr_comment(
    client: &dyn CommentClient,
    owner: &str,
    repo: &str,
    pr_number: u64,
    body: &str,
    marker: &str,
) -> Result<UpsertOutcome, GithubError> {
    match find_marked_comment(client, owner, repo, pr_number, marker).await? {
        Some(id) => {
            client.update_comment(owner, repo, id, body).await?;
            info!("Updated comment {} on {}/{}#{}", id, owner, repo, pr_number);
            Ok(UpsertOutcome::Updated(id))
        }
        None => {
            let id = client.create_comment(owner, repo, pr_number, body).await?;
            info!("Created comment {} on {}/{}#{}", id, owner, repo, pr_number);
            Ok(UpsertOutcome::Created(id))
        }
    }
}

/// A wrapper around `octocrab::Octocrab` that implements `CommentClient`.
///
/// This wrapper is necessary due to Rust's orphan rules, which prevent
/// implementing external traits on external types.
pub struct OctocrabClient(pub octocrab::Octocrab);

impl OctocrabClient {
    /// Creates a new OctocrabClient from an Octocrab instance.
    pub fn new(client: octocrab::Octocrab) -> Self {
        Self(client)
    }
}

impl std::ops::Deref for OctocrabClient {
    type Target = octocrab::Octocrab;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Extracts the HTTP status code from an octocrab error.
fn extract_status_code(error: &octocrab::Error) -> Option<StatusCode> {
    match error {
        octocrab::Error::GitHub { source, .. } => Some(source.status_code),
        _ => None,
    }
}

fn map_error(operation: &str, error: octocrab::Error) -> GithubError {
    match extract_status_code(&error) {
        Some(StatusCode::NOT_FOUND) => GithubError::NotFound {
            operation: operation.to_string(),
        },
        Some(status @ (StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)) => {
            GithubError::Unauthorized {
                operation: operation.to_string(),
                status: status.as_u16(),
            }
        }
        _ => GithubError::Api {
            operation: operation.to_string(),
            message: error.to_string(),
        },
    }
}

#[derive(Serialize)]
struct PageParams {
    per_page: u8,
    page: u32,
}

#[derive(Serialize)]
struct CommentBody<'a> {
    body: &'a str,
}

#[async_trait]
impl CommentClient for OctocrabClient {
    async fn list_comments(
        &self,
        owner: &str,
        repo: &str,
        issue: u64,
        page: u32,
    ) -> Result<Vec<IssueComment>, GithubError> {
        let route = format!("/repos/{}/{}/issues/{}/comments", owner, repo, issue);
        let params = PageParams {
            per_page: COMMENTS_PER_PAGE,
            page,
        };
        self.0
            .get(route, Some(&params))
            .await
            .map_err(|e| map_error("list comments", e))
    }

    async fn create_comment(
        &self,
        owner: &str,
        repo: &str,
        issue: u64,
        body: &str,
    ) -> Result<u64, GithubError> {
        let route = format!("/repos/{}/{}/issues/{}/comments", owner, repo, issue);
        let created: IssueComment = self
            .0
            .post(route, Some(&CommentBody { body }))
            .await
            .map_err(|e| map_error("create comment", e))?;
        Ok(created.id)
    }

    async fn update_comment(
        &self,
        owner: &str,
        repo: &str,
        comment_id: u64,
        body: &str,
    ) -> Result<(), GithubError> {
        let route = format!("/repos/{}/{}/issues/comments/{}", owner, repo, comment_id);
        let _: IssueComment = self
            .0
            .patch(route, Some(&CommentBody { body }))
            .await
            .map_err(|e| map_error("update comment", e))?;
        Ok(())
    }
}
