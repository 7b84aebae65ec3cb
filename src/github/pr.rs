//! Pull request operations.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::github::GitHubClient;

/// A pull request on GitHub.
#[derive(Debug, Clone, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub title: String,
}

/// Request body for creating a pull request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreatePullRequest {
    pub title: String,
    pub head: String,
    pub base: String,
    pub body: String,
}

impl CreatePullRequest {
    /// Create a new pull request.
    pub fn new(
        title: impl Into<String>,
        head: impl Into<String>,
        base: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            head: head.into(),
            base: base.into(),
            body: body.into(),
        }
    }
}

/// Pull request operations.
pub trait PullRequestOps {
    /// Create a new pull request. `None` when the response body was unreadable.
    fn create_pull_request(
        &self,
        owner: &str,
        repo: &str,
        pr: &CreatePullRequest,
    ) -> Result<Option<PullRequest>>;
}

impl PullRequestOps for GitHubClient {
    fn create_pull_request(
        &self,
        owner: &str,
        repo: &str,
        pr: &CreatePullRequest,
    ) -> Result<Option<PullRequest>> {
        let endpoint = format!(
            "/repos/{}/{}/pulls",
            urlencoding::encode(owner),
            urlencoding::encode(repo)
        );
        self.post(&endpoint, pr)
    }
}
