//! Action dispatch.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::error::{Result, WorkerError};
use crate::event::{Action, FileUpload, PullRequestSpec};
use crate::github::{ContentsOps, CreatePullRequest, PullRequest, PullRequestOps, PutFile};

/// Result of one uploaded file.
#[derive(Debug, Clone, PartialEq)]
pub struct FileCommit {
    pub path: String,
    /// `true` when the file did not exist before.
    pub created: bool,
    /// Blob sha of the new content, when GitHub reports it.
    pub content_sha: Option<String>,
}

/// What a dispatch run did.
#[derive(Debug, Clone)]
pub enum Outcome {
    Uploaded(Vec<FileCommit>),
    /// Details are `None` when GitHub's response body was unreadable.
    PullRequestCreated(Option<PullRequest>),
}

/// Runs validated actions against one owner's repositories.
pub struct Dispatcher<'a, C> {
    client: &'a C,
    owner: &'a str,
}

impl<'a, C> Dispatcher<'a, C>
where
    C: ContentsOps + PullRequestOps,
{
    pub fn new(client: &'a C, owner: &'a str) -> Self {
        Self { client, owner }
    }

    pub fn dispatch(&self, action: &Action) -> Result<Outcome> {
        match action {
            Action::UploadFiles { repo, files } => self.upload_files(repo, files),
            Action::CreatePullRequest(spec) => self.create_pr(spec),
        }
    }

    /// Upload each file in order, stopping at the first failure.
    ///
    /// Files written before a failure are not rolled back.
    pub fn upload_files(&self, repo: &str, files: &[FileUpload]) -> Result<Outcome> {
        let mut commits = Vec::with_capacity(files.len());
        for file in files {
            commits.push(self.upload_file(repo, file)?);
        }
        Ok(Outcome::Uploaded(commits))
    }

    fn upload_file(&self, repo: &str, file: &FileUpload) -> Result<FileCommit> {
        let branch = file.branch.as_deref();
        let existing = match self.client.get_file(self.owner, repo, &file.path, branch) {
            Ok(meta) => meta.map(|m| m.sha),
            Err(e @ WorkerError::Api { .. }) => {
                tracing::warn!(path = %file.path, error = %e, "could not read existing file, treating as new");
                None
            }
            Err(e) => return Err(e),
        };
        let created = existing.is_none();

        let body = PutFile {
            message: file.message.clone(),
            content: BASE64.encode(file.content.as_bytes()),
            branch: file.branch.clone(),
            sha: existing,
        };

        let response = self.client.put_file(self.owner, repo, &file.path, &body)?;
        tracing::info!(path = %file.path, created, "uploaded file");

        Ok(FileCommit {
            path: file.path.clone(),
            created,
            content_sha: response.and_then(|r| r.content).map(|c| c.sha),
        })
    }

    pub fn create_pr(&self, spec: &PullRequestSpec) -> Result<Outcome> {
        let request = CreatePullRequest::new(&spec.title, &spec.head, &spec.base, &spec.body);
        let pr = self
            .client
            .create_pull_request(self.owner, &spec.repo, &request)?;
        match &pr {
            Some(pr) => tracing::info!(number = pr.number, url = %pr.html_url, "created pull request"),
            None => tracing::info!(head = %spec.head, "created pull request"),
        }
        Ok(Outcome::PullRequestCreated(pr))
    }
}
