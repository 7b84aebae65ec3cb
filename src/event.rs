//! Dispatch event loading and action validation.
//!
//! The event file is the `repository_dispatch` payload GitHub Actions writes
//! to `GITHUB_EVENT_PATH`. Only `client_payload` is read:
//!
//! ```json
//! { "client_payload": { "action": "create_pr", "owner": "acme", "repo": "site", "head": "feature" } }
//! ```
//!
//! Loading checks the owner. Action fields are checked separately by
//! [`DispatchEvent::action`], after credentials have been obtained.

use std::path::Path;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{Result, WorkerError};

/// Default commit message for uploaded files.
pub const DEFAULT_UPLOAD_MESSAGE: &str = "automation upload";
/// Default pull request title.
pub const DEFAULT_PR_TITLE: &str = "Automated PR";
/// Default pull request base branch.
pub const DEFAULT_BASE_BRANCH: &str = "main";

/// A loaded dispatch event.
#[derive(Debug, Clone)]
pub struct DispatchEvent {
    owner: String,
    repo: Option<String>,
    action: Option<Value>,
    fields: Map<String, Value>,
}

impl DispatchEvent {
    /// Read and parse the event file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            WorkerError::Config(format!(
                "GITHUB_EVENT_PATH not readable ({}): {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json(&text)
    }

    /// Parse an event document.
    ///
    /// Only malformed JSON is a configuration error; a payload with missing
    /// or wrongly typed fields is a validation error.
    pub fn from_json(text: &str) -> Result<Self> {
        let mut event: Value = serde_json::from_str(text)
            .map_err(|e| WorkerError::Config(format!("event file is not valid JSON: {}", e)))?;

        let mut payload = match event.get_mut("client_payload").map(Value::take) {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(map)) => map,
            Some(_) => {
                return Err(WorkerError::Validation(
                    "client_payload must be an object".into(),
                ))
            }
        };

        let owner = take_string(&mut payload, "owner")?.ok_or_else(|| {
            WorkerError::Validation("client_payload.owner is required to locate installation".into())
        })?;
        let repo = take_string(&mut payload, "repo")?;
        let action = payload.remove("action").filter(|a| !a.is_null());

        Ok(Self {
            owner,
            repo,
            action,
            fields: payload,
        })
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn repo(&self) -> Option<&str> {
        self.repo.as_deref()
    }

    /// The raw action name, if any.
    pub fn action_name(&self) -> Option<&str> {
        self.action.as_ref().and_then(Value::as_str)
    }

    /// Validate the action-specific fields and produce a typed [`Action`].
    pub fn action(&self) -> Result<Action> {
        match &self.action {
            Some(Value::String(name)) if name == "upload_files" => self.upload_files(),
            Some(Value::String(name)) if name == "create_pr" => self.create_pr(),
            Some(Value::String(name)) => Err(WorkerError::UnknownAction(Some(name.clone()))),
            None => Err(WorkerError::UnknownAction(None)),
            Some(_) => Err(WorkerError::Validation(
                "client_payload.action must be a string".into(),
            )),
        }
    }

    fn upload_files(&self) -> Result<Action> {
        #[derive(Deserialize)]
        struct Fields {
            #[serde(default)]
            files: Vec<RawFile>,
        }

        #[derive(Deserialize)]
        struct RawFile {
            path: Option<String>,
            content: Option<String>,
            message: Option<String>,
            branch: Option<String>,
        }

        let fields: Fields = self.fields_as()?;
        let repo = match &self.repo {
            Some(repo) if !fields.files.is_empty() => repo.clone(),
            _ => {
                return Err(WorkerError::Validation(
                    "repo and files are required for upload_files".into(),
                ))
            }
        };

        let files = fields
            .files
            .into_iter()
            .enumerate()
            .map(|(i, f)| {
                let path = f.path.filter(|p| !p.is_empty()).ok_or_else(|| {
                    WorkerError::Validation(format!("files[{}].path is required", i))
                })?;
                Ok(FileUpload {
                    path,
                    content: f.content.unwrap_or_default(),
                    message: f.message.unwrap_or_else(|| DEFAULT_UPLOAD_MESSAGE.into()),
                    branch: f.branch.filter(|b| !b.is_empty()),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Action::UploadFiles { repo, files })
    }

    fn create_pr(&self) -> Result<Action> {
        #[derive(Deserialize)]
        struct Fields {
            head: Option<String>,
            base: Option<String>,
            title: Option<String>,
            body: Option<String>,
        }

        let fields: Fields = self.fields_as()?;
        let (Some(repo), Some(head)) = (self.repo.clone(), fields.head.filter(|h| !h.is_empty()))
        else {
            return Err(WorkerError::Validation(
                "repo and head are required for create_pr".into(),
            ));
        };

        Ok(Action::CreatePullRequest(PullRequestSpec {
            repo,
            title: fields.title.unwrap_or_else(|| DEFAULT_PR_TITLE.into()),
            head,
            base: fields.base.unwrap_or_else(|| DEFAULT_BASE_BRANCH.into()),
            body: fields.body.unwrap_or_default(),
        }))
    }

    fn fields_as<T: serde::de::DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(Value::Object(self.fields.clone()))
            .map_err(|e| WorkerError::Validation(format!("malformed action fields: {}", e)))
    }
}

/// A validated action.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    UploadFiles { repo: String, files: Vec<FileUpload> },
    CreatePullRequest(PullRequestSpec),
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Self::UploadFiles { .. } => "upload_files",
            Self::CreatePullRequest(_) => "create_pr",
        }
    }
}

/// Remove `key` from the payload as a non-empty string.
fn take_string(payload: &mut Map<String, Value>, key: &str) -> Result<Option<String>> {
    match payload.remove(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(_) => Err(WorkerError::Validation(format!(
            "client_payload.{} must be a string",
            key
        ))),
    }
}

/// One file to create or update.
#[derive(Debug, Clone, PartialEq)]
pub struct FileUpload {
    pub path: String,
    pub content: String,
    pub message: String,
    pub branch: Option<String>,
}

/// A pull request to open.
#[derive(Debug, Clone, PartialEq)]
pub struct PullRequestSpec {
    pub repo: String,
    pub title: String,
    pub head: String,
    pub base: String,
    pub body: String,
}
