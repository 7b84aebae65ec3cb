//! Repository contents API.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::github::GitHubClient;

/// Metadata of an existing file, as returned by the contents endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct FileMetadata {
    pub sha: String,
    #[serde(default)]
    pub path: String,
}

/// Request body for creating or updating a file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PutFile {
    pub message: String,
    /// Base64-encoded file content.
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    /// Blob sha of the file being replaced; omitted when creating.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PutFileResponse {
    pub content: Option<FileMetadata>,
}

/// Repository file operations.
pub trait ContentsOps {
    /// Fetch metadata for `path`, `None` when the file does not exist.
    fn get_file(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        branch: Option<&str>,
    ) -> Result<Option<FileMetadata>>;

    /// Create or update `path`.
    ///
    /// The response is `None` when GitHub accepted the write but returned
    /// no readable body.
    fn put_file(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        body: &PutFile,
    ) -> Result<Option<PutFileResponse>>;
}

impl ContentsOps for GitHubClient {
    fn get_file(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        branch: Option<&str>,
    ) -> Result<Option<FileMetadata>> {
        let mut endpoint = contents_endpoint(owner, repo, path);
        if let Some(branch) = branch {
            endpoint.push_str("?ref=");
            endpoint.push_str(&urlencoding::encode(branch));
        }
        self.get_optional(&endpoint)
    }

    fn put_file(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        body: &PutFile,
    ) -> Result<Option<PutFileResponse>> {
        self.put(&contents_endpoint(owner, repo, path), body)
    }
}

/// `/repos/{owner}/{repo}/contents/{path}` with each path segment encoded.
pub(crate) fn contents_endpoint(owner: &str, repo: &str, path: &str) -> String {
    let path = path
        .trim_start_matches('/')
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/");
    format!(
        "/repos/{}/{}/contents/{}",
        urlencoding::encode(owner),
        urlencoding::encode(repo),
        path
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_endpoint_keeps_separators() {
        assert_eq!(
            contents_endpoint("acme", "site", "docs/read me.md"),
            "/repos/acme/site/contents/docs/read%20me.md"
        );
        assert_eq!(
            contents_endpoint("acme", "site", "/top.txt"),
            "/repos/acme/site/contents/top.txt"
        );
    }

    #[test]
    fn test_put_body_omits_unset_fields() {
        let body = PutFile {
            message: "m".into(),
            content: "aGk=".into(),
            branch: None,
            sha: None,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"message": "m", "content": "aGk="})
        );

        let body = PutFile {
            branch: Some("dev".into()),
            sha: Some("abc".into()),
            ..body
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"message": "m", "content": "aGk=", "branch": "dev", "sha": "abc"})
        );
    }
}
