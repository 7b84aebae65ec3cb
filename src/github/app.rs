//! App-level endpoints, called with the App assertion.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::Result;
use crate::github::GitHubClient;

/// An installation of the App on a user or organization account.
#[derive(Debug, Clone, Deserialize)]
pub struct Installation {
    pub id: u64,
    #[serde(default)]
    pub account: Option<Account>,
}

impl Installation {
    /// Account login, empty when GitHub omits the account.
    pub fn login(&self) -> &str {
        self.account.as_ref().map_or("", |a| a.login.as_str())
    }
}

/// The account an installation belongs to.
#[derive(Debug, Clone, Deserialize)]
pub struct Account {
    #[serde(default)]
    pub login: String,
}

/// Raw response of the access token endpoint.
#[derive(Clone, Deserialize)]
pub struct AccessTokenResponse {
    pub token: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Endpoints that require App authentication.
pub trait AppOps {
    /// One page of `GET /app/installations`.
    fn list_installations_page(&self, page: u32, per_page: u32) -> Result<Vec<Installation>>;

    /// `POST /app/installations/{id}/access_tokens`.
    fn create_installation_token(&self, installation_id: u64) -> Result<AccessTokenResponse>;
}

impl AppOps for GitHubClient {
    fn list_installations_page(&self, page: u32, per_page: u32) -> Result<Vec<Installation>> {
        let endpoint = format!("/app/installations?per_page={}&page={}", per_page, page);
        self.get(&endpoint)
    }

    fn create_installation_token(&self, installation_id: u64) -> Result<AccessTokenResponse> {
        let endpoint = format!("/app/installations/{}/access_tokens", installation_id);
        self.post_empty(&endpoint)
    }
}
