//! Installation lookup and token exchange.

use chrono::{DateTime, Utc};

use crate::error::{Result, WorkerError};
use crate::github::AppOps;

const PER_PAGE: u32 = 100;
const MAX_PAGES: u32 = 100;

/// A short-lived access token scoped to one installation.
#[derive(Clone)]
pub struct InstallationToken {
    installation_id: u64,
    secret: String,
    expires_at: Option<DateTime<Utc>>,
}

impl InstallationToken {
    pub fn new(installation_id: u64, secret: impl Into<String>) -> Self {
        Self {
            installation_id,
            secret: secret.into(),
            expires_at: None,
        }
    }

    pub fn installation_id(&self) -> u64 {
        self.installation_id
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// The raw token. Never log this.
    pub fn secret(&self) -> &str {
        &self.secret
    }
}

impl std::fmt::Debug for InstallationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstallationToken")
            .field("installation_id", &self.installation_id)
            .field("len", &self.secret.len())
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Find the installation for `owner`, unless an id was configured up front.
///
/// The configured id always wins; no request is made in that case.
/// Otherwise the App's installations are listed and the first whose account
/// login equals `owner` (ignoring case) is returned.
pub fn resolve_installation<C: AppOps>(
    client: &C,
    owner: &str,
    configured: Option<u64>,
) -> Result<u64> {
    if let Some(id) = configured {
        tracing::info!(installation_id = id, "using configured installation id");
        return Ok(id);
    }

    let mut page = 1;
    loop {
        let installations = client.list_installations_page(page, PER_PAGE)?;
        let count = installations.len();

        if let Some(found) = installations
            .into_iter()
            .find(|inst| inst.login().eq_ignore_ascii_case(owner))
        {
            tracing::info!(installation_id = found.id, owner, "resolved installation");
            return Ok(found.id);
        }

        if count < PER_PAGE as usize || page >= MAX_PAGES {
            break;
        }
        page += 1;
    }

    Err(WorkerError::NotFound(format!(
        "No installation found for owner '{}'. Ensure App is installed on that account/org.",
        owner
    )))
}

/// Trade the App assertion (carried by `client`) for an installation token.
pub fn exchange_token<C: AppOps>(client: &C, installation_id: u64) -> Result<InstallationToken> {
    let response = client
        .create_installation_token(installation_id)
        .map_err(|e| match e {
            WorkerError::Api { status, message } => WorkerError::Auth(format!(
                "token exchange for installation {} failed ({}): {}",
                installation_id, status, message
            )),
            other => other,
        })?;

    let secret = response.token.filter(|t| !t.is_empty()).ok_or_else(|| {
        WorkerError::Auth(format!(
            "token exchange for installation {} returned no token",
            installation_id
        ))
    })?;

    let token = InstallationToken {
        installation_id,
        secret,
        expires_at: response.expires_at,
    };
    tracing::info!(installation_id, token_len = token.secret.len(), "obtained installation token");
    Ok(token)
}
