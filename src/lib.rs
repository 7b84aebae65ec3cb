//! # Automation Worker
//!
//! Acts on `repository_dispatch` events as a GitHub App.
//!
//! One run:
//! - loads the event's `client_payload` (owner, repo, action and its fields)
//! - signs an App assertion and resolves the owner's installation
//! - exchanges the assertion for an installation token
//! - validates the action and performs it: uploading files or opening a pull request
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use automation_worker::prelude::*;
//!
//! let config = WorkerConfig::try_from(ConfigArgs {
//!     app_id: Some("12345".into()),
//!     private_key: Some(std::fs::read_to_string("app.pem")?),
//!     event_path: Some("event.json".into()),
//!     ..Default::default()
//! })?;
//!
//! match run(&config)? {
//!     Outcome::Uploaded(files) => println!("uploaded {} file(s)", files.len()),
//!     Outcome::PullRequestCreated(Some(pr)) => println!("opened {}", pr.html_url),
//!     Outcome::PullRequestCreated(None) => println!("opened a pull request"),
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod auth;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod github;

use crate::auth::{exchange_token, issue_assertion, resolve_installation};
use crate::config::WorkerConfig;
use crate::dispatch::{Dispatcher, Outcome};
use crate::error::Result;
use crate::event::DispatchEvent;
use crate::github::GitHubClient;

/// Handle the dispatch event described by `config`.
///
/// The installation token is obtained before the action's fields are
/// validated, so a payload with a bad action still costs one token exchange.
pub fn run(config: &WorkerConfig) -> Result<Outcome> {
    let event = DispatchEvent::load(&config.event_path)?;
    tracing::info!(
        owner = event.owner(),
        repo = event.repo(),
        action = event.action_name(),
        "loaded dispatch event"
    );

    let assertion = issue_assertion(config.app_id, &config.private_key)?;
    tracing::debug!(app_id = assertion.issuer(), expires_at = %assertion.expires_at(), "issued App assertion");

    let app = GitHubClient::for_app(&assertion, &config.api_url);
    let installation_id = resolve_installation(&app, event.owner(), config.installation_id)?;
    let token = exchange_token(&app, installation_id)?;

    let action = event.action()?;
    let client = GitHubClient::for_installation(&token, &config.api_url);
    tracing::info!(action = action.name(), "dispatching");
    Dispatcher::new(&client, event.owner()).dispatch(&action)
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::auth::{InstallationToken, SignedAssertion};
    pub use crate::config::{ConfigArgs, WorkerConfig};
    pub use crate::dispatch::{Dispatcher, FileCommit, Outcome};
    pub use crate::error::{Result, WorkerError};
    pub use crate::event::{Action, DispatchEvent, FileUpload, PullRequestSpec};
    pub use crate::github::{GitHubClient, PullRequest};
    pub use crate::run;
}
