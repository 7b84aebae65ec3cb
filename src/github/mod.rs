//! GitHub REST API integration.
//!
//! This module provides a blocking client for the handful of endpoints a
//! dispatch run needs:
//! - List App installations and mint installation tokens
//! - Read and write repository files
//! - Create pull requests
//!
//! # Example
//!
//! ```rust,no_run
//! use automation_worker::github::{Auth, CreatePullRequest, GitHubClient, PullRequestOps};
//!
//! let client = GitHubClient::new(Auth::Installation("ghs_your_token_here".into()));
//!
//! let pr = CreatePullRequest::new("Bump deps", "bump-deps", "main", "");
//! if let Some(created) = client.create_pull_request("acme", "site", &pr)? {
//!     println!("{}", created.html_url);
//! }
//! # Ok::<(), automation_worker::error::WorkerError>(())
//! ```

mod app;
mod client;
mod contents;
mod pr;

pub use app::{AccessTokenResponse, Account, AppOps, Installation};
pub use client::{Auth, GitHubClient};
pub use contents::{ContentsOps, FileMetadata, PutFile, PutFileResponse};
pub use pr::{CreatePullRequest, PullRequest, PullRequestOps};
