//! GitHub App credentials.
//!
//! A run authenticates in three steps:
//! - sign a short-lived assertion with the App's private key ([`issue_assertion`])
//! - find the installation for the target account ([`resolve_installation`])
//! - exchange the assertion for an installation token ([`exchange_token`])

mod assertion;
mod installation;

pub use assertion::{issue_assertion, issue_assertion_at, Claims, SignedAssertion};
pub use installation::{exchange_token, resolve_installation, InstallationToken};
