//! GitHub API client.

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::auth::{InstallationToken, SignedAssertion};
use crate::config::DEFAULT_API_URL;
use crate::error::{Result, WorkerError};

/// Credential attached to every request.
#[derive(Clone)]
pub enum Auth {
    /// App-level JWT, sent as `Bearer`.
    App(String),
    /// Installation access token, sent as `token`.
    Installation(String),
}

impl Auth {
    fn header_value(&self) -> Result<HeaderValue> {
        let value = match self {
            Self::App(jwt) => format!("Bearer {}", jwt),
            Self::Installation(token) => format!("token {}", token),
        };
        let mut value = HeaderValue::from_str(&value)
            .map_err(|_| WorkerError::Auth("credential contains invalid header characters".into()))?;
        value.set_sensitive(true);
        Ok(value)
    }
}

/// Client for interacting with the GitHub API.
#[derive(Clone)]
pub struct GitHubClient {
    pub(crate) auth: Auth,
    pub(crate) base_url: String,
    pub(crate) client: Client,
}

impl GitHubClient {
    /// Create a client with the given credential against api.github.com.
    pub fn new(auth: Auth) -> Self {
        Self::with_base_url(auth, DEFAULT_API_URL)
    }

    /// Create a client against a custom API base (GitHub Enterprise, tests).
    pub fn with_base_url(auth: Auth, base_url: impl Into<String>) -> Self {
        let mut url = base_url.into();
        while url.ends_with('/') {
            url.pop();
        }
        Self {
            auth,
            base_url: url,
            client: Client::new(),
        }
    }

    /// Client authenticated as the App itself.
    pub fn for_app(assertion: &SignedAssertion, base_url: impl Into<String>) -> Self {
        Self::with_base_url(Auth::App(assertion.token().to_string()), base_url)
    }

    /// Client authenticated as one installation of the App.
    pub fn for_installation(token: &InstallationToken, base_url: impl Into<String>) -> Self {
        Self::with_base_url(Auth::Installation(token.secret().to_string()), base_url)
    }

    /// Get the default headers for API requests.
    pub(crate) fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, self.auth.header_value()?);
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static("automation-worker"));
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static("2022-11-28"),
        );
        Ok(headers)
    }

    fn request(&self, method: Method, endpoint: &str) -> Result<RequestBuilder> {
        let url = format!("{}{}", self.base_url, endpoint);
        tracing::debug!(%method, %url, "GitHub API request");
        Ok(self.client.request(method, &url).headers(self.headers()?))
    }

    /// Make a GET request to the GitHub API.
    pub(crate) fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        let response = self.request(Method::GET, endpoint)?.send()?;
        parse(check(response)?)
    }

    /// Make a GET request, mapping 404 to `None`.
    pub(crate) fn get_optional<T: DeserializeOwned>(&self, endpoint: &str) -> Result<Option<T>> {
        let response = self.request(Method::GET, endpoint)?.send()?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        parse(check(response)?).map(Some)
    }

    /// Make a POST request to the GitHub API.
    ///
    /// The write has happened once the status is a success, so an
    /// unreadable body yields `None` rather than an error.
    pub(crate) fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<Option<T>> {
        let response = self.request(Method::POST, endpoint)?.json(body).send()?;
        parse_after_write(check(response)?)
    }

    /// Make a POST request without a body.
    pub(crate) fn post_empty<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        let response = self.request(Method::POST, endpoint)?.send()?;
        parse(check(response)?)
    }

    /// Make a PUT request to the GitHub API. Same body handling as [`Self::post`].
    pub(crate) fn put<T: DeserializeOwned, B: Serialize>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<Option<T>> {
        let response = self.request(Method::PUT, endpoint)?.json(body).send()?;
        parse_after_write(check(response)?)
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

fn check(response: Response) -> Result<Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let body = response.text().unwrap_or_default();
    Err(WorkerError::Api {
        status: status.as_u16(),
        message: body,
    })
}

fn parse<T: DeserializeOwned>(response: Response) -> Result<T> {
    let bytes = response.bytes()?;
    Ok(serde_json::from_slice(&bytes)?)
}

fn parse_after_write<T: DeserializeOwned>(response: Response) -> Result<Option<T>> {
    let status = response.status();
    let bytes = response.bytes()?;
    match serde_json::from_slice(&bytes) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            tracing::warn!(%status, error = %e, "unreadable response body after successful write");
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Thing {
        name: String,
    }

    #[test]
    fn test_trailing_slash_removed() {
        let client = GitHubClient::with_base_url(Auth::App("jwt".into()), "http://host/api/");
        assert_eq!(client.base_url(), "http://host/api");
    }

    #[test]
    fn test_auth_schemes() {
        let app = GitHubClient::new(Auth::App("abc".into()));
        let headers = app.headers().unwrap();
        assert_eq!(headers[AUTHORIZATION], "Bearer abc");
        assert_eq!(headers[USER_AGENT], "automation-worker");

        let inst = GitHubClient::new(Auth::Installation("ghs_xyz".into()));
        assert_eq!(inst.headers().unwrap()[AUTHORIZATION], "token ghs_xyz");
    }

    #[test]
    fn test_invalid_credential_is_auth_error() {
        let client = GitHubClient::new(Auth::Installation("bad\ntoken".into()));
        assert!(matches!(client.headers(), Err(WorkerError::Auth(_))));
    }

    #[test]
    fn test_get_sends_headers_and_parses() {
        let mut server = Server::new();
        let mock = server
            .mock("GET", "/things/1")
            .match_header("authorization", "token t0k")
            .match_header("accept", "application/vnd.github+json")
            .match_header("x-github-api-version", "2022-11-28")
            .with_status(200)
            .with_body(r#"{"name":"one"}"#)
            .create();

        let client = GitHubClient::with_base_url(Auth::Installation("t0k".into()), server.url());
        let thing: Thing = client.get("/things/1").unwrap();

        assert_eq!(thing.name, "one");
        mock.assert();
    }

    #[test]
    fn test_non_success_becomes_api_error() {
        let mut server = Server::new();
        server
            .mock("GET", "/things/2")
            .with_status(500)
            .with_body("boom")
            .create();

        let client = GitHubClient::with_base_url(Auth::App("jwt".into()), server.url());
        let err = client.get::<Thing>("/things/2").unwrap_err();

        assert_eq!(err.status(), Some(500));
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn test_successful_write_with_empty_body() {
        let mut server = Server::new();
        server.mock("PUT", "/things/3").with_status(201).with_body("").create();
        server.mock("POST", "/things").with_status(201).with_body("<html>").create();

        let client = GitHubClient::with_base_url(Auth::Installation("t".into()), server.url());
        let put: Option<Thing> = client.put("/things/3", &serde_json::json!({})).unwrap();
        let post: Option<Thing> = client.post("/things", &serde_json::json!({})).unwrap();

        assert!(put.is_none());
        assert!(post.is_none());
    }

    #[test]
    fn test_failed_write_is_still_an_error() {
        let mut server = Server::new();
        server.mock("PUT", "/things/4").with_status(409).with_body("").create();

        let client = GitHubClient::with_base_url(Auth::Installation("t".into()), server.url());
        let err = client
            .put::<Thing, _>("/things/4", &serde_json::json!({}))
            .unwrap_err();

        assert_eq!(err.status(), Some(409));
    }

    #[test]
    fn test_get_optional_maps_404_to_none() {
        let mut server = Server::new();
        server.mock("GET", "/missing").with_status(404).create();

        let client = GitHubClient::with_base_url(Auth::App("jwt".into()), server.url());
        let result: Option<Thing> = client.get_optional("/missing").unwrap();

        assert!(result.is_none());
    }
}
