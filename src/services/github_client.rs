//! GitHub API client.
//!
//! Every request goes through [`GitHubClient::fetch_json`], which never fails
//! out of band: it always resolves to either the parsed JSON body or a
//! classified [`AppError`].

use crate::error::{AppError, INVALID_JSON_MESSAGE};
use reqwest::{header, redirect, Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Public GitHub REST API host.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Media type GitHub recommends for REST requests.
pub const GITHUB_MEDIA_TYPE: &str = "application/vnd.github+json";

/// Maximum redirects followed per request.
const MAX_REDIRECTS: usize = 10;

const BAD_REQUEST_MESSAGE: &str = "Bad request.";
const NOT_FOUND_MESSAGE: &str = "Information not found.";
const UNEXPECTED_MESSAGE: &str = "Something went wrong.";

/// Outcome of a single lookup: parsed JSON or a classified error.
pub type FetchResult = Result<Value, AppError>;

/// GitHub API client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubClientConfig {
    /// Base URL of the API (e.g., `https://api.github.com`).
    pub base_url: String,

    /// User-Agent header; GitHub rejects requests without one.
    pub user_agent: String,

    /// Optional request timeout in seconds. `None` waits indefinitely.
    pub timeout_secs: Option<u64>,
}

impl Default for GitHubClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_secs: None,
        }
    }
}

/// GitHub API client.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    client: Client,
    config: GitHubClientConfig,
}

impl GitHubClient {
    /// Create a new GitHub client.
    pub fn new(config: GitHubClientConfig) -> Result<Self, AppError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static(GITHUB_MEDIA_TYPE),
        );

        let mut builder = Client::builder()
            .default_headers(headers)
            .user_agent(config.user_agent.clone())
            .redirect(redirect::Policy::limited(MAX_REDIRECTS));
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(std::time::Duration::from_secs(secs));
        }

        let client = builder
            .build()
            .map_err(|e| AppError::unknown("Failed to build HTTP client").with_cause(e))?;

        Ok(Self { client, config })
    }

    /// Client configuration.
    pub fn config(&self) -> &GitHubClientConfig {
        &self.config
    }

    /// Get the full URL for an API path.
    fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// URL of the user lookup endpoint.
    pub fn user_url(&self, login: &str) -> String {
        self.api_url(&format!("/users/{}", urlencoding::encode(login)))
    }

    /// URL of the contributor listing endpoint.
    pub fn contributors_url(&self, owner: &str, repository: &str) -> String {
        self.api_url(&format!(
            "/repos/{}/{}/contributors",
            urlencoding::encode(owner),
            urlencoding::encode(repository)
        ))
    }

    /// GET `url` and parse the body as JSON.
    ///
    /// Transport failures become `NetworkError`, unparseable 2xx bodies
    /// `SyntaxError`, 400 `BadRequestError`, 404 `NotFoundError` carrying
    /// `not_found_message`, and any other status `UnexpectedError`.
    pub async fn fetch_json(&self, url: &str, not_found_message: Option<&str>) -> FetchResult {
        log::debug!("[fetch] GET {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            log::debug!("[fetch] {} returned {}", url, status);
            return Err(classify_status(status, not_found_message));
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body)
            .map_err(|e| AppError::syntax(INVALID_JSON_MESSAGE).with_cause(e))
    }

    /// Look up a user by login.
    pub async fn fetch_user(&self, login: &str) -> FetchResult {
        let message = format!("User \"{}\" not found.", login);
        self.fetch_json(&self.user_url(login), Some(&message)).await
    }

    /// List a repository's contributors.
    pub async fn fetch_contributors(&self, owner: &str, repository: &str) -> FetchResult {
        let message = format!("Repository \"{}\" not found.", repository);
        self.fetch_json(&self.contributors_url(owner, repository), Some(&message))
            .await
    }
}

/// Map a non-success status to an error.
pub fn classify_status(status: StatusCode, not_found_message: Option<&str>) -> AppError {
    match status {
        StatusCode::BAD_REQUEST => AppError::bad_request(BAD_REQUEST_MESSAGE),
        StatusCode::NOT_FOUND => {
            AppError::not_found(not_found_message.unwrap_or(NOT_FOUND_MESSAGE))
        }
        _ => AppError::unexpected(UNEXPECTED_MESSAGE).with_cause(format!("HTTP {}", status)),
    }
}
