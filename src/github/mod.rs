pub mod mock;
pub mod types;

pub use types::{ComparePayload, CommitDetailPayload, RepoRef, Tag, UserRef};

use async_trait::async_trait;
use regex::Regex;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use serde::de::DeserializeOwned;
use std::sync::LazyLock;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::config::Config;
use types::ErrorBody;

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_USER_AGENT: &str = "gh-version-compare";
const ACCEPT_V3: &str = "application/vnd.github.v3+json";

#[derive(Debug, Error)]
pub enum GitHubError {
    #[error("GitHub API rate limit exceeded. Wait before making more requests or add a GitHub token for higher limits.")]
    RateLimited,

    #[error("GitHub API authentication failed. Check your token or try without one for public repositories.")]
    AuthFailed,

    #[error("Access denied. This repository requires authentication or you do not have permission to access it.")]
    AccessDenied,

    #[error("Repository not found or not accessible. Private repositories require a token. ({0})")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("File not found in comparison: {0}")]
    FileNotInComparison(String),

    #[error("GitHub API error: {status} - {message}")]
    Unknown { status: u16, message: String },

    #[error("GitHub API request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to decode GitHub API response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl GitHubError {
    /// True when a supplied credential was turned away by the API.
    pub fn is_credential_rejection(&self) -> bool {
        matches!(self, GitHubError::AuthFailed | GitHubError::AccessDenied)
    }
}

/// Map a non-2xx status and its error message onto the error taxonomy.
pub fn classify_error(status: u16, message: &str) -> GitHubError {
    match status {
        401 => GitHubError::AuthFailed,
        403 if message.to_lowercase().contains("rate limit") => GitHubError::RateLimited,
        403 => GitHubError::AccessDenied,
        404 => GitHubError::NotFound(message.to_string()),
        429 => GitHubError::RateLimited,
        400 | 422 => GitHubError::InvalidRequest(message.to_string()),
        _ => GitHubError::Unknown {
            status,
            message: message.to_string(),
        },
    }
}

static REPO_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"^https://github\.com/([^/]+)/([^/]+?)/?$",
        r"^git@github\.com:([^/]+)/([^/]+)$",
        r"^github\.com/([^/]+)/([^/]+)$",
        r"^([A-Za-z0-9-]+)/([A-Za-z0-9_.-]+)$",
    ]
    .iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect()
});

/// Parse a repository reference from a URL or `owner/name` string.
///
/// Accepted forms:
///   https://github.com/{owner}/{name}[.git][/]
///   git@github.com:{owner}/{name}[.git]
///   github.com/{owner}/{name}
///   {owner}/{name}
pub fn parse_repo_ref(input: &str) -> Result<RepoRef, GitHubError> {
    let input = input.trim();
    let invalid = || GitHubError::InvalidRequest(format!("not a GitHub repository: {input}"));

    let caps = REPO_PATTERNS
        .iter()
        .find_map(|pattern| pattern.captures(input))
        .ok_or_else(invalid)?;

    let owner = caps.get(1).ok_or_else(invalid)?.as_str();
    let raw_name = caps.get(2).ok_or_else(invalid)?.as_str();
    let name = raw_name.strip_suffix(".git").unwrap_or(raw_name);
    if !is_owner_name(owner) || !is_repo_name(name) {
        return Err(invalid());
    }

    Ok(RepoRef {
        owner: owner.to_string(),
        name: name.to_string(),
        url: format!("https://github.com/{owner}/{name}"),
    })
}

/// Account names: ASCII letters, digits and hyphens.
fn is_owner_name(owner: &str) -> bool {
    !owner.is_empty() && owner.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

fn is_repo_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
}

/// Read-only GitHub operations the comparison pipeline depends on.
///
/// Implemented by the HTTP client, the embedded demo fixture, and test doubles.
#[async_trait]
pub trait GitHubApi: Send + Sync {
    /// Whether a credential is attached to outgoing requests.
    fn has_token(&self) -> bool;

    /// First page (up to 100) of the repository's tags.
    async fn list_tags(&self, owner: &str, repo: &str) -> Result<Vec<Tag>, GitHubError>;

    /// One directional comparison: what `head` introduces relative to `base`.
    async fn compare(
        &self,
        owner: &str,
        repo: &str,
        base: &str,
        head: &str,
    ) -> Result<ComparePayload, GitHubError>;

    /// The account the token belongs to.
    async fn current_user(&self) -> Result<UserRef, GitHubError>;

    /// A single commit with its file list.
    async fn commit(
        &self,
        owner: &str,
        repo: &str,
        sha: &str,
    ) -> Result<CommitDetailPayload, GitHubError>;
}

/// HTTP implementation of [`GitHubApi`] on top of reqwest.
///
/// The token is captured when the client is built; a new token needs a new
/// client.
pub struct GitHubClient {
    client: reqwest::Client,
    base_url: String,
    has_token: bool,
}

impl GitHubClient {
    pub fn new(config: &Config) -> Result<Self, GitHubError> {
        Self::with_settings(
            config.github.api_url.as_deref().unwrap_or(DEFAULT_API_URL),
            config.github.token.as_deref(),
            config.github.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT),
        )
    }

    pub fn with_settings(
        base_url: &str,
        token: Option<&str>,
        user_agent: &str,
    ) -> Result<Self, GitHubError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_V3));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(user_agent)
                .map_err(|_| GitHubError::InvalidRequest("invalid user agent".to_string()))?,
        );

        let token = token.filter(|t| !t.is_empty());
        if let Some(token) = token {
            let mut value = HeaderValue::from_str(&format!("token {token}")).map_err(|_| {
                GitHubError::InvalidRequest("token contains invalid characters".to_string())
            })?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder().default_headers(headers).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            has_token: token.is_some(),
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, GitHubError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, has_token = self.has_token, "GitHub API request");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        debug!(status = status.as_u16(), "GitHub API response");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.message)
                .unwrap_or_else(|| "Unknown error".to_string());
            warn!(status = status.as_u16(), %message, "GitHub API error response");
            return Err(classify_error(status.as_u16(), &message));
        }

        let body = response.text().await?;
        debug!(bytes = body.len(), "received GitHub API body");
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl GitHubApi for GitHubClient {
    fn has_token(&self) -> bool {
        self.has_token
    }

    #[instrument(skip(self))]
    async fn list_tags(&self, owner: &str, repo: &str) -> Result<Vec<Tag>, GitHubError> {
        self.get(&format!("/repos/{owner}/{repo}/tags?per_page=100"))
            .await
    }

    #[instrument(skip(self))]
    async fn compare(
        &self,
        owner: &str,
        repo: &str,
        base: &str,
        head: &str,
    ) -> Result<ComparePayload, GitHubError> {
        self.get(&format!("/repos/{owner}/{repo}/compare/{base}...{head}"))
            .await
    }

    #[instrument(skip(self))]
    async fn current_user(&self) -> Result<UserRef, GitHubError> {
        self.get("/user").await
    }

    #[instrument(skip(self))]
    async fn commit(
        &self,
        owner: &str,
        repo: &str,
        sha: &str,
    ) -> Result<CommitDetailPayload, GitHubError> {
        self.get(&format!("/repos/{owner}/{repo}/commits/{sha}"))
            .await
    }
}
