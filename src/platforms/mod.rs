//! Platform adapters.
//!
//! Each remote service implements [`Platform`]: authenticate once, then list
//! posts inside a date window and delete posts by id. Nothing outside this
//! module knows which service it is talking to.

mod bluesky;
pub mod feed;
mod mastodon;
mod twitter;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::Config;
use crate::models::{DeletionResult, Post};

pub use bluesky::{parse_at_uri, AtUri, BlueskyPlatform};
pub use feed::{collect_window, DateWindow, FeedPage, WindowPosition};
pub use mastodon::{strip_html, MastodonPlatform};
pub use twitter::TwitterPlatform;

/// Canonical names of every supported platform, in display order.
pub const PLATFORM_NAMES: &[&str] = &["bluesky", "mastodon", "twitter"];

#[derive(Debug, Error)]
pub enum PlatformError {
    /// A fetch or delete was attempted before a successful `authenticate`.
    #[error("not authenticated with {0}")]
    NotAuthenticated(String),
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },
    #[error("invalid post id: {0}")]
    InvalidPostId(String),
}

/// Result of an authentication attempt that did not hit a transport fault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    /// Logged in; carries the account handle or username.
    Authenticated { account: String },
    /// Required credentials are missing from the configuration.
    NotConfigured,
    /// The remote service refused the credentials.
    Rejected(String),
    /// The platform has no working integration yet.
    Unsupported,
}

impl AuthOutcome {
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }
}

/// Capability contract implemented by every platform adapter.
///
/// An adapter starts unauthenticated. A successful [`authenticate`] moves it
/// to the authenticated state for the rest of its life; every other call
/// requires that state.
///
/// [`authenticate`]: Platform::authenticate
#[async_trait]
pub trait Platform: Send + Sync {
    /// Canonical lowercase name, used in archive filenames and `Post::platform`.
    fn name(&self) -> &'static str;

    /// Title-cased name for console output.
    fn display_name(&self) -> String {
        title_case(self.name())
    }

    /// Whether the configuration carries every credential this platform needs.
    fn is_configured(&self) -> bool;

    fn is_authenticated(&self) -> bool;

    /// Fixed, redacted key/value view of this platform's configuration.
    fn config_summary(&self) -> Vec<(&'static str, String)>;

    /// Log in to the remote service.
    ///
    /// Expected failures (missing or rejected credentials) come back as an
    /// `Ok` outcome and leave the adapter unauthenticated.
    ///
    /// # Errors
    ///
    /// Returns an error only for unexpected transport faults.
    async fn authenticate(&mut self) -> Result<AuthOutcome, PlatformError>;

    /// List posts created inside `window`, newest first, capped at `limit`.
    ///
    /// Transport and API faults while paging are logged and produce an empty
    /// list so that one platform cannot stop the others.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::NotAuthenticated`] if called before a
    /// successful [`authenticate`](Platform::authenticate).
    async fn fetch_posts(
        &self,
        window: &DateWindow,
        limit: Option<usize>,
    ) -> Result<Vec<Post>, PlatformError>;

    /// Delete one post. Never fails past this boundary: every error is
    /// captured in the returned result. Called before a successful
    /// `authenticate`, it returns a failed result with a "Not authenticated"
    /// error and makes no remote call.
    async fn delete_post(&self, post_id: &str) -> DeletionResult;
}

/// Build one adapter per supported platform from the loaded configuration.
///
/// # Errors
///
/// Returns an error if an HTTP client cannot be constructed.
pub fn build_platforms(config: &Config) -> Result<Vec<Box<dyn Platform>>, PlatformError> {
    Ok(vec![
        Box::new(BlueskyPlatform::new(config.bluesky.clone())?),
        Box::new(MastodonPlatform::new(config.mastodon.clone())?),
        Box::new(TwitterPlatform::new(config.twitter.clone())),
    ])
}

/// Shared HTTP client settings for platform adapters.
pub(crate) fn http_client() -> Result<reqwest::Client, PlatformError> {
    Ok(reqwest::Client::builder()
        .user_agent(crate::constants::USER_AGENT)
        .timeout(crate::constants::HTTP_TIMEOUT)
        .build()?)
}

/// Turn a non-success response into [`PlatformError::Api`].
pub(crate) async fn check_status(
    response: reqwest::Response,
) -> Result<reqwest::Response, PlatformError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(PlatformError::Api {
        status: status.as_u16(),
        message,
    })
}

pub(crate) fn title_case(name: &str) -> String {
    let mut chars = name.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// Redact a secret for display, keeping only whether it is set.
pub(crate) fn redact(value: &str) -> String {
    if value.is_empty() {
        "(not set)".to_string()
    } else {
        "********".to_string()
    }
}

/// Display a non-secret value, marking it when empty.
pub(crate) fn shown(value: &str) -> String {
    if value.is_empty() {
        "(not set)".to_string()
    } else {
        value.to_string()
    }
}
