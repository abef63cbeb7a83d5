use async_trait::async_trait;
use tracing::warn;

use super::feed::DateWindow;
use super::{AuthOutcome, Platform, PlatformError};
use crate::config::TwitterConfig;
use crate::models::{DeletionResult, Post};

/// Placeholder for Twitter/X. Credentials are read and reported, but the
/// adapter never authenticates, so the session never fetches or deletes
/// through it.
pub struct TwitterPlatform {
    config: TwitterConfig,
}

impl TwitterPlatform {
    #[must_use]
    pub const fn new(config: TwitterConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Platform for TwitterPlatform {
    fn name(&self) -> &'static str {
        "twitter"
    }

    fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    fn is_authenticated(&self) -> bool {
        false
    }

    fn config_summary(&self) -> Vec<(&'static str, String)> {
        self.config.summary()
    }

    async fn authenticate(&mut self) -> Result<AuthOutcome, PlatformError> {
        warn!("Twitter/X integration is not yet implemented");
        Ok(AuthOutcome::Unsupported)
    }

    async fn fetch_posts(
        &self,
        _window: &DateWindow,
        _limit: Option<usize>,
    ) -> Result<Vec<Post>, PlatformError> {
        Err(PlatformError::NotAuthenticated("Twitter/X".to_string()))
    }

    async fn delete_post(&self, post_id: &str) -> DeletionResult {
        DeletionResult::failed(post_id, "Not authenticated with Twitter/X")
    }
}
