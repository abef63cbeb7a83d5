use async_trait::async_trait;
use scraper::{Html, Node};
use serde::Deserialize;
use serde_json::{json, Map};
use tracing::{debug, error, info, warn};

use super::feed::{collect_window, DateWindow, FeedPage, UnparseableItem};
use super::{check_status, http_client, AuthOutcome, Platform, PlatformError};
use crate::config::MastodonConfig;
use crate::constants::MASTODON_PAGE_SIZE;
use crate::models::{DeletionResult, Post};
use crate::timestamp;

/// Reduce status HTML to plain text.
///
/// Entities are decoded, `<br>` becomes a newline and consecutive
/// paragraphs are separated by a blank line.
#[must_use]
pub fn strip_html(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let mut text = String::new();

    for node in fragment.root_element().descendants() {
        match node.value() {
            Node::Text(t) => text.push_str(t),
            Node::Element(el) if el.name() == "br" => text.push('\n'),
            Node::Element(el) if el.name() == "p" && !text.is_empty() => text.push_str("\n\n"),
            _ => {}
        }
    }

    text.trim().to_string()
}

#[derive(Debug, Deserialize)]
struct Account {
    id: String,
    username: String,
}

#[derive(Debug, Deserialize)]
struct Status {
    id: String,
    created_at: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    visibility: Option<String>,
    #[serde(default)]
    replies_count: u64,
    #[serde(default)]
    reblogs_count: u64,
    #[serde(default)]
    favourites_count: u64,
}

#[derive(Debug, Clone)]
struct Session {
    account_id: String,
}

/// Mastodon adapter using the REST API with a personal access token.
pub struct MastodonPlatform {
    config: MastodonConfig,
    client: reqwest::Client,
    session: Option<Session>,
}

impl MastodonPlatform {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: MastodonConfig) -> Result<Self, PlatformError> {
        Ok(Self {
            config,
            client: http_client()?,
            session: None,
        })
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/api/v1/{path}", self.config.api_base_url.trim_end_matches('/'))
    }

    fn session(&self) -> Result<&Session, PlatformError> {
        self.session
            .as_ref()
            .ok_or_else(|| PlatformError::NotAuthenticated("Mastodon".to_string()))
    }

    async fn account_statuses(
        &self,
        session: &Session,
        max_id: Option<String>,
        limit: usize,
    ) -> Result<FeedPage<Status>, PlatformError> {
        let mut url = format!(
            "{}?limit={limit}&exclude_reblogs=true",
            self.api_url(&format!(
                "accounts/{}/statuses",
                urlencoding::encode(&session.account_id)
            ))
        );
        if let Some(max_id) = max_id {
            url.push_str("&max_id=");
            url.push_str(&urlencoding::encode(&max_id));
        }

        debug!(url = %url, "Fetching Mastodon statuses page");

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.config.access_token)
            .send()
            .await?;
        let statuses: Vec<Status> = check_status(response).await?.json().await?;

        // Mastodon pages by id: the next page is everything older than the
        // last status returned.
        let cursor = statuses.last().map(|s| s.id.clone());
        Ok(FeedPage {
            items: statuses,
            cursor,
        })
    }
}

fn to_post(status: Status) -> Result<Option<Post>, UnparseableItem> {
    let created_at = timestamp::normalize(&status.created_at).map_err(|source| UnparseableItem {
        id: status.id.clone(),
        source,
    })?;

    let mut metadata = Map::new();
    metadata.insert("visibility".to_string(), json!(status.visibility));
    metadata.insert("replies_count".to_string(), json!(status.replies_count));
    metadata.insert("reblogs_count".to_string(), json!(status.reblogs_count));
    metadata.insert("favourites_count".to_string(), json!(status.favourites_count));

    Ok(Some(Post {
        id: status.id,
        content: strip_html(&status.content),
        created_at,
        platform: "mastodon".to_string(),
        url: status.url,
        metadata: Some(metadata),
    }))
}

#[async_trait]
impl Platform for MastodonPlatform {
    fn name(&self) -> &'static str {
        "mastodon"
    }

    fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    fn config_summary(&self) -> Vec<(&'static str, String)> {
        self.config.summary()
    }

    async fn authenticate(&mut self) -> Result<AuthOutcome, PlatformError> {
        if !self.config.is_configured() {
            warn!(
                "Mastodon configuration missing; set MASTODON_API_BASE_URL and MASTODON_ACCESS_TOKEN"
            );
            return Ok(AuthOutcome::NotConfigured);
        }

        let response = self
            .client
            .get(self.api_url("accounts/verify_credentials"))
            .bearer_auth(&self.config.access_token)
            .send()
            .await?;

        let status = response.status();
        if status.is_client_error() {
            warn!(status = status.as_u16(), "Mastodon rejected access token");
            return Ok(AuthOutcome::Rejected(status.to_string()));
        }

        let account: Account = check_status(response).await?.json().await?;
        info!(username = %account.username, "Authenticated with Mastodon");

        self.session = Some(Session {
            account_id: account.id,
        });
        Ok(AuthOutcome::Authenticated {
            account: account.username,
        })
    }

    async fn fetch_posts(
        &self,
        window: &DateWindow,
        limit: Option<usize>,
    ) -> Result<Vec<Post>, PlatformError> {
        let session = self.session()?;

        let result = collect_window(
            self.name(),
            window,
            limit,
            MASTODON_PAGE_SIZE,
            move |max_id, page_size| self.account_statuses(session, max_id, page_size),
            to_post,
        )
        .await;

        match result {
            Ok(posts) => {
                info!(count = posts.len(), "Fetched Mastodon posts");
                Ok(posts)
            }
            Err(e) => {
                error!("Error retrieving Mastodon posts: {e}");
                Ok(Vec::new())
            }
        }
    }

    async fn delete_post(&self, post_id: &str) -> DeletionResult {
        if self.session.is_none() {
            return DeletionResult::failed(post_id, "Not authenticated with Mastodon");
        }
        if post_id.is_empty() {
            return DeletionResult::failed(
                post_id,
                PlatformError::InvalidPostId(post_id.to_string()).to_string(),
            );
        }

        let url = self.api_url(&format!("statuses/{}", urlencoding::encode(post_id)));
        let result = async {
            let response = self
                .client
                .delete(&url)
                .bearer_auth(&self.config.access_token)
                .send()
                .await?;
            check_status(response).await.map(|_| ())
        }
        .await;

        match result {
            Ok(()) => {
                debug!(post_id, "Deleted Mastodon status");
                DeletionResult::succeeded(post_id)
            }
            Err(e) => {
                warn!(post_id, "Failed to delete Mastodon status: {e}");
                DeletionResult::failed(post_id, e.to_string())
            }
        }
    }
}
