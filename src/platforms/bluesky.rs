use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map};
use tracing::{debug, error, info, warn};

use super::feed::{collect_window, DateWindow, FeedPage, UnparseableItem};
use super::{check_status, http_client, AuthOutcome, Platform, PlatformError};
use crate::config::BlueskyConfig;
use crate::constants::{BLUESKY_PAGE_SIZE, BLUESKY_POST_COLLECTION, BLUESKY_WEB_BASE};
use crate::models::{DeletionResult, Post};
use crate::timestamp;

/// Parts of an `at://{repo}/{collection}/{rkey}` record URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtUri {
    pub repo: String,
    pub collection: String,
    pub rkey: String,
}

/// Split an AT Protocol record URI into repo, collection and record key.
#[must_use]
pub fn parse_at_uri(uri: &str) -> Option<AtUri> {
    let rest = uri.strip_prefix("at://")?;
    let mut parts = rest.split('/');
    let repo = parts.next().filter(|s| !s.is_empty())?;
    let collection = parts.next().filter(|s| !s.is_empty())?;
    let rkey = parts.next().filter(|s| !s.is_empty())?;
    if parts.next().is_some() {
        return None;
    }
    Some(AtUri {
        repo: repo.to_string(),
        collection: collection.to_string(),
        rkey: rkey.to_string(),
    })
}

#[derive(Debug, Serialize)]
struct CreateSessionRequest<'a> {
    identifier: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateSessionResponse {
    access_jwt: String,
    did: String,
    handle: String,
}

#[derive(Debug, Deserialize)]
struct XrpcError {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Response from `app.bsky.feed.getAuthorFeed`.
#[derive(Debug, Deserialize)]
struct AuthorFeedResponse {
    #[serde(default)]
    feed: Vec<FeedViewPost>,
    #[serde(default)]
    cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FeedViewPost {
    post: Option<PostView>,
    /// Present for reposts and pinned posts.
    #[serde(default)]
    reason: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PostView {
    uri: String,
    cid: String,
    author: Author,
    record: PostRecord,
    #[serde(default)]
    reply_count: Option<u64>,
    #[serde(default)]
    repost_count: Option<u64>,
    #[serde(default)]
    like_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct Author {
    did: String,
    handle: String,
}

#[derive(Debug, Deserialize)]
struct PostRecord {
    #[serde(default)]
    text: String,
    #[serde(rename = "createdAt", default)]
    created_at: Option<String>,
}

#[derive(Debug, Clone)]
struct Session {
    access_jwt: String,
    did: String,
    handle: String,
}

/// Bluesky adapter speaking XRPC to the account's PDS.
pub struct BlueskyPlatform {
    config: BlueskyConfig,
    client: reqwest::Client,
    session: Option<Session>,
}

impl BlueskyPlatform {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: BlueskyConfig) -> Result<Self, PlatformError> {
        Ok(Self {
            config,
            client: http_client()?,
            session: None,
        })
    }

    fn xrpc_url(&self, method: &str) -> String {
        format!("{}/xrpc/{method}", self.config.service_url.trim_end_matches('/'))
    }

    fn session(&self) -> Result<&Session, PlatformError> {
        self.session
            .as_ref()
            .ok_or_else(|| PlatformError::NotAuthenticated("Bluesky".to_string()))
    }

    async fn get_author_feed(
        &self,
        session: &Session,
        cursor: Option<String>,
        limit: usize,
    ) -> Result<FeedPage<FeedViewPost>, PlatformError> {
        let mut url = format!(
            "{}?actor={}&limit={limit}",
            self.xrpc_url("app.bsky.feed.getAuthorFeed"),
            urlencoding::encode(&session.did)
        );
        if let Some(cursor) = cursor {
            url.push_str("&cursor=");
            url.push_str(&urlencoding::encode(&cursor));
        }

        debug!(url = %url, "Fetching Bluesky author feed page");

        let response = self
            .client
            .get(&url)
            .bearer_auth(&session.access_jwt)
            .send()
            .await?;
        let page: AuthorFeedResponse = check_status(response).await?.json().await?;

        Ok(FeedPage {
            items: page.feed,
            cursor: page.cursor,
        })
    }

    async fn delete_record(&self, session: &Session, uri: &AtUri) -> Result<(), PlatformError> {
        let response = self
            .client
            .post(self.xrpc_url("com.atproto.repo.deleteRecord"))
            .bearer_auth(&session.access_jwt)
            .json(&json!({
                "repo": uri.repo,
                "collection": uri.collection,
                "rkey": uri.rkey,
            }))
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }
}

/// Convert a feed item into a post, dropping items that are not the
/// session owner's own records.
fn to_post(session: &Session, item: FeedViewPost) -> Result<Option<Post>, UnparseableItem> {
    let Some(post) = item.post else {
        return Ok(None);
    };
    if item.reason.is_some() || post.author.did != session.did {
        debug!(uri = %post.uri, "Skipping repost or pinned entry");
        return Ok(None);
    }
    let Some(raw_created_at) = post.record.created_at.as_deref() else {
        debug!(uri = %post.uri, "Skipping record without createdAt");
        return Ok(None);
    };

    let created_at = timestamp::normalize(raw_created_at).map_err(|source| UnparseableItem {
        id: post.uri.clone(),
        source,
    })?;

    let url = parse_at_uri(&post.uri).map(|at| {
        format!(
            "{BLUESKY_WEB_BASE}/profile/{}/post/{}",
            session.handle, at.rkey
        )
    });

    let mut metadata = Map::new();
    metadata.insert("uri".to_string(), json!(post.uri));
    metadata.insert("cid".to_string(), json!(post.cid));
    metadata.insert("author".to_string(), json!(post.author.handle));
    metadata.insert("reply_count".to_string(), json!(post.reply_count));
    metadata.insert("repost_count".to_string(), json!(post.repost_count));
    metadata.insert("like_count".to_string(), json!(post.like_count));

    Ok(Some(Post {
        id: post.uri,
        content: post.record.text,
        created_at,
        platform: "bluesky".to_string(),
        url,
        metadata: Some(metadata),
    }))
}

#[async_trait]
impl Platform for BlueskyPlatform {
    fn name(&self) -> &'static str {
        "bluesky"
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
            warn!("Bluesky configuration missing; set BLUESKY_HANDLE and BLUESKY_PASSWORD");
            return Ok(AuthOutcome::NotConfigured);
        }

        let response = self
            .client
            .post(self.xrpc_url("com.atproto.server.createSession"))
            .json(&CreateSessionRequest {
                identifier: &self.config.handle,
                password: &self.config.password,
            })
            .send()
            .await?;

        let status = response.status();
        if status.is_client_error() {
            let body: Option<XrpcError> = response.json().await.ok();
            let reason = body
                .and_then(|b| b.message.or(b.error))
                .unwrap_or_else(|| status.to_string());
            warn!(status = status.as_u16(), reason = %reason, "Bluesky rejected credentials");
            return Ok(AuthOutcome::Rejected(reason));
        }

        let session: CreateSessionResponse = check_status(response).await?.json().await?;
        info!(handle = %session.handle, did = %session.did, "Authenticated with Bluesky");

        let account = session.handle.clone();
        self.session = Some(Session {
            access_jwt: session.access_jwt,
            did: session.did,
            handle: session.handle,
        });
        Ok(AuthOutcome::Authenticated { account })
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
            BLUESKY_PAGE_SIZE,
            move |cursor, page_size| self.get_author_feed(session, cursor, page_size),
            move |item| to_post(session, item),
        )
        .await;

        match result {
            Ok(posts) => {
                info!(count = posts.len(), "Fetched Bluesky posts");
                Ok(posts)
            }
            Err(e) => {
                error!("Error retrieving Bluesky posts: {e}");
                Ok(Vec::new())
            }
        }
    }

    async fn delete_post(&self, post_id: &str) -> DeletionResult {
        let Ok(session) = self.session() else {
            return DeletionResult::failed(post_id, "Not authenticated with Bluesky");
        };

        let Some(uri) = parse_at_uri(post_id) else {
            return DeletionResult::failed(
                post_id,
                PlatformError::InvalidPostId(post_id.to_string()).to_string(),
            );
        };
        if uri.collection != BLUESKY_POST_COLLECTION {
            return DeletionResult::failed(
                post_id,
                format!("not a post record: {}", uri.collection),
            );
        }

        match self.delete_record(session, &uri).await {
            Ok(()) => {
                debug!(post_id, "Deleted Bluesky post");
                DeletionResult::succeeded(post_id)
            }
            Err(e) => {
                warn!(post_id, "Failed to delete Bluesky post: {e}");
                DeletionResult::failed(post_id, e.to_string())
            }
        }
    }
}
