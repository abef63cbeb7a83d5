//! Date-windowed collection over a paged, reverse-chronological feed.

use std::future::Future;

use chrono::NaiveDateTime;
use thiserror::Error;
use tracing::{debug, warn};

use super::PlatformError;
use crate::models::Post;
use crate::timestamp::TimestampError;

/// Closed interval `[start, end]` over naive UTC timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

/// Where a timestamp falls relative to a [`DateWindow`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowPosition {
    /// Older than the start bound.
    Before,
    Within,
    /// Newer than the end bound.
    After,
}

impl DateWindow {
    #[must_use]
    pub const fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub const fn start(&self) -> NaiveDateTime {
        self.start
    }

    #[must_use]
    pub const fn end(&self) -> NaiveDateTime {
        self.end
    }

    #[must_use]
    pub fn position(&self, ts: NaiveDateTime) -> WindowPosition {
        if ts < self.start {
            WindowPosition::Before
        } else if ts > self.end {
            WindowPosition::After
        } else {
            WindowPosition::Within
        }
    }

    #[must_use]
    pub fn contains(&self, ts: NaiveDateTime) -> bool {
        self.position(ts) == WindowPosition::Within
    }
}

/// One page of a remote feed plus the continuation cursor, if any.
#[derive(Debug, Clone)]
pub struct FeedPage<T> {
    pub items: Vec<T>,
    pub cursor: Option<String>,
}

/// A feed item whose timestamp could not be normalized.
#[derive(Debug, Error)]
#[error("post {id}: {source}")]
pub struct UnparseableItem {
    pub id: String,
    #[source]
    pub source: TimestampError,
}

/// Page through a feed and collect the posts that fall inside `window`.
///
/// `fetch_page` receives the cursor from the previous page (`None` first)
/// and the number of items to request. `to_post` converts a raw item; it
/// returns `Ok(None)` for items that are not the user's own posts, which
/// are dropped before any date check.
///
/// The feed must be newest first. The first item older than
/// `window.start()` ends collection without requesting further pages,
/// so a feed that is out of order is silently truncated at that point.
/// Items newer than `window.end()` are skipped. Collection also stops as
/// soon as `limit` posts are held, or when a page comes back empty or
/// without a cursor.
///
/// # Errors
///
/// Propagates the first error returned by `fetch_page`.
pub async fn collect_window<T, F, Fut, C>(
    platform: &str,
    window: &DateWindow,
    limit: Option<usize>,
    max_page_size: usize,
    mut fetch_page: F,
    mut to_post: C,
) -> Result<Vec<Post>, PlatformError>
where
    F: FnMut(Option<String>, usize) -> Fut,
    Fut: Future<Output = Result<FeedPage<T>, PlatformError>>,
    C: FnMut(T) -> Result<Option<Post>, UnparseableItem>,
{
    let mut posts = Vec::new();
    if limit == Some(0) {
        return Ok(posts);
    }

    let mut cursor: Option<String> = None;
    let mut pages = 0usize;

    loop {
        let page_size = limit.map_or(max_page_size, |l| max_page_size.min(l - posts.len()));
        let page = fetch_page(cursor.take(), page_size).await?;
        pages += 1;

        if page.items.is_empty() {
            debug!(platform, pages, "Feed exhausted");
            break;
        }

        for item in page.items {
            let post = match to_post(item) {
                Ok(Some(post)) => post,
                Ok(None) => continue,
                Err(e) => {
                    warn!(platform, "Skipping item with unparseable timestamp: {e}");
                    continue;
                }
            };

            match window.position(post.created_at) {
                WindowPosition::Before => {
                    debug!(
                        platform,
                        pages,
                        collected = posts.len(),
                        "Reached posts older than the window"
                    );
                    return Ok(posts);
                }
                WindowPosition::After => {}
                WindowPosition::Within => {
                    posts.push(post);
                    if limit.is_some_and(|l| posts.len() >= l) {
                        debug!(platform, pages, "Post limit reached");
                        return Ok(posts);
                    }
                }
            }
        }

        match page.cursor {
            Some(next) if !next.is_empty() => cursor = Some(next),
            _ => break,
        }
    }

    Ok(posts)
}
