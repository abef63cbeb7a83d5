//! Shared constants used across the application.

use std::time::Duration;

/// User agent sent with every platform API request.
pub const USER_AGENT: &str = concat!("social-scrubber/", env!("CARGO_PKG_VERSION"));

/// Timeout applied to each platform API request.
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Largest page `app.bsky.feed.getAuthorFeed` is asked for.
pub const BLUESKY_PAGE_SIZE: usize = 50;

/// Largest page `GET /api/v1/accounts/:id/statuses` is asked for.
pub const MASTODON_PAGE_SIZE: usize = 40;

/// Default PDS used when `BLUESKY_SERVICE_URL` is not set.
pub const BLUESKY_DEFAULT_SERVICE: &str = "https://bsky.social";

/// Public web host used to build Bluesky post links.
pub const BLUESKY_WEB_BASE: &str = "https://bsky.app";

/// Record collection holding Bluesky posts.
pub const BLUESKY_POST_COLLECTION: &str = "app.bsky.feed.post";

/// Characters kept from a post's content in previews.
pub const PREVIEW_CHARS: usize = 50;
