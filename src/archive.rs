//! Local JSON snapshots of posts, written before deletion.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{Post, PostMetadata};

/// On-disk snapshot of one post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchiveRecord {
    pub platform: String,
    pub post_id: String,
    pub content: String,
    pub created_at: NaiveDateTime,
    pub url: Option<String>,
    pub metadata: Option<PostMetadata>,
    /// When the snapshot was written (naive UTC).
    pub archived_at: NaiveDateTime,
}

impl ArchiveRecord {
    #[must_use]
    pub fn new(platform: &str, post: &Post, archived_at: NaiveDateTime) -> Self {
        Self {
            platform: platform.to_string(),
            post_id: post.id.clone(),
            content: post.content.clone(),
            created_at: post.created_at,
            url: post.url.clone(),
            metadata: post.metadata.clone(),
            archived_at,
        }
    }
}

/// Make a post id safe to use inside a filename.
///
/// Percent-encodes everything outside `[A-Za-z0-9._~-]`. The encoding is
/// reversible, so distinct ids always give distinct filenames.
#[must_use]
pub fn sanitize_id(id: &str) -> String {
    urlencoding::encode(id).into_owned()
}

/// `{platform}_{YYYYMMDD_HHMMSS}_{post id}.json`
#[must_use]
pub fn archive_file_name(platform: &str, post: &Post) -> String {
    format!(
        "{platform}_{}_{}.json",
        post.created_at.format("%Y%m%d_%H%M%S"),
        sanitize_id(&post.id)
    )
}

/// Write a snapshot of `post` into `dir`, creating the directory if needed.
///
/// Returns the path of the written file.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the file cannot
/// be written.
pub async fn write_archive(platform: &str, post: &Post, dir: &Path) -> Result<PathBuf> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("Failed to create archive directory: {}", dir.display()))?;

    let record = ArchiveRecord::new(platform, post, Utc::now().naive_utc());
    let json = serde_json::to_string_pretty(&record).context("Failed to serialize archive")?;

    let path = dir.join(archive_file_name(platform, post));
    tokio::fs::write(&path, json)
        .await
        .with_context(|| format!("Failed to write archive file: {}", path.display()))?;

    debug!(path = %path.display(), post_id = %post.id, "Archived post");
    Ok(path)
}

/// Read an archive file back.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a valid record.
pub async fn read_archive(path: &Path) -> Result<ArchiveRecord> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read archive file: {}", path.display()))?;
    serde_json::from_slice(&bytes)
        .with_context(|| format!("Invalid archive file: {}", path.display()))
}

/// Make sure the archive directory exists before a deletion pass.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub async fn ensure_archive_dir(dir: &Path) -> Result<()> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("Failed to create archive directory: {}", dir.display()))
}
