//! Value types shared by every platform adapter and the bulk delete pass.

use std::fmt;
use std::path::PathBuf;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Platform-specific auxiliary fields carried through to archives.
pub type PostMetadata = Map<String, Value>;

/// A post retrieved from a remote platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    /// Platform-specific identifier. For Bluesky this is the full `at://` URI.
    pub id: String,
    /// Plain-text body with any markup removed.
    pub content: String,
    /// Creation time as naive UTC.
    pub created_at: NaiveDateTime,
    /// Canonical lowercase platform name.
    pub platform: String,
    pub url: Option<String>,
    pub metadata: Option<PostMetadata>,
}

impl Post {
    /// Short single-line preview of the content.
    ///
    /// Keeps the first `max_chars` characters, appends `...` when truncated
    /// and flattens line breaks so the preview fits in a table cell.
    #[must_use]
    pub fn preview(&self, max_chars: usize) -> String {
        let mut preview: String = self.content.chars().take(max_chars).collect();
        if self.content.chars().count() > max_chars {
            preview.push_str("...");
        }
        preview.replace(['\n', '\r'], " ")
    }
}

impl fmt::Display for Post {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.platform,
            self.created_at.format("%Y-%m-%d %H:%M"),
            self.preview(crate::constants::PREVIEW_CHARS)
        )
    }
}

/// Outcome of one deletion attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionResult {
    pub post_id: String,
    pub success: bool,
    /// Present iff `success` is false.
    pub error: Option<String>,
    /// True iff an archive write completed before the delete attempt.
    pub archived: bool,
    /// Set iff `archived`.
    pub archive_path: Option<PathBuf>,
}

impl DeletionResult {
    #[must_use]
    pub fn succeeded(post_id: impl Into<String>) -> Self {
        Self {
            post_id: post_id.into(),
            success: true,
            error: None,
            archived: false,
            archive_path: None,
        }
    }

    #[must_use]
    pub fn failed(post_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            post_id: post_id.into(),
            success: false,
            error: Some(error.into()),
            archived: false,
            archive_path: None,
        }
    }

    /// Record that the post was archived to `path` before deletion.
    #[must_use]
    pub fn with_archive(mut self, path: PathBuf) -> Self {
        self.archived = true;
        self.archive_path = Some(path);
        self
    }
}

/// Aggregate counts over a batch of deletion results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeletionSummary {
    pub deleted: usize,
    pub failed: usize,
    pub archived: usize,
}

impl DeletionSummary {
    #[must_use]
    pub fn from_results(results: &[DeletionResult]) -> Self {
        results.iter().fold(Self::default(), |mut acc, r| {
            if r.success {
                acc.deleted += 1;
            } else {
                acc.failed += 1;
            }
            if r.archived {
                acc.archived += 1;
            }
            acc
        })
    }
}
