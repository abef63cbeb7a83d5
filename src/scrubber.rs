//! Archive-then-delete over a batch of posts from one platform.

use std::path::Path;

use tracing::{info, warn};

use crate::archive::write_archive;
use crate::models::{DeletionResult, DeletionSummary, Post};
use crate::platforms::Platform;

/// Delete every post in `posts` through `platform`, in order.
///
/// When `archive_dir` is set each post is first written to an archive file
/// there. A failed archive write is logged and the delete still goes ahead;
/// the result then reports `archived = false`. A failed delete is recorded
/// in its result and the batch moves on, so the output always holds exactly
/// one result per input post, in input order.
pub async fn bulk_delete(
    platform: &dyn Platform,
    posts: &[Post],
    archive_dir: Option<&Path>,
) -> Vec<DeletionResult> {
    let mut results = Vec::with_capacity(posts.len());

    for post in posts {
        let archived_to = match archive_dir {
            Some(dir) => match write_archive(platform.name(), post, dir).await {
                Ok(path) => Some(path),
                Err(e) => {
                    warn!(
                        platform = platform.name(),
                        post_id = %post.id,
                        "Failed to archive post: {e:#}"
                    );
                    None
                }
            },
            None => None,
        };

        let mut result = platform.delete_post(&post.id).await;
        if let Some(path) = archived_to {
            result = result.with_archive(path);
        }

        if let Some(error) = &result.error {
            warn!(platform = platform.name(), post_id = %post.id, error = %error, "Delete failed");
        }
        results.push(result);
    }

    let summary = DeletionSummary::from_results(&results);
    info!(
        platform = platform.name(),
        deleted = summary.deleted,
        failed = summary.failed,
        archived = summary.archived,
        "Bulk delete finished"
    );

    results
}
