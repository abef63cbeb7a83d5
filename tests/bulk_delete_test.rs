//! Integration tests for the archive-then-delete pass.

mod common;

use common::{calls_matching, post, ts, CallLog, MockPlatform};
use social_scrubber::archive::{archive_file_name, read_archive};
use social_scrubber::scrubber::bulk_delete;
use tempfile::TempDir;

fn three_posts() -> Vec<social_scrubber::models::Post> {
    vec![
        post("mastodon", "101", ts(2024, 1, 10)),
        post("mastodon", "102", ts(2024, 1, 9)),
        post("mastodon", "103", ts(2024, 1, 8)),
    ]
}

#[tokio::test]
async fn test_results_match_input_order() {
    let log = CallLog::default();
    let platform = MockPlatform::new("mastodon", &log);
    let posts = three_posts();

    let results = bulk_delete(&platform, &posts, None).await;

    let ids: Vec<&str> = results.iter().map(|r| r.post_id.as_str()).collect();
    assert_eq!(ids, ["101", "102", "103"]);
    assert!(results.iter().all(|r| r.success && !r.archived));
    assert_eq!(
        calls_matching(&log, "mastodon:delete"),
        [
            "mastodon:delete:101",
            "mastodon:delete:102",
            "mastodon:delete:103"
        ]
    );
}

#[tokio::test]
async fn test_one_failure_does_not_stop_the_batch() {
    let log = CallLog::default();
    let platform = MockPlatform::new("mastodon", &log).failing("102");
    let posts = three_posts();

    let results = bulk_delete(&platform, &posts, None).await;

    assert_eq!(results.len(), 3);
    assert!(results[0].success);
    assert!(!results[1].success);
    assert_eq!(results[1].error.as_deref(), Some("remote refused delete"));
    assert!(results[2].success);
    assert_eq!(calls_matching(&log, "mastodon:delete").len(), 3);
}

#[tokio::test]
async fn test_archives_each_post_before_deleting_it() {
    let dir = TempDir::new().unwrap();
    let archive_dir = dir.path().join("archives");
    let log = CallLog::default();
    let platform = MockPlatform::new("mastodon", &log)
        .failing("103")
        .watching(archive_dir.clone());
    let posts = three_posts();

    let results = bulk_delete(&platform, &posts, Some(&archive_dir)).await;

    assert_eq!(
        calls_matching(&log, "mastodon:delete"),
        [
            "mastodon:delete:101:archived",
            "mastodon:delete:102:archived",
            "mastodon:delete:103:archived"
        ]
    );
    for (post, result) in posts.iter().zip(&results) {
        assert!(result.archived);
        let path = result.archive_path.as_ref().unwrap();
        assert_eq!(
            path.file_name().unwrap().to_string_lossy(),
            archive_file_name("mastodon", post)
        );
        let record = read_archive(path).await.unwrap();
        assert_eq!(record.post_id, post.id);
        assert_eq!(record.content, post.content);
    }
    // Archive survives a failed delete.
    assert!(!results[2].success);
    assert!(results[2].archive_path.as_ref().unwrap().exists());
}

#[tokio::test]
async fn test_archive_failure_does_not_block_delete() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, "file").unwrap();
    let log = CallLog::default();
    let platform = MockPlatform::new("bluesky", &log);
    let posts = vec![post(
        "bluesky",
        "at://did:plc:abc/app.bsky.feed.post/3kabc",
        ts(2024, 1, 10),
    )];

    let results = bulk_delete(&platform, &posts, Some(&blocker)).await;

    assert_eq!(results.len(), 1);
    assert!(results[0].success);
    assert!(!results[0].archived);
    assert!(results[0].archive_path.is_none());
    assert_eq!(calls_matching(&log, "bluesky:delete").len(), 1);
}

#[tokio::test]
async fn test_empty_batch() {
    let log = CallLog::default();
    let platform = MockPlatform::new("mastodon", &log);

    let results = bulk_delete(&platform, &[], None).await;

    assert!(results.is_empty());
    assert!(log.lock().unwrap().is_empty());
}
