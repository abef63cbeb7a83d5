//! Bluesky adapter against a mock XRPC server.

use chrono::NaiveDate;
use serde_json::{json, Value};
use social_scrubber::config::BlueskyConfig;
use social_scrubber::platforms::{AuthOutcome, BlueskyPlatform, DateWindow, Platform};
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DID: &str = "did:plc:alice";
const FEED_PATH: &str = "/xrpc/app.bsky.feed.getAuthorFeed";

fn config(server: &MockServer) -> BlueskyConfig {
    BlueskyConfig {
        handle: "alice.bsky.social".to_string(),
        password: "app-password".to_string(),
        service_url: server.uri(),
    }
}

fn january() -> DateWindow {
    DateWindow::new(
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap(),
        NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(23, 59, 59)
            .unwrap(),
    )
}

fn feed_item(rkey: &str, created_at: &str, author_did: &str) -> Value {
    json!({
        "post": {
            "uri": format!("at://{author_did}/app.bsky.feed.post/{rkey}"),
            "cid": format!("bafy{rkey}"),
            "author": {"did": author_did, "handle": "alice.bsky.social"},
            "record": {"$type": "app.bsky.feed.post", "text": format!("post {rkey}"), "createdAt": created_at},
            "replyCount": 0,
            "repostCount": 1,
            "likeCount": 2
        }
    })
}

async fn mount_session(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/xrpc/com.atproto.server.createSession"))
        .and(body_partial_json(json!({"identifier": "alice.bsky.social"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accessJwt": "jwt-token",
            "refreshJwt": "refresh-token",
            "did": DID,
            "handle": "alice.bsky.social"
        })))
        .mount(server)
        .await;
}

async fn authenticated(server: &MockServer) -> BlueskyPlatform {
    mount_session(server).await;
    let mut platform = BlueskyPlatform::new(config(server)).unwrap();
    let outcome = platform.authenticate().await.unwrap();
    assert!(outcome.is_authenticated());
    platform
}

#[tokio::test]
async fn test_authenticate_success() {
    let server = MockServer::start().await;
    let platform = authenticated(&server).await;

    assert!(platform.is_authenticated());
}

#[tokio::test]
async fn test_authenticate_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/xrpc/com.atproto.server.createSession"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": "AuthenticationRequired",
            "message": "Invalid identifier or password"
        })))
        .mount(&server)
        .await;

    let mut platform = BlueskyPlatform::new(config(&server)).unwrap();
    let outcome = platform.authenticate().await.unwrap();

    assert_eq!(
        outcome,
        AuthOutcome::Rejected("Invalid identifier or password".to_string())
    );
    assert!(!platform.is_authenticated());
}

#[tokio::test]
async fn test_authenticate_without_credentials_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut platform = BlueskyPlatform::new(BlueskyConfig {
        service_url: server.uri(),
        ..BlueskyConfig::default()
    })
    .unwrap();

    assert_eq!(platform.authenticate().await.unwrap(), AuthOutcome::NotConfigured);
    assert!(!platform.is_configured());
}

#[tokio::test]
async fn test_fetch_follows_cursor_and_stops_at_older_posts() {
    let server = MockServer::start().await;
    let platform = authenticated(&server).await;

    Mock::given(method("GET"))
        .and(path(FEED_PATH))
        .and(query_param("actor", DID))
        .and(query_param("limit", "50"))
        .and(header("authorization", "Bearer jwt-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "feed": [
                feed_item("3knewer", "2024-01-20T10:00:00.000Z", DID),
                {
                    "post": feed_item("3krepost", "2024-01-14T10:00:00.000Z", "did:plc:bob")["post"],
                    "reason": {"$type": "app.bsky.feed.defs#reasonRepost"}
                },
                feed_item("3kfirst", "2024-01-12T08:30:00.000Z", DID)
            ],
            "cursor": "page2"
        })))
        .expect(1)
        .with_priority(5)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(FEED_PATH))
        .and(query_param("cursor", "page2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "feed": [
                feed_item("3ksecond", "2024-01-05T12:00:00+02:00", DID),
                feed_item("3kold", "2023-12-20T12:00:00.000Z", DID),
                feed_item("3kolder", "2023-12-19T12:00:00.000Z", DID)
            ],
            "cursor": "page3"
        })))
        .expect(1)
        .with_priority(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(FEED_PATH))
        .and(query_param("cursor", "page3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"feed": []})))
        .expect(0)
        .with_priority(1)
        .mount(&server)
        .await;

    let posts = platform.fetch_posts(&january(), None).await.unwrap();

    let ids: Vec<&str> = posts.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(
        ids,
        [
            "at://did:plc:alice/app.bsky.feed.post/3kfirst",
            "at://did:plc:alice/app.bsky.feed.post/3ksecond"
        ]
    );
    assert_eq!(
        posts[0].url.as_deref(),
        Some("https://bsky.app/profile/alice.bsky.social/post/3kfirst")
    );
    assert_eq!(
        posts[1].created_at,
        NaiveDate::from_ymd_opt(2024, 1, 5)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    );
    let metadata = posts[0].metadata.as_ref().unwrap();
    assert_eq!(metadata["cid"], json!("bafy3kfirst"));
    assert_eq!(metadata["like_count"], json!(2));
    assert!(posts.iter().all(|p| p.platform == "bluesky"));
}

#[tokio::test]
async fn test_fetch_limit_shrinks_page_and_stops() {
    let server = MockServer::start().await;
    let platform = authenticated(&server).await;

    Mock::given(method("GET"))
        .and(path(FEED_PATH))
        .and(query_param("limit", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "feed": [
                feed_item("3ka", "2024-01-12T08:00:00.000Z", DID),
                feed_item("3kb", "2024-01-11T08:00:00.000Z", DID)
            ],
            "cursor": "page2"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let posts = platform.fetch_posts(&january(), Some(2)).await.unwrap();

    assert_eq!(posts.len(), 2);
}

#[tokio::test]
async fn test_fetch_server_error_yields_empty() {
    let server = MockServer::start().await;
    let platform = authenticated(&server).await;

    Mock::given(method("GET"))
        .and(path(FEED_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream failure"))
        .mount(&server)
        .await;

    let posts = platform.fetch_posts(&january(), None).await.unwrap();

    assert!(posts.is_empty());
}

#[tokio::test]
async fn test_delete_sends_record_key() {
    let server = MockServer::start().await;
    let platform = authenticated(&server).await;

    Mock::given(method("POST"))
        .and(path("/xrpc/com.atproto.repo.deleteRecord"))
        .and(header("authorization", "Bearer jwt-token"))
        .and(body_partial_json(json!({
            "repo": DID,
            "collection": "app.bsky.feed.post",
            "rkey": "3kabc"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let result = platform
        .delete_post("at://did:plc:alice/app.bsky.feed.post/3kabc")
        .await;

    assert!(result.success, "{:?}", result.error);
    assert_eq!(result.post_id, "at://did:plc:alice/app.bsky.feed.post/3kabc");
}

#[tokio::test]
async fn test_delete_failure_is_captured() {
    let server = MockServer::start().await;
    let platform = authenticated(&server).await;

    Mock::given(method("POST"))
        .and(path("/xrpc/com.atproto.repo.deleteRecord"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "InvalidRequest",
            "message": "Could not locate record"
        })))
        .mount(&server)
        .await;

    let result = platform
        .delete_post("at://did:plc:alice/app.bsky.feed.post/3kgone")
        .await;
    assert!(!result.success);
    assert!(result.error.unwrap().contains("Could not locate record"));

    let malformed = platform.delete_post("not-a-uri").await;
    assert!(!malformed.success);
    assert!(malformed.error.unwrap().contains("invalid post id"));
}
