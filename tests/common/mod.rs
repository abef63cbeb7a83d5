//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use social_scrubber::archive::sanitize_id;
use social_scrubber::models::{DeletionResult, Post};
use social_scrubber::platforms::{AuthOutcome, DateWindow, Platform, PlatformError};

/// Calls made against mock platforms, in order, shared across clones.
pub type CallLog = Arc<Mutex<Vec<String>>>;

pub fn ts(y: i32, m: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

pub fn post(platform: &str, id: &str, created_at: NaiveDateTime) -> Post {
    Post {
        id: id.to_string(),
        content: format!("post {id}"),
        created_at,
        platform: platform.to_string(),
        url: Some(format!("https://example.com/{id}")),
        metadata: None,
    }
}

/// In-memory platform that records every call it receives.
pub struct MockPlatform {
    pub name: &'static str,
    pub configured: bool,
    pub auth: Result<AuthOutcome, String>,
    pub authenticated: bool,
    pub posts: Vec<Post>,
    pub failing_ids: Vec<String>,
    /// When set, each delete records whether an archive for the post
    /// already existed in this directory.
    pub watch_archive_dir: Option<PathBuf>,
    pub log: CallLog,
}

impl MockPlatform {
    pub fn new(name: &'static str, log: &CallLog) -> Self {
        Self {
            name,
            configured: true,
            auth: Ok(AuthOutcome::Authenticated {
                account: format!("{name}-user"),
            }),
            authenticated: false,
            posts: Vec::new(),
            failing_ids: Vec::new(),
            watch_archive_dir: None,
            log: Arc::clone(log),
        }
    }

    pub fn with_posts(mut self, posts: Vec<Post>) -> Self {
        self.posts = posts;
        self
    }

    pub fn failing(mut self, id: &str) -> Self {
        self.failing_ids.push(id.to_string());
        self
    }

    pub fn unconfigured(mut self) -> Self {
        self.configured = false;
        self
    }

    pub fn rejecting(mut self) -> Self {
        self.auth = Ok(AuthOutcome::Rejected("bad credentials".to_string()));
        self
    }

    pub fn erroring_on_auth(mut self) -> Self {
        self.auth = Err("connection reset".to_string());
        self
    }

    pub fn watching(mut self, dir: PathBuf) -> Self {
        self.watch_archive_dir = Some(dir);
        self
    }

    fn record(&self, entry: String) {
        self.log.lock().unwrap().push(entry);
    }

    fn archive_exists(&self, post_id: &str) -> bool {
        let Some(dir) = &self.watch_archive_dir else {
            return false;
        };
        let suffix = format!("_{}.json", sanitize_id(post_id));
        std::fs::read_dir(dir)
            .map(|entries| {
                entries
                    .filter_map(Result::ok)
                    .any(|e| e.file_name().to_string_lossy().ends_with(&suffix))
            })
            .unwrap_or(false)
    }
}

#[async_trait]
impl Platform for MockPlatform {
    fn name(&self) -> &'static str {
        self.name
    }

    fn is_configured(&self) -> bool {
        self.configured
    }

    fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    fn config_summary(&self) -> Vec<(&'static str, String)> {
        vec![("mock", self.name.to_string())]
    }

    async fn authenticate(&mut self) -> Result<AuthOutcome, PlatformError> {
        self.record(format!("{}:authenticate", self.name));
        match &self.auth {
            Ok(outcome) => {
                self.authenticated = outcome.is_authenticated();
                Ok(outcome.clone())
            }
            Err(message) => Err(PlatformError::Api {
                status: 0,
                message: message.clone(),
            }),
        }
    }

    async fn fetch_posts(
        &self,
        window: &DateWindow,
        limit: Option<usize>,
    ) -> Result<Vec<Post>, PlatformError> {
        self.record(format!("{}:fetch", self.name));
        if !self.authenticated {
            return Err(PlatformError::NotAuthenticated(self.name.to_string()));
        }
        Ok(self
            .posts
            .iter()
            .filter(|p| window.contains(p.created_at))
            .take(limit.unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }

    async fn delete_post(&self, post_id: &str) -> DeletionResult {
        let entry = if self.archive_exists(post_id) {
            format!("{}:delete:{post_id}:archived", self.name)
        } else {
            format!("{}:delete:{post_id}", self.name)
        };
        self.record(entry);

        if self.failing_ids.iter().any(|id| id == post_id) {
            DeletionResult::failed(post_id, "remote refused delete")
        } else {
            DeletionResult::succeeded(post_id)
        }
    }
}

/// Log entries that start with `prefix`.
pub fn calls_matching(log: &CallLog, prefix: &str) -> Vec<String> {
    log.lock()
        .unwrap()
        .iter()
        .filter(|c| c.starts_with(prefix))
        .cloned()
        .collect()
}
