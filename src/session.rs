//! One scrub run across every platform: authenticate, fetch, confirm, delete.
//!
//! The session owns the dry-run gate. The bulk delete pass has no notion of
//! dry runs, so nothing reaches it while `dry_run` is set.

use std::path::PathBuf;

use futures_util::future::join_all;
use tracing::{debug, error, info, warn};

use crate::archive::ensure_archive_dir;
use crate::config::ScrubConfig;
use crate::models::{DeletionResult, Post};
use crate::platforms::{title_case, DateWindow, Platform};
use crate::report;
use crate::scrubber::bulk_delete;

/// How a deletion pass should behave.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteOptions {
    pub dry_run: bool,
    pub archive_before_delete: bool,
    pub archive_path: PathBuf,
}

impl From<&ScrubConfig> for DeleteOptions {
    fn from(config: &ScrubConfig) -> Self {
        Self {
            dry_run: config.dry_run,
            archive_before_delete: config.archive_before_delete,
            archive_path: config.archive_path.clone(),
        }
    }
}

/// Yes/no questions asked of the operator during a run.
pub trait Prompter {
    fn confirm(&self, message: &str, default: bool) -> bool;
}

/// Answers every question with yes.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeYes;

impl Prompter for AssumeYes {
    fn confirm(&self, _message: &str, _default: bool) -> bool {
        true
    }
}

/// Everything a run needs beyond the platforms themselves.
#[derive(Debug, Clone)]
pub struct RunPlan {
    /// Restrict the run to these platform names. `None` means all of them.
    pub selected: Option<Vec<String>>,
    pub window: DateWindow,
    pub limit: Option<usize>,
    pub options: DeleteOptions,
}

/// How a run ended.
#[derive(Debug)]
pub enum RunOutcome {
    NothingConfigured,
    NothingAuthenticated,
    Cancelled,
    NoPosts,
    Completed {
        /// Posts fetched per platform, in platform order.
        posts: Vec<(&'static str, Vec<Post>)>,
        /// Deletion results per platform. Empty on a dry run.
        results: Vec<(&'static str, Vec<DeletionResult>)>,
    },
}

pub struct ScrubSession {
    platforms: Vec<Box<dyn Platform>>,
}

impl ScrubSession {
    #[must_use]
    pub fn new(platforms: Vec<Box<dyn Platform>>) -> Self {
        Self { platforms }
    }

    #[must_use]
    pub fn platforms(&self) -> &[Box<dyn Platform>] {
        &self.platforms
    }

    fn find(&self, name: &str) -> Option<&dyn Platform> {
        self.platforms
            .iter()
            .find(|p| p.name() == name)
            .map(|p| &**p)
    }

    /// Names of configured platforms, limited to `selected` when given.
    #[must_use]
    pub fn configured_platforms(&self, selected: Option<&[String]>) -> Vec<&'static str> {
        self.platforms
            .iter()
            .filter(|p| p.is_configured())
            .filter(|p| selected.map_or(true, |names| names.iter().any(|n| n == p.name())))
            .map(|p| p.name())
            .collect()
    }

    /// Authenticate the named platforms concurrently.
    ///
    /// Returns one `(name, authenticated)` pair per named platform, in
    /// session order. A transport fault during login is logged and counts as
    /// a failed authentication.
    pub async fn authenticate_platforms(&mut self, names: &[&str]) -> Vec<(&'static str, bool)> {
        let attempts = self
            .platforms
            .iter_mut()
            .filter(|p| names.contains(&p.name()))
            .map(|platform| async move {
                let name = platform.name();
                info!(platform = name, "Authenticating");
                let ok = match platform.authenticate().await {
                    Ok(outcome) => outcome.is_authenticated(),
                    Err(e) => {
                        error!(platform = name, "Authentication failed: {e}");
                        false
                    }
                };
                (name, ok)
            });

        join_all(attempts).await
    }

    /// Fetch posts in `window` from every named platform, concurrently.
    ///
    /// Platforms that are not authenticated are skipped with a warning and
    /// do not appear in the output.
    pub async fn fetch_posts(
        &self,
        names: &[&str],
        window: &DateWindow,
        limit: Option<usize>,
    ) -> Vec<(&'static str, Vec<Post>)> {
        let fetches = self
            .platforms
            .iter()
            .filter(|p| names.contains(&p.name()))
            .filter(|p| {
                if p.is_authenticated() {
                    true
                } else {
                    warn!(platform = p.name(), "Skipping platform: not authenticated");
                    false
                }
            })
            .map(|platform| async move {
                let name = platform.name();
                let posts = match platform.fetch_posts(window, limit).await {
                    Ok(posts) => posts,
                    Err(e) => {
                        error!(platform = name, "Error fetching posts: {e}");
                        Vec::new()
                    }
                };
                info!(platform = name, count = posts.len(), "Fetched posts");
                (name, posts)
            });

        join_all(fetches).await
    }

    /// Delete `posts` through the named platform.
    ///
    /// On a dry run nothing is deleted and no results are returned. With
    /// archiving enabled the archive directory must be creatable first;
    /// otherwise the pass is aborted and returns no results.
    pub async fn delete_posts(
        &self,
        name: &str,
        posts: &[Post],
        options: &DeleteOptions,
    ) -> Vec<DeletionResult> {
        let Some(platform) = self.find(name) else {
            warn!(platform = name, "Unknown platform");
            return Vec::new();
        };
        if posts.is_empty() {
            return Vec::new();
        }

        if options.dry_run {
            info!(
                platform = name,
                count = posts.len(),
                "[DRY RUN] Would delete posts"
            );
            return Vec::new();
        }

        let archive_dir = if options.archive_before_delete {
            if let Err(e) = ensure_archive_dir(&options.archive_path).await {
                error!(platform = name, "Aborting deletion: {e:#}");
                return Vec::new();
            }
            Some(options.archive_path.as_path())
        } else {
            None
        };

        info!(platform = name, count = posts.len(), "Deleting posts");
        bulk_delete(platform, posts, archive_dir).await
    }

    /// Run the full interactive flow and print progress to the console.
    pub async fn run(&mut self, plan: &RunPlan, prompter: &dyn Prompter) -> RunOutcome {
        println!("🔧 Checking platform configurations...");
        for platform in &self.platforms {
            debug!(
                platform = platform.name(),
                config = ?platform.config_summary(),
                "Platform configuration"
            );
            report::print_platform_status(
                &platform.display_name(),
                platform.is_configured(),
                platform.is_authenticated(),
            );
        }

        let configured = self.configured_platforms(plan.selected.as_deref());
        if configured.is_empty() {
            println!("\n❌ No platforms are configured. Please check your .env file.");
            return RunOutcome::NothingConfigured;
        }

        println!(
            "\n🔐 Authenticating with {} platform(s)...",
            configured.len()
        );
        let authenticated: Vec<&'static str> = self
            .authenticate_platforms(&configured)
            .await
            .into_iter()
            .filter_map(|(name, ok)| ok.then_some(name))
            .collect();
        if authenticated.is_empty() {
            println!("\n❌ Failed to authenticate with any platforms.");
            return RunOutcome::NothingAuthenticated;
        }

        report::print_run_parameters(&plan.window, plan.limit, plan.options.dry_run);
        if !prompter.confirm("Proceed with fetching posts?", true) {
            println!("Operation cancelled.");
            return RunOutcome::Cancelled;
        }

        let posts = self
            .fetch_posts(&authenticated, &plan.window, plan.limit)
            .await;
        let total: usize = posts.iter().map(|(_, p)| p.len()).sum();
        if total == 0 {
            println!("\n✅ No posts found in the specified date range.");
            return RunOutcome::NoPosts;
        }

        println!("\n📊 Found {total} posts total:");
        for (name, platform_posts) in &posts {
            if !platform_posts.is_empty() {
                let title = format!("{} Posts", title_case(name));
                report::print_posts_table(platform_posts, &title);
            }
        }

        if plan.options.dry_run {
            println!("\n🧪 This is a DRY RUN. No posts will actually be deleted.");
        } else if !prompter.confirm(&format!("Delete {total} posts?"), false) {
            println!("Deletion cancelled.");
            return RunOutcome::Cancelled;
        }

        let mut results = Vec::new();
        for (name, platform_posts) in &posts {
            let deleted = self.delete_posts(name, platform_posts, &plan.options).await;
            if !deleted.is_empty() {
                report::print_deletion_results(&deleted, name);
                results.push((*name, deleted));
            }
        }

        println!("\n✅ Social Scrubber completed!");
        RunOutcome::Completed { posts, results }
    }
}
