use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::Parser;
use dialoguer::{theme::ColorfulTheme, Confirm};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use social_scrubber::config::{log_level_from_env, Config};
use social_scrubber::platforms::{build_platforms, PLATFORM_NAMES};
use social_scrubber::report::print_banner;
use social_scrubber::session::{AssumeYes, DeleteOptions, Prompter, RunPlan, ScrubSession};

/// Social Scrubber - Bulk delete your social media posts.
#[derive(Debug, Parser)]
#[command(name = "social-scrubber", version, about)]
struct Args {
    /// Enable dry run mode (overrides DRY_RUN)
    #[arg(long, conflicts_with = "no_dry_run")]
    dry_run: bool,

    /// Disable dry run mode and actually delete posts
    #[arg(long)]
    no_dry_run: bool,

    /// Maximum posts to process per platform, 0 for no limit (overrides MAX_POSTS_PER_SCRUB)
    #[arg(long)]
    max_posts: Option<usize>,

    /// Comma-separated list of platforms to process (bluesky,mastodon,twitter)
    #[arg(long, value_delimiter = ',')]
    platforms: Option<Vec<String>>,

    /// Start date in ISO format (YYYY-MM-DD) or "7_days_ago"
    #[arg(long)]
    start_date: Option<String>,

    /// End date in ISO format (YYYY-MM-DD) or "today"
    #[arg(long)]
    end_date: Option<String>,

    /// Directory for post archives (overrides ARCHIVE_PATH)
    #[arg(long)]
    archive_dir: Option<PathBuf>,

    /// Do not archive posts before deleting them
    #[arg(long)]
    no_archive: bool,

    /// Answer yes to every confirmation prompt
    #[arg(long, short = 'y')]
    yes: bool,
}

impl Args {
    fn dry_run_override(&self) -> Option<bool> {
        if self.no_dry_run {
            Some(false)
        } else if self.dry_run {
            Some(true)
        } else {
            None
        }
    }

    fn apply(&self, config: &mut Config) {
        if let Some(dry_run) = self.dry_run_override() {
            config.scrub.dry_run = dry_run;
        }
        if let Some(max_posts) = self.max_posts {
            config.scrub.max_posts_per_scrub = max_posts;
        }
        if let Some(start) = &self.start_date {
            config.scrub.start_date.clone_from(start);
        }
        if let Some(end) = &self.end_date {
            config.scrub.end_date.clone_from(end);
        }
        if let Some(dir) = &self.archive_dir {
            config.scrub.archive_path.clone_from(dir);
        }
        if self.no_archive {
            config.scrub.archive_before_delete = false;
        }
    }

    fn selected_platforms(&self) -> Result<Option<Vec<String>>> {
        let Some(names) = &self.platforms else {
            return Ok(None);
        };
        let names: Vec<String> = names
            .iter()
            .map(|n| n.trim().to_lowercase())
            .filter(|n| !n.is_empty())
            .collect();
        for name in &names {
            if !PLATFORM_NAMES.contains(&name.as_str()) {
                bail!(
                    "Unknown platform '{name}' (expected one of: {})",
                    PLATFORM_NAMES.join(", ")
                );
            }
        }
        Ok(Some(names))
    }
}

struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn confirm(&self, message: &str, default: bool) -> bool {
        Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(message)
            .default(default)
            .interact()
            .unwrap_or_else(|e| {
                warn!("Prompt failed, treating as no: {e}");
                false
            })
    }
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    // Initialize logging before anything that can fail
    init_tracing(&log_level_from_env())?;

    let args = Args::parse();

    let mut config = Config::from_env().context("Failed to load configuration")?;

    args.apply(&mut config);
    let selected = args.selected_platforms()?;

    let now = Utc::now().naive_utc();
    config.validate(now).context("Invalid configuration")?;
    let window = config.scrub.window(now).context("Invalid date range")?;

    info!(
        start = %window.start(),
        end = %window.end(),
        dry_run = config.scrub.dry_run,
        "Configuration loaded"
    );

    let platforms = build_platforms(&config).context("Failed to initialize platforms")?;
    let mut session = ScrubSession::new(platforms);

    let plan = RunPlan {
        selected,
        window,
        limit: config.scrub.limit(),
        options: DeleteOptions::from(&config.scrub),
    };

    print_banner();
    let outcome = if args.yes {
        session.run(&plan, &AssumeYes).await
    } else {
        session.run(&plan, &TerminalPrompter).await
    };
    info!(?outcome, "Run finished");

    Ok(())
}

fn init_tracing(log_level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("warn,social_scrubber={}", log_level.to_lowercase()))
    });

    // Check if JSON logging is requested
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| matches!(v.to_lowercase().as_str(), "json" | "structured"))
        .unwrap_or(false);

    if use_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;
    }

    Ok(())
}
