//! Console output for interactive runs.
//!
//! `render_*` functions build plain text so they can be tested; `print_*`
//! functions add styling and write to stdout.

use std::fmt::Write as _;

use chrono::NaiveDateTime;
use console::style;

use crate::constants::PREVIEW_CHARS;
use crate::models::{DeletionResult, DeletionSummary, Post};
use crate::platforms::{title_case, DateWindow};

const ID_TAIL_CHARS: usize = 12;

pub fn print_banner() {
    let banner = r"
    ╔═══════════════════════════════════════════════╗
    ║              SOCIAL SCRUBBER                  ║
    ║        Bulk delete your social media posts    ║
    ╚═══════════════════════════════════════════════╝
    ";
    println!("{}", style(banner).bold().blue());
}

/// Last characters of an id, enough to tell posts apart in a table.
#[must_use]
pub fn short_id(id: &str) -> &str {
    let skip = id.chars().count().saturating_sub(ID_TAIL_CHARS);
    id.char_indices().nth(skip).map_or(id, |(i, _)| &id[i..])
}

#[must_use]
pub fn format_date_range(start: NaiveDateTime, end: NaiveDateTime) -> String {
    format!(
        "{} → {}",
        start.format("%Y-%m-%d %H:%M"),
        end.format("%Y-%m-%d %H:%M")
    )
}

#[must_use]
pub fn platform_status_line(display_name: &str, configured: bool, authenticated: bool) -> String {
    let (icon, text) = if authenticated {
        ("✅", "Ready")
    } else if configured {
        ("⚠️", "Configured but not authenticated")
    } else {
        ("❌", "Not configured")
    };
    format!("{icon} {display_name}: {text}")
}

pub fn print_platform_status(display_name: &str, configured: bool, authenticated: bool) {
    println!(
        "{}",
        platform_status_line(display_name, configured, authenticated)
    );
}

pub fn print_run_parameters(window: &DateWindow, limit: Option<usize>, dry_run: bool) {
    println!();
    println!(
        "📅 Date range: {}",
        format_date_range(window.start(), window.end())
    );
    println!(
        "🔢 Max posts per platform: {}",
        limit.map_or_else(|| "unlimited".to_string(), |l| l.to_string())
    );
    println!("🧪 Dry run mode: {}", if dry_run { "ON" } else { "OFF" });
}

#[must_use]
pub fn render_posts_table(posts: &[Post], title: &str) -> String {
    let mut out = String::new();
    if posts.is_empty() {
        let _ = writeln!(out, "No posts found for {}", title.to_lowercase());
        return out;
    }

    let _ = writeln!(out, "{title} ({} posts)", posts.len());
    let _ = writeln!(
        out,
        "{:<10} {:<16} {:<53} {}",
        "Platform", "Date", "Content Preview", "Post ID"
    );
    for post in posts {
        let _ = writeln!(
            out,
            "{:<10} {:<16} {:<53} {}",
            title_case(&post.platform),
            post.created_at.format("%Y-%m-%d %H:%M").to_string(),
            post.preview(PREVIEW_CHARS),
            short_id(&post.id)
        );
    }
    out
}

pub fn print_posts_table(posts: &[Post], title: &str) {
    if posts.is_empty() {
        println!("{}", style(render_posts_table(posts, title).trim_end()).yellow());
        return;
    }
    print!("{}", render_posts_table(posts, title));
}

#[must_use]
pub fn render_deletion_summary(results: &[DeletionResult], platform: &str) -> String {
    let summary = DeletionSummary::from_results(results);
    let mut out = String::new();
    let _ = writeln!(out, "{} Deletion Summary", title_case(platform));
    let _ = writeln!(out, "✅ Successfully deleted: {}", summary.deleted);
    let _ = writeln!(out, "❌ Failed to delete: {}", summary.failed);
    let _ = writeln!(out, "📁 Archived: {}", summary.archived);

    if summary.failed > 0 {
        let _ = writeln!(out, "Failed Deletions:");
        for result in results.iter().filter(|r| !r.success) {
            let _ = writeln!(
                out,
                "  • Post {}: {}",
                short_id(&result.post_id),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }
    out
}

pub fn print_deletion_results(results: &[DeletionResult], platform: &str) {
    if results.is_empty() {
        return;
    }
    println!();
    print!("{}", style(render_deletion_summary(results, platform)).blue());
}
