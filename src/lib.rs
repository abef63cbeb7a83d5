//! Social Scrubber library.
//!
//! Bulk deletes a user's own posts from Bluesky and Mastodon inside a date
//! window, writing a local JSON archive of each post before it is deleted.

pub mod archive;
pub mod config;
pub mod constants;
pub mod models;
pub mod platforms;
pub mod report;
pub mod scrubber;
pub mod session;
pub mod timestamp;
