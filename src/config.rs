use std::path::PathBuf;

use chrono::{Duration, NaiveDateTime, NaiveTime};
use thiserror::Error;

use crate::constants::BLUESKY_DEFAULT_SERVICE;
use crate::platforms::{redact, shown, DateWindow};
use crate::timestamp;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {message}")]
    InvalidValue { name: String, message: String },
    #[error("failed to parse {name} as integer: {source}")]
    ParseInt {
        name: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("failed to parse {name} as boolean: {value}")]
    ParseBool { name: String, value: String },
    #[error("invalid {name} date: {value:?} (expected YYYY-MM-DD, an ISO date-time, 'today' or 'N_days_ago')")]
    InvalidDate { name: String, value: String },
}

/// Bluesky credentials.
#[derive(Debug, Clone, Default)]
pub struct BlueskyConfig {
    pub handle: String,
    /// App password, not the account password.
    pub password: String,
    pub service_url: String,
}

impl BlueskyConfig {
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.handle.is_empty() && !self.password.is_empty()
    }

    #[must_use]
    pub fn summary(&self) -> Vec<(&'static str, String)> {
        vec![
            ("handle", shown(&self.handle)),
            ("password", redact(&self.password)),
            ("service", shown(&self.service_url)),
        ]
    }
}

/// Mastodon credentials.
#[derive(Debug, Clone, Default)]
pub struct MastodonConfig {
    /// Instance URL, e.g. `https://mastodon.social`.
    pub api_base_url: String,
    pub access_token: String,
}

impl MastodonConfig {
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.api_base_url.is_empty() && !self.access_token.is_empty()
    }

    #[must_use]
    pub fn summary(&self) -> Vec<(&'static str, String)> {
        vec![
            ("api_base_url", shown(&self.api_base_url)),
            ("access_token", redact(&self.access_token)),
        ]
    }
}

/// Twitter/X credentials. Read so they can be reported; the integration
/// itself is not available yet.
#[derive(Debug, Clone, Default)]
pub struct TwitterConfig {
    pub api_key: String,
    pub api_secret: String,
    pub access_token: String,
    pub access_token_secret: String,
    pub bearer_token: String,
}

impl TwitterConfig {
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
            && !self.api_secret.is_empty()
            && !self.access_token.is_empty()
            && !self.access_token_secret.is_empty()
    }

    #[must_use]
    pub fn summary(&self) -> Vec<(&'static str, String)> {
        vec![
            ("api_key", redact(&self.api_key)),
            ("api_secret", redact(&self.api_secret)),
            ("access_token", redact(&self.access_token)),
            ("access_token_secret", redact(&self.access_token_secret)),
            ("bearer_token", redact(&self.bearer_token)),
        ]
    }
}

/// Which end of the date range a date expression is being resolved for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateBound {
    Start,
    End,
}

/// What to scrub and how.
#[derive(Debug, Clone)]
pub struct ScrubConfig {
    /// Raw start date: ISO date/date-time, `today`, or `N_days_ago`.
    pub start_date: String,
    /// Raw end date: ISO date/date-time, `today`, or `N_days_ago`.
    pub end_date: String,
    /// Per-platform cap; 0 means no cap.
    pub max_posts_per_scrub: usize,
    pub dry_run: bool,
    pub archive_before_delete: bool,
    pub archive_path: PathBuf,
}

impl Default for ScrubConfig {
    fn default() -> Self {
        Self {
            start_date: "7_days_ago".to_string(),
            end_date: "today".to_string(),
            max_posts_per_scrub: 10,
            dry_run: true,
            archive_before_delete: true,
            archive_path: PathBuf::from("./archives"),
        }
    }
}

impl ScrubConfig {
    /// Per-platform post limit, `None` when unlimited.
    #[must_use]
    pub fn limit(&self) -> Option<usize> {
        (self.max_posts_per_scrub > 0).then_some(self.max_posts_per_scrub)
    }

    /// Resolve the start bound relative to `now` (naive UTC).
    ///
    /// # Errors
    ///
    /// Returns an error if the date expression is malformed.
    pub fn start_datetime(&self, now: NaiveDateTime) -> Result<NaiveDateTime, ConfigError> {
        resolve_date_spec(&self.start_date, DateBound::Start, now).ok_or_else(|| {
            ConfigError::InvalidDate {
                name: "start".to_string(),
                value: self.start_date.clone(),
            }
        })
    }

    /// Resolve the end bound relative to `now` (naive UTC).
    ///
    /// # Errors
    ///
    /// Returns an error if the date expression is malformed.
    pub fn end_datetime(&self, now: NaiveDateTime) -> Result<NaiveDateTime, ConfigError> {
        resolve_date_spec(&self.end_date, DateBound::End, now).ok_or_else(|| {
            ConfigError::InvalidDate {
                name: "end".to_string(),
                value: self.end_date.clone(),
            }
        })
    }

    /// Resolve both bounds into a window.
    ///
    /// # Errors
    ///
    /// Returns an error if either date expression is malformed or start is after end.
    pub fn window(&self, now: NaiveDateTime) -> Result<DateWindow, ConfigError> {
        let start = self.start_datetime(now)?;
        let end = self.end_datetime(now)?;
        if start > end {
            return Err(ConfigError::InvalidValue {
                name: "SCRUB_START_DATE".to_string(),
                message: format!("start {start} is after end {end}"),
            });
        }
        Ok(DateWindow::new(start, end))
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub bluesky: BlueskyConfig,
    pub mastodon: MastodonConfig,
    pub twitter: TwitterConfig,
    pub scrub: ScrubConfig,
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Credentials are optional; a platform without them is simply reported
    /// as not configured.
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric or boolean variable cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            bluesky: BlueskyConfig {
                handle: env_or_default("BLUESKY_HANDLE", ""),
                password: env_or_default("BLUESKY_PASSWORD", ""),
                service_url: env_or_default("BLUESKY_SERVICE_URL", BLUESKY_DEFAULT_SERVICE),
            },
            mastodon: MastodonConfig {
                api_base_url: env_or_default("MASTODON_API_BASE_URL", ""),
                access_token: env_or_default("MASTODON_ACCESS_TOKEN", ""),
            },
            twitter: TwitterConfig {
                api_key: env_or_default("TWITTER_API_KEY", ""),
                api_secret: env_or_default("TWITTER_API_SECRET", ""),
                access_token: env_or_default("TWITTER_ACCESS_TOKEN", ""),
                access_token_secret: env_or_default("TWITTER_ACCESS_TOKEN_SECRET", ""),
                bearer_token: env_or_default("TWITTER_BEARER_TOKEN", ""),
            },
            scrub: ScrubConfig {
                start_date: env_or_default("SCRUB_START_DATE", "7_days_ago"),
                end_date: env_or_default("SCRUB_END_DATE", "today"),
                max_posts_per_scrub: parse_env_usize("MAX_POSTS_PER_SCRUB", 10)?,
                dry_run: parse_env_bool("DRY_RUN", true)?,
                archive_before_delete: parse_env_bool("ARCHIVE_BEFORE_DELETE", true)?,
                archive_path: PathBuf::from(env_or_default("ARCHIVE_PATH", "./archives")),
            },
            log_level: log_level_from_env(),
        })
    }

    /// Validate that the configuration is usable at `now`.
    ///
    /// # Errors
    ///
    /// Returns an error if the date range is malformed or inverted, or a
    /// configured URL does not parse.
    pub fn validate(&self, now: NaiveDateTime) -> Result<(), ConfigError> {
        self.scrub.window(now)?;

        if !self.mastodon.api_base_url.is_empty() {
            url::Url::parse(&self.mastodon.api_base_url).map_err(|e| {
                ConfigError::InvalidValue {
                    name: "MASTODON_API_BASE_URL".to_string(),
                    message: e.to_string(),
                }
            })?;
        }
        if self.bluesky.service_url.is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "BLUESKY_SERVICE_URL".to_string(),
                message: "cannot be empty".to_string(),
            });
        }
        url::Url::parse(&self.bluesky.service_url).map_err(|e| ConfigError::InvalidValue {
            name: "BLUESKY_SERVICE_URL".to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Configuration with no credentials and default scrub settings.
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            bluesky: BlueskyConfig {
                service_url: BLUESKY_DEFAULT_SERVICE.to_string(),
                ..BlueskyConfig::default()
            },
            mastodon: MastodonConfig::default(),
            twitter: TwitterConfig::default(),
            scrub: ScrubConfig::default(),
            log_level: "INFO".to_string(),
        }
    }
}

/// Resolve a date expression against `now`.
///
/// Accepts `today`, `N_days_ago` / `N days ago`, an ISO date (midnight) or
/// an ISO date-time with or without offset.
#[must_use]
pub fn resolve_date_spec(spec: &str, bound: DateBound, now: NaiveDateTime) -> Option<NaiveDateTime> {
    let spec = spec.trim();
    let lowered = spec.to_ascii_lowercase();

    if lowered == "today" {
        return Some(match bound {
            DateBound::Start => now.date().and_time(NaiveTime::MIN),
            DateBound::End => now,
        });
    }

    if let Some(days) = parse_days_ago(&lowered) {
        return now.checked_sub_signed(Duration::try_days(days)?);
    }

    timestamp::normalize(spec).ok()
}

fn parse_days_ago(spec: &str) -> Option<i64> {
    let count = spec
        .strip_suffix("_days_ago")
        .or_else(|| spec.strip_suffix("_day_ago"))
        .or_else(|| spec.strip_suffix(" days ago"))
        .or_else(|| spec.strip_suffix(" day ago"))?;
    count.trim().parse::<u32>().ok().map(i64::from)
}

/// `LOG_LEVEL`, defaulting to `INFO`. Read on its own so logging can be set
/// up before the rest of the configuration is parsed.
#[must_use]
pub fn log_level_from_env() -> String {
    env_or_default("LOG_LEVEL", "INFO")
}

fn env_or_default(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_env_usize(name: &str, default: usize) -> Result<usize, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.trim().parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

fn parse_env_bool(name: &str, default: bool) -> Result<bool, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => match val.to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::ParseBool {
                name: name.to_string(),
                value: val,
            }),
        },
        _ => Ok(default),
    }
}
