//! Runtime configuration.
//!
//! The date bounds are configuration rather than wall-clock values: "today"
//! is pinned so that validation is reproducible, and the minimum date sits
//! one hundred years before it.

use std::time::Duration;

use time::{Date, macros::date};
use url::Url;

use crate::date_range::DateBounds;
use crate::error::{Error, Result};
use crate::utils::date_format::parse_iso_date;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/";
pub const DEFAULT_TODAY: Date = date!(2025 - 04 - 13);
pub const DEFAULT_NOTIFICATION_TTL: Duration = Duration::from_secs(5);

pub const ENV_BASE_URL: &str = "ROSTER_API_URL";
pub const ENV_TODAY: &str = "ROSTER_TODAY";
pub const ENV_NOTIFICATION_SECS: &str = "ROSTER_NOTIFICATION_SECS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Where the roster API is served. Endpoints live under `api/employees`.
    pub base_url: Url,
    pub bounds: DateBounds,
    /// How long a notification stays visible.
    pub notification_ttl: Duration,
}

impl Config {
    /// Configuration for the API at `base_url` with the default date window
    /// and notification lifetime.
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            bounds: DateBounds::ending(DEFAULT_TODAY),
            notification_ttl: DEFAULT_NOTIFICATION_TTL,
        }
    }

    /// Reads `ROSTER_API_URL`, `ROSTER_TODAY` and `ROSTER_NOTIFICATION_SECS`,
    /// keeping the default for any variable that isn't set.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds a configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let base_url = lookup(ENV_BASE_URL).unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let mut config = Self::new(Url::parse(&base_url).map_err(|_| Error::Config {
            variable: ENV_BASE_URL.to_string(),
            value: base_url.clone(),
        })?);

        if let Some(value) = lookup(ENV_TODAY) {
            let today = parse_iso_date(&value).map_err(|_| Error::Config {
                variable: ENV_TODAY.to_string(),
                value: value.clone(),
            })?;
            config.bounds = DateBounds::ending(today);
        }

        if let Some(value) = lookup(ENV_NOTIFICATION_SECS) {
            let secs: u64 = value.parse().map_err(|_| Error::Config {
                variable: ENV_NOTIFICATION_SECS.to_string(),
                value: value.clone(),
            })?;
            config.notification_ttl = Duration::from_secs(secs);
        }

        debug!(?config, "loaded configuration");
        Ok(config)
    }
}
