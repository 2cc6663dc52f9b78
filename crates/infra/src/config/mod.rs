//! Client configuration
//!
//! Environment-driven configuration for the calendar client. Invalid values
//! fall back to their defaults with a warning; only an unparseable URL is a
//! hard error (there is no safe fallback for "where is the server").

use std::time::Duration;

use chrono_tz::Tz;
use gts_core::EventCacheConfig;
use gts_domain::constants::DEFAULT_DEBOUNCE_MS;
use gts_domain::{GtsError, Result};
use tracing::{info, warn};
use url::Url;

const DEFAULT_EVENTS_URL: &str = "http://localhost:8000/calendar/events/";
const DEFAULT_JOBS_URL: &str = "http://localhost:8000/jobs/";

/// Everything the calendar client needs to talk to its backend.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub events_url: Url,
    pub jobs_url: Url,
    /// Trailing window for the debounced refresh lane.
    pub debounce: Duration,
    pub cache: EventCacheConfig,
    /// Timezone for day keys and panel time labels.
    pub timezone: Tz,
}

impl ClientConfig {
    /// Build from the environment:
    /// `GTS_EVENTS_URL`, `GTS_JOBS_URL`, `GTS_DEBOUNCE_MS`, `GTS_TIMEZONE`,
    /// plus the cache variables read by [`EventCacheConfig::default`].
    pub fn from_env() -> Result<Self> {
        let events_url = url_from_env("GTS_EVENTS_URL", DEFAULT_EVENTS_URL)?;
        let jobs_url = url_from_env("GTS_JOBS_URL", DEFAULT_JOBS_URL)?;

        let debounce = Duration::from_millis(
            env_parsed("GTS_DEBOUNCE_MS").unwrap_or(DEFAULT_DEBOUNCE_MS),
        );

        let timezone = match std::env::var("GTS_TIMEZONE") {
            Ok(raw) => raw.parse::<Tz>().unwrap_or_else(|_| {
                warn!(value = %raw, "GTS_TIMEZONE not a valid IANA timezone; using UTC");
                chrono_tz::UTC
            }),
            Err(_) => chrono_tz::UTC,
        };

        Ok(Self { events_url, jobs_url, debounce, cache: EventCacheConfig::default(), timezone })
    }

    /// Log the effective configuration at startup.
    pub fn log_summary(&self) {
        info!(
            events_url = %self.events_url,
            jobs_url = %self.jobs_url,
            debounce_ms = self.debounce.as_millis() as u64,
            timezone = %self.timezone,
            "calendar client configuration loaded"
        );
    }
}

fn url_from_env(var: &str, default: &str) -> Result<Url> {
    match std::env::var(var) {
        Ok(raw) => match Url::parse(&raw) {
            Ok(url) => Ok(url),
            Err(err) => {
                warn!(var, value = %raw, error = %err, "invalid URL in environment; using default");
                parse_default(var, default)
            }
        },
        Err(_) => parse_default(var, default),
    }
}

fn parse_default(var: &str, default: &str) -> Result<Url> {
    Url::parse(default).map_err(|err| GtsError::Config(format!("{var} default invalid: {err}")))
}

fn env_parsed<T: std::str::FromStr>(var: &str) -> Option<T> {
    let raw = std::env::var(var).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(var, value = %raw, "unparseable value in environment; using default");
            None
        }
    }
}
