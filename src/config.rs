use std::env;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::rate_limit::{DEFAULT_MAX_REQUESTS, DEFAULT_WINDOW};

pub const DEFAULT_BIND: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;

/// Longest accepted rate-limit window (one day).
pub const MAX_RATE_WINDOW_SECS: usize = 86_400;

/// Central configuration loaded from environment variables.
///
/// The .env file is loaded automatically at startup via dotenvy.
/// Every setting has a default, so an empty environment is valid.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind: String,
    pub port: u16,
    /// Requests admitted per client per window (SCAMCHECK_RATE_LIMIT)
    pub rate_limit: usize,
    /// Sliding window length (SCAMCHECK_RATE_WINDOW_SECS)
    pub rate_window: Duration,
    /// Use the first X-Forwarded-For entry as the client identifier.
    /// Only enable behind a proxy that sets the header itself.
    pub trust_forwarded_for: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            port: DEFAULT_PORT,
            rate_limit: DEFAULT_MAX_REQUESTS,
            rate_window: DEFAULT_WINDOW,
            trust_forwarded_for: false,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. `load` passes the
    /// process environment; tests pass a map.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = match lookup("SCAMCHECK_PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .with_context(|| format!("SCAMCHECK_PORT must be a port number, got {raw:?}"))?,
            None => defaults.port,
        };

        let rate_limit = match lookup("SCAMCHECK_RATE_LIMIT") {
            Some(raw) => parse_positive("SCAMCHECK_RATE_LIMIT", &raw)?,
            None => defaults.rate_limit,
        };

        let rate_window = match lookup("SCAMCHECK_RATE_WINDOW_SECS") {
            Some(raw) => {
                let secs = parse_positive("SCAMCHECK_RATE_WINDOW_SECS", &raw)?;
                if secs > MAX_RATE_WINDOW_SECS {
                    anyhow::bail!(
                        "SCAMCHECK_RATE_WINDOW_SECS must be at most {MAX_RATE_WINDOW_SECS}, got {secs}"
                    );
                }
                Duration::from_secs(secs as u64)
            }
            None => defaults.rate_window,
        };

        let trust_forwarded_for = lookup("SCAMCHECK_TRUST_FORWARDED_FOR")
            .map(|raw| matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(defaults.trust_forwarded_for);

        Ok(Self {
            bind: lookup("SCAMCHECK_BIND").unwrap_or(defaults.bind),
            port,
            rate_limit,
            rate_window,
            trust_forwarded_for,
        })
    }
}

fn parse_positive(key: &str, raw: &str) -> Result<usize> {
    let value = raw
        .trim()
        .parse::<usize>()
        .with_context(|| format!("{key} must be a positive integer, got {raw:?}"))?;
    if value == 0 {
        anyhow::bail!("{key} must be at least 1");
    }
    Ok(value)
}
