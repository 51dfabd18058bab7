//! Traversal tunables and browser endpoint configuration.
//!
//! Everything is read from the process environment when a traversal starts:
//!
//! | Variable                   | Meaning                                   |
//! |----------------------------|-------------------------------------------|
//! | `BROWSERLESS_TOKEN`        | remote browser credential (required)      |
//! | `PRICEWALK_BROWSER_TOKEN`  | alias for the credential                  |
//! | `PRICEWALK_BROWSER_WS`     | remote CDP WebSocket base URL             |
//! | `PRICEWALK_BUDGET_SECS`    | wall-clock budget for one traversal       |
//! | `PRICEWALK_MAX_RETRIES`    | navigation attempts per URL               |
//! | `PRICEWALK_CHROMIUM_PATH`  | Chromium binary for local mode            |
//!
//! Malformed numeric overrides are ignored with a warning.

use crate::error::TraversalError;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

/// Environment variable holding the remote browser credential.
pub const TOKEN_VAR: &str = "BROWSERLESS_TOKEN";
/// Accepted alias for [`TOKEN_VAR`].
pub const TOKEN_ALIAS_VAR: &str = "PRICEWALK_BROWSER_TOKEN";
/// Default remote browser service.
pub const DEFAULT_REMOTE_WS: &str = "wss://chrome.browserless.io";

/// Launch flags passed to the remote browser service as query parameters.
/// A `None` value is sent as a bare key.
pub const REMOTE_LAUNCH_FLAGS: &[(&str, Option<&str>)] = &[
    ("--disable-http2", None),
    ("--disable-blink-features", Some("AutomationControlled")),
    ("stealth", Some("true")),
    ("--location", Some("asia")),
    ("timeout", Some("50000")),
];

/// Inclusive range for a randomized delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayRange {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl DelayRange {
    pub const fn fixed(ms: u64) -> Self {
        Self {
            min_ms: ms,
            max_ms: ms,
        }
    }

    pub const fn between(min_ms: u64, max_ms: u64) -> Self {
        Self { min_ms, max_ms }
    }
}

/// Timing and retry settings for one traversal.
#[derive(Debug, Clone)]
pub struct TraversalConfig {
    /// Checked before each subcategory; once exceeded, collected items are returned.
    pub time_budget: Duration,
    /// Navigation attempts per URL before it is skipped.
    pub max_attempts: u32,
    /// Bound on a single page load.
    pub navigation_timeout: Duration,
    /// Pause after each completed load, before block inspection.
    pub settle: DelayRange,
    /// Pause after a block page, before the next attempt. Longer than `settle`.
    pub cooldown: DelayRange,
    /// How long to wait for subcategory links before treating a page as a leaf.
    pub subcategory_wait: Duration,
    /// How long to wait for the first item tile.
    pub card_wait: Duration,
    /// Vertical scroll applied to trigger lazy-loaded tiles.
    pub scroll_offset_px: u32,
    /// Pause after the lazy-load scroll.
    pub scroll_settle: Duration,
}

impl Default for TraversalConfig {
    fn default() -> Self {
        Self {
            time_budget: Duration::from_secs(45),
            max_attempts: 2,
            navigation_timeout: Duration::from_secs(35),
            settle: DelayRange::fixed(2_000),
            cooldown: DelayRange::fixed(5_000),
            subcategory_wait: Duration::from_secs(5),
            card_wait: Duration::from_secs(8),
            scroll_offset_px: 2_000,
            scroll_settle: Duration::from_millis(1_500),
        }
    }
}

impl TraversalConfig {
    /// Defaults with `PRICEWALK_BUDGET_SECS` and `PRICEWALK_MAX_RETRIES` applied.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let budget_secs = env_parse("PRICEWALK_BUDGET_SECS", defaults.time_budget.as_secs());
        let max_attempts = env_parse("PRICEWALK_MAX_RETRIES", defaults.max_attempts).max(1);
        Self {
            time_budget: Duration::from_secs(budget_secs),
            max_attempts,
            ..defaults
        }
    }
}

/// Where the browser for a traversal comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowserEndpoint {
    /// A remote CDP service reached over WebSocket. Requires a credential.
    Remote {
        ws_base: String,
        token: Option<String>,
    },
    /// A headless Chromium launched on this machine.
    Local { chromium_path: Option<PathBuf> },
}

impl BrowserEndpoint {
    /// Remote endpoint from `PRICEWALK_BROWSER_WS` and the credential variables.
    ///
    /// A missing credential is recorded as `None`, not rejected here; the
    /// traversal rejects it before opening a session.
    pub fn remote_from_env() -> Self {
        let ws_base = std::env::var("PRICEWALK_BROWSER_WS")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_REMOTE_WS.to_string());
        let token = [TOKEN_VAR, TOKEN_ALIAS_VAR]
            .iter()
            .find_map(|var| std::env::var(var).ok())
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        Self::Remote { ws_base, token }
    }

    /// Local endpoint, honoring `PRICEWALK_CHROMIUM_PATH`.
    pub fn local_from_env() -> Self {
        Self::Local {
            chromium_path: std::env::var("PRICEWALK_CHROMIUM_PATH")
                .ok()
                .map(PathBuf::from),
        }
    }

    /// Fail fast when the endpoint needs a credential that is absent.
    pub fn require_credentials(&self) -> Result<(), TraversalError> {
        match self {
            BrowserEndpoint::Remote { token: None, .. } => {
                Err(TraversalError::MissingCredential { var: TOKEN_VAR })
            }
            _ => Ok(()),
        }
    }

    /// Human-readable endpoint description with the credential redacted.
    pub fn describe(&self) -> String {
        match self {
            BrowserEndpoint::Remote { ws_base, token } => {
                let cred = if token.is_some() { "set" } else { "missing" };
                format!("remote {ws_base} (token {cred})")
            }
            BrowserEndpoint::Local {
                chromium_path: Some(p),
            } => format!("local {}", p.display()),
            BrowserEndpoint::Local {
                chromium_path: None,
            } => "local (auto-detect)".to_string(),
        }
    }
}

/// Build the remote WebSocket URL carrying the credential and launch flags.
pub fn remote_connection_url(ws_base: &str, token: &str) -> Result<String, url::ParseError> {
    let mut url = url::Url::parse(ws_base)?;
    {
        let mut query = url.query_pairs_mut();
        query.append_pair("token", token);
        for (key, value) in REMOTE_LAUNCH_FLAGS {
            match value {
                Some(v) => query.append_pair(key, v),
                None => query.append_key_only(key),
            };
        }
    }
    Ok(url.to_string())
}

fn env_parse<T: FromStr + Copy + std::fmt::Display>(var: &str, default: T) -> T {
    match std::env::var(var) {
        Ok(raw) => match raw.trim().parse::<T>() {
            Ok(v) => v,
            Err(_) => {
                warn!("ignoring malformed {var}={raw:?}, using {default}");
                default
            }
        },
        Err(_) => default,
    }
}
