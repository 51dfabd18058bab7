//! Page loads with bounded retries and block-page detection.
//!
//! Every attempt is one of three things: the page loaded cleanly, the page
//! loaded but is an anti-bot interstitial, or the load did not finish. The
//! first ends the loop; the other two are retried until the attempt budget
//! is spent. Nothing here ever returns an error to the caller.

use crate::catalog::profile::SiteProfile;
use crate::config::TraversalConfig;
use crate::events::{EventBus, TraversalEvent};
use crate::renderer::RenderContext;
use crate::stealth::behavior;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Result of a single attempt, or of the whole retry loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NavigationOutcome {
    Success,
    Blocked,
    TimedOut,
    /// Every attempt was `Blocked` or `TimedOut`. The caller skips the URL.
    ExhaustedRetries,
}

impl NavigationOutcome {
    pub fn is_success(self) -> bool {
        self == NavigationOutcome::Success
    }
}

/// Drives one tab through page loads for a single traversal.
pub struct Navigator<'a> {
    config: &'a TraversalConfig,
    profile: &'a SiteProfile,
    events: &'a EventBus,
    host: &'a str,
}

impl<'a> Navigator<'a> {
    pub fn new(
        config: &'a TraversalConfig,
        profile: &'a SiteProfile,
        events: &'a EventBus,
        host: &'a str,
    ) -> Self {
        Self {
            config,
            profile,
            events,
            host,
        }
    }

    /// Load `url`, retrying up to `max_attempts` times.
    ///
    /// Returns [`NavigationOutcome::Success`] or
    /// [`NavigationOutcome::ExhaustedRetries`].
    pub async fn navigate(&self, ctx: &mut dyn RenderContext, url: &str) -> NavigationOutcome {
        let max_attempts = self.config.max_attempts.max(1);

        for attempt in 1..=max_attempts {
            info!("navigating (attempt {attempt}/{max_attempts}) to {url}");
            self.events.emit(TraversalEvent::NavigationAttempt {
                host: self.host.to_string(),
                url: url.to_string(),
                attempt,
                max_attempts,
            });

            match self.attempt(ctx, url).await {
                NavigationOutcome::Success => return NavigationOutcome::Success,
                NavigationOutcome::Blocked => {
                    warn!("block page detected at {url}");
                    self.events.emit(TraversalEvent::BlockDetected {
                        host: self.host.to_string(),
                        url: url.to_string(),
                        attempt,
                    });
                    if attempt < max_attempts {
                        behavior::sleep_cooldown(self.config.cooldown).await;
                    }
                }
                _ => {
                    warn!("page load timed out at {url}");
                    self.events.emit(TraversalEvent::NavigationTimedOut {
                        host: self.host.to_string(),
                        url: url.to_string(),
                        attempt,
                    });
                }
            }
        }

        warn!("giving up on {url} after {max_attempts} attempts");
        self.events.emit(TraversalEvent::NavigationExhausted {
            host: self.host.to_string(),
            url: url.to_string(),
            attempts: max_attempts,
        });
        NavigationOutcome::ExhaustedRetries
    }

    /// One load plus settle plus block inspection.
    async fn attempt(&self, ctx: &mut dyn RenderContext, url: &str) -> NavigationOutcome {
        let timeout = self.config.navigation_timeout;
        let timeout_ms = timeout.as_millis() as u64;

        match tokio::time::timeout(timeout, ctx.navigate(url, timeout_ms)).await {
            Ok(Ok(result)) => {
                debug!("loaded {} in {}ms", result.final_url, result.load_time_ms);
            }
            Ok(Err(e)) => {
                debug!("load failed: {e:#}");
                return NavigationOutcome::TimedOut;
            }
            Err(_) => return NavigationOutcome::TimedOut,
        }

        behavior::sleep_settle(self.config.settle).await;

        match ctx.get_html().await {
            Ok(markup) if self.profile.is_block_page(&markup) => NavigationOutcome::Blocked,
            Ok(_) => NavigationOutcome::Success,
            Err(e) => {
                // Unreadable markup cannot be judged; let extraction find out.
                debug!("could not read markup for block check: {e:#}");
                NavigationOutcome::Success
            }
        }
    }
}
