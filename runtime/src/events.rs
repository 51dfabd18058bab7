// Copyright 2026 Pricewalk Contributors
// SPDX-License-Identifier: Apache-2.0

//! Traversal event bus.
//!
//! The EventBus is a `tokio::sync::broadcast` channel that carries
//! [`TraversalEvent`] values. The REST SSE endpoint and the CLI progress
//! display subscribe independently. When no subscribers exist, events are
//! silently dropped.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Every event a traversal emits. Serialized to JSON for SSE.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TraversalEvent {
    // ── Traversal lifecycle ───────────────
    /// A traversal has started.
    TraversalStarted {
        host: String,
        target: String,
        timestamp: String,
    },
    /// Subcategory links were read from the root page.
    SubcategoriesDiscovered { host: String, count: usize },
    /// A subcategory (or the root, as `DIRECT`) is being scraped.
    SubcategoryStarted {
        host: String,
        subcategory: String,
        index: usize,
        total: usize,
    },
    /// Items were extracted from one page.
    ItemsExtracted {
        host: String,
        subcategory: String,
        count: usize,
    },
    /// The time budget ran out before all subcategories were visited.
    BudgetExhausted {
        host: String,
        visited: usize,
        remaining: usize,
        elapsed_ms: u64,
    },
    /// The traversal finished (possibly partially).
    TraversalComplete {
        host: String,
        total_items: usize,
        elapsed_ms: u64,
    },
    /// The traversal stopped on a fatal setup error.
    TraversalFailed {
        host: String,
        error: String,
        elapsed_ms: u64,
    },

    // ── Navigation ────────────────────────
    /// A page load attempt is starting.
    NavigationAttempt {
        host: String,
        url: String,
        attempt: u32,
        max_attempts: u32,
    },
    /// The loaded page was an anti-bot interstitial.
    BlockDetected {
        host: String,
        url: String,
        attempt: u32,
    },
    /// The page load did not complete in time (or failed outright).
    NavigationTimedOut {
        host: String,
        url: String,
        attempt: u32,
    },
    /// Every attempt failed; the URL is skipped.
    NavigationExhausted {
        host: String,
        url: String,
        attempts: u32,
    },
}

impl TraversalEvent {
    /// Host of the traversal that emitted this event.
    pub fn host(&self) -> &str {
        match self {
            TraversalEvent::TraversalStarted { host, .. }
            | TraversalEvent::SubcategoriesDiscovered { host, .. }
            | TraversalEvent::SubcategoryStarted { host, .. }
            | TraversalEvent::ItemsExtracted { host, .. }
            | TraversalEvent::BudgetExhausted { host, .. }
            | TraversalEvent::TraversalComplete { host, .. }
            | TraversalEvent::TraversalFailed { host, .. }
            | TraversalEvent::NavigationAttempt { host, .. }
            | TraversalEvent::BlockDetected { host, .. }
            | TraversalEvent::NavigationTimedOut { host, .. }
            | TraversalEvent::NavigationExhausted { host, .. } => host,
        }
    }
}

/// The central event bus.
pub struct EventBus {
    sender: broadcast::Sender<TraversalEvent>,
}

impl EventBus {
    /// Create a new event bus with the given buffer capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Emit an event to all subscribers. Silently ignores if no subscribers.
    pub fn emit(&self, event: TraversalEvent) {
        let _ = self.sender.send(event);
    }

    /// Subscribe to receive all future events.
    pub fn subscribe(&self) -> broadcast::Receiver<TraversalEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

/// Check if an event belongs to a traversal of `host` (case-insensitive).
pub fn event_matches_host(event: &TraversalEvent, host: &str) -> bool {
    event.host().eq_ignore_ascii_case(host)
}

/// RFC 3339 timestamp for the current time.
pub fn now_timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization() {
        let event = TraversalEvent::TraversalStarted {
            host: "www.carrefour.pk".to_string(),
            target: "https://www.carrefour.pk/mafpak/en/c/FPAK1000000".to_string(),
            timestamp: "2026-01-01T00:00:00.000Z".to_string(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"TraversalStarted\""));
        assert!(json.contains("www.carrefour.pk"));

        let parsed: TraversalEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, event);
    }

    #[test]
    fn test_event_bus_emit_no_subscribers() {
        let bus = EventBus::new(16);
        bus.emit(TraversalEvent::SubcategoriesDiscovered {
            host: "shop.example".to_string(),
            count: 3,
        });
    }

    #[test]
    fn test_event_bus_subscribe_receive() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        bus.emit(TraversalEvent::BlockDetected {
            host: "shop.example".to_string(),
            url: "https://shop.example/c/1".to_string(),
            attempt: 1,
        });

        match rx.try_recv().unwrap() {
            TraversalEvent::BlockDetected { attempt, .. } => assert_eq!(attempt, 1),
            other => panic!("wrong event: {other:?}"),
        }
    }

    #[test]
    fn test_event_matches_host() {
        let event = TraversalEvent::ItemsExtracted {
            host: "shop.example".to_string(),
            subcategory: "Milk".to_string(),
            count: 12,
        };
        assert!(event_matches_host(&event, "shop.example"));
        assert!(event_matches_host(&event, "SHOP.example"));
        assert!(!event_matches_host(&event, "other.example"));
    }

    #[test]
    fn test_timestamp_is_rfc3339() {
        let ts = now_timestamp();
        assert!(chrono::DateTime::parse_from_rfc3339(&ts).is_ok());
    }
}
