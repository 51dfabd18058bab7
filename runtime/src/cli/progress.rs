//! Live spinner driven by traversal events.

use crate::events::{EventBus, TraversalEvent};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

/// Create a simple spinner for general operations.
pub fn create_spinner(message: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("  {spinner:.cyan} {msg}") {
        bar.set_style(style.tick_chars("\u{25b8}\u{25b9}\u{25b8}\u{25b9}\u{25b8}"));
    }
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(120));
    bar
}

/// Spinner text for an event, or `None` to leave the spinner unchanged.
pub fn describe(event: &TraversalEvent) -> Option<String> {
    match event {
        TraversalEvent::NavigationAttempt {
            url,
            attempt,
            max_attempts,
            ..
        } => Some(format!("Loading {url} (attempt {attempt}/{max_attempts})")),
        TraversalEvent::BlockDetected { .. } => Some("Block page, cooling down".to_string()),
        TraversalEvent::NavigationTimedOut { .. } => Some("Page load timed out".to_string()),
        TraversalEvent::SubcategoriesDiscovered { count, .. } => {
            Some(format!("Found {count} subcategories"))
        }
        TraversalEvent::SubcategoryStarted {
            subcategory,
            index,
            total,
            ..
        } => Some(format!("[{index}/{total}] {subcategory}")),
        TraversalEvent::BudgetExhausted { .. } => {
            Some("Time budget used, wrapping up".to_string())
        }
        _ => None,
    }
}

/// Follow `events` and mirror them onto `bar` until the bus closes or the
/// returned task is aborted.
pub fn follow(events: &EventBus, bar: ProgressBar) -> JoinHandle<()> {
    let mut rx = events.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    if let Some(msg) = describe(&event) {
                        bar.set_message(msg);
                    }
                }
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_subcategory_progress() {
        let event = TraversalEvent::SubcategoryStarted {
            host: "shop.example".to_string(),
            subcategory: "Milk".to_string(),
            index: 2,
            total: 5,
        };
        assert_eq!(describe(&event).as_deref(), Some("[2/5] Milk"));
    }

    #[test]
    fn test_describe_ignores_completion() {
        let event = TraversalEvent::TraversalComplete {
            host: "shop.example".to_string(),
            total_items: 3,
            elapsed_ms: 10,
        };
        assert!(describe(&event).is_none());
    }
}
