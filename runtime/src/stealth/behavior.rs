//! Randomized pauses between page loads.

use crate::config::DelayRange;
use rand::Rng;
use std::time::Duration;

/// Pick a delay inside `range`. A fixed range always yields its value.
pub fn random_delay(range: DelayRange) -> Duration {
    let (lo, hi) = if range.min_ms <= range.max_ms {
        (range.min_ms, range.max_ms)
    } else {
        (range.max_ms, range.min_ms)
    };
    if lo == hi {
        return Duration::from_millis(lo);
    }
    let ms = rand::thread_rng().gen_range(lo..=hi);
    Duration::from_millis(ms)
}

/// Sleep for a settle delay after a page finishes loading.
pub async fn sleep_settle(range: DelayRange) {
    tokio::time::sleep(random_delay(range)).await;
}

/// Sleep for a cooldown delay after a block page.
pub async fn sleep_cooldown(range: DelayRange) {
    tokio::time::sleep(random_delay(range)).await;
}
