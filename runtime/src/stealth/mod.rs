//! Pacing that keeps the traversal from looking like a burst of bot traffic.

pub mod behavior;
