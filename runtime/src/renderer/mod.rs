//! Renderer abstraction for browser-based page rendering.
//!
//! The traversal pipeline talks to the browser only through these traits:
//! a [`BrowserConnector`] opens a [`Renderer`] (one browser connection),
//! which hands out [`RenderContext`]s (tabs). The only implementation shipped
//! is Chromium via chromiumoxide; tests script their own.

pub mod chromium;

use crate::config::BrowserEndpoint;
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Result of navigating to a URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigationResult {
    /// The final URL after any redirects.
    pub final_url: String,
    /// Time taken to load the page in milliseconds.
    pub load_time_ms: u64,
}

/// Opens browser connections for a given endpoint.
#[async_trait]
pub trait BrowserConnector: Send + Sync {
    /// Connect to (or launch) a browser.
    async fn connect(&self, endpoint: &BrowserEndpoint) -> Result<Box<dyn Renderer>>;
}

/// A browser engine that can create rendering contexts.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Create a new browser context (tab).
    async fn new_context(&self) -> Result<Box<dyn RenderContext>>;
    /// Shut down the browser engine and release the connection.
    async fn shutdown(&self) -> Result<()>;
    /// Number of currently active contexts.
    fn active_contexts(&self) -> usize;
}

/// A single browser context (tab) for rendering pages.
///
/// Navigation mutates the tab in place; callers must not share one context
/// between concurrent tasks.
#[async_trait]
pub trait RenderContext: Send + Sync {
    /// Navigate to a URL with a timeout.
    async fn navigate(&mut self, url: &str, timeout_ms: u64) -> Result<NavigationResult>;
    /// Execute JavaScript in the page context and return the result.
    async fn execute_js(&self, script: &str) -> Result<serde_json::Value>;
    /// Get the full page HTML.
    async fn get_html(&self) -> Result<String>;
    /// Get the current URL.
    async fn get_url(&self) -> Result<String>;
    /// Wait until `selector` matches at least one element.
    ///
    /// Returns `Ok(false)` when the timeout elapses without a match.
    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<bool>;
    /// Scroll the window to a vertical offset.
    async fn scroll_to(&self, y: u32) -> Result<()>;
    /// Close this context.
    async fn close(self: Box<Self>) -> Result<()>;
}
