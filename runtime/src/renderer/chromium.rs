//! Chromium-based renderer using chromiumoxide.
//!
//! Two ways in: [`ChromiumRenderer::connect`] attaches to a remote CDP
//! service over WebSocket, [`ChromiumRenderer::launch`] starts a local
//! headless Chromium.

use super::{BrowserConnector, NavigationResult, RenderContext, Renderer};
use crate::config::{self, BrowserEndpoint};
use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::handler::Handler;
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// User agent applied to every tab.
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
                              AppleWebKit/537.36 (KHTML, like Gecko) \
                              Chrome/121.0.0.0 Safari/537.36";

const SELECTOR_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Find a local Chromium binary.
pub fn find_chromium() -> Option<PathBuf> {
    // 1. PRICEWALK_CHROMIUM_PATH env
    if let Ok(p) = std::env::var("PRICEWALK_CHROMIUM_PATH") {
        let path = PathBuf::from(&p);
        if path.exists() {
            return Some(path);
        }
    }

    // 2. ~/.pricewalk/chromium/
    if let Some(home) = dirs::home_dir() {
        let candidates = if cfg!(target_os = "macos") {
            vec![
                home.join(".pricewalk/chromium/chrome-mac-arm64/Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing"),
                home.join(".pricewalk/chromium/chrome-mac-x64/Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing"),
                home.join(".pricewalk/chromium/chrome"),
            ]
        } else {
            vec![
                home.join(".pricewalk/chromium/chrome-linux64/chrome"),
                home.join(".pricewalk/chromium/chrome"),
            ]
        };
        for c in candidates {
            if c.exists() {
                return Some(c);
            }
        }
    }

    // 3. System PATH
    for name in ["google-chrome", "chromium", "chromium-browser"] {
        if let Ok(path) = which::which(name) {
            return Some(path);
        }
    }

    None
}

/// Opens Chromium renderers for remote or local endpoints.
pub struct ChromiumConnector;

#[async_trait]
impl BrowserConnector for ChromiumConnector {
    async fn connect(&self, endpoint: &BrowserEndpoint) -> Result<Box<dyn Renderer>> {
        let renderer = match endpoint {
            BrowserEndpoint::Remote { ws_base, token } => {
                let token = token
                    .as_deref()
                    .ok_or_else(|| anyhow!("{} is not set", config::TOKEN_VAR))?;
                let url = config::remote_connection_url(ws_base, token)
                    .with_context(|| format!("invalid browser endpoint '{ws_base}'"))?;
                ChromiumRenderer::connect(&url).await?
            }
            BrowserEndpoint::Local { chromium_path } => {
                ChromiumRenderer::launch(chromium_path.clone()).await?
            }
        };
        Ok(Box::new(renderer))
    }
}

/// Chromium-based renderer.
pub struct ChromiumRenderer {
    browser: Mutex<Browser>,
    handler: JoinHandle<()>,
    active_count: Arc<AtomicUsize>,
}

impl ChromiumRenderer {
    /// Attach to a remote browser over a CDP WebSocket URL.
    pub async fn connect(ws_url: &str) -> Result<Self> {
        let (browser, handler) = Browser::connect(ws_url)
            .await
            .context("failed to connect to remote browser")?;
        Ok(Self::from_parts(browser, handler))
    }

    /// Launch a local headless Chromium instance.
    pub async fn launch(chromium_path: Option<PathBuf>) -> Result<Self> {
        let chrome_path = match chromium_path {
            Some(p) => p,
            None => find_chromium()
                .context("Chromium not found. Set PRICEWALK_CHROMIUM_PATH.")?,
        };

        let config = BrowserConfig::builder()
            .chrome_executable(chrome_path)
            .arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-http2")
            .arg("--disable-blink-features=AutomationControlled")
            .build()
            .map_err(|e| anyhow!("failed to build browser config: {e}"))?;

        let (browser, handler) = Browser::launch(config)
            .await
            .context("failed to launch Chromium")?;
        Ok(Self::from_parts(browser, handler))
    }

    fn from_parts(browser: Browser, mut handler: Handler) -> Self {
        // Spawn the handler task
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                let _ = event;
            }
        });

        Self {
            browser: Mutex::new(browser),
            handler,
            active_count: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl Renderer for ChromiumRenderer {
    async fn new_context(&self) -> Result<Box<dyn RenderContext>> {
        let page = self
            .browser
            .lock()
            .await
            .new_page("about:blank")
            .await
            .context("failed to create new page")?;

        page.set_user_agent(USER_AGENT)
            .await
            .context("failed to set user agent")?;

        self.active_count.fetch_add(1, Ordering::Relaxed);

        Ok(Box::new(ChromiumContext {
            page,
            active_count: Arc::clone(&self.active_count),
        }))
    }

    async fn shutdown(&self) -> Result<()> {
        let result = self.browser.lock().await.close().await;
        self.handler.abort();
        result.context("failed to close browser")?;
        Ok(())
    }

    fn active_contexts(&self) -> usize {
        self.active_count.load(Ordering::Relaxed)
    }
}

impl Drop for ChromiumRenderer {
    // Dropping the handler closes the CDP socket; a launched child is
    // killed by `Browser`'s own drop.
    fn drop(&mut self) {
        self.handler.abort();
    }
}

/// A single Chromium page context.
pub struct ChromiumContext {
    page: Page,
    active_count: Arc<AtomicUsize>,
}

#[async_trait]
impl RenderContext for ChromiumContext {
    async fn navigate(&mut self, url: &str, timeout_ms: u64) -> Result<NavigationResult> {
        let start = Instant::now();

        let result =
            tokio::time::timeout(Duration::from_millis(timeout_ms), self.page.goto(url)).await;

        let load_time_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(Ok(_response)) => {
                let _ = self.page.wait_for_navigation().await;

                let final_url = self
                    .page
                    .url()
                    .await
                    .unwrap_or_default()
                    .unwrap_or_else(|| url.to_string());

                Ok(NavigationResult {
                    final_url,
                    load_time_ms,
                })
            }
            Ok(Err(e)) => bail!("navigation failed: {e}"),
            Err(_) => bail!("navigation timed out after {timeout_ms}ms"),
        }
    }

    async fn execute_js(&self, script: &str) -> Result<serde_json::Value> {
        let result = self
            .page
            .evaluate(script)
            .await
            .context("JS execution failed")?;

        result
            .into_value()
            .map_err(|e| anyhow!("failed to convert JS result: {e:?}"))
    }

    async fn get_html(&self) -> Result<String> {
        let result = self
            .page
            .evaluate("document.documentElement.outerHTML")
            .await
            .context("failed to get HTML")?;

        result
            .into_value()
            .map_err(|e| anyhow!("failed to convert HTML result: {e:?}"))
    }

    async fn get_url(&self) -> Result<String> {
        let url = self
            .page
            .url()
            .await
            .context("failed to get URL")?
            .unwrap_or_default();
        Ok(url)
    }

    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<bool> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.page.find_element(selector).await.is_ok() {
                return Ok(true);
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
            tokio::time::sleep(SELECTOR_POLL_INTERVAL).await;
        }
    }

    async fn scroll_to(&self, y: u32) -> Result<()> {
        self.page
            .evaluate(format!("window.scrollTo(0, {y})"))
            .await
            .context("scroll failed")?;
        Ok(())
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.active_count.fetch_sub(1, Ordering::Relaxed);
        let _ = self.page.close().await;
        Ok(())
    }
}
