//! One browser connection and one tab, owned by a single traversal.

use crate::config::BrowserEndpoint;
use crate::error::TraversalError;
use crate::renderer::{BrowserConnector, RenderContext, Renderer};
use tracing::{debug, warn};

/// Browser resources for one traversal.
///
/// Obtained from [`TraversalSession::open`] and released by
/// [`TraversalSession::close`]. A session dropped without `close`, as when
/// the traversal future is cancelled, is released on a background task.
pub struct TraversalSession {
    renderer: Option<Box<dyn Renderer>>,
    context: Option<Box<dyn RenderContext>>,
}

impl TraversalSession {
    /// Connect to the browser and open the tab.
    ///
    /// If the tab cannot be opened the connection is shut down before the
    /// error is returned.
    pub async fn open(
        connector: &dyn BrowserConnector,
        endpoint: &BrowserEndpoint,
    ) -> Result<Self, TraversalError> {
        debug!("opening browser session: {}", endpoint.describe());
        let renderer = connector
            .connect(endpoint)
            .await
            .map_err(TraversalError::BrowserConnect)?;

        match renderer.new_context().await {
            Ok(context) => Ok(Self {
                renderer: Some(renderer),
                context: Some(context),
            }),
            Err(e) => {
                if let Err(close_err) = renderer.shutdown().await {
                    warn!("browser shutdown failed: {close_err:#}");
                }
                Err(TraversalError::ContextOpen(e))
            }
        }
    }

    /// The tab. `None` only once the session has been released.
    pub fn context_mut(&mut self) -> Option<&mut Box<dyn RenderContext>> {
        self.context.as_mut()
    }

    /// Close the tab and the browser connection. Failures are logged only.
    pub async fn close(mut self) {
        if let Some(renderer) = self.renderer.take() {
            release(renderer, self.context.take()).await;
        }
    }
}

impl Drop for TraversalSession {
    fn drop(&mut self) {
        let Some(renderer) = self.renderer.take() else {
            return;
        };
        let context = self.context.take();
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                warn!("traversal cancelled, releasing browser session");
                handle.spawn(release(renderer, context));
            }
            Err(_) => warn!("browser session dropped outside a runtime"),
        }
    }
}

async fn release(renderer: Box<dyn Renderer>, context: Option<Box<dyn RenderContext>>) {
    if let Some(context) = context {
        if let Err(e) = context.close().await {
            warn!("tab close failed: {e:#}");
        }
    }
    if let Err(e) = renderer.shutdown().await {
        warn!("browser shutdown failed: {e:#}");
    }
    debug!("browser session closed");
}
