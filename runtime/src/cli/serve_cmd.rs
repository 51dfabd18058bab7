//! `pricewalk serve`: run the REST wrapper in the foreground.

use crate::cli::output;
use crate::events::EventBus;
use crate::renderer::chromium::ChromiumConnector;
use crate::rest::{self, AppState, EndpointSource};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

pub async fn run(port: u16, local: bool) -> Result<()> {
    let endpoint = if local {
        EndpointSource::Local
    } else {
        EndpointSource::Remote
    };
    let state = Arc::new(AppState {
        connector: Arc::new(ChromiumConnector),
        endpoint,
        events: Arc::new(EventBus::default()),
    });

    info!("starting pricewalk v{}", env!("CARGO_PKG_VERSION"));
    if !output::is_quiet() {
        eprintln!("  Pricewalk listening on http://0.0.0.0:{port}");
        eprintln!("  GET /api/v1/catalog?url=<category url>");
    }

    tokio::select! {
        result = rest::start(port, state) => result.context("REST server failed"),
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received");
            Ok(())
        }
    }
}
