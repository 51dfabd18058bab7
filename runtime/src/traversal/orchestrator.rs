//! Sequences navigation, discovery and extraction under a time budget.
//!
//! Fatal errors happen only before the session opens (credential, target,
//! profile) or while opening it. Once a tab exists the traversal cannot
//! fail: every page-level problem degrades to fewer items, and the session
//! is closed before `run` returns. Dropping the `run` future releases the
//! session too, see [`TraversalSession`].

use super::session::TraversalSession;
use super::{domain_base, TraversalReport};
use crate::catalog::profile::SiteProfile;
use crate::catalog::CatalogReader;
use crate::config::{BrowserEndpoint, TraversalConfig};
use crate::error::TraversalError;
use crate::events::{self, EventBus, TraversalEvent};
use crate::model::{CatalogItem, RawItem};
use crate::navigation::Navigator;
use crate::renderer::{BrowserConnector, RenderContext};
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{info, warn};

/// A configured traversal. Each [`Traversal::run`] owns a fresh session.
pub struct Traversal {
    connector: Arc<dyn BrowserConnector>,
    endpoint: BrowserEndpoint,
    config: TraversalConfig,
    profile: SiteProfile,
    events: Arc<EventBus>,
}

impl Traversal {
    pub fn new(
        connector: Arc<dyn BrowserConnector>,
        endpoint: BrowserEndpoint,
        config: TraversalConfig,
        profile: SiteProfile,
        events: Arc<EventBus>,
    ) -> Self {
        Self {
            connector,
            endpoint,
            config,
            profile,
            events,
        }
    }

    pub fn config(&self) -> &TraversalConfig {
        &self.config
    }

    /// Traverse the category at `target_url`.
    pub async fn run(&self, target_url: &str) -> Result<TraversalReport, TraversalError> {
        let started = Instant::now();
        info!("starting traversal of {target_url}");

        let result = self.run_inner(target_url, started).await;
        if let Err(e) = &result {
            warn!("traversal failed: {e}");
            let host = domain_base(target_url)
                .map(|(_, host)| host)
                .unwrap_or_else(|_| target_url.to_string());
            self.events.emit(TraversalEvent::TraversalFailed {
                host,
                error: e.to_string(),
                elapsed_ms: started.elapsed().as_millis() as u64,
            });
        }
        result
    }

    async fn run_inner(
        &self,
        target_url: &str,
        started: Instant,
    ) -> Result<TraversalReport, TraversalError> {
        let (base, host) = domain_base(target_url)?;
        self.endpoint.require_credentials()?;
        let selectors = self
            .profile
            .compile()
            .map_err(TraversalError::InvalidProfile)?;

        self.events.emit(TraversalEvent::TraversalStarted {
            host: host.clone(),
            target: target_url.to_string(),
            timestamp: events::now_timestamp(),
        });

        let mut session = TraversalSession::open(self.connector.as_ref(), &self.endpoint).await?;
        let reader = CatalogReader::new(&self.profile, &selectors, &base);
        let mut report = match session.context_mut() {
            Some(tab) => {
                self.traverse(&mut **tab, &reader, &host, target_url, started)
                    .await
            }
            None => TraversalReport::empty(self.profile.default_category.clone()),
        };
        session.close().await;

        report.elapsed_ms = started.elapsed().as_millis() as u64;
        info!(
            "finished: {} items from {}/{} subcategories in {}ms",
            report.total_items(),
            report.subcategories_visited,
            report.subcategories_found,
            report.elapsed_ms
        );
        self.events.emit(TraversalEvent::TraversalComplete {
            host,
            total_items: report.total_items(),
            elapsed_ms: report.elapsed_ms,
        });
        Ok(report)
    }

    async fn traverse(
        &self,
        tab: &mut dyn RenderContext,
        reader: &CatalogReader<'_>,
        host: &str,
        target_url: &str,
        started: Instant,
    ) -> TraversalReport {
        let navigator = Navigator::new(&self.config, &self.profile, &self.events, host);
        let mut report = TraversalReport::empty(self.profile.default_category.clone());

        if !navigator
            .navigate(&mut *tab, target_url)
            .await
            .is_success()
        {
            warn!("root page unavailable, returning no items");
            return report;
        }
        report.root_loaded = true;
        info!("root page loaded");

        report.category = reader.detect_category(&*tab).await;
        let subcategories = reader
            .discover_subcategories(&*tab, self.config.subcategory_wait)
            .await;
        report.subcategories_found = subcategories.len();
        info!("found {} subcategories", subcategories.len());
        self.events.emit(TraversalEvent::SubcategoriesDiscovered {
            host: host.to_string(),
            count: subcategories.len(),
        });

        if subcategories.is_empty() {
            let label = self.profile.direct_subcategory.clone();
            info!("scraping root page directly");
            self.events.emit(TraversalEvent::SubcategoryStarted {
                host: host.to_string(),
                subcategory: label.clone(),
                index: 1,
                total: 1,
            });
            let raw = reader.extract_items(&*tab, &self.config).await;
            self.collect(&mut report, raw, &label, host);
            return report;
        }

        let total = subcategories.len();
        for (i, sub) in subcategories.iter().enumerate() {
            let elapsed = started.elapsed();
            if elapsed > self.config.time_budget {
                info!(
                    "time budget of {}s used, returning current items",
                    self.config.time_budget.as_secs()
                );
                report.budget_exhausted = true;
                self.events.emit(TraversalEvent::BudgetExhausted {
                    host: host.to_string(),
                    visited: i,
                    remaining: total - i,
                    elapsed_ms: elapsed.as_millis() as u64,
                });
                break;
            }

            info!("[{}/{}] processing {}", i + 1, total, sub.name);
            self.events.emit(TraversalEvent::SubcategoryStarted {
                host: host.to_string(),
                subcategory: sub.name.clone(),
                index: i + 1,
                total,
            });
            report.subcategories_visited += 1;

            if navigator
                .navigate(&mut *tab, &sub.url)
                .await
                .is_success()
            {
                let raw = reader.extract_items(&*tab, &self.config).await;
                self.collect(&mut report, raw, &sub.name, host);
            }
        }

        report
    }

    fn collect(&self, report: &mut TraversalReport, raw: Vec<RawItem>, subcategory: &str, host: &str) {
        let count = raw.len();
        let category = report.category.clone();
        report.items.extend(raw.into_iter().map(|r| {
            CatalogItem::from_raw(r, &category, subcategory, &self.profile.currency)
        }));
        info!("extracted {count} items");
        self.events.emit(TraversalEvent::ItemsExtracted {
            host: host.to_string(),
            subcategory: subcategory.to_string(),
            count,
        });
    }
}
