//! Reading category pages: subcategory links, item tiles, breadcrumbs.
//!
//! Async methods on [`CatalogReader`] do the browser work (waits, scroll,
//! markup fetch); the parsing they delegate to is synchronous and lives in
//! [`discovery`] and [`cards`].

pub mod cards;
pub mod discovery;
pub mod profile;

use crate::config::TraversalConfig;
use crate::model::{RawItem, SubcategoryRef};
use crate::renderer::RenderContext;
use profile::{ProfileSelectors, SiteProfile};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Site-aware page reader for one traversal.
pub struct CatalogReader<'a> {
    profile: &'a SiteProfile,
    selectors: &'a ProfileSelectors,
    domain_base: &'a str,
}

impl<'a> CatalogReader<'a> {
    pub fn new(
        profile: &'a SiteProfile,
        selectors: &'a ProfileSelectors,
        domain_base: &'a str,
    ) -> Self {
        Self {
            profile,
            selectors,
            domain_base,
        }
    }

    /// Category label from the breadcrumb, or the profile default.
    pub async fn detect_category(&self, ctx: &dyn RenderContext) -> String {
        match ctx.get_html().await {
            Ok(html) => discovery::parse_category(&html, self.profile, self.selectors),
            Err(e) => {
                debug!("breadcrumb unavailable: {e:#}");
                self.profile.default_category.clone()
            }
        }
    }

    /// Subcategory links on the loaded page, in document order.
    ///
    /// An empty result means the page is a leaf.
    pub async fn discover_subcategories(
        &self,
        ctx: &dyn RenderContext,
        wait: Duration,
    ) -> Vec<SubcategoryRef> {
        info!("checking for subcategories");
        match ctx
            .wait_for_selector(&self.profile.subcategory_link, wait)
            .await
        {
            Ok(true) => {}
            Ok(false) => return Vec::new(),
            Err(e) => {
                debug!("subcategory wait failed: {e:#}");
                return Vec::new();
            }
        }

        match ctx.get_html().await {
            Ok(html) => discovery::parse_subcategories(&html, self.selectors, self.domain_base),
            Err(e) => {
                warn!("could not read listing markup: {e:#}");
                Vec::new()
            }
        }
    }

    /// Raw item rows on the loaded page, in document order.
    pub async fn extract_items(
        &self,
        ctx: &dyn RenderContext,
        config: &TraversalConfig,
    ) -> Vec<RawItem> {
        match ctx
            .wait_for_selector(&self.profile.card, config.card_wait)
            .await
        {
            Ok(true) => {}
            Ok(false) => {
                info!("no item tiles appeared");
                return Vec::new();
            }
            Err(e) => {
                debug!("card wait failed: {e:#}");
                return Vec::new();
            }
        }

        if let Err(e) = ctx.scroll_to(config.scroll_offset_px).await {
            debug!("lazy-load scroll failed: {e:#}");
        }
        tokio::time::sleep(config.scroll_settle).await;

        match ctx.get_html().await {
            Ok(html) => cards::parse_cards(&html, self.selectors, self.domain_base),
            Err(e) => {
                warn!("could not read item markup: {e:#}");
                Vec::new()
            }
        }
    }
}

/// Visible text of an element, whitespace-collapsed.
pub(crate) fn element_text(el: &scraper::ElementRef<'_>) -> String {
    el.text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Resolve a link against the domain base by concatenation.
///
/// Absolute links are kept as they are.
pub(crate) fn absolute_url(domain_base: &str, href: &str) -> String {
    let href = href.trim();
    if href.starts_with("http://") || href.starts_with("https://") {
        return href.to_string();
    }
    let base = domain_base.trim_end_matches('/');
    if href.starts_with('/') {
        format!("{base}{href}")
    } else {
        format!("{base}/{href}")
    }
}
