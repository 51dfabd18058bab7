//! Storefront selectors and site constants.
//!
//! Selectors are site-specific and break whenever the storefront ships a new
//! layout, so they live in `site_profile.json` (embedded at compile time)
//! rather than in code. All parsing entry points are synchronous because
//! `scraper::Html` is `!Send`; callers fetch markup first, then parse.

use anyhow::{anyhow, Result};
use scraper::Selector;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

const SITE_PROFILE_JSON: &str = include_str!("site_profile.json");

/// CSS selectors and constants for one storefront layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteProfile {
    pub name: String,
    /// Currency code stamped on every item.
    pub currency: String,
    /// Category label when the breadcrumb is missing.
    pub default_category: String,
    /// Subcategory label for a root page scraped directly.
    pub direct_subcategory: String,
    pub breadcrumb_category: String,
    pub subcategory_link: String,
    /// Element inside a subcategory link holding its display name.
    pub subcategory_name: String,
    /// Item tile container.
    pub card: String,
    pub card_name: String,
    /// Integer part of the price.
    pub card_price_main: String,
    /// Fractional part of the price, rendered in a smaller font.
    pub card_price_fraction: String,
    pub card_quantity: String,
    pub card_link: String,
    /// Lowercase substrings identifying an anti-bot interstitial.
    pub block_signatures: Vec<String>,
}

impl SiteProfile {
    /// The profile shipped with the binary.
    pub fn embedded() -> &'static SiteProfile {
        static PROFILE: OnceLock<SiteProfile> = OnceLock::new();
        PROFILE.get_or_init(|| {
            serde_json::from_str(SITE_PROFILE_JSON).expect("embedded site profile is valid")
        })
    }

    /// Parse a profile from JSON (for alternate layouts).
    pub fn from_json(json: &str) -> Result<Self> {
        let profile: SiteProfile = serde_json::from_str(json)?;
        profile.compile()?;
        Ok(profile)
    }

    /// Parse every selector in the profile.
    pub fn compile(&self) -> Result<ProfileSelectors> {
        Ok(ProfileSelectors {
            breadcrumb_category: parse_selector(&self.breadcrumb_category)?,
            subcategory_link: parse_selector(&self.subcategory_link)?,
            subcategory_name: parse_selector(&self.subcategory_name)?,
            card: parse_selector(&self.card)?,
            card_name: parse_selector(&self.card_name)?,
            card_price_main: parse_selector(&self.card_price_main)?,
            card_price_fraction: parse_selector(&self.card_price_fraction)?,
            card_quantity: parse_selector(&self.card_quantity)?,
            card_link: parse_selector(&self.card_link)?,
        })
    }

    /// Whether the markup contains any block signature (case-insensitive).
    pub fn is_block_page(&self, markup: &str) -> bool {
        let lower = markup.to_lowercase();
        self.block_signatures
            .iter()
            .any(|sig| lower.contains(&sig.to_lowercase()))
    }
}

/// Compiled form of a [`SiteProfile`]'s selectors.
pub struct ProfileSelectors {
    pub breadcrumb_category: Selector,
    pub subcategory_link: Selector,
    pub subcategory_name: Selector,
    pub card: Selector,
    pub card_name: Selector,
    pub card_price_main: Selector,
    pub card_price_fraction: Selector,
    pub card_quantity: Selector,
    pub card_link: Selector,
}

fn parse_selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow!("invalid selector '{css}': {e:?}"))
}
