//! Subcategory links and the breadcrumb category.

use super::profile::{ProfileSelectors, SiteProfile};
use super::{absolute_url, element_text};
use crate::model::SubcategoryRef;
use scraper::Html;

/// Subcategory links in document order.
///
/// Links without a name element (or with an empty name or href) are skipped.
pub fn parse_subcategories(
    html: &str,
    selectors: &ProfileSelectors,
    domain_base: &str,
) -> Vec<SubcategoryRef> {
    let document = Html::parse_document(html);

    document
        .select(&selectors.subcategory_link)
        .filter_map(|link| {
            let name = link
                .select(&selectors.subcategory_name)
                .next()
                .map(|el| element_text(&el))
                .filter(|n| !n.is_empty())?;
            let href = link.value().attr("href").filter(|h| !h.trim().is_empty())?;
            Some(SubcategoryRef {
                name,
                url: absolute_url(domain_base, href),
            })
        })
        .collect()
}

/// Category label from the second breadcrumb item.
pub fn parse_category(html: &str, profile: &SiteProfile, selectors: &ProfileSelectors) -> String {
    let document = Html::parse_document(html);
    document
        .select(&selectors.breadcrumb_category)
        .next()
        .map(|el| element_text(&el))
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| profile.default_category.clone())
}
