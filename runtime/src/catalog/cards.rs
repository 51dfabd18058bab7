//! Item tile parsing.
//!
//! Each tile is parsed on its own; a tile missing its name yields `None`
//! and is dropped without affecting its neighbours.

use super::profile::ProfileSelectors;
use super::{absolute_url, element_text};
use crate::model::RawItem;
use regex::Regex;
use crate::pricing::normalizer::SIZE_UNITS;
use scraper::{ElementRef, Html, Selector};
use std::sync::OnceLock;

/// `<number><unit>` size token inside an item name.
fn size_token_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(
            r"(?i)\b\d+(?:\.\d+)?\s*(?:{SIZE_UNITS}|pcs|pack)\b"
        ))
        .expect("size token regex is valid")
    })
}

/// Parse every tile on the page, in document order.
pub fn parse_cards(html: &str, selectors: &ProfileSelectors, domain_base: &str) -> Vec<RawItem> {
    let document = Html::parse_document(html);
    document
        .select(&selectors.card)
        .filter_map(|card| parse_card(&card, selectors, domain_base))
        .collect()
}

/// Parse one tile. `None` when the tile has no name.
pub fn parse_card(
    card: &ElementRef<'_>,
    selectors: &ProfileSelectors,
    domain_base: &str,
) -> Option<RawItem> {
    let name = card
        .select(&selectors.card_name)
        .next()
        .map(|el| element_text(&el))
        .filter(|n| !n.is_empty())?;

    let raw_price = card
        .select(&selectors.card_price_main)
        .next()
        .map(|main| {
            let fraction = card
                .select(&selectors.card_price_fraction)
                .next()
                .map(|el| element_text(&el))
                .unwrap_or_default();
            format!("{}{}", integer_text(&main, &selectors.card_price_fraction), fraction)
        })
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| "0".to_string());

    let label = card
        .select(&selectors.card_quantity)
        .next()
        .map(|el| element_text(&el))
        .unwrap_or_default();
    let (quantity_label, unit_quantity) = if label.is_empty() {
        let token = size_token(&name).unwrap_or_default();
        (token.clone(), token)
    } else {
        let unit = split_unit_quantity(&label);
        (label, unit)
    };

    let item_url = card
        .select(&selectors.card_link)
        .next()
        .and_then(|a| a.value().attr("href"))
        .filter(|h| !h.trim().is_empty())
        .map(|h| absolute_url(domain_base, h))
        .unwrap_or_default();

    Some(RawItem {
        name,
        raw_price,
        quantity_label,
        unit_quantity,
        item_url,
    })
}

/// The part of a quantity label before the first `-`, trimmed.
pub fn split_unit_quantity(label: &str) -> String {
    label.split('-').next().unwrap_or(label).trim().to_string()
}

/// First size token in `name`, e.g. `"1.5 L"` in `"Nestle Water 1.5 L"`.
pub fn size_token(name: &str) -> Option<String> {
    size_token_regex()
        .find(name)
        .map(|m| m.as_str().trim().to_string())
}

/// Text of the integer price element without any nested fraction element.
fn integer_text(el: &ElementRef<'_>, fraction: &Selector) -> String {
    let nested: Vec<_> = el.select(fraction).map(|f| f.id()).collect();
    el.descendants()
        .filter(|node| !node.ancestors().any(|a| nested.contains(&a.id())))
        .filter_map(|node| node.value().as_text().map(|t| t.trim().to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::profile::SiteProfile;

    const BASE: &str = "https://www.carrefour.pk";

    fn selectors() -> ProfileSelectors {
        SiteProfile::embedded().compile().unwrap()
    }

    fn tile(name: &str, main: &str, fraction: &str, qty: &str, href: &str) -> String {
        let mut html = String::from(r#"<div class="relative max-w-[134px] w-full">"#);
        if !href.is_empty() {
            html.push_str(&format!(r#"<a href="{href}"><img/></a>"#));
        }
        if !name.is_empty() {
            html.push_str(&format!(r#"<div class="line-clamp-2"><span>{name}</span></div>"#));
        }
        if !main.is_empty() {
            html.push_str(&format!(
                r#"<div class="flex"><div class="text-lg font-bold">{main}</div><div class="text-2xs font-bold">{fraction}</div></div>"#
            ));
        }
        if !qty.is_empty() {
            html.push_str(&format!(r#"<div class="text-gray-500 truncate">{qty}</div>"#));
        }
        html.push_str("</div>");
        html
    }

    #[test]
    fn test_full_tile() {
        let html = tile(
            "Nurpur Butter",
            "1,250",
            ".00",
            "500g - Pack",
            "/mafpak/en/p/123",
        );
        let items = parse_cards(&html, &selectors(), BASE);
        assert_eq!(items.len(), 1);
        let item = &items[0];
        assert_eq!(item.name, "Nurpur Butter");
        assert_eq!(item.raw_price, "1,250.00");
        assert_eq!(item.quantity_label, "500g - Pack");
        assert_eq!(item.unit_quantity, "500g");
        assert_eq!(item.item_url, "https://www.carrefour.pk/mafpak/en/p/123");
    }

    #[test]
    fn test_nameless_tile_is_dropped_neighbours_kept() {
        let html = format!(
            "{}{}{}",
            tile("Milk 1L", "250", ".00", "1L", "/mafpak/en/p/1"),
            tile("", "999", ".00", "1kg", "/mafpak/en/p/2"),
            tile("Eggs", "400", "", "12 pcs", "/mafpak/en/p/3"),
        );
        let items = parse_cards(&html, &selectors(), BASE);
        let names: Vec<_> = items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["Milk 1L", "Eggs"]);
    }

    #[test]
    fn test_missing_price_defaults_to_zero() {
        let html = tile("Mystery Box", "", "", "", "");
        let items = parse_cards(&html, &selectors(), BASE);
        assert_eq!(items[0].raw_price, "0");
        assert_eq!(items[0].item_url, "");
    }

    #[test]
    fn test_nested_fraction_is_not_duplicated() {
        let html = r#"<div class="max-w-[134px]">
            <div class="line-clamp-2">Sugar</div>
            <div class="text-lg font-bold">180<div class="text-2xs font-bold">.50</div></div>
        </div>"#;
        let items = parse_cards(html, &selectors(), BASE);
        assert_eq!(items[0].raw_price, "180.50");
    }

    #[test]
    fn test_wrapped_integer_with_nested_fraction() {
        let html = r#"<div class="max-w-[134px]">
            <div class="line-clamp-2">Sugar</div>
            <div class="text-lg font-bold"><span>180</span><div class="text-2xs font-bold">.50</div></div>
        </div>"#;
        let items = parse_cards(html, &selectors(), BASE);
        assert_eq!(items[0].raw_price, "180.50");
    }

    #[test]
    fn test_quantity_from_name_when_label_missing() {
        let html = tile("Nestle Pure Life Water 1.5 L", "120", ".00", "", "");
        let items = parse_cards(&html, &selectors(), BASE);
        assert_eq!(items[0].quantity_label, "1.5 L");
        assert_eq!(items[0].unit_quantity, "1.5 L");
    }

    #[test]
    fn test_split_unit_quantity() {
        assert_eq!(split_unit_quantity("1kg - Bag"), "1kg");
        assert_eq!(split_unit_quantity("750ml"), "750ml");
        assert_eq!(split_unit_quantity(""), "");
    }

    #[test]
    fn test_size_token() {
        assert_eq!(size_token("Olpers Milk 250ml x 6").as_deref(), Some("250ml"));
        assert_eq!(size_token("Dettol Soap 3 pcs").as_deref(), Some("3 pcs"));
        assert_eq!(size_token("Lays Masala"), None);
        assert_eq!(size_token("Basmati Rice 500 gms").as_deref(), Some("500 gms"));
        assert_eq!(size_token("Shan Biryani 50 Gram").as_deref(), Some("50 Gram"));
        assert_eq!(size_token("Rose Water 120 Milliliter").as_deref(), Some("120 Milliliter"));
        // a letter run that merely starts with a unit is not a size
        assert_eq!(size_token("Top 10 lemons"), None);
    }

    #[test]
    fn test_absolute_links_kept() {
        let html = tile("Tea", "500", ".00", "", "https://www.carrefour.pk/mafpak/en/p/7");
        let items = parse_cards(&html, &selectors(), BASE);
        assert_eq!(items[0].item_url, "https://www.carrefour.pk/mafpak/en/p/7");
    }
}
