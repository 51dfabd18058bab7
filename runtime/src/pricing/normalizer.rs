//! Per-unit price inference from unstructured price and size text.
//!
//! Storefront tiles describe the same kind of thing in many ways
//! ("Pack of 6", "200ml x 12", "Lays Masala 50g"). To make prices comparable,
//! [`normalize`] runs two ordered tables against the case-folded
//! `"{item_name} {quantity_text}"` string:
//!
//! 1. [`PACK_RULES`]: multi-pack phrasings. The first rule with an accepted
//!    match fixes the pack count; a count above one yields the price of a
//!    single item inside the pack and ends inference.
//! 2. [`MEASURE_UNITS`]: the first `<number><unit>` weight or volume token,
//!    scaled to one kilogram or one litre.
//!
//! When neither table applies, the parsed price is returned as a plain
//! per-item price. Parsing failures never escape: an unreadable price yields
//! `0.00` labelled [`PER_ITEM`].
//!
//! Several pack rules can match the same text ("12 x 200ml" is both a
//! standalone count and a count-by-size). Table order decides; rules are
//! never combined.

use regex::{Captures, Regex};
use std::sync::OnceLock;

/// Label for the price of one item inside a multi-pack.
pub const PER_PACK_ITEM: &str = "1 Unit";
/// Label for prices scaled to one kilogram.
pub const PER_KILOGRAM: &str = "1 KG";
/// Label for prices scaled up from millilitres to one litre.
pub const PER_LITRE: &str = "1 Litre";
/// Label for prices of items already sold in litres.
pub const PER_LITRE_SHORT: &str = "1 L";
/// Label for a plain per-item price (no size or pack information found).
pub const PER_ITEM: &str = "Unit";

/// Result of price normalization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitPrice {
    /// Non-negative, finite, rounded to cents.
    pub value: f64,
    /// One of the `PER_*` labels.
    pub unit: &'static str,
}

impl UnitPrice {
    fn new(value: f64, unit: &'static str) -> Self {
        Self {
            value: round_cents(value),
            unit,
        }
    }

    /// A derived price, or the plain price when the derivation overflowed.
    fn derived(value: f64, unit: &'static str, price: f64) -> Self {
        if value.is_finite() && value >= 0.0 {
            Self::new(value, unit)
        } else {
            Self::new(price, PER_ITEM)
        }
    }

    /// The value formatted with exactly two decimal places.
    pub fn formatted(&self) -> String {
        format!("{:.2}", self.value)
    }
}

// ── Rule tables ─────────────────────────────────────────────────────────────

/// A multi-pack phrasing. Capture group 1 holds the pack count.
pub struct PackRule {
    /// Short identifier, reported in debug logs.
    pub name: &'static str,
    /// Regex source; `{units}` expands to the size-unit alternation.
    pattern: &'static str,
    /// Extra check on a match before its count is used.
    accept: fn(&Captures<'_>) -> bool,
}

fn any_match(_: &Captures<'_>) -> bool {
    true
}

/// `x 12` and `x 4 cans` count; `x 12kg`, `x 2 kg` and `x 1.5` are sizes.
fn no_size_suffix(caps: &Captures<'_>) -> bool {
    caps.get(2).is_none()
}

/// Weight and volume spellings, longest first. Shared with size-token
/// detection in item names.
pub(crate) const SIZE_UNITS: &str = "kg|grams|gram|gms|gm|g|millilitres|milliliters|millilitre|milliliter|ml|litres|liters|litre|liter|ltr|lt|l";

/// Multi-pack phrasings in priority order.
pub const PACK_RULES: &[PackRule] = &[
    PackRule {
        name: "pack_of",
        pattern: r"\bpack\s*of\s*(\d+)",
        accept: any_match,
    },
    PackRule {
        name: "pieces",
        pattern: r"(?:^|[^\d.])(\d+)\s*(?:pcs|pc|pieces)\b",
        accept: any_match,
    },
    PackRule {
        name: "units",
        pattern: r"(?:^|[^\d.])(\d+)\s*units?\b",
        accept: any_match,
    },
    PackRule {
        name: "packs",
        pattern: r"(?:^|[^\d.])(\d+)\s*packs?\b",
        accept: any_match,
    },
    PackRule {
        name: "times_count",
        pattern: r"(?:^|[^a-z0-9])[x×]\s*(\d+)(\.\d|[a-z]|\s+(?:{units})\b)?",
        accept: no_size_suffix,
    },
    PackRule {
        name: "count_times",
        pattern: r"(?:^|[^\d.])(\d+)\s*[x×](?:\s|$)",
        accept: any_match,
    },
    PackRule {
        name: "count_by_size",
        pattern: r"(?:^|[^\d.])(\d+)\s*[x×]\s*\d+(?:\.\d+)?\s*(?:{units})\b",
        accept: any_match,
    },
    PackRule {
        name: "size_by_count",
        pattern: r"\d+(?:\.\d+)?\s*(?:{units})\s*[x×]\s*(\d+)",
        accept: any_match,
    },
];

/// A weight or volume unit and how to scale a price to its base unit.
pub struct MeasureUnit {
    /// Spellings that select this unit.
    pub spellings: &'static [&'static str],
    /// Multiplier applied to `price / quantity`.
    pub scale: f64,
    /// Base-unit label of the result.
    pub label: &'static str,
}

/// Weight and volume units recognized by the measure pass.
pub const MEASURE_UNITS: &[MeasureUnit] = &[
    MeasureUnit {
        spellings: &["g", "gm", "gms", "gram", "grams"],
        scale: 1000.0,
        label: PER_KILOGRAM,
    },
    MeasureUnit {
        spellings: &["kg"],
        scale: 1.0,
        label: PER_KILOGRAM,
    },
    MeasureUnit {
        spellings: &["ml", "milliliter", "milliliters", "millilitre", "millilitres"],
        scale: 1000.0,
        label: PER_LITRE,
    },
    MeasureUnit {
        spellings: &["l", "lt", "ltr", "liter", "liters", "litre", "litres"],
        scale: 1.0,
        label: PER_LITRE_SHORT,
    },
];

fn pack_regexes() -> &'static [Regex] {
    static COMPILED: OnceLock<Vec<Regex>> = OnceLock::new();
    COMPILED.get_or_init(|| {
        PACK_RULES
            .iter()
            .map(|rule| {
                Regex::new(&rule.pattern.replace("{units}", SIZE_UNITS))
                    .expect("pack rule regex is valid")
            })
            .collect()
    })
}

fn measure_regex() -> &'static Regex {
    static COMPILED: OnceLock<Regex> = OnceLock::new();
    COMPILED.get_or_init(|| {
        Regex::new(&format!(r"(\d+(?:\.\d+)?)\s*({SIZE_UNITS})\b"))
            .expect("measure regex is valid")
    })
}

// ── Public API ──────────────────────────────────────────────────────────────

/// Convert a raw price plus quantity/name text into a per-unit price.
///
/// Total: every input produces a non-negative, finite value rounded to cents.
pub fn normalize(raw_price: &str, quantity_text: &str, item_name: &str) -> UnitPrice {
    let Some(price) = parse_price(raw_price) else {
        return UnitPrice::new(0.0, PER_ITEM);
    };

    let text = format!("{item_name} {quantity_text}").to_lowercase();

    if let Some((rule, count)) = pack_count(&text) {
        if count > 1 {
            tracing::debug!(rule, count, "multi-pack price");
            return UnitPrice::derived(price / f64::from(count), PER_PACK_ITEM, price);
        }
    }

    if let Some((quantity, unit)) = measure(&text) {
        if quantity > 0.0 {
            return UnitPrice::derived(price / quantity * unit.scale, unit.label, price);
        }
    }

    UnitPrice::new(price, PER_ITEM)
}

/// Parse a storefront price, discarding currency symbols and separators.
///
/// Keeps digits and dots, then trims dots left over from prefixes such as
/// `"Rs."`. Returns `None` for empty, malformed, or non-finite results.
pub fn parse_price(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    cleaned
        .trim_matches('.')
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
}

/// Find the pack count using the first pack rule with an accepted match.
///
/// Returns the rule name with the count. Expects case-folded text.
pub fn pack_count(text: &str) -> Option<(&'static str, u32)> {
    for (rule, re) in PACK_RULES.iter().zip(pack_regexes()) {
        for caps in re.captures_iter(text) {
            if !(rule.accept)(&caps) {
                continue;
            }
            if let Some(count) = caps.get(1).and_then(|m| m.as_str().parse::<u32>().ok()) {
                return Some((rule.name, count));
            }
        }
    }
    None
}

/// Find the first weight or volume token. Expects case-folded text.
pub fn measure(text: &str) -> Option<(f64, &'static MeasureUnit)> {
    let caps = measure_regex().captures(text)?;
    let quantity = caps.get(1)?.as_str().parse::<f64>().ok()?;
    let spelling = caps.get(2)?.as_str();
    let unit = MEASURE_UNITS
        .iter()
        .find(|u| u.spellings.contains(&spelling))?;
    Some((quantity, unit))
}

fn round_cents(value: f64) -> f64 {
    let scaled = value * 100.0;
    if scaled.is_finite() {
        scaled.round() / 100.0
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_unit_price(result: UnitPrice, value: f64, unit: &str) {
        assert!(
            (result.value - value).abs() < 0.001,
            "expected {value}, got {}",
            result.value
        );
        assert_eq!(result.unit, unit);
    }

    #[test]
    fn test_grams_scale_to_kilogram() {
        assert_unit_price(normalize("Rs. 1,250.00", "500g", ""), 2500.0, PER_KILOGRAM);
    }

    #[test]
    fn test_pack_of_divides_price() {
        assert_unit_price(normalize("300.00", "pack of 6", ""), 50.0, PER_PACK_ITEM);
    }

    #[test]
    fn test_no_pattern_keeps_price() {
        assert_unit_price(normalize("100", "", ""), 100.0, PER_ITEM);
    }

    #[test]
    fn test_unparseable_price_is_zero() {
        assert_unit_price(normalize("abc", "1kg", ""), 0.0, PER_ITEM);
        assert_unit_price(normalize("", "pack of 6", ""), 0.0, PER_ITEM);
        assert_unit_price(normalize("1.250.00", "500g", ""), 0.0, PER_ITEM);
    }

    #[test]
    fn test_parse_price_strips_currency_and_separators() {
        assert_eq!(parse_price("Rs. 1,250.00"), Some(1250.0));
        assert_eq!(parse_price("PKR 499"), Some(499.0));
        assert_eq!(parse_price("Rs.250"), Some(250.0));
        assert_eq!(parse_price("1,099.50"), Some(1099.5));
        assert_eq!(parse_price("free"), None);
        assert_eq!(parse_price(&"9".repeat(400)), None);
    }

    #[test]
    fn test_pieces_units_and_packs() {
        assert_unit_price(normalize("360", "12 pcs", "Farm Eggs"), 30.0, PER_PACK_ITEM);
        assert_unit_price(normalize("450", "3 units", ""), 150.0, PER_PACK_ITEM);
        assert_unit_price(normalize("200", "", "Tissue Box 2 Packs"), 100.0, PER_PACK_ITEM);
    }

    #[test]
    fn test_times_count_after_size() {
        // "x 6" wins over the 1.5L measure.
        assert_unit_price(normalize("720", "1.5L x 6", ""), 120.0, PER_PACK_ITEM);
        assert_unit_price(normalize("1200", "200ml x 24", "Juice"), 50.0, PER_PACK_ITEM);
    }

    #[test]
    fn test_times_count_rejects_size_suffix() {
        // "x 2kg" is a size, not a count.
        assert_eq!(pack_count("rice x 2kg"), None);
        assert_unit_price(normalize("600", "x 2kg", "Rice"), 300.0, PER_KILOGRAM);
    }

    #[test]
    fn test_times_count_before_a_word() {
        assert_unit_price(normalize("300", "x 3 rolls", "Rose Petal Tissue"), 100.0, PER_PACK_ITEM);
        assert_unit_price(normalize("520", "", "Red Bull x 4 cans"), 130.0, PER_PACK_ITEM);
        assert_eq!(pack_count("soap x 6 bars"), Some(("times_count", 6)));
    }

    #[test]
    fn test_times_count_rejects_spaced_unit() {
        assert_eq!(pack_count("flour x 2 kg"), None);
        assert_unit_price(normalize("900", "x 3 litres", ""), 300.0, PER_LITRE_SHORT);
    }

    #[test]
    fn test_decimal_is_not_a_count() {
        assert_eq!(pack_count("2.5 packs"), None);
        assert_eq!(pack_count("1.5 pcs"), None);
        assert_unit_price(normalize("500", "2.5 packs", ""), 500.0, PER_ITEM);
    }

    #[test]
    fn test_count_before_size() {
        assert_eq!(pack_count("12 x 200ml"), Some(("count_times", 12)));
        assert_eq!(pack_count("24x250ml"), Some(("count_by_size", 24)));
        assert_unit_price(normalize("2400", "24x250ml", ""), 100.0, PER_PACK_ITEM);
    }

    #[test]
    fn test_size_by_count_without_spaces() {
        assert_eq!(pack_count("250mlx12"), Some(("size_by_count", 12)));
    }

    #[test]
    fn test_rule_order_is_priority_order() {
        // "pack of 4" outranks the later "x 6".
        assert_eq!(pack_count("pack of 4 x 6"), Some(("pack_of", 4)));
    }

    #[test]
    fn test_multiplier_of_one_falls_through_to_measure() {
        assert_unit_price(normalize("250", "pack of 1 500g", ""), 500.0, PER_KILOGRAM);
    }

    #[test]
    fn test_measure_units() {
        assert_unit_price(normalize("100", "250ml", ""), 400.0, PER_LITRE);
        assert_unit_price(normalize("300", "1.5 ltr", ""), 200.0, PER_LITRE_SHORT);
        assert_unit_price(normalize("500", "2kg", ""), 250.0, PER_KILOGRAM);
        assert_unit_price(normalize("90", "", "Shan Masala 50 gm"), 1800.0, PER_KILOGRAM);
        assert_unit_price(normalize("440", "1 Litre", "Olpers Milk"), 440.0, PER_LITRE_SHORT);
    }

    #[test]
    fn test_size_from_item_name() {
        assert_unit_price(normalize("150", "", "Lays Salted 50g"), 3000.0, PER_KILOGRAM);
    }

    #[test]
    fn test_zero_quantity_falls_back() {
        assert_unit_price(normalize("100", "0g", ""), 100.0, PER_ITEM);
    }

    #[test]
    fn test_words_are_not_units() {
        assert!(measure("5 large eggs").is_none());
        assert!(measure("2 gallon").is_none());
        assert_eq!(pack_count("max 2 per order"), None);
    }

    #[test]
    fn test_results_are_rounded_to_cents() {
        let result = normalize("100", "3 pcs", "");
        assert_eq!(result.value, 33.33);
        assert_eq!(result.formatted(), "33.33");
        assert_eq!(normalize("5", "", "").formatted(), "5.00");
    }

    #[test]
    fn test_normalize_is_total() {
        let prices = ["0", "0.00", "12", "Rs. 99.99", "1e10", ".", "..5", "PKR", "7,00,000"];
        let quantities = [
            "",
            "0.0001g",
            "x",
            "x 0",
            "0 x 0ml",
            "pack of 0",
            "pack of 99999999999999",
            "1.5.5 kg",
            "×××",
            "ünïcödé 5 Ĺ",
        ];
        for price in prices {
            for quantity in quantities {
                let result = normalize(price, quantity, "Item 5 ×");
                assert!(result.value.is_finite(), "{price:?} / {quantity:?}");
                assert!(result.value >= 0.0, "{price:?} / {quantity:?}");
            }
        }
    }
}
