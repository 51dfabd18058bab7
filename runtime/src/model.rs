//! Records produced by a traversal.

use crate::pricing::{self, UnitPrice};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// One normalized catalog row.
///
/// Field names on the wire are fixed by the API consumers; `Base_Unit_Price`
/// travels as a string with two decimal places.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    #[serde(rename = "Category")]
    pub category: String,
    #[serde(rename = "Subcategory")]
    pub subcategory: String,
    #[serde(rename = "Item_Name")]
    pub item_name: String,
    /// Price exactly as rendered on the tile.
    #[serde(rename = "Price")]
    pub raw_price: String,
    #[serde(rename = "Currency")]
    pub currency: String,
    /// Full quantity label, e.g. `"500g - Pack"`.
    #[serde(rename = "Big_Qty")]
    pub raw_quantity: String,
    /// Quantity used for normalization, e.g. `"500g"`.
    #[serde(rename = "Unit_Qty")]
    pub unit_quantity: String,
    #[serde(
        rename = "Base_Unit_Price",
        serialize_with = "serialize_cents",
        deserialize_with = "deserialize_cents"
    )]
    pub base_unit_price: f64,
    #[serde(rename = "Base_Unit")]
    pub base_unit: String,
    #[serde(rename = "Item_URL")]
    pub item_url: String,
}

impl CatalogItem {
    /// Annotate a raw tile with its normalized unit price.
    pub fn from_raw(raw: RawItem, category: &str, subcategory: &str, currency: &str) -> Self {
        let UnitPrice { value, unit } =
            pricing::normalize(&raw.raw_price, &raw.unit_quantity, &raw.name);
        Self {
            category: category.to_string(),
            subcategory: subcategory.to_string(),
            item_name: raw.name,
            raw_price: raw.raw_price,
            currency: currency.to_string(),
            raw_quantity: raw.quantity_label,
            unit_quantity: raw.unit_quantity,
            base_unit_price: value,
            base_unit: unit.to_string(),
            item_url: raw.item_url,
        }
    }
}

fn serialize_cents<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format!("{value:.2}"))
}

fn deserialize_cents<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let s = String::deserialize(deserializer)?;
    s.parse::<f64>().map_err(serde::de::Error::custom)
}

/// Fields read from one item tile, before normalization.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawItem {
    pub name: String,
    /// Integer and fractional price fragments joined, or `"0"`.
    pub raw_price: String,
    /// Quantity label as shown (or the size token found in the name).
    pub quantity_label: String,
    /// Quantity label up to the first `-`, trimmed.
    pub unit_quantity: String,
    /// Absolute detail-page URL, empty when the tile has no link.
    pub item_url: String,
}

/// A subcategory link found on a listing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubcategoryRef {
    pub name: String,
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw() -> RawItem {
        RawItem {
            name: "Dawn Bread".to_string(),
            raw_price: "1,250.00".to_string(),
            quantity_label: "500g - Loaf".to_string(),
            unit_quantity: "500g".to_string(),
            item_url: "https://shop.example/p/123".to_string(),
        }
    }

    #[test]
    fn test_from_raw_normalizes() {
        let item = CatalogItem::from_raw(raw(), "Bakery", "Bread", "PKR");
        assert_eq!(item.base_unit_price, 2500.0);
        assert_eq!(item.base_unit, "1 KG");
        assert_eq!(item.raw_quantity, "500g - Loaf");
        assert_eq!(item.unit_quantity, "500g");
        assert_eq!(item.currency, "PKR");
    }

    #[test]
    fn test_wire_field_names() {
        let item = CatalogItem::from_raw(raw(), "Bakery", "Bread", "PKR");
        let json = serde_json::to_value(&item).unwrap();
        let obj = json.as_object().unwrap();
        for key in [
            "Category",
            "Subcategory",
            "Item_Name",
            "Price",
            "Currency",
            "Big_Qty",
            "Unit_Qty",
            "Base_Unit_Price",
            "Base_Unit",
            "Item_URL",
        ] {
            assert!(obj.contains_key(key), "missing {key}");
        }
        assert_eq!(obj.len(), 10);
        assert_eq!(json["Base_Unit_Price"], "2500.00");
        assert_eq!(json["Price"], "1,250.00");
    }

    #[test]
    fn test_base_unit_price_reads_back_from_string() {
        let item = CatalogItem::from_raw(raw(), "Bakery", "Bread", "PKR");
        let json = serde_json::to_string(&item).unwrap();
        let parsed: CatalogItem = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, item);
    }
}
