//! Raw serde shapes for the hand-maintained catalog JSON.
//!
//! The file has drifted through several schemas over the years, so every
//! field here is optional-with-default and a few are `serde_json::Value`
//! where the editors have used both strings and arrays. Normalization into
//! page-ready data happens in [`crate::catalog::normalize`] and
//! [`crate::catalog::views`]; this module only has to parse everything the
//! historical variants contain.

use rustc_hash::FxHashMap;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawCatalog {
    pub series: Vec<RawSeries>,
    pub families: Option<RawFamilies>,
}

/// Top-level `families` is a dictionary in the current schema and an array
/// in the legacy one.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawFamilies {
    Keyed(FxHashMap<String, RawFamily>),
    Listed(Vec<RawFamily>),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawSeries {
    pub slug: String,
    pub label: String,
    pub description: String,
    pub features: Vec<String>,
    pub family_keys: Vec<String>,
    pub family_groups: Vec<RawFamilyGroup>,
    /// Legacy schema: families embedded directly in the series.
    pub families: Vec<RawFamily>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawFamilyGroup {
    pub title: String,
    pub description: String,
    pub family_keys: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawFamily {
    pub key: String,
    pub slug: String,
    pub title: String,
    pub image: String,
    pub items: Vec<RawItem>,
    pub details: RawDetails,
}

/// One SKU row. Size/side/measurement columns vary per family, so anything
/// we don't model explicitly is carried through in `attrs` for the table
/// renderer, in document order (serde_json's `preserve_order` feature).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawItem {
    pub sku: Option<String>,
    pub item_number: Option<String>,
    pub group: Option<Value>,
    #[serde(flatten)]
    pub attrs: serde_json::Map<String, Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawDetails {
    pub hero_image: String,
    pub gallery: Vec<String>,
    pub description: String,
    pub indications: Vec<String>,
    pub lcode: String,
    /// String or array of strings.
    pub notes: Option<Value>,
    /// String or array of strings.
    pub mp_note: Option<Value>,
    /// Loose maps: itemNumber | sku | "item number", description | Description.
    pub additional_items: Vec<serde_json::Map<String, Value>>,
    pub size_groups: Vec<RawSizeGroup>,
    pub measurement_cards: Vec<RawMeasurementCard>,
    pub sections: Vec<RawSection>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawSizeGroup {
    pub title: String,
    pub image: String,
    pub notes: Option<Value>,
    /// Either full item objects or bare SKU strings referencing `items`.
    pub rows: Vec<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawMeasurementCard {
    pub key: String,
    pub title: String,
    pub note: String,
    pub description: String,
    pub image: String,
    pub href: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawSection {
    pub id: String,
    pub title: String,
    pub body: String,
    pub image: String,
    /// String or array of strings.
    pub steps: Option<Value>,
    /// String or array of strings.
    pub required_materials: Option<Value>,
    /// String or array of strings.
    pub procedure: Option<Value>,
    /// Strings or loose item maps.
    pub suggested_tools: Option<Value>,
    /// `{ "Group Title": [items] }` where items are strings or item maps.
    pub lists: Option<serde_json::Map<String, Value>>,
}

impl RawItem {
    /// Canonical item number: `itemNumber` preferred, `sku` fallback.
    pub fn number(&self) -> String {
        self.item_number
            .as_deref()
            .or(self.sku.as_deref())
            .unwrap_or("")
            .trim()
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn families_parse_as_dict_or_array() {
        let keyed: RawCatalog = serde_json::from_str(
            r#"{"families": {"TS-100": {"key": "TS-100", "title": "Tibial Brace"}}}"#,
        )
        .unwrap();
        match keyed.families {
            Some(RawFamilies::Keyed(map)) => assert!(map.contains_key("TS-100")),
            other => panic!("expected keyed families, got {:?}", other),
        }

        let listed: RawCatalog =
            serde_json::from_str(r#"{"families": [{"key": "TS-100"}]}"#).unwrap();
        match listed.families {
            Some(RawFamilies::Listed(v)) => assert_eq!(v.len(), 1),
            other => panic!("expected listed families, got {:?}", other),
        }
    }

    #[test]
    fn item_keeps_unmodeled_columns() {
        let item: RawItem = serde_json::from_str(
            r#"{"sku": "TS-100-L", "size": "Large", "side": "Left"}"#,
        )
        .unwrap();
        assert_eq!(item.number(), "TS-100-L");
        assert_eq!(item.attrs.get("size").unwrap(), "Large");
    }
}
