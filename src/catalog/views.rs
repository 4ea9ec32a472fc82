//! Per-page view models.
//!
//! Builders turn the raw catalog shapes into the exact structures the
//! templates (and the JSON endpoints) render: mirrored item-number/SKU
//! columns, linked additional items, normalized sections, size groups and
//! measurement cards.

use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use std::sync::OnceLock;

use crate::catalog::normalize::{pick_str, slugify, string_array, value_display};
use crate::catalog::schema::{RawFamily, RawItem, RawSection, RawSeries, RawSizeGroup};
use crate::catalog::store::Catalog;

// ============================================================================
// View model types
// ============================================================================

/// One SKU table row. `item_number` and `sku` mirror each other when the
/// source row only carries one of them; extra columns pass through in
/// order as label/value pairs.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ItemRow {
    pub item_number: String,
    pub sku: String,
    pub group: String,
    pub attrs: Vec<(String, String)>,
}

/// An additional item or suggested tool, linked back into the catalog
/// when its SKU is known.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LinkedItem {
    pub item_number: String,
    pub description: String,
    pub family_key: String,
    pub family_title: String,
    pub href: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListGroup {
    pub title: String,
    /// Plain string entries (empty when the group holds tools).
    pub texts: Vec<String>,
    /// Linked tool entries (empty when the group holds strings).
    pub tools: Vec<LinkedItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SectionView {
    pub id: String,
    pub title: String,
    pub body: String,
    pub image: String,
    pub steps: Vec<String>,
    pub required_materials: Vec<String>,
    pub procedure: Vec<String>,
    pub suggested_tools: Vec<LinkedItem>,
    pub lists: Vec<ListGroup>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MeasurementCard {
    pub key: String,
    pub title: String,
    pub note: String,
    pub image: String,
    pub href: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SizeGroupView {
    pub title: String,
    pub image: String,
    pub notes: Vec<String>,
    pub rows: Vec<ItemRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FamilyPage {
    pub family: String,
    pub title: String,
    pub hero_image: String,
    pub gallery: Vec<String>,
    pub description: String,
    pub indications: Vec<String>,
    pub lcode: String,
    pub notes: Vec<String>,
    pub mp_note: Vec<String>,
    pub additional_items: Vec<LinkedItem>,
    pub sizes: Vec<ItemRow>,
    pub size_groups: Option<Vec<SizeGroupView>>,
    pub measurement_cards: Vec<MeasurementCard>,
    pub sections: Vec<SectionView>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FamilyCard {
    pub family: String,
    pub title: String,
    pub image: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FamilyGroupView {
    pub title: String,
    pub description: String,
    pub families: Vec<FamilyCard>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SeriesPage {
    pub label: String,
    pub description: String,
    pub features: Vec<String>,
    /// Flat, deduplicated card list.
    pub families: Vec<FamilyCard>,
    pub family_groups: Option<Vec<FamilyGroupView>>,
}

// ============================================================================
// Row normalization
// ============================================================================

pub fn normalize_row(item: &RawItem) -> ItemRow {
    let number = item
        .item_number
        .as_deref()
        .or(item.sku.as_deref())
        .unwrap_or("")
        .to_string();
    let sku = item
        .sku
        .as_deref()
        .or(item.item_number.as_deref())
        .unwrap_or("")
        .to_string();
    let group = item
        .group
        .as_ref()
        .map(value_display)
        .unwrap_or_default();
    let attrs = item
        .attrs
        .iter()
        .map(|(k, v)| (k.clone(), value_display(v)))
        .collect();

    ItemRow {
        item_number: number,
        sku,
        group,
        attrs,
    }
}

/// Rows may be full objects or bare SKU strings referencing `items`.
pub fn normalize_rows(rows: &[Value], items: &[RawItem]) -> Vec<ItemRow> {
    rows.iter()
        .map(|row| match row {
            Value::String(s) => {
                let sku = s.trim();
                items
                    .iter()
                    .find(|it| it.number() == sku)
                    .map(normalize_row)
                    .unwrap_or_else(|| ItemRow {
                        item_number: sku.to_string(),
                        sku: sku.to_string(),
                        group: String::new(),
                        attrs: Vec::new(),
                    })
            }
            other => serde_json::from_value::<RawItem>(other.clone())
                .map(|it| normalize_row(&it))
                .unwrap_or_else(|_| ItemRow {
                    item_number: String::new(),
                    sku: String::new(),
                    group: String::new(),
                    attrs: Vec::new(),
                }),
        })
        .collect()
}

// ============================================================================
// Additional items / suggested tools
// ============================================================================

fn map_str(m: &serde_json::Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| m.get(*k))
        .map(value_display)
        .find(|s| !s.trim().is_empty())
}

pub fn link_additional_items(
    catalog: &Catalog,
    raws: &[serde_json::Map<String, Value>],
) -> Vec<LinkedItem> {
    raws.iter()
        .map(|ai| {
            let item_number =
                map_str(ai, &["itemNumber", "sku", "item number"]).unwrap_or_default();
            let description = map_str(ai, &["description", "Description"])
                .unwrap_or_else(|| item_number.clone());

            match catalog.item_ref(&item_number) {
                Some(r) if !item_number.trim().is_empty() => LinkedItem {
                    href: format!(
                        "/catalog/{}?sku={}",
                        urlencoding::encode(&r.family_key),
                        urlencoding::encode(item_number.trim())
                    ),
                    family_key: r.family_key.clone(),
                    family_title: r.family_title.clone(),
                    item_number,
                    description,
                },
                _ => LinkedItem {
                    item_number,
                    description,
                    family_key: String::new(),
                    family_title: String::new(),
                    href: String::new(),
                },
            }
        })
        .collect()
}

fn link_suggested_tools(catalog: &Catalog, tools: Option<&Value>) -> Vec<LinkedItem> {
    let list: Vec<Value> = match tools {
        None | Some(Value::Null) => return Vec::new(),
        Some(Value::Array(a)) => a.clone(),
        Some(other) => vec![other.clone()],
    };

    let maps: Vec<serde_json::Map<String, Value>> = list
        .into_iter()
        .map(|v| match v {
            Value::Object(m) => m,
            other => {
                let mut m = serde_json::Map::new();
                m.insert("description".to_string(), Value::String(value_display(&other)));
                m
            }
        })
        .collect();

    link_additional_items(catalog, &maps)
}

fn normalize_lists(
    catalog: &Catalog,
    lists: Option<&serde_json::Map<String, Value>>,
) -> Vec<ListGroup> {
    let Some(map) = lists else {
        return Vec::new();
    };
    map.iter()
        .map(|(title, arr)| {
            let has_objects = matches!(arr, Value::Array(a) if a.iter().any(|x| x.is_object()));
            if has_objects {
                let maps: Vec<serde_json::Map<String, Value>> = arr
                    .as_array()
                    .map(|a| {
                        a.iter()
                            .filter_map(|v| v.as_object().cloned())
                            .collect()
                    })
                    .unwrap_or_default();
                ListGroup {
                    title: title.clone(),
                    texts: Vec::new(),
                    tools: link_additional_items(catalog, &maps),
                }
            } else {
                ListGroup {
                    title: title.clone(),
                    texts: string_array(Some(arr)),
                    tools: Vec::new(),
                }
            }
        })
        .collect()
}

// ============================================================================
// Sections and measurement cards
// ============================================================================

fn section_id(raw: &RawSection, index: usize) -> String {
    if !raw.id.trim().is_empty() {
        return raw.id.trim().to_string();
    }
    let slug = slugify(&raw.title);
    if !slug.is_empty() {
        slug
    } else {
        format!("section-{}", index + 1)
    }
}

pub fn normalize_sections(catalog: &Catalog, sections: &[RawSection]) -> Vec<SectionView> {
    sections
        .iter()
        .enumerate()
        .map(|(i, s)| SectionView {
            id: section_id(s, i),
            title: s.title.clone(),
            body: s.body.clone(),
            image: s.image.clone(),
            steps: string_array(s.steps.as_ref()),
            required_materials: string_array(s.required_materials.as_ref()),
            procedure: string_array(s.procedure.as_ref()),
            suggested_tools: link_suggested_tools(catalog, s.suggested_tools.as_ref()),
            lists: normalize_lists(catalog, s.lists.as_ref()),
        })
        .collect()
}

struct CardRule {
    note_pattern: &'static str,
    key: &'static str,
    title: &'static str,
    image_keywords: &'static [&'static str],
}

const CARD_RULES: &[CardRule] = &[
    CardRule {
        note_pattern: r"(?i)m-?\s?p\s*diam",
        key: "mp-diameter",
        title: "M-P Diameter",
        image_keywords: &["mp", "m-p", "m_p", "diameter"],
    },
    CardRule {
        note_pattern: r"(?i)calf",
        key: "calf-circumf",
        title: "Calf Circumference",
        image_keywords: &["calf"],
    },
    CardRule {
        note_pattern: r"(?i)forearm",
        key: "forearm",
        title: "Forearm",
        image_keywords: &["forearm"],
    },
    CardRule {
        note_pattern: r"(?i)wrist",
        key: "wrist",
        title: "Wrist",
        image_keywords: &["wrist"],
    },
    CardRule {
        note_pattern: r"(?i)bicep",
        key: "bicep-circumf",
        title: "Bicep Circumference",
        image_keywords: &["bicep"],
    },
];

fn card_regexes() -> &'static Vec<Regex> {
    static REGEXES: OnceLock<Vec<Regex>> = OnceLock::new();
    REGEXES.get_or_init(|| {
        CARD_RULES
            .iter()
            .map(|r| Regex::new(r.note_pattern).expect("static card rule pattern"))
            .collect()
    })
}

fn image_by_keyword(gallery: &[String], keywords: &[&str]) -> String {
    for kw in keywords {
        if let Some(hit) = gallery.iter().find(|p| p.to_lowercase().contains(kw)) {
            return hit.clone();
        }
    }
    String::new()
}

/// Measurement cards, in order of preference: explicit cards, derived from
/// sections, else keyword rules over notes and gallery image names.
pub fn coerce_measurement_cards(
    fam: &RawFamily,
    sections: &[SectionView],
    notes: &[String],
) -> Vec<MeasurementCard> {
    let d = &fam.details;

    if !d.measurement_cards.is_empty() {
        return d
            .measurement_cards
            .iter()
            .enumerate()
            .map(|(i, m)| {
                let key = if !m.key.trim().is_empty() {
                    m.key.trim().to_string()
                } else {
                    let slug = slugify(&m.title);
                    if slug.is_empty() {
                        format!("card-{}", i + 1)
                    } else {
                        slug
                    }
                };
                let note = if !m.note.is_empty() {
                    m.note.clone()
                } else {
                    m.description.clone()
                };
                let href = if !m.href.is_empty() {
                    m.href.clone()
                } else {
                    format!("#{}", key)
                };
                MeasurementCard {
                    key,
                    title: m.title.clone(),
                    note,
                    image: m.image.clone(),
                    href,
                }
            })
            .collect();
    }

    if !sections.is_empty() {
        return sections
            .iter()
            .map(|s| MeasurementCard {
                key: s.id.clone(),
                title: s.title.clone(),
                note: if !s.body.is_empty() {
                    s.body.clone()
                } else {
                    s.steps.first().cloned().unwrap_or_default()
                },
                image: s.image.clone(),
                href: format!("#{}", s.id),
            })
            .collect();
    }

    let regexes = card_regexes();
    CARD_RULES
        .iter()
        .zip(regexes.iter())
        .filter_map(|(rule, re)| {
            let note = notes.iter().find(|n| re.is_match(n))?;
            Some(MeasurementCard {
                key: rule.key.to_string(),
                title: rule.title.to_string(),
                note: note.clone(),
                image: image_by_keyword(&d.gallery, rule.image_keywords),
                href: format!("#{}", rule.key),
            })
        })
        .collect()
}

// ============================================================================
// Page builders
// ============================================================================

fn build_size_groups(fam: &RawFamily, explicit: &[RawSizeGroup]) -> Option<Vec<SizeGroupView>> {
    if !explicit.is_empty() {
        let groups: Vec<SizeGroupView> = explicit
            .iter()
            .map(|g| SizeGroupView {
                title: if g.title.is_empty() {
                    "Group".to_string()
                } else {
                    g.title.clone()
                },
                image: g.image.clone(),
                notes: string_array(g.notes.as_ref()),
                rows: normalize_rows(&g.rows, &fam.items),
            })
            .filter(|g| !g.rows.is_empty())
            .collect();
        return Some(groups);
    }

    // Implicit grouping by a per-item `group` field, insertion-ordered.
    if fam.items.iter().any(|it| it.group.is_some()) {
        let mut order: Vec<String> = Vec::new();
        let mut buckets: FxBuckets = FxBuckets::default();
        for item in &fam.items {
            let row = normalize_row(item);
            let gkey = item
                .group
                .as_ref()
                .map(value_display)
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "Other".to_string());
            if !buckets.contains_key(&gkey) {
                order.push(gkey.clone());
            }
            buckets.entry(gkey).or_default().push(row);
        }
        let groups = order
            .into_iter()
            .map(|title| {
                let rows = buckets.remove(&title).unwrap_or_default();
                SizeGroupView {
                    title,
                    image: String::new(),
                    notes: Vec::new(),
                    rows,
                }
            })
            .collect();
        return Some(groups);
    }

    None
}

type FxBuckets = rustc_hash::FxHashMap<String, Vec<ItemRow>>;

pub fn build_family_page(catalog: &Catalog, fam: &RawFamily) -> FamilyPage {
    let d = &fam.details;

    let sizes: Vec<ItemRow> = fam.items.iter().map(normalize_row).collect();
    let size_groups = build_size_groups(fam, &d.size_groups);
    let notes = string_array(d.notes.as_ref());
    let sections = normalize_sections(catalog, &d.sections);
    let measurement_cards = coerce_measurement_cards(fam, &sections, &notes);

    FamilyPage {
        family: fam.key.clone(),
        title: if fam.title.is_empty() {
            fam.key.clone()
        } else {
            fam.title.clone()
        },
        hero_image: pick_str(&[Some(&d.hero_image), Some(&fam.image)])
            .unwrap_or("")
            .to_string(),
        gallery: d.gallery.clone(),
        description: d.description.clone(),
        indications: d.indications.clone(),
        lcode: d.lcode.clone(),
        notes,
        mp_note: string_array(d.mp_note.as_ref()),
        additional_items: link_additional_items(catalog, &d.additional_items),
        sizes,
        size_groups,
        measurement_cards,
        sections,
    }
}

fn to_card(fam: &RawFamily) -> FamilyCard {
    FamilyCard {
        family: fam.key.clone(),
        title: if fam.title.is_empty() {
            fam.key.clone()
        } else {
            fam.title.clone()
        },
        image: fam.image.clone(),
    }
}

fn cards_by_keys(catalog: &Catalog, keys: &[String]) -> Vec<FamilyCard> {
    keys.iter()
        .map(|k| match catalog.family_by_key(k) {
            Some(fam) => to_card(fam),
            // Unknown keys still render as a bare card, like the data
            // editors expect while a family page is in flight.
            None => FamilyCard {
                family: k.clone(),
                title: k.clone(),
                image: String::new(),
            },
        })
        .filter(|c| !c.family.is_empty())
        .collect()
}

pub fn build_series_page(catalog: &Catalog, series: &RawSeries) -> SeriesPage {
    let mut families: Vec<FamilyCard>;
    let mut family_groups: Option<Vec<FamilyGroupView>> = None;

    if !series.family_groups.is_empty() {
        let groups: Vec<FamilyGroupView> = series
            .family_groups
            .iter()
            .map(|g| FamilyGroupView {
                title: g.title.clone(),
                description: g.description.clone(),
                families: cards_by_keys(catalog, &g.family_keys),
            })
            .collect();

        let mut seen = rustc_hash::FxHashSet::default();
        families = Vec::new();
        for grp in &groups {
            for card in &grp.families {
                if seen.insert(card.family.clone()) {
                    families.push(card.clone());
                }
            }
        }
        family_groups = Some(groups);
    } else {
        families = cards_by_keys(catalog, &series.family_keys);
    }

    SeriesPage {
        label: if series.label.is_empty() {
            series.slug.clone()
        } else {
            series.label.clone()
        },
        description: series.description.clone(),
        features: series.features.clone(),
        families,
        family_groups,
    }
}
