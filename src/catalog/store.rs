//! Catalog loading and lookup indices.
//!
//! `Catalog::load` accepts any of the historical products.json variants
//! (keyed dictionary, legacy top-level array, legacy series-embedded
//! families) and unifies them: one family list, per-series family keys,
//! and two FxHashMap indices (family key/slug and SKU).

use anyhow::{Context, Result};
use rustc_hash::FxHashMap;
use std::path::Path;

use crate::catalog::schema::{RawCatalog, RawFamilies, RawFamily, RawSeries};

/// Points a SKU back at the family that sells it.
#[derive(Debug, Clone)]
pub struct ItemRef {
    pub family_key: String,
    pub family_title: String,
}

pub struct Catalog {
    series: Vec<RawSeries>,
    families: Vec<RawFamily>,
    /// Uppercased family key and slug -> index into `families`.
    by_key: FxHashMap<String, usize>,
    /// Uppercased SKU/item number -> owning family.
    item_index: FxHashMap<String, ItemRef>,
}

impl Catalog {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog: {}", path.display()))?;
        let raw: RawCatalog = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse catalog: {}", path.display()))?;
        Ok(Self::from_raw(raw))
    }

    #[doc(hidden)]
    pub fn from_value(v: serde_json::Value) -> Result<Self> {
        let raw: RawCatalog = serde_json::from_value(v).context("Failed to parse catalog")?;
        Ok(Self::from_raw(raw))
    }

    pub fn from_raw(raw: RawCatalog) -> Self {
        let mut families: Vec<RawFamily> = Vec::new();
        let mut by_key: FxHashMap<String, usize> = FxHashMap::default();

        let register = |fam: RawFamily,
                            families: &mut Vec<RawFamily>,
                            by_key: &mut FxHashMap<String, usize>| {
            let key_u = fam.key.trim().to_uppercase();
            let slug_u = fam.slug.trim().to_uppercase();
            if !key_u.is_empty() && by_key.contains_key(&key_u) {
                return;
            }
            let idx = families.len();
            if !key_u.is_empty() {
                by_key.insert(key_u, idx);
            }
            if !slug_u.is_empty() {
                by_key.entry(slug_u).or_insert(idx);
            }
            families.push(fam);
        };

        // Preferred dictionary (or legacy array) first, then legacy
        // series-embedded families that are not already present.
        match raw.families {
            Some(RawFamilies::Keyed(map)) => {
                let mut entries: Vec<(String, RawFamily)> = map.into_iter().collect();
                entries.sort_by(|a, b| a.0.cmp(&b.0));
                for (map_key, mut fam) in entries {
                    if fam.key.trim().is_empty() {
                        fam.key = map_key;
                    }
                    register(fam, &mut families, &mut by_key);
                }
            }
            Some(RawFamilies::Listed(list)) => {
                for fam in list {
                    register(fam, &mut families, &mut by_key);
                }
            }
            None => {}
        }

        let mut series = raw.series;
        for s in &mut series {
            for fam in s.families.drain(..) {
                let key = if !fam.key.trim().is_empty() {
                    fam.key.clone()
                } else {
                    fam.slug.clone()
                };
                if !key.trim().is_empty()
                    && !s
                        .family_keys
                        .iter()
                        .any(|k| k.to_uppercase() == key.to_uppercase())
                {
                    s.family_keys.push(key);
                }
                register(fam, &mut families, &mut by_key);
            }
        }

        let mut item_index: FxHashMap<String, ItemRef> = FxHashMap::default();
        for fam in &families {
            for item in &fam.items {
                let num = item.number();
                if num.is_empty() {
                    continue;
                }
                item_index
                    .entry(num.to_uppercase())
                    .or_insert_with(|| ItemRef {
                        family_key: fam.key.clone(),
                        family_title: if fam.title.is_empty() {
                            fam.key.clone()
                        } else {
                            fam.title.clone()
                        },
                    });
            }
        }

        Self {
            series,
            families,
            by_key,
            item_index,
        }
    }

    pub fn series(&self) -> &[RawSeries] {
        &self.series
    }

    pub fn family_count(&self) -> usize {
        self.families.len()
    }

    pub fn series_by_slug(&self, slug: &str) -> Option<&RawSeries> {
        self.series.iter().find(|s| s.slug == slug)
    }

    /// Case-insensitive family lookup by key or slug.
    pub fn family_by_key(&self, key: &str) -> Option<&RawFamily> {
        self.by_key
            .get(&key.trim().to_uppercase())
            .map(|&i| &self.families[i])
    }

    /// Family lookup plus the series that owns it (first series listing the
    /// family among its keys).
    pub fn find_family(&self, raw_key: &str) -> Option<(Option<&RawSeries>, &RawFamily)> {
        let fam = self.family_by_key(raw_key)?;
        let key_u = fam.key.to_uppercase();
        let slug_u = fam.slug.to_uppercase();
        let series = self.series.iter().find(|s| {
            s.family_keys
                .iter()
                .any(|fk| fk.to_uppercase() == key_u || (!slug_u.is_empty() && fk.to_uppercase() == slug_u))
        });
        Some((series, fam))
    }

    pub fn item_ref(&self, sku: &str) -> Option<&ItemRef> {
        self.item_index.get(&sku.trim().to_uppercase())
    }
}
