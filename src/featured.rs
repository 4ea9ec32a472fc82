//! Weekly featured-product rotation.
//!
//! The home page shows three family cards picked by a deterministic
//! shuffle of the featured pool: the seed is a 32-bit hash (xmur3) of the
//! ISO week key for the current date in US Eastern time, fed into a
//! mulberry32 generator. Everyone sees the same rotation for a whole
//! week, and it changes without anyone editing the catalog.

use chrono::{Datelike, NaiveDate, Utc};
use chrono_tz::America::New_York;
use rustc_hash::FxHashSet;
use serde::Serialize;

use crate::catalog::normalize::{normalize_public_path, pick_str};
use crate::catalog::store::Catalog;

// ============================================================================
// Week key
// ============================================================================

/// ISO week key for a calendar date, e.g. `2026-W35`. The year is the ISO
/// week-numbering year, so early January can map to week 52/53 of the
/// previous year.
pub fn week_key(date: NaiveDate) -> String {
    let iso = date.iso_week();
    format!("{}-W{}", iso.year(), iso.week())
}

/// Week key for the current moment, using the Eastern-time calendar date.
pub fn week_key_now() -> String {
    week_key(Utc::now().with_timezone(&New_York).date_naive())
}

// ============================================================================
// Seeded PRNG (xmur3 seed, mulberry32 stream)
// ============================================================================

/// xmur3 string hash, folded once through the finalizer. 32-bit wrapping
/// arithmetic throughout so the stream matches across platforms.
pub fn xmur3(s: &str) -> u32 {
    let mut h: u32 = 1779033703 ^ s.len() as u32;
    for c in s.chars() {
        h = (h ^ c as u32).wrapping_mul(3432918353);
        h = h.rotate_left(13);
    }
    h = (h ^ (h >> 16)).wrapping_mul(2246822507);
    h = (h ^ (h >> 13)).wrapping_mul(3266489909);
    h ^ (h >> 16)
}

/// mulberry32: one u32 of state, uniform output in `[0, 1)`.
#[derive(Debug, Clone)]
pub struct Mulberry32 {
    state: u32,
}

impl Mulberry32 {
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    pub fn from_key(key: &str) -> Self {
        Self::new(xmur3(key))
    }

    pub fn next_f64(&mut self) -> f64 {
        self.state = self.state.wrapping_add(0x6d2b_79f5);
        let mut t = self.state;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        f64::from(t ^ (t >> 14)) / 4294967296.0
    }
}

/// Fisher-Yates over a cloned slice; the input is never reordered.
pub fn shuffle_deterministic<T: Clone>(items: &[T], rng: &mut Mulberry32) -> Vec<T> {
    let mut a = items.to_vec();
    for i in (1..a.len()).rev() {
        let j = (rng.next_f64() * (i as f64 + 1.0)).floor() as usize;
        a.swap(i, j);
    }
    a
}

// ============================================================================
// Featured pool
// ============================================================================

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FeaturedCard {
    pub name: String,
    pub desc: String,
    pub sku: String,
    pub img: String,
    pub href: String,
    pub tag: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeaturedDebug {
    pub week: String,
    pub pool_count: usize,
    pub featured_count: usize,
    pub first: Option<String>,
}

fn image_for_family(fam: &crate::catalog::schema::RawFamily) -> Option<String> {
    let d = &fam.details;
    let candidate = pick_str(&[
        Some(&fam.image),
        Some(&d.hero_image),
        d.gallery.first().map(String::as_str),
    ])?;
    normalize_public_path(candidate)
}

/// One card per family reachable through series `familyKeys`, image
/// required, deduplicated by href (first occurrence wins).
pub fn build_pool(catalog: &Catalog) -> Vec<FeaturedCard> {
    let mut seen: FxHashSet<String> = FxHashSet::default();
    let mut out = Vec::new();

    for series in catalog.series() {
        for key in &series.family_keys {
            let Some(fam) = catalog.family_by_key(key) else {
                continue;
            };
            let Some(img) = image_for_family(fam) else {
                continue;
            };
            let href = format!("/catalog/{}", urlencoding::encode(&fam.key));
            if !seen.insert(href.clone()) {
                continue;
            }
            let name = pick_str(&[Some(&fam.title), Some(&fam.key)])
                .unwrap_or("Untitled")
                .to_string();
            let desc = pick_str(&[Some(&fam.details.description), Some(&series.description)])
                .unwrap_or("")
                .to_string();
            out.push(FeaturedCard {
                name,
                desc,
                sku: String::new(),
                img,
                href,
                tag: series.label.clone(),
            });
        }
    }

    out
}

pub const FEATURED_COUNT: usize = 3;

/// The week's featured cards: pool shuffled by the week-key seed, first
/// three taken.
pub fn featured_for_week(catalog: &Catalog, week: &str) -> Vec<FeaturedCard> {
    let pool = build_pool(catalog);
    let mut rng = Mulberry32::from_key(week);
    let mut shuffled = shuffle_deterministic(&pool, &mut rng);
    shuffled.truncate(FEATURED_COUNT);
    shuffled
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn week_key_uses_iso_week_numbering_year() {
        // 2026-01-01 is a Thursday: week 1 of 2026.
        assert_eq!(week_key(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()), "2026-W1");
        // 2025-12-29 is the Monday of that same week.
        assert_eq!(week_key(NaiveDate::from_ymd_opt(2025, 12, 29).unwrap()), "2026-W1");
        // 2027-01-01 is a Friday: still week 53 of 2026.
        assert_eq!(week_key(NaiveDate::from_ymd_opt(2027, 1, 1).unwrap()), "2026-W53");
        assert_eq!(week_key(NaiveDate::from_ymd_opt(2025, 8, 14).unwrap()), "2025-W33");
    }

    #[test]
    fn xmur3_matches_reference_values() {
        assert_eq!(xmur3("2025-W33"), 3607474899);
        assert_eq!(xmur3("2026-W1"), 3547492389);
        assert_eq!(xmur3("2026-W53"), 3977045230);
    }

    #[test]
    fn mulberry32_matches_reference_stream() {
        let mut rng = Mulberry32::from_key("2025-W33");
        let vals: Vec<f64> = (0..4).map(|_| rng.next_f64()).collect();
        let expected = [
            0.48576945485547185,
            0.7699923648033291,
            0.28455845662392676,
            0.6671663725282997,
        ];
        for (got, want) in vals.iter().zip(expected.iter()) {
            assert!((got - want).abs() < 1e-15, "got {}, want {}", got, want);
        }
    }

    #[test]
    fn shuffle_matches_reference_permutation() {
        let items: Vec<usize> = (0..6).collect();
        let mut rng = Mulberry32::from_key("2025-W33");
        assert_eq!(shuffle_deterministic(&items, &mut rng), vec![4, 0, 5, 1, 3, 2]);
        let mut rng = Mulberry32::from_key("2026-W1");
        assert_eq!(shuffle_deterministic(&items, &mut rng), vec![0, 2, 1, 5, 4, 3]);
    }

    #[test]
    fn shuffle_is_a_permutation_and_stable_per_key() {
        let items: Vec<usize> = (0..50).collect();
        let a = shuffle_deterministic(&items, &mut Mulberry32::from_key("2026-W10"));
        let b = shuffle_deterministic(&items, &mut Mulberry32::from_key("2026-W10"));
        assert_eq!(a, b);
        let mut sorted = a.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, items);
    }

    fn pool_catalog() -> Catalog {
        Catalog::from_value(json!({
            "series": [
                {
                    "slug": "fracture",
                    "label": "Fracture Bracing",
                    "description": "Series description.",
                    "familyKeys": ["A", "B", "NO-IMAGE", "A", "MISSING"]
                }
            ],
            "families": {
                "A": {
                    "key": "A",
                    "title": "Alpha Brace",
                    "image": "alpha.png",
                    "details": {"description": "Family description."}
                },
                "B": {
                    "key": "B",
                    "title": "Beta Brace",
                    "details": {"heroImage": "static/images/beta.png"}
                },
                "NO-IMAGE": {"key": "NO-IMAGE", "title": "Imageless"}
            }
        }))
        .unwrap()
    }

    #[test]
    fn pool_requires_an_image_and_dedupes_by_href() {
        let pool = build_pool(&pool_catalog());
        assert_eq!(pool.len(), 2);

        assert_eq!(pool[0].name, "Alpha Brace");
        assert_eq!(pool[0].img, "/images/alpha.png");
        assert_eq!(pool[0].href, "/catalog/A");
        assert_eq!(pool[0].desc, "Family description.");
        assert_eq!(pool[0].tag, "Fracture Bracing");

        // hero image fallback, static/ prefix stripped, series description
        assert_eq!(pool[1].img, "/images/beta.png");
        assert_eq!(pool[1].desc, "Series description.");
    }

    #[test]
    fn featured_is_capped_and_deterministic() {
        let cat = pool_catalog();
        let a = featured_for_week(&cat, "2026-W10");
        let b = featured_for_week(&cat, "2026-W10");
        assert_eq!(a, b);
        assert!(a.len() <= FEATURED_COUNT);
    }
}
