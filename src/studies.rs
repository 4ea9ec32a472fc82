//! Clinical studies: a flat JSON list with per-study pages and
//! position-based prev/next navigation.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Study {
    pub slug: String,
    pub title: String,
    pub summary: String,
    /// Body paragraphs.
    pub body: Vec<String>,
    pub citation: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StudyLink {
    pub slug: String,
    pub title: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct StudyPage {
    pub study: Study,
    pub prev: Option<StudyLink>,
    pub next: Option<StudyLink>,
}

#[derive(Debug, Default)]
pub struct StudyStore {
    list: Vec<Study>,
}

impl StudyStore {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read studies: {}", path.display()))?;
        let list: Vec<Study> = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse studies: {}", path.display()))?;
        Ok(Self { list })
    }

    pub fn from_list(list: Vec<Study>) -> Self {
        Self { list }
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn all(&self) -> &[Study] {
        &self.list
    }

    pub fn page(&self, slug: &str) -> Option<StudyPage> {
        let idx = self.list.iter().position(|s| s.slug == slug)?;
        let link = |s: &Study| StudyLink {
            slug: s.slug.clone(),
            title: s.title.clone(),
        };
        Some(StudyPage {
            study: self.list[idx].clone(),
            prev: idx.checked_sub(1).map(|i| link(&self.list[i])),
            next: self.list.get(idx + 1).map(link),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn store() -> StudyStore {
        StudyStore::from_list(
            ["first", "second", "third"]
                .iter()
                .map(|s| Study {
                    slug: s.to_string(),
                    title: s.to_uppercase(),
                    ..Default::default()
                })
                .collect(),
        )
    }

    #[test]
    fn page_links_neighbors_by_position() {
        let s = store();

        let first = s.page("first").unwrap();
        assert_eq!(first.prev, None);
        assert_eq!(first.next.unwrap().slug, "second");

        let mid = s.page("second").unwrap();
        assert_eq!(mid.prev.unwrap().slug, "first");
        assert_eq!(mid.next.unwrap().slug, "third");

        let last = s.page("third").unwrap();
        assert_eq!(last.prev.unwrap().slug, "second");
        assert_eq!(last.next, None);
    }

    #[test]
    fn unknown_slug_is_none() {
        assert!(store().page("nope").is_none());
    }
}
