//! Shape-normalization helpers for catalog data.
//!
//! The catalog JSON is hand-maintained, so values arrive as strings or
//! arrays, paths come with backslashes or stray whitespace, and most
//! fields may simply be missing. Everything here is total: bad input
//! degrades to `None` or an empty collection.

use serde_json::Value;

/// First candidate that is a non-blank string, trimmed-length checked but
/// returned as-is.
pub fn pick_str<'a>(candidates: &[Option<&'a str>]) -> Option<&'a str> {
    candidates
        .iter()
        .flatten()
        .copied()
        .find(|s| !s.trim().is_empty())
}

/// Normalize a catalog image path into a public URL path.
///
/// Backslashes become slashes, whitespace right before the file extension
/// is dropped ("hero .png" happens), a leading `static/` is stripped, and
/// bare file names are assumed to live under `/images/`.
pub fn normalize_public_path(p: &str) -> Option<String> {
    let mut out = p.replace('\\', "/").trim().to_string();
    if out.is_empty() {
        return None;
    }

    if let Some(dot) = out.rfind('.') {
        let ext = &out[dot + 1..];
        if !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()) {
            let head = out[..dot].trim_end().to_string();
            out = format!("{}.{}", head, ext);
        }
    }

    if let Some(rest) = out.strip_prefix("static/") {
        out = format!("/{}", rest);
    }

    if !out.starts_with('/') {
        out = if out.contains('/') {
            format!("/{}", out)
        } else {
            format!("/images/{}", out)
        };
    }

    Some(out)
}

/// Lowercase slug: alphanumeric runs joined by single dashes.
pub fn slugify(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut pending_dash = false;
    for c in s.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    out
}

/// Render a JSON scalar the way the site shows it in tables.
pub fn value_display(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Accept a string or an array of strings; trim and drop blanks.
pub fn string_array(v: Option<&Value>) -> Vec<String> {
    match v {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .map(value_display)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        Some(other) => {
            let s = value_display(other).trim().to_string();
            if s.is_empty() {
                Vec::new()
            } else {
                vec![s]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn public_paths_are_normalized() {
        assert_eq!(
            normalize_public_path("static/images/hero.png").as_deref(),
            Some("/images/hero.png")
        );
        assert_eq!(
            normalize_public_path("images\\hero.png").as_deref(),
            Some("/images/hero.png")
        );
        assert_eq!(
            normalize_public_path("hero.png").as_deref(),
            Some("/images/hero.png")
        );
        // stray whitespace before the extension
        assert_eq!(
            normalize_public_path("hero .png").as_deref(),
            Some("/images/hero.png")
        );
        assert_eq!(
            normalize_public_path("/images/hero.png").as_deref(),
            Some("/images/hero.png")
        );
        assert_eq!(normalize_public_path("   "), None);
    }

    #[test]
    fn pick_str_skips_blank_candidates() {
        assert_eq!(
            pick_str(&[Some("  "), None, Some("hero.png")]),
            Some("hero.png")
        );
        assert_eq!(pick_str(&[None, Some("")]), None);
    }

    #[test]
    fn slugify_collapses_punctuation() {
        assert_eq!(slugify("M-P Diameter"), "m-p-diameter");
        assert_eq!(slugify("  Wrist / Forearm  "), "wrist-forearm");
        assert_eq!(slugify("---"), "");
    }

    #[test]
    fn string_array_accepts_both_shapes() {
        assert_eq!(
            string_array(Some(&json!(["a", " b ", ""]))),
            vec!["a".to_string(), "b".to_string()]
        );
        assert_eq!(string_array(Some(&json!("note"))), vec!["note".to_string()]);
        assert_eq!(string_array(Some(&json!(null))), Vec::<String>::new());
        assert_eq!(string_array(None), Vec::<String>::new());
    }
}
