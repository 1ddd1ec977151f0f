//! Category mapping utilities.
//!
//! Maps the raw `type` tag(s) of a spot to normalized category slugs via
//! the [`CategoryTable`], and picks the single primary category used by
//! primary-mode partitioning.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use spotmap_spot_models::{INDEX_FILE, Spot};

use crate::registry::CategoryTable;

/// Runs of characters that may not appear in a slug.
static NON_SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9\-_.]+").expect("valid regex"));

/// Runs of hyphens.
static HYPHENS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-+").expect("valid regex"));

/// Normalizes a category name into a slug.
///
/// The pipeline:
/// 1. Trim and lowercase
/// 2. Transliterate `ä`, `ö`, `ü`, `ß`
/// 3. Replace each run of characters outside `[a-z0-9\-_.]` with `-`
/// 4. Collapse repeated hyphens
/// 5. Trim leading/trailing hyphens
#[must_use]
pub fn slugify(raw: &str) -> String {
    let lower = raw.trim().to_lowercase();
    let transliterated = lower
        .replace('ä', "ae")
        .replace('ö', "oe")
        .replace('ü', "ue")
        .replace('ß', "ss");
    let replaced = NON_SLUG_RE.replace_all(&transliterated, "-");
    let collapsed = HYPHENS_RE.replace_all(&replaced, "-");
    collapsed.trim_matches('-').to_string()
}

/// Returns whether a slug can name a category directory.
///
/// Rejects the empty slug, slugs made only of dots (`.`, `..`), which
/// would resolve outside their category directory, and the index file
/// name along with its temporary sibling.
#[must_use]
pub fn is_usable_slug(slug: &str) -> bool {
    !slug.is_empty()
        && !slug.chars().all(|c| c == '.')
        && slug != INDEX_FILE
        && slug.strip_prefix(INDEX_FILE) != Some(".tmp")
}

/// Derives the category slugs of a spot.
///
/// Reads `type`, falling back to `category` when `type` is absent.
#[must_use]
pub fn derive_categories(spot: &Spot, table: &CategoryTable) -> Vec<String> {
    let raw = spot.get("type").or_else(|| spot.get("category"));
    categories_for_type(raw, table)
}

/// Maps a raw `type` value (string or array of strings) to deduplicated
/// category slugs in first-occurrence order.
///
/// Never returns an empty list: a missing or empty type maps to the
/// table's default slug.
#[must_use]
pub fn categories_for_type(raw: Option<&Value>, table: &CategoryTable) -> Vec<String> {
    let mut categories: Vec<String> = Vec::new();

    for token in raw_tokens(raw) {
        let slug = slugify(&table.canonical(&token));
        if !is_usable_slug(&slug) {
            log::debug!("Dropping category token {token:?}: unusable slug {slug:?}");
            continue;
        }
        if !categories.contains(&slug) {
            categories.push(slug);
        }
    }

    if categories.is_empty() {
        categories.push(table.default.clone());
    }

    categories
}

/// Returns the highest-priority category present in `categories`.
///
/// Categories not named in the priority list rank after it, in encounter
/// order. An empty list yields the table's default slug.
#[must_use]
pub fn pick_primary<'a>(categories: &'a [String], table: &'a CategoryTable) -> &'a str {
    table
        .priority
        .iter()
        .find(|p| categories.contains(p))
        .or_else(|| categories.first())
        .map_or(table.default.as_str(), String::as_str)
}

/// Flattens a raw `type` value into string tokens.
fn raw_tokens(raw: Option<&Value>) -> Vec<String> {
    match raw {
        None | Some(Value::Null | Value::Object(_)) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::Null => None,
                Value::String(s) => Some(s.clone()),
                other => Some(other.to_string()),
            })
            .collect(),
        Some(Value::String(s)) if s.is_empty() => Vec::new(),
        Some(Value::String(s)) => vec![s.clone()],
        Some(Value::Bool(false)) => Vec::new(),
        Some(other) => vec![other.to_string()],
    }
}
