//! Category table: synonyms, priority order, and the default slug.
//!
//! The built-in table lives in `packages/source/categories/default.toml`
//! and is baked into the binary at compile time via [`include_str!`]. A
//! table with the same shape can be loaded from disk to replace it.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;

use serde::Deserialize;

use crate::SourceError;
use crate::type_mapping::{is_usable_slug, slugify};

/// TOML config embedded at compile time.
const DEFAULT_CATEGORIES_TOML: &str = include_str!("../categories/default.toml");

static BUILTIN: LazyLock<CategoryTable> = LazyLock::new(|| {
    parse_category_toml(DEFAULT_CATEGORIES_TOML)
        .unwrap_or_else(|e| panic!("Failed to parse categories/default.toml: {e}"))
});

/// Maps raw `type` tokens to canonical categories and ranks categories for
/// primary selection.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CategoryTable {
    /// Reserved category for spots without any explicit type.
    #[serde(default = "default_slug")]
    pub default: String,
    /// Categories in descending preference for primary selection.
    #[serde(default)]
    pub priority: Vec<String>,
    /// Raw token (lower-case) to canonical category.
    #[serde(default)]
    pub synonyms: BTreeMap<String, String>,
}

fn default_slug() -> String {
    "other".to_string()
}

impl CategoryTable {
    /// Returns the canonical category for a raw token.
    ///
    /// The lookup is case-insensitive; unknown tokens pass through
    /// lower-cased.
    #[must_use]
    pub fn canonical(&self, token: &str) -> String {
        let lower = token.to_lowercase();
        match self.synonyms.get(&lower) {
            Some(mapped) => mapped.clone(),
            None => lower,
        }
    }
}

impl Default for CategoryTable {
    fn default() -> Self {
        builtin().clone()
    }
}

/// Returns the built-in category table.
///
/// # Panics
///
/// Panics if the embedded TOML is malformed (this is a compile-time
/// guarantee since the config is embedded).
#[must_use]
pub fn builtin() -> &'static CategoryTable {
    &BUILTIN
}

/// Parses a category table from TOML text.
///
/// Synonym keys are lower-cased so lookups stay case-insensitive, and the
/// default slug is normalized.
///
/// # Errors
///
/// Returns [`SourceError::Config`] if the TOML is malformed or the default
/// slug normalizes to nothing.
pub fn parse_category_toml(toml_str: &str) -> Result<CategoryTable, SourceError> {
    let mut table: CategoryTable =
        toml::de::from_str(toml_str).map_err(|e| SourceError::Config {
            message: e.to_string(),
        })?;

    table.default = slugify(&table.default);
    if !is_usable_slug(&table.default) {
        return Err(SourceError::Config {
            message: format!("default category slug {:?} is not usable", table.default),
        });
    }

    table.synonyms = table
        .synonyms
        .into_iter()
        .map(|(raw, canonical)| (raw.to_lowercase(), canonical))
        .collect();

    Ok(table)
}

/// Loads a category table from a TOML file.
///
/// # Errors
///
/// Returns [`SourceError::Io`] if the file cannot be read, or
/// [`SourceError::Config`] if it is not a valid table.
pub fn load_category_table(path: &Path) -> Result<CategoryTable, SourceError> {
    let text = std::fs::read_to_string(path).map_err(|source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let table = parse_category_toml(&text)?;
    log::info!(
        "Loaded category table from {} ({} synonyms)",
        path.display(),
        table.synonyms.len()
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_table_loads() {
        let table = builtin();
        assert_eq!(table.default, "other");
        assert_eq!(table.priority.first().map(String::as_str), Some("pumptrack"));
        assert_eq!(table.synonyms.get("camping").map(String::as_str), Some("stellplatz"));
    }

    #[test]
    fn builtin_priority_contains_default() {
        let table = builtin();
        assert!(table.priority.contains(&table.default));
    }

    #[test]
    fn canonical_lookup_is_case_insensitive() {
        let table = builtin();
        assert_eq!(table.canonical("Playground_Adventure"), "playground");
        assert_eq!(table.canonical("BEACH"), "water");
        assert_eq!(table.canonical("Skatepark"), "skatepark");
    }

    #[test]
    fn custom_table_keys_are_lower_cased() {
        let table = parse_category_toml(
            r#"
            default = "Misc"
            priority = ["zoo"]

            [synonyms]
            Tierpark = "zoo"
            "#,
        )
        .unwrap();
        assert_eq!(table.default, "misc");
        assert_eq!(table.canonical("TIERPARK"), "zoo");
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let table = parse_category_toml("").unwrap();
        assert_eq!(table.default, "other");
        assert!(table.priority.is_empty());
        assert!(table.synonyms.is_empty());
    }

    #[test]
    fn rejects_malformed_toml() {
        let err = parse_category_toml("priority = [").unwrap_err();
        assert!(matches!(err, SourceError::Config { .. }));
    }

    #[test]
    fn rejects_empty_default_slug() {
        let err = parse_category_toml(r#"default = "!!!""#).unwrap_err();
        assert!(matches!(err, SourceError::Config { .. }));
    }

    #[test]
    fn rejects_path_like_default_slug() {
        for raw in ["..", "index.json"] {
            let err = parse_category_toml(&format!("default = {raw:?}")).unwrap_err();
            assert!(matches!(err, SourceError::Config { .. }), "{raw}");
        }
    }

    #[test]
    fn loads_table_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("categories.toml");
        std::fs::write(&path, "[synonyms]\nspielplatz = \"playground\"\n").unwrap();
        let table = load_category_table(&path).unwrap();
        assert_eq!(table.canonical("Spielplatz"), "playground");
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load_category_table(Path::new("/nonexistent/categories.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/categories.toml"));
    }
}
