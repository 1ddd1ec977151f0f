//! Split a flat spot collection into per-category files.
//!
//! ## Layout
//!
//! ```text
//! <out_dir>/
//!   index.json            [{slug, name, count, file}, ...] sorted by slug
//!   <slug>/spots.json     verbatim spots of that category
//! ```
//!
//! In [`PartitionMode::Replicate`] a spot lands in the bucket of every
//! category it belongs to; in [`PartitionMode::Primary`] only in the bucket
//! of its primary category.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use spotmap_source::parsing::read_spots;
use spotmap_source::progress::ProgressCallback;
use spotmap_source::registry::CategoryTable;
use spotmap_source::type_mapping::{derive_categories, pick_primary};
use spotmap_spot_models::{CategoryIndexEntry, PartitionMode, Spot};

use crate::{CATEGORY_FILE, GenerateError, INDEX_FILE, create_dir_all, write_json};

/// Directory the display layer serves category files from.
pub const DEFAULT_FILE_PREFIX: &str = "data";

/// Options for [`split`] and [`write_partition`].
#[derive(Debug, Clone)]
pub struct SplitOptions {
    /// Which buckets a spot is written to.
    pub mode: PartitionMode,
    /// Prefix of the `file` path recorded in the index. Empty for paths
    /// relative to the partition directory.
    pub file_prefix: String,
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self {
            mode: PartitionMode::default(),
            file_prefix: DEFAULT_FILE_PREFIX.to_string(),
        }
    }
}

/// Spots bucketed by category slug. Buckets keep encounter order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Partition {
    buckets: BTreeMap<String, Vec<Spot>>,
}

impl Partition {
    /// Returns the buckets, ordered by slug.
    #[must_use]
    pub const fn buckets(&self) -> &BTreeMap<String, Vec<Spot>> {
        &self.buckets
    }

    /// Returns the spots of one category, if it has any.
    #[must_use]
    pub fn bucket(&self, slug: &str) -> Option<&[Spot]> {
        self.buckets.get(slug).map(Vec::as_slice)
    }

    /// Builds the category index, sorted by slug.
    #[must_use]
    pub fn index(&self, file_prefix: &str) -> Vec<CategoryIndexEntry> {
        self.buckets
            .iter()
            .map(|(slug, spots)| CategoryIndexEntry {
                slug: slug.clone(),
                name: display_name(slug),
                count: spots.len(),
                file: category_file(file_prefix, slug),
            })
            .collect()
    }
}

/// Buckets spots by category.
#[must_use]
pub fn partition(spots: &[Spot], mode: PartitionMode, table: &CategoryTable) -> Partition {
    let mut buckets: BTreeMap<String, Vec<Spot>> = BTreeMap::new();

    for spot in spots {
        let categories = derive_categories(spot, table);
        match mode {
            PartitionMode::Primary => {
                let primary = pick_primary(&categories, table);
                buckets
                    .entry(primary.to_string())
                    .or_default()
                    .push(spot.clone());
            }
            PartitionMode::Replicate => {
                for category in categories {
                    buckets.entry(category).or_default().push(spot.clone());
                }
            }
        }
    }

    Partition { buckets }
}

/// Returns the slug with its first character upper-cased.
#[must_use]
pub fn display_name(slug: &str) -> String {
    let mut chars = slug.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// Returns the index `file` path of a category.
#[must_use]
pub fn category_file(file_prefix: &str, slug: &str) -> String {
    let prefix = file_prefix.trim_end_matches('/');
    if prefix.is_empty() {
        format!("{slug}/{CATEGORY_FILE}")
    } else {
        format!("{prefix}/{slug}/{CATEGORY_FILE}")
    }
}

/// Writes one file per bucket plus the index into `out_dir`.
///
/// Existing files at those paths are overwritten.
///
/// # Errors
///
/// Returns [`GenerateError`] if a directory or file cannot be written.
pub fn write_partition(
    partition: &Partition,
    out_dir: &Path,
    file_prefix: &str,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<Vec<CategoryIndexEntry>, GenerateError> {
    create_dir_all(out_dir)?;
    progress.set_total(partition.buckets.len() as u64);

    for (slug, spots) in &partition.buckets {
        progress.set_message(format!("Writing {slug}"));
        let dir = out_dir.join(slug);
        create_dir_all(&dir)?;
        write_json(&dir.join(CATEGORY_FILE), spots)?;
        log::debug!("  {slug}: {} spots", spots.len());
        progress.inc(1);
    }

    let index = partition.index(file_prefix);
    write_json(&out_dir.join(INDEX_FILE), &index)?;
    progress.finish(format!("Wrote {} categories", index.len()));

    Ok(index)
}

/// Reads a spot collection, partitions it, and writes the result.
///
/// # Errors
///
/// Returns [`GenerateError`] if the input cannot be read or parsed, or if
/// the output cannot be written.
pub fn split(
    input: &Path,
    out_dir: &Path,
    options: &SplitOptions,
    table: &CategoryTable,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<Vec<CategoryIndexEntry>, GenerateError> {
    let spots = read_spots(input).map_err(|e| GenerateError::source_at(input, e))?;
    log::info!(
        "Splitting {} spots from {} ({} mode)",
        spots.len(),
        input.display(),
        options.mode
    );

    let partition = partition(&spots, options.mode, table);
    let index = write_partition(&partition, out_dir, &options.file_prefix, progress)?;

    log::info!("Split complete: {} categories", index.len());
    for entry in &index {
        log::info!("  - {}: {} -> {}", entry.slug, entry.count, entry.file);
    }

    Ok(index)
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};
    use spotmap_source::progress::null_progress;
    use spotmap_source::registry::builtin;

    use super::*;

    fn spots(value: Value) -> Vec<Spot> {
        serde_json::from_value(value).unwrap()
    }

    fn sample() -> Vec<Spot> {
        spots(json!([
            {"id": "a", "type": ["playground", "wc"]},
            {"id": "b", "type": "lake"},
            {"id": "c"},
            {"id": "d", "type": ["toilet", "pumptrack"]},
        ]))
    }

    fn ids(spots: &[Spot]) -> Vec<&str> {
        spots.iter().filter_map(Spot::id).collect()
    }

    #[test]
    fn replicate_fans_out_to_every_category() {
        let p = partition(&sample(), PartitionMode::Replicate, builtin());
        assert_eq!(ids(p.bucket("playground").unwrap()), vec!["a"]);
        assert_eq!(ids(p.bucket("wc").unwrap()), vec!["a", "d"]);
        assert_eq!(ids(p.bucket("water").unwrap()), vec!["b"]);
        assert_eq!(ids(p.bucket("other").unwrap()), vec!["c"]);
        assert_eq!(ids(p.bucket("pumptrack").unwrap()), vec!["d"]);
    }

    #[test]
    fn primary_places_each_spot_once() {
        let p = partition(&sample(), PartitionMode::Primary, builtin());
        assert_eq!(ids(p.bucket("playground").unwrap()), vec!["a"]);
        assert_eq!(ids(p.bucket("pumptrack").unwrap()), vec!["d"]);
        assert!(p.bucket("wc").is_none());
        let total: usize = p.buckets().values().map(Vec::len).sum();
        assert_eq!(total, 4);
    }

    #[test]
    fn index_is_sorted_with_display_names() {
        let p = partition(&sample(), PartitionMode::Replicate, builtin());
        let index = p.index("data");
        let slugs: Vec<&str> = index.iter().map(|e| e.slug.as_str()).collect();
        assert_eq!(slugs, vec!["other", "playground", "pumptrack", "water", "wc"]);
        assert_eq!(index[1].name, "Playground");
        assert_eq!(index[4].count, 2);
        assert_eq!(index[4].file, "data/wc/spots.json");
    }

    #[test]
    fn display_name_capitalizes_first_character() {
        assert_eq!(display_name("water"), "Water");
        assert_eq!(display_name("1-zoo"), "1-zoo");
        assert_eq!(display_name(""), "");
    }

    #[test]
    fn category_file_handles_prefixes() {
        assert_eq!(category_file("data", "wc"), "data/wc/spots.json");
        assert_eq!(category_file("public/data/", "wc"), "public/data/wc/spots.json");
        assert_eq!(category_file("", "wc"), "wc/spots.json");
    }

    #[test]
    fn writes_category_files_and_index() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("spots.json");
        std::fs::write(
            &input,
            "[{\"id\":\"a\",\"type\":\"beach\",\"extra\":{\"keep\":true},},{\"id\":\"b\"},]",
        )
        .unwrap();
        let out = dir.path().join("data");

        let index = split(
            &input,
            &out,
            &SplitOptions::default(),
            builtin(),
            &null_progress(),
        )
        .unwrap();
        assert_eq!(index.len(), 2);

        let water: Value =
            serde_json::from_str(&std::fs::read_to_string(out.join("water/spots.json")).unwrap())
                .unwrap();
        assert_eq!(water, json!([{"id": "a", "type": "beach", "extra": {"keep": true}}]));

        let written: Vec<CategoryIndexEntry> =
            serde_json::from_str(&std::fs::read_to_string(out.join("index.json")).unwrap())
                .unwrap();
        assert_eq!(written, index);
    }

    #[test]
    fn path_like_types_stay_inside_out_dir() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("spots.json");
        std::fs::write(
            &input,
            r#"[{"id":"a","type":".."},{"id":"b","type":"."},{"id":"c","type":"index.json"}]"#,
        )
        .unwrap();
        let out = dir.path().join("out");

        let index = split(
            &input,
            &out,
            &SplitOptions::default(),
            builtin(),
            &null_progress(),
        )
        .unwrap();

        let slugs: Vec<&str> = index.iter().map(|e| e.slug.as_str()).collect();
        assert_eq!(slugs, vec!["other"]);
        assert_eq!(index[0].count, 3);
        assert!(!dir.path().join("spots.json").exists());
        assert!(!out.join("spots.json").exists());
        assert!(out.join("index.json").is_file());
    }

    #[test]
    fn split_rejects_non_array_input() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("spots.json");
        std::fs::write(&input, "{\"id\":\"a\"}").unwrap();

        let err = split(
            &input,
            &dir.path().join("out"),
            &SplitOptions::default(),
            builtin(),
            &null_progress(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            GenerateError::Source {
                source: spotmap_source::SourceError::Structural { .. },
                ..
            }
        ));
        assert!(err.to_string().contains("spots.json"));
    }
}
