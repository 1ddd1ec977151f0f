//! Merge per-category files back into one flat collection.
//!
//! Reads `index.json` from the partition directory, then every category
//! file it references in index order. Spots are deduplicated by
//! [`Spot::identity`]: the first occurrence wins and later duplicates are
//! dropped. This is what makes a replicate-mode split followed by a merge
//! reproduce the original collection.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;
use spotmap_source::parsing::spots_from_value;
use spotmap_source::progress::ProgressCallback;
use spotmap_spot_models::{CategoryIndexEntry, Spot, value_kind};

use crate::{CATEGORY_FILE, GenerateError, INDEX_FILE, write_json};

/// Result of a merge.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergeOutcome {
    /// Deduplicated spots in first-occurrence order.
    pub spots: Vec<Spot>,
    /// Number of records dropped as duplicates.
    pub duplicates: usize,
}

/// Deduplicates spots by identity, keeping the first occurrence.
#[must_use]
pub fn dedupe(spots: impl IntoIterator<Item = Spot>) -> MergeOutcome {
    let mut seen = BTreeSet::new();
    let mut outcome = MergeOutcome::default();

    for spot in spots {
        if seen.insert(spot.identity()) {
            outcome.spots.push(spot);
        } else {
            outcome.duplicates += 1;
        }
    }

    outcome
}

/// Reads the category index of a partition directory.
///
/// # Errors
///
/// Returns [`GenerateError`] if the index cannot be read, is not JSON, is
/// not an array, or has malformed entries.
pub fn read_index(base_dir: &Path) -> Result<Vec<CategoryIndexEntry>, GenerateError> {
    let path = base_dir.join(INDEX_FILE);
    let value = read_json(&path)?;

    if !value.is_array() {
        return Err(GenerateError::Structural {
            path,
            message: format!("expected a JSON array, found {}", value_kind(&value)),
        });
    }

    serde_json::from_value(value).map_err(|source| GenerateError::Json { path, source })
}

/// Resolves the category file an index entry points to.
///
/// The entry's `file` is tried relative to `base_dir` first. When the index
/// was written with a display-layer prefix that path does not exist, and
/// the canonical `<base_dir>/<slug>/spots.json` layout is used instead.
#[must_use]
pub fn resolve_category_file(base_dir: &Path, entry: &CategoryIndexEntry) -> PathBuf {
    let listed = base_dir.join(&entry.file);
    if !entry.file.is_empty() && listed.is_file() {
        return listed;
    }
    base_dir.join(&entry.slug).join(CATEGORY_FILE)
}

/// Reads every category file of a partition directory and deduplicates
/// the result.
///
/// Fails fast: the first unreadable or malformed category file aborts the
/// merge.
///
/// # Errors
///
/// Returns [`GenerateError`] if the index or any category file cannot be
/// read or parsed.
pub fn merge_dir(
    base_dir: &Path,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<MergeOutcome, GenerateError> {
    let index = read_index(base_dir)?;
    log::info!(
        "Merging {} categories from {}",
        index.len(),
        base_dir.display()
    );
    progress.set_total(index.len() as u64);

    let mut all = Vec::new();
    for entry in &index {
        progress.set_message(format!("Reading {}", entry.slug));
        let path = resolve_category_file(base_dir, entry);
        let spots = spots_from_value(read_json(&path)?)
            .map_err(|e| GenerateError::source_at(&path, e))?;

        if spots.len() != entry.count {
            log::warn!(
                "{}: index lists {} spots, file holds {}",
                path.display(),
                entry.count,
                spots.len()
            );
        }

        all.extend(spots);
        progress.inc(1);
    }

    let outcome = dedupe(all);
    progress.finish(format!("Merged {} unique spots", outcome.spots.len()));
    Ok(outcome)
}

/// Merges a partition directory and writes the flat collection to
/// `output`.
///
/// # Errors
///
/// Returns [`GenerateError`] if reading the partition or writing the output
/// fails. Nothing is written on a read failure.
pub fn merge(
    base_dir: &Path,
    output: &Path,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<MergeOutcome, GenerateError> {
    let outcome = merge_dir(base_dir, progress)?;
    write_json(output, &outcome.spots)?;

    log::info!(
        "Merged {} unique spots ({} duplicates dropped) -> {}",
        outcome.spots.len(),
        outcome.duplicates,
        output.display()
    );
    Ok(outcome)
}

fn read_json(path: &Path) -> Result<Value, GenerateError> {
    let text = std::fs::read_to_string(path).map_err(|source| GenerateError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| GenerateError::Json {
        path: path.to_path_buf(),
        source,
    })
}
