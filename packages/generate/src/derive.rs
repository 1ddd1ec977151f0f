//! Attach scores and badges to every spot of a collection.

use std::collections::BTreeSet;
use std::path::Path;

use spotmap_score::{derive_all, matches_active_badges};
use spotmap_source::parsing::read_spots;
use spotmap_spot_models::{Badge, DerivedSpot, Spot};

use crate::{GenerateError, write_json};

/// Counts reported by [`derive_file`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeriveSummary {
    /// Spots read from the input.
    pub total: usize,
    /// Spots that carried every required badge and were written.
    pub kept: usize,
}

/// Derives every spot and keeps those carrying all `required` badges.
#[must_use]
pub fn derive_spots(spots: &[Spot], required: &BTreeSet<Badge>) -> Vec<DerivedSpot> {
    spots
        .iter()
        .map(derive_all)
        .filter(|derived| matches_active_badges(&derived.spot, required))
        .collect()
}

/// Reads a spot collection, derives it, filters by badges, and writes the
/// result pretty-printed.
///
/// # Errors
///
/// Returns [`GenerateError`] if the input cannot be read or parsed, or if
/// the output cannot be written.
pub fn derive_file(
    input: &Path,
    output: &Path,
    required: &BTreeSet<Badge>,
) -> Result<DeriveSummary, GenerateError> {
    let spots = read_spots(input).map_err(|e| GenerateError::source_at(input, e))?;
    let derived = derive_spots(&spots, required);
    write_json(output, &derived)?;

    let summary = DeriveSummary {
        total: spots.len(),
        kept: derived.len(),
    };
    if required.is_empty() {
        log::info!("Derived {} spots -> {}", summary.total, output.display());
    } else {
        let codes: Vec<&str> = required.iter().map(AsRef::as_ref).collect();
        log::info!(
            "Derived {} spots, {} match [{}] -> {}",
            summary.total,
            summary.kept,
            codes.join(", "),
            output.display()
        );
    }
    Ok(summary)
}
