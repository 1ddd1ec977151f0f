#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Spot scoring.
//!
//! Three scores are derived from a spot's raw attributes:
//!
//! | Score | Range | Terms |
//! |-------|-------|-------|
//! | Safety | 0-4 | road distance, low risk, fenced, sightline (0-2) |
//! | Sanity | 0-5 | toilet, baby toilet, refreshment nearby, shade, parking |
//! | Reset | `none`/`30`/`90`/`ALL` | tiered on the two scores, seats, area, water |
//!
//! Scores read attributes leniently: a malformed attribute counts as
//! absent and its documented default applies. All functions are pure.

pub mod badges;

use serde_json::Value;
use spotmap_spot_models::{
    BADGES_KEY, DerivedSpot, MAX_SAFETY_SCORE, MAX_SANITY_SCORE, RESET_SCORE_KEY, ResetTier,
    SAFETY_SCORE_KEY, SANITY_SCORE_KEY, Spot, is_truthy,
};

pub use badges::{compute_badges, matches_active_badges};

/// Minimum distance to the nearest road, in meters.
const SAFE_ROAD_DISTANCE_M: f64 = 50.0;
/// Minimum area for a clear sightline, in square meters.
const SIGHTLINE_AREA_M2: f64 = 1200.0;
/// Maximum distance to a cafe or ice cream shop, in meters.
const REFRESHMENT_DISTANCE_M: f64 = 150.0;
/// Assumed refreshment distance when unknown.
const UNKNOWN_DISTANCE_M: f64 = 999.0;
/// Minimum shade score.
const MIN_SHADE_SCORE: f64 = 2.0;
/// Minimum parking height clearance, in meters.
const MIN_PARKING_HEIGHT_M: f64 = 2.6;
/// Assumed parking height clearance when unknown.
const DEFAULT_PARKING_HEIGHT_M: f64 = 3.0;

/// Computes the safety score (0-4).
///
/// The sightline term alone contributes up to 2, so the raw sum can reach
/// 5; it saturates at 4.
#[must_use]
pub fn safety_score(spot: &Spot) -> u8 {
    let road = u8::from(spot.number_or("road_distance_m", 0.0) >= SAFE_ROAD_DISTANCE_M);
    let low_risk = u8::from(spot.str("risk_profile").unwrap_or_default().contains("low"));
    let fenced = u8::from(spot.is_truthy("fenced"));
    let sightline = u8::from(!spot.is_truthy("trees"))
        + u8::from(spot.number_or("surface_area_m2", 0.0) >= SIGHTLINE_AREA_M2);

    (road + low_risk + fenced + sightline).min(MAX_SAFETY_SCORE)
}

/// Computes the sanity score (0-5).
#[must_use]
pub fn sanity_score(spot: &Spot) -> u8 {
    let toilet = spot.str("toilet");
    let wc = u8::from(matches!(toilet, Some("yes" | "yes_baby")));
    let baby = u8::from(toilet == Some("yes_baby"));
    let cafe = u8::from(refreshment_nearby(spot));
    let shade = u8::from(spot.number_or("shade_score", 0.0) >= MIN_SHADE_SCORE);
    let parking = u8::from(
        spot.number_or("parking_height_limit_m", DEFAULT_PARKING_HEIGHT_M) >= MIN_PARKING_HEIGHT_M,
    );

    (wc + baby + cafe + shade + parking).min(MAX_SANITY_SCORE)
}

/// Computes the reset tier from scratch.
#[must_use]
pub fn reset_score(spot: &Spot) -> ResetTier {
    reset_tier(spot, safety_score(spot), sanity_score(spot))
}

/// Evaluates the reset tiers top-down; the first tier that holds wins.
fn reset_tier(spot: &Spot, safety: u8, sanity: u8) -> ResetTier {
    let seats = spot.number_or("benches_count", 0.0) + spot.number_or("picnic_tables", 0.0);
    let area = spot.number_or("surface_area_m2", 0.0);

    if sanity >= 4 && safety >= 3 && area >= 1500.0 && (has_water(spot) || area >= 2000.0) {
        ResetTier::All
    } else if sanity >= 3 && safety >= 2 && seats >= 2.0 && area >= 800.0 {
        ResetTier::Ninety
    } else if sanity >= 2 && safety >= 2 && seats >= 1.0 {
        ResetTier::Thirty
    } else {
        ResetTier::None
    }
}

/// Returns whether the spot has a water feature.
///
/// `waterplay` must be truthy and not the literal `"none"`.
#[must_use]
pub fn has_water(spot: &Spot) -> bool {
    spot.get("waterplay")
        .is_some_and(|v| is_truthy(v) && v.as_str() != Some("none"))
}

fn refreshment_nearby(spot: &Spot) -> bool {
    spot.number_or("cafe_distance_m", UNKNOWN_DISTANCE_M) <= REFRESHMENT_DISTANCE_M
        || spot.number_or("ice_distance_m", UNKNOWN_DISTANCE_M) <= REFRESHMENT_DISTANCE_M
}

/// Derives scores and badges for a spot.
///
/// Works on a copy: the input is never mutated. Deriving an already
/// derived spot yields the same scores and badges, since the scores only
/// read raw attributes.
#[must_use]
pub fn derive_all(spot: &Spot) -> DerivedSpot {
    let mut copy = spot.clone();

    let safety_score = safety_score(&copy);
    let sanity_score = sanity_score(&copy);
    let reset_score = reset_tier(&copy, safety_score, sanity_score);

    copy.insert(SAFETY_SCORE_KEY, safety_score);
    copy.insert(SANITY_SCORE_KEY, sanity_score);
    copy.insert(RESET_SCORE_KEY, reset_score.as_ref());

    let badges = compute_badges(&copy);
    copy.insert(
        BADGES_KEY,
        badges
            .iter()
            .map(|b| Value::from(b.as_ref()))
            .collect::<Vec<_>>(),
    );

    DerivedSpot {
        spot: copy,
        safety_score,
        sanity_score,
        reset_score,
        badges,
    }
}
