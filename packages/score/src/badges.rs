//! Badge evaluation.
//!
//! Each [`Badge`] maps to one pure predicate over the raw spot. Unlike the
//! scores, predicates read attributes strictly: a malformed attribute makes
//! the predicate fail. A failed predicate counts as `false` for that badge
//! only, so one bad attribute never blocks the other badges.

use std::collections::BTreeSet;
use std::str::FromStr as _;

use spotmap_spot_models::{Badge, FieldError, RESET_SCORE_KEY, ResetTier, Spot};

use crate::{REFRESHMENT_DISTANCE_M, has_water, reset_score};

type Predicate = fn(&Spot) -> Result<bool, FieldError>;

/// Returns the predicate for a badge.
fn rule(badge: Badge) -> Predicate {
    match badge {
        Badge::Fenced => |s| Ok(s.is_truthy("fenced")),
        Badge::Shade => |s| Ok(s.number("shade_score")?.unwrap_or(0.0) >= 2.0),
        Badge::Water => |s| Ok(has_water(s)),
        Badge::Pumptrack => |s| Ok(matches!(s.str("pumptrack_levels"), Some("multi" | "toddler"))),
        Badge::Cafe => |s| {
            Ok(within_reach(s, "cafe_distance_m") || within_reach(s, "ice_distance_m"))
        },
        Badge::Toilet => |s| Ok(matches!(s.str("toilet"), Some("yes" | "yes_baby"))),
        Badge::BabyRoom => |s| {
            Ok(s.is_truthy("nursing_room")
                || s.is_truthy("changing_table")
                || s.str("toilet") == Some("yes_baby"))
        },
        Badge::WindShelter => |s| Ok(s.number("wind_shelter")?.unwrap_or(0.0) >= 2.0),
        Badge::SportPitch => |s| Ok(s.is_truthy("pitch_family")),
        Badge::Reset30 => |s| Ok(current_tier(s) == ResetTier::Thirty),
        Badge::Reset90 => |s| Ok(current_tier(s) == ResetTier::Ninety),
        Badge::ResetAll => |s| Ok(current_tier(s) == ResetTier::All),
    }
}

/// Whether a distance attribute is known and at most 150 m. A malformed
/// distance only disqualifies itself, never the alternative.
fn within_reach(spot: &Spot, key: &str) -> bool {
    spot.number(key)
        .ok()
        .flatten()
        .is_some_and(|d| d <= REFRESHMENT_DISTANCE_M)
}

/// Reads the tier already attached to the spot, recomputing it when the
/// attribute is missing or not a known tier.
fn current_tier(spot: &Spot) -> ResetTier {
    spot.str(RESET_SCORE_KEY)
        .and_then(|raw| ResetTier::from_str(raw).ok())
        .unwrap_or_else(|| reset_score(spot))
}

/// Evaluates a single badge. A failing predicate counts as `false`.
#[must_use]
pub fn holds(spot: &Spot, badge: Badge) -> bool {
    rule(badge)(spot).unwrap_or_else(|e| {
        log::debug!("Badge {badge} treated as absent: {e}");
        false
    })
}

/// Evaluates every badge predicate, returning the badges that hold in
/// listing order.
#[must_use]
pub fn compute_badges(spot: &Spot) -> Vec<Badge> {
    Badge::all()
        .iter()
        .copied()
        .filter(|&badge| holds(spot, badge))
        .collect()
}

/// Returns whether the spot carries every required badge.
///
/// An empty requirement matches every spot.
#[must_use]
pub fn matches_active_badges(spot: &Spot, required: &BTreeSet<Badge>) -> bool {
    required.iter().all(|&badge| holds(spot, badge))
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;

    fn spot(value: Value) -> Spot {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn evaluates_amenity_badges() {
        let s = spot(json!({
            "fenced": true,
            "pumptrack_levels": "toddler",
            "wind_shelter": 2,
            "pitch_family": "football",
            "changing_table": true,
            "trees": true
        }));
        assert_eq!(
            compute_badges(&s),
            vec![
                Badge::Fenced,
                Badge::Pumptrack,
                Badge::BabyRoom,
                Badge::WindShelter,
                Badge::SportPitch,
            ]
        );
    }

    #[test]
    fn pumptrack_needs_known_level() {
        assert!(holds(&spot(json!({"pumptrack_levels": "multi"})), Badge::Pumptrack));
        assert!(!holds(&spot(json!({"pumptrack_levels": "pro"})), Badge::Pumptrack));
    }

    #[test]
    fn malformed_attribute_only_fails_its_own_badge() {
        let s = spot(json!({
            "shade_score": {"morning": 3},
            "cafe_distance_m": "around the corner",
            "fenced": true,
            "toilet": "yes",
            "trees": true
        }));
        let badges = compute_badges(&s);
        assert!(!badges.contains(&Badge::Shade));
        assert!(!badges.contains(&Badge::Cafe));
        assert!(badges.contains(&Badge::Fenced));
        assert!(badges.contains(&Badge::Toilet));
    }

    #[test]
    fn cafe_badge_accepts_either_distance() {
        assert!(holds(&spot(json!({"ice_distance_m": 20})), Badge::Cafe));
        assert!(holds(&spot(json!({"cafe_distance_m": 150})), Badge::Cafe));
        assert!(!holds(&spot(json!({"cafe_distance_m": 151})), Badge::Cafe));
    }

    #[test]
    fn malformed_cafe_distance_does_not_hide_ice_distance() {
        let s = spot(json!({"cafe_distance_m": "unknown", "ice_distance_m": 20}));
        assert!(holds(&s, Badge::Cafe));
        assert_eq!(crate::sanity_score(&s), 2);

        let both_bad = spot(json!({"cafe_distance_m": "unknown", "ice_distance_m": [1]}));
        assert!(!holds(&both_bad, Badge::Cafe));
    }

    #[test]
    fn reset_badges_are_mutually_exclusive() {
        let cases = [
            json!({}),
            json!({"toilet": "yes", "road_distance_m": 80, "benches_count": 1}),
            json!({"toilet": "yes_baby", "fenced": true, "road_distance_m": 80, "cafe_distance_m": 10,
                   "surface_area_m2": 2500, "risk_profile": "low"}),
        ];
        for case in cases {
            let badges = compute_badges(&spot(case.clone()));
            let resets = badges
                .iter()
                .filter(|b| matches!(b, Badge::Reset30 | Badge::Reset90 | Badge::ResetAll))
                .count();
            assert!(resets <= 1, "{case}: {badges:?}");
        }
    }

    #[test]
    fn reset_badge_uses_attached_tier() {
        let s = spot(json!({"ResetScore": "90"}));
        assert!(holds(&s, Badge::Reset90));
        assert!(!holds(&s, Badge::Reset30));
    }

    #[test]
    fn reset_badge_recomputes_unknown_tier() {
        let s = spot(json!({
            "ResetScore": "forever",
            "toilet": "yes",
            "road_distance_m": 80,
            "benches_count": 1
        }));
        assert!(holds(&s, Badge::Reset30));
    }

    #[test]
    fn empty_requirement_matches_everything() {
        let required = BTreeSet::new();
        assert!(matches_active_badges(&Spot::new(), &required));
        assert!(matches_active_badges(
            &spot(json!({"shade_score": [1, 2]})),
            &required
        ));
    }

    #[test]
    fn requirements_are_intersected() {
        let s = spot(json!({"fenced": true, "toilet": "yes"}));
        let both = BTreeSet::from([Badge::Fenced, Badge::Toilet]);
        let with_water = BTreeSet::from([Badge::Fenced, Badge::Water]);
        assert!(matches_active_badges(&s, &both));
        assert!(!matches_active_badges(&s, &with_water));
    }
}
