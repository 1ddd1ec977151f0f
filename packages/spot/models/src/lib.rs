#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Spot record, reset tier, badge, and category index types.
//!
//! This crate defines the shared vocabulary of the spot-map toolchain. A
//! [`Spot`] is kept as an open JSON object so that attributes the toolchain
//! does not know about survive every transform verbatim; typed accessors
//! read the handful of attributes that scoring and classification need.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use strum_macros::{AsRefStr, Display, EnumString};

/// Attribute name the derived safety score is stored under.
pub const SAFETY_SCORE_KEY: &str = "SafetyScore";
/// Attribute name the derived sanity score is stored under.
pub const SANITY_SCORE_KEY: &str = "SanityScore";
/// Attribute name the derived reset tier is stored under.
pub const RESET_SCORE_KEY: &str = "ResetScore";
/// Attribute name the derived badge list is stored under.
pub const BADGES_KEY: &str = "badges";

/// Name of the category index file inside a partition directory. No
/// category may use it as its slug.
pub const INDEX_FILE: &str = "index.json";

/// Upper bound of the safety score.
pub const MAX_SAFETY_SCORE: u8 = 4;
/// Upper bound of the sanity score.
pub const MAX_SANITY_SCORE: u8 = 5;

/// How long a family can comfortably stay at a spot.
///
/// Tiers are totally ordered: `None < Thirty < Ninety < All`.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum ResetTier {
    /// Not suited for a longer stay
    #[default]
    #[serde(rename = "none")]
    #[strum(serialize = "none")]
    None,
    /// Good for about half an hour
    #[serde(rename = "30")]
    #[strum(serialize = "30")]
    Thirty,
    /// Good for about an hour and a half
    #[serde(rename = "90")]
    #[strum(serialize = "90")]
    Ninety,
    /// Good for the whole afternoon
    #[serde(rename = "ALL")]
    #[strum(serialize = "ALL")]
    All,
}

impl ResetTier {
    /// Returns all variants of this enum, lowest tier first.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::None, Self::Thirty, Self::Ninety, Self::All]
    }

    /// Returns the badge that signals this tier, if any.
    #[must_use]
    pub const fn badge(self) -> Option<Badge> {
        match self {
            Self::None => None,
            Self::Thirty => Some(Badge::Reset30),
            Self::Ninety => Some(Badge::Reset90),
            Self::All => Some(Badge::ResetAll),
        }
    }
}

/// Short code signaling one yes/no capability of a spot.
///
/// The declaration order is the order badges are listed in on a derived
/// spot.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum Badge {
    /// Fenced area
    #[serde(rename = "FEN")]
    #[strum(serialize = "FEN")]
    Fenced,
    /// Adequate shade
    #[serde(rename = "SHA")]
    #[strum(serialize = "SHA")]
    Shade,
    /// Water feature present
    #[serde(rename = "WTR")]
    #[strum(serialize = "WTR")]
    Water,
    /// Pump track with multi-level or toddler sections
    #[serde(rename = "PTK")]
    #[strum(serialize = "PTK")]
    Pumptrack,
    /// Cafe or ice cream nearby
    #[serde(rename = "CAF")]
    #[strum(serialize = "CAF")]
    Cafe,
    /// Toilet available
    #[serde(rename = "WC")]
    #[strum(serialize = "WC")]
    Toilet,
    /// Nursing room or changing table
    #[serde(rename = "BRM")]
    #[strum(serialize = "BRM")]
    BabyRoom,
    /// Wind shelter
    #[serde(rename = "WND")]
    #[strum(serialize = "WND")]
    WindShelter,
    /// Structured sport pitch
    #[serde(rename = "STL")]
    #[strum(serialize = "STL")]
    SportPitch,
    /// Reset tier `30`
    #[serde(rename = "RST30")]
    #[strum(serialize = "RST30")]
    Reset30,
    /// Reset tier `90`
    #[serde(rename = "RST90")]
    #[strum(serialize = "RST90")]
    Reset90,
    /// Reset tier `ALL`
    #[serde(rename = "RSTALL")]
    #[strum(serialize = "RSTALL")]
    ResetAll,
}

impl Badge {
    /// Returns all variants of this enum in listing order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Fenced,
            Self::Shade,
            Self::Water,
            Self::Pumptrack,
            Self::Cafe,
            Self::Toilet,
            Self::BabyRoom,
            Self::WindShelter,
            Self::SportPitch,
            Self::Reset30,
            Self::Reset90,
            Self::ResetAll,
        ]
    }

    /// Human-readable description of the capability.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Fenced => "Fenced area",
            Self::Shade => "Adequate shade",
            Self::Water => "Water feature",
            Self::Pumptrack => "Pump track (multi-level or toddler)",
            Self::Cafe => "Cafe or ice cream within 150 m",
            Self::Toilet => "Toilet",
            Self::BabyRoom => "Nursing room or changing table",
            Self::WindShelter => "Wind shelter",
            Self::SportPitch => "Sport pitch",
            Self::Reset30 => "Reset tier 30",
            Self::Reset90 => "Reset tier 90",
            Self::ResetAll => "Reset tier ALL",
        }
    }
}

/// How a spot collection is split into category buckets.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum PartitionMode {
    /// A spot is written to the bucket of every category it belongs to
    #[default]
    Replicate,
    /// A spot is written only to the bucket of its primary category
    Primary,
}

/// One entry of the category index written next to the per-category files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryIndexEntry {
    /// Normalized category identifier.
    pub slug: String,
    /// Display name (slug with its first character capitalized).
    pub name: String,
    /// Number of spots in the category file.
    pub count: usize,
    /// Path of the category file, relative to the display layer root.
    pub file: String,
}

/// Error returned when a spot attribute holds a value of the wrong shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// The attribute that could not be read.
    pub field: String,
    /// What the attribute was expected to hold.
    pub expected: &'static str,
    /// The JSON kind that was found instead.
    pub found: &'static str,
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "attribute '{}': expected {}, found {}",
            self.field, self.expected, self.found
        )
    }
}

impl std::error::Error for FieldError {}

/// Returns the JSON kind of a value, for error messages.
#[must_use]
pub const fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Loose truthiness: everything except `null`, `false`, `0`, `NaN`, and
/// the empty string.
#[must_use]
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// One place record.
///
/// Wraps the raw JSON object. Serializes back to exactly the object it was
/// read from, key order included.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Spot(Map<String, Value>);

impl Spot {
    /// Creates an empty spot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the raw value of an attribute. `null` reads as absent.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|v| !v.is_null())
    }

    /// Sets an attribute, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// Returns the attribute as a string slice, if it is a string.
    #[must_use]
    pub fn str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Returns whether the attribute is present and truthy.
    #[must_use]
    pub fn is_truthy(&self, key: &str) -> bool {
        self.get(key).is_some_and(is_truthy)
    }

    /// Reads a numeric attribute.
    ///
    /// Accepts JSON numbers and strings holding a number. Absent, `null`,
    /// and empty-string attributes read as `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError`] if the attribute holds anything else.
    pub fn number(&self, key: &str) -> Result<Option<f64>, FieldError> {
        let Some(value) = self.get(key) else {
            return Ok(None);
        };
        let malformed = || FieldError {
            field: key.to_string(),
            expected: "number",
            found: value_kind(value),
        };
        match value {
            Value::Number(n) => n.as_f64().map(Some).ok_or_else(malformed),
            Value::String(s) if s.trim().is_empty() => Ok(None),
            Value::String(s) => s.trim().parse::<f64>().map(Some).map_err(|_| malformed()),
            _ => Err(malformed()),
        }
    }

    /// Reads a numeric attribute, falling back to `default` when it is
    /// absent or malformed.
    #[must_use]
    pub fn number_or(&self, key: &str, default: f64) -> f64 {
        self.number(key).ok().flatten().unwrap_or(default)
    }

    /// Returns the explicit `id`, if it is a non-empty string.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.str("id").filter(|id| !id.is_empty())
    }

    /// Returns the raw `id` value of any JSON kind, if it is truthy.
    #[must_use]
    pub fn raw_id(&self) -> Option<&Value> {
        self.get("id").filter(|v| is_truthy(v))
    }

    /// Returns the latitude as stored, preferring `geo.lat` over `lat`.
    #[must_use]
    pub fn latitude(&self) -> Option<&Value> {
        first_truthy([self.geo_field("lat"), self.get("lat")])
    }

    /// Returns the longitude as stored, preferring `geo.lng` over `lng`
    /// over `lon`.
    #[must_use]
    pub fn longitude(&self) -> Option<&Value> {
        first_truthy([self.geo_field("lng"), self.get("lng"), self.get("lon")])
    }

    /// Returns the stable identity used for deduplication.
    ///
    /// A truthy `id` wins, whatever its JSON kind; numbers are keyed by
    /// their text form, so `42` and `"42"` share an identity. Spots
    /// without one are keyed by `name-lat-lng`.
    #[must_use]
    pub fn identity(&self) -> SpotIdentity {
        if let Some(id) = self.raw_id() {
            return SpotIdentity(render_key_part(Some(id)));
        }
        SpotIdentity(format!(
            "{}-{}-{}",
            render_key_part(self.get("name")),
            render_key_part(self.latitude()),
            render_key_part(self.longitude()),
        ))
    }

    /// Borrows the underlying JSON object.
    #[must_use]
    pub const fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Consumes the spot, returning the underlying JSON object.
    #[must_use]
    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }

    fn geo_field(&self, key: &str) -> Option<&Value> {
        self.get("geo")
            .and_then(Value::as_object)
            .and_then(|geo| geo.get(key))
    }
}

impl From<Map<String, Value>> for Spot {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl From<Spot> for Value {
    fn from(spot: Spot) -> Self {
        Self::Object(spot.0)
    }
}

fn first_truthy<'a, const N: usize>(candidates: [Option<&'a Value>; N]) -> Option<&'a Value> {
    candidates.into_iter().flatten().find(|v| is_truthy(v))
}

fn render_key_part(value: Option<&Value>) -> String {
    match value {
        None => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Deduplication key of a spot; see [`Spot::identity`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpotIdentity(String);

impl SpotIdentity {
    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SpotIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A spot with its derived scores and badges attached.
///
/// `spot` already carries the derived attributes under
/// [`SAFETY_SCORE_KEY`], [`SANITY_SCORE_KEY`], [`RESET_SCORE_KEY`] and
/// [`BADGES_KEY`]; the typed fields mirror them. Serializes as `spot`.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedSpot {
    /// Copy of the input spot with the derived attributes attached.
    pub spot: Spot,
    /// Safety score, 0 to [`MAX_SAFETY_SCORE`].
    pub safety_score: u8,
    /// Sanity score, 0 to [`MAX_SANITY_SCORE`].
    pub sanity_score: u8,
    /// Reset tier.
    pub reset_score: ResetTier,
    /// Badges that hold for the spot, in listing order.
    pub badges: Vec<Badge>,
}

impl DerivedSpot {
    /// Returns whether the spot carries the given badge.
    #[must_use]
    pub fn has_badge(&self, badge: Badge) -> bool {
        self.badges.contains(&badge)
    }
}

impl Serialize for DerivedSpot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.spot.serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr as _;

    use serde_json::json;

    use super::*;

    fn spot(value: Value) -> Spot {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn truthiness_follows_loose_rules() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!(0.0)));
        assert!(!is_truthy(&json!("")));
        assert!(is_truthy(&json!("no")));
        assert!(is_truthy(&json!(2)));
        assert!(is_truthy(&json!([])));
        assert!(is_truthy(&json!({})));
    }

    #[test]
    fn number_accepts_numeric_strings() {
        let s = spot(json!({"a": 60, "b": " 2.6 ", "c": "", "d": null}));
        assert_eq!(s.number("a").unwrap(), Some(60.0));
        assert_eq!(s.number("b").unwrap(), Some(2.6));
        assert_eq!(s.number("c").unwrap(), None);
        assert_eq!(s.number("d").unwrap(), None);
        assert_eq!(s.number("missing").unwrap(), None);
    }

    #[test]
    fn number_rejects_malformed_values() {
        let s = spot(json!({"a": {"x": 1}, "b": "far", "c": true}));
        let err = s.number("a").unwrap_err();
        assert_eq!(err.field, "a");
        assert_eq!(err.found, "object");
        assert!(s.number("b").is_err());
        assert!(s.number("c").is_err());
        assert!((s.number_or("a", 999.0) - 999.0).abs() < f64::EPSILON);
    }

    #[test]
    fn identity_prefers_explicit_id() {
        let s = spot(json!({"id": "spot-1", "name": "Park", "lat": 1.0, "lon": 2.0}));
        assert_eq!(s.identity().as_str(), "spot-1");
    }

    #[test]
    fn identity_falls_back_to_name_and_coordinates() {
        let nested = spot(json!({"name": "Park", "geo": {"lat": 51.5, "lng": 7.25}}));
        assert_eq!(nested.identity().as_str(), "Park-51.5-7.25");

        let flat = spot(json!({"name": "Park", "lat": 51.5, "lon": 7.25}));
        assert_eq!(flat.identity().as_str(), "Park-51.5-7.25");

        let empty_id = spot(json!({"id": "", "name": "Park", "lat": 1, "lng": 2}));
        assert_eq!(empty_id.identity().as_str(), "Park-1-2");

        let zero_id = spot(json!({"id": 0, "name": "Park", "lat": 1, "lng": 2}));
        assert_eq!(zero_id.identity().as_str(), "Park-1-2");
    }

    #[test]
    fn numeric_ids_are_identities() {
        let a = spot(json!({"id": 1, "type": "wc"}));
        let b = spot(json!({"id": 2, "type": "wc"}));
        assert_eq!(a.identity().as_str(), "1");
        assert_ne!(a.identity(), b.identity());
        assert_eq!(a.id(), None);
        assert_eq!(a.raw_id(), Some(&json!(1)));

        let string_form = spot(json!({"id": "1"}));
        assert_eq!(string_form.identity(), a.identity());
    }

    #[test]
    fn nested_geo_wins_over_flat_fields() {
        let s = spot(json!({"geo": {"lat": 10.0, "lng": 20.0}, "lat": 1.0, "lng": 2.0}));
        assert_eq!(s.latitude(), Some(&json!(10.0)));
        assert_eq!(s.longitude(), Some(&json!(20.0)));
    }

    #[test]
    fn spot_serializes_verbatim_in_key_order() {
        let text = r#"{"zeta":1,"alpha":{"nested":[1,2]},"id":"x"}"#;
        let s: Spot = serde_json::from_str(text).unwrap();
        assert_eq!(serde_json::to_string(&s).unwrap(), text);
    }

    #[test]
    fn reset_tier_text_form() {
        assert_eq!(ResetTier::All.to_string(), "ALL");
        assert_eq!(ResetTier::from_str("90").unwrap(), ResetTier::Ninety);
        assert!(ResetTier::from_str("all").is_err());
        assert_eq!(serde_json::to_value(ResetTier::None).unwrap(), json!("none"));
        assert!(ResetTier::None < ResetTier::Thirty && ResetTier::Ninety < ResetTier::All);
    }

    #[test]
    fn badge_codes_parse_case_insensitively() {
        assert_eq!(Badge::from_str("fen").unwrap(), Badge::Fenced);
        assert_eq!(Badge::from_str("RSTALL").unwrap(), Badge::ResetAll);
        assert!(Badge::from_str("XYZ").is_err());
        assert_eq!(serde_json::to_value(Badge::BabyRoom).unwrap(), json!("BRM"));
    }

    #[test]
    fn only_reset_tiers_above_none_have_badges() {
        assert_eq!(ResetTier::None.badge(), None);
        for tier in &ResetTier::all()[1..] {
            assert!(tier.badge().is_some(), "{tier:?} has no badge");
        }
    }

    #[test]
    fn partition_mode_parses_case_insensitively() {
        assert_eq!(
            PartitionMode::from_str("Primary").unwrap(),
            PartitionMode::Primary
        );
        assert_eq!(PartitionMode::default(), PartitionMode::Replicate);
        assert_eq!(PartitionMode::Replicate.to_string(), "replicate");
    }
}
