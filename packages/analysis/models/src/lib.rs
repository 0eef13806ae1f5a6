#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Location record, rank, and derived analysis types.
//!
//! These are plain data types shared between the ingestion layer, the
//! geospatial analysis core, and the page renderer. None of them perform
//! I/O; everything derived here is recomputed from the input record list
//! on every invocation.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

// ── Input records ────────────────────────────────────────────────────────

/// A record's competitive ranking position.
///
/// Only [`RankValue::Numeric`] values participate in min/max scaling. The
/// encoded sentinel token that marks [`RankValue::Special`] on the wire is
/// recognized at the ingestion boundary and never seen past it.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum RankValue {
    /// No rank was recorded for this location.
    #[default]
    Unranked,
    /// Ranked at or beyond the tracked ceiling; exact position unknown.
    Special,
    /// A concrete rank position. Lower is better.
    Numeric(f64),
}

impl RankValue {
    /// Returns the numeric rank, if this is a [`RankValue::Numeric`].
    #[must_use]
    pub const fn numeric(self) -> Option<f64> {
        match self {
            Self::Numeric(v) => Some(v),
            Self::Unranked | Self::Special => None,
        }
    }

    /// Whether this is the "beyond the ceiling" sentinel.
    #[must_use]
    pub const fn is_special(self) -> bool {
        matches!(self, Self::Special)
    }
}

/// A single cleaned location row.
///
/// Latitude and longitude are already numerically coerced and range
/// checked by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationRecord {
    /// Latitude in degrees, within [-90, 90].
    pub latitude: f64,
    /// Longitude in degrees, within [-180, 180].
    pub longitude: f64,
    /// Display title for the location.
    pub title: String,
    /// Rank of the location, [`RankValue::Unranked`] when absent.
    #[serde(default)]
    pub rank: RankValue,
    /// Optional detail link.
    #[serde(default)]
    pub url: Option<String>,
}

impl LocationRecord {
    /// Creates an unranked record without a URL.
    #[must_use]
    pub fn new(latitude: f64, longitude: f64, title: impl Into<String>) -> Self {
        Self {
            latitude,
            longitude,
            title: title.into(),
            rank: RankValue::Unranked,
            url: None,
        }
    }

    /// Sets the rank.
    #[must_use]
    pub const fn with_rank(mut self, rank: RankValue) -> Self {
        self.rank = rank;
        self
    }

    /// Sets the detail URL.
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

// ── Bounds & zoom ────────────────────────────────────────────────────────

/// Bounding box and mean center of a record set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bounds {
    /// Maximum latitude.
    pub north: f64,
    /// Minimum latitude.
    pub south: f64,
    /// Maximum longitude.
    pub east: f64,
    /// Minimum longitude.
    pub west: f64,
    /// Arithmetic mean of all latitudes.
    pub center_lat: f64,
    /// Arithmetic mean of all longitudes.
    pub center_lng: f64,
}

impl Bounds {
    /// North/south extent in degrees.
    #[must_use]
    pub fn lat_spread(&self) -> f64 {
        self.north - self.south
    }

    /// East/west extent in degrees.
    #[must_use]
    pub fn lng_spread(&self) -> f64 {
        self.east - self.west
    }

    /// The larger of the two extents.
    #[must_use]
    pub fn max_spread(&self) -> f64 {
        self.lat_spread().max(self.lng_spread())
    }

    /// Whether a point lies inside the box, edges included.
    #[must_use]
    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        (self.south..=self.north).contains(&latitude) && (self.west..=self.east).contains(&longitude)
    }
}

/// Discrete map scale. Higher values are more zoomed in.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ZoomLevel(u8);

impl ZoomLevel {
    /// Wraps a raw zoom value.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    /// Returns the raw zoom value.
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }
}

impl fmt::Display for ZoomLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── Colors ───────────────────────────────────────────────────────────────

/// An 8-bit RGB color, displayed and serialized as `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb {
    /// Creates a color from its channels.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Converts an HSV color to RGB.
    ///
    /// `hue` is in degrees and wraps; `saturation` and `value` are clamped
    /// to [0, 1].
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::many_single_char_names
    )]
    pub fn from_hsv(hue: f64, saturation: f64, value: f64) -> Self {
        let h = hue.rem_euclid(360.0) / 60.0;
        let s = saturation.clamp(0.0, 1.0);
        let v = value.clamp(0.0, 1.0);

        let sector = h.floor();
        let f = h - sector;
        let p = v * (1.0 - s);
        let q = v * s.mul_add(-f, 1.0);
        let t = v * s.mul_add(-(1.0 - f), 1.0);

        let (r, g, b) = match sector as u8 % 6 {
            0 => (v, t, p),
            1 => (q, v, p),
            2 => (p, v, t),
            3 => (p, q, v),
            4 => (t, p, v),
            _ => (v, p, q),
        };

        Self::new(to_channel(r), to_channel(g), to_channel(b))
    }

    /// Linear interpolation between two colors, `t` clamped to [0, 1].
    #[must_use]
    pub fn lerp(self, other: Self, t: f64) -> Self {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| {
            let (a, b) = (f64::from(a), f64::from(b));
            to_channel((b - a).mul_add(t, a) / 255.0)
        };
        Self::new(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }

    /// Squared Euclidean distance between two colors in RGB space.
    #[must_use]
    pub fn distance_sq(self, other: Self) -> u32 {
        let d = |a: u8, b: u8| {
            let diff = u32::from(a.abs_diff(b));
            diff * diff
        };
        d(self.r, other.r) + d(self.g, other.g) + d(self.b, other.b)
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_channel(unit: f64) -> u8 {
    (unit.clamp(0.0, 1.0) * 255.0).round() as u8
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Error returned when a string is not a `#rgb` or `#rrggbb` hex color.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseColorError {
    /// The rejected input.
    pub input: String,
}

impl fmt::Display for ParseColorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid color '{}': expected #rgb or #rrggbb", self.input)
    }
}

impl std::error::Error for ParseColorError {}

impl FromStr for Rgb {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseColorError {
            input: s.to_string(),
        };
        let hex = s.trim().strip_prefix('#').ok_or_else(err)?;
        if !hex.is_ascii() {
            return Err(err());
        }

        let channel = |digits: &str| u8::from_str_radix(digits, 16).map_err(|_| err());

        match hex.len() {
            6 => Ok(Self::new(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            3 => {
                let short = |i: usize| channel(&hex[i..=i]).map(|c| c * 17);
                Ok(Self::new(short(0)?, short(1)?, short(2)?))
            }
            _ => Err(err()),
        }
    }
}

impl TryFrom<String> for Rgb {
    type Error = ParseColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.to_string()
    }
}

/// How a normalized rank position in [0, 1] maps to a color.
///
/// Position 0 is the best rank, position 1 the worst.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Gradient {
    /// Hue rotation in HSV space at fixed saturation and value.
    Hue {
        /// Hue for the best rank, in degrees.
        from_degrees: f64,
        /// Hue for the worst rank, in degrees.
        to_degrees: f64,
        /// HSV saturation, [0, 1].
        saturation: f64,
        /// HSV value, [0, 1].
        value: f64,
    },
    /// Channel-wise linear interpolation between two colors.
    Rgb {
        /// Color for the best rank.
        best: Rgb,
        /// Color for the worst rank.
        worst: Rgb,
    },
}

impl Default for Gradient {
    fn default() -> Self {
        Self::Hue {
            from_degrees: 120.0,
            to_degrees: 0.0,
            saturation: 0.8,
            value: 0.9,
        }
    }
}

impl Gradient {
    /// Color at normalized position `t`, clamped to [0, 1].
    #[must_use]
    pub fn at(&self, t: f64) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        match *self {
            Self::Hue {
                from_degrees,
                to_degrees,
                saturation,
                value,
            } => Rgb::from_hsv(
                (to_degrees - from_degrees).mul_add(t, from_degrees),
                saturation,
                value,
            ),
            Self::Rgb { best, worst } => best.lerp(worst, t),
        }
    }

    /// The color assigned to the best rank.
    #[must_use]
    pub fn best(&self) -> Rgb {
        self.at(0.0)
    }

    /// The color assigned to the worst rank.
    #[must_use]
    pub fn worst(&self) -> Rgb {
        self.at(1.0)
    }
}

/// Named palettes.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PalettePreset {
    /// Green to red hue rotation, grey specials, blue unranked.
    #[default]
    Modern,
    /// Green to purple RGB blend, red specials, plain blue unranked.
    Classic,
}

/// The full set of colors used for marker classification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Palette {
    /// Gradient used for numeric ranks.
    pub gradient: Gradient,
    /// Fixed color for special ranks.
    pub special: Rgb,
    /// Fixed color for unranked records.
    pub unranked: Rgb,
}

impl Palette {
    /// Builds the palette for a preset.
    #[must_use]
    pub const fn preset(preset: PalettePreset) -> Self {
        match preset {
            PalettePreset::Modern => Self {
                gradient: Gradient::Hue {
                    from_degrees: 120.0,
                    to_degrees: 0.0,
                    saturation: 0.8,
                    value: 0.9,
                },
                special: Rgb::new(0x6b, 0x72, 0x80),
                unranked: Rgb::new(0x3b, 0x82, 0xf6),
            },
            PalettePreset::Classic => Self {
                gradient: Gradient::Rgb {
                    best: Rgb::new(0x5c, 0xb8, 0x5c),
                    worst: Rgb::new(0x5e, 0x35, 0xb1),
                },
                special: Rgb::new(0xd9, 0x53, 0x4f),
                unranked: Rgb::new(0x00, 0x7b, 0xff),
            },
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::preset(PalettePreset::Modern)
    }
}

/// Whether unranked records get a visible `"?"` label or a plain marker.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum UnrankedStyle {
    /// Labeled `"?"` marker.
    #[default]
    Labeled,
    /// Unlabeled default marker.
    Plain,
}

/// Display color and label for one record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorAssignment {
    /// Marker color.
    pub color: Rgb,
    /// Short marker label (e.g. `"3"`, `"20+"`, `"?"`).
    pub label: String,
    /// Normalized gradient position for numeric ranks with a spread pool.
    pub scale: Option<f64>,
}

// ── Density & clusters ───────────────────────────────────────────────────

/// One populated cell of the density grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DensityCell {
    /// Latitude band index, 0 at the southern edge.
    pub row: usize,
    /// Longitude band index, 0 at the western edge.
    pub col: usize,
    /// Latitude of the cell center.
    pub center_lat: f64,
    /// Longitude of the cell center.
    pub center_lng: f64,
    /// Number of records in the cell.
    pub count: u64,
    /// Records per square degree.
    pub density: f64,
}

/// Populated density cells plus summary figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DensityAnalysis {
    /// Non-empty cells in row-major order.
    pub cells: Vec<DensityCell>,
    /// Highest density among the cells, 0 when there are none.
    pub max_density: f64,
    /// Number of non-empty cells.
    pub total_cells: usize,
}

/// A greedy proximity group of at least two records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cluster {
    /// Input indices of the members; the seed comes first.
    pub members: Vec<usize>,
    /// Mean member latitude.
    pub center_lat: f64,
    /// Mean member longitude.
    pub center_lng: f64,
    /// Mean of the members' numeric ranks, if any member has one.
    pub avg_rank: Option<f64>,
}

impl Cluster {
    /// Number of member records.
    #[must_use]
    pub fn size(&self) -> usize {
        self.members.len()
    }
}

/// A weighted point for heatmap layers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeatPoint {
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lng: f64,
    /// Relative heat weight.
    pub weight: f64,
}

// ── Summaries ────────────────────────────────────────────────────────────

/// Aggregate figures over the numeric ranks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankPerformance {
    /// Mean numeric rank.
    pub avg_rank: f64,
    /// Lowest (best) numeric rank.
    pub best_rank: f64,
    /// Highest (worst) numeric rank.
    pub worst_rank: f64,
    /// Population variance of the numeric ranks.
    pub rank_variance: f64,
}

/// Rank breakdown for a record set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankSummary {
    /// Number of records analyzed.
    pub total_locations: usize,
    /// Numeric ranks in input order.
    pub numeric_ranks: Vec<f64>,
    /// Records with the special rank.
    pub special_ranks: usize,
    /// Records with no rank.
    pub unranked: usize,
    /// Count per rank bucket (`"Rank N"` or the special label).
    pub distribution: BTreeMap<String, u64>,
    /// Present when at least one numeric rank exists.
    pub performance: Option<RankPerformance>,
}

/// A record paired with its display color.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    /// Input index of the record.
    pub index: usize,
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lng: f64,
    /// Popup title.
    pub title: String,
    /// Popup link.
    pub url: Option<String>,
    /// The record's rank.
    pub rank: RankValue,
    /// Color and label.
    pub assignment: ColorAssignment,
}

// ── Configuration & report ───────────────────────────────────────────────

/// Tunables for the analysis pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct AnalysisConfig {
    /// Density grid resolution per axis.
    pub grid_size: usize,
    /// Planar clustering distance in degrees.
    pub cluster_threshold: f64,
    /// Label used for special ranks.
    pub special_label: String,
    /// Treatment of unranked records.
    pub unranked_style: UnrankedStyle,
    /// Marker colors.
    pub palette: Palette,
}

/// Default density grid resolution.
pub const DEFAULT_GRID_SIZE: usize = 10;

/// Default clustering distance (0.01 degrees, roughly 1 km).
pub const DEFAULT_CLUSTER_THRESHOLD: f64 = 0.01;

/// Default label for special ranks.
pub const DEFAULT_SPECIAL_LABEL: &str = "20+";

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
            cluster_threshold: DEFAULT_CLUSTER_THRESHOLD,
            special_label: DEFAULT_SPECIAL_LABEL.to_string(),
            unranked_style: UnrankedStyle::default(),
            palette: Palette::default(),
        }
    }
}

/// Everything derived from one record list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    /// Bounding box and center.
    pub bounds: Bounds,
    /// Suggested initial zoom.
    pub zoom: ZoomLevel,
    /// One marker per record, in input order.
    pub markers: Vec<Marker>,
    /// Density grid.
    pub density: DensityAnalysis,
    /// Proximity clusters.
    pub clusters: Vec<Cluster>,
    /// Rank breakdown.
    pub summary: RankSummary,
    /// Per-record heat points.
    pub heat: Vec<HeatPoint>,
    /// Per-cell heat points derived from the density grid.
    pub density_heat: Vec<HeatPoint>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgb_displays_as_lowercase_hex() {
        assert_eq!(Rgb::new(0x5c, 0xb8, 0x5c).to_string(), "#5cb85c");
    }

    #[test]
    fn rgb_parses_long_and_short_hex() {
        assert_eq!("#d9534f".parse::<Rgb>().unwrap(), Rgb::new(0xd9, 0x53, 0x4f));
        assert_eq!("#fff".parse::<Rgb>().unwrap(), Rgb::new(255, 255, 255));
    }

    #[test]
    fn rgb_rejects_malformed_hex() {
        assert!("d9534f".parse::<Rgb>().is_err());
        assert!("#d9534".parse::<Rgb>().is_err());
        assert!("#zzzzzz".parse::<Rgb>().is_err());
    }

    #[test]
    fn hsv_primaries_convert() {
        assert_eq!(Rgb::from_hsv(0.0, 1.0, 1.0), Rgb::new(255, 0, 0));
        assert_eq!(Rgb::from_hsv(120.0, 1.0, 1.0), Rgb::new(0, 255, 0));
        assert_eq!(Rgb::from_hsv(240.0, 1.0, 1.0), Rgb::new(0, 0, 255));
        assert_eq!(Rgb::from_hsv(360.0, 1.0, 1.0), Rgb::new(255, 0, 0));
    }

    #[test]
    fn lerp_hits_endpoints() {
        let a = Rgb::new(92, 184, 92);
        let b = Rgb::new(94, 53, 177);
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
        assert_eq!(a.lerp(b, 7.0), b);
    }

    #[test]
    fn default_gradient_runs_green_to_red() {
        let gradient = Gradient::default();
        let best = gradient.best();
        let worst = gradient.worst();
        assert!(best.g > best.r);
        assert!(worst.r > worst.g);
    }

    #[test]
    fn palette_preset_parses_from_str() {
        assert_eq!(
            "classic".parse::<PalettePreset>().unwrap(),
            PalettePreset::Classic
        );
        assert_eq!(PalettePreset::Modern.to_string(), "modern");
    }

    #[test]
    fn rank_value_numeric_accessor() {
        assert_eq!(RankValue::Numeric(4.0).numeric(), Some(4.0));
        assert_eq!(RankValue::Special.numeric(), None);
        assert!(RankValue::Special.is_special());
        assert_eq!(RankValue::default(), RankValue::Unranked);
    }

    #[test]
    fn bounds_spreads_and_containment() {
        let bounds = Bounds {
            north: 41.0,
            south: 40.0,
            east: 30.5,
            west: 29.0,
            center_lat: 40.5,
            center_lng: 29.7,
        };
        assert!((bounds.max_spread() - 1.5).abs() < f64::EPSILON);
        assert!(bounds.contains(41.0, 29.0));
        assert!(!bounds.contains(41.1, 29.0));
    }
}
