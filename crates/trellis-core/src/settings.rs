//! Compiler settings and target capability levels.

use serde::{Deserialize, Serialize};

use crate::error::{CompileError, Result};

/// Platform capability level, ordered oldest to newest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TargetApi {
    #[serde(rename = "16")]
    JellyBean,
    #[serde(rename = "17")]
    JellyBeanMr1,
    #[serde(rename = "19")]
    KitKat,
    #[serde(rename = "21")]
    Lollipop,
    #[serde(rename = "23")]
    Marshmallow,
    #[serde(rename = "26")]
    Oreo,
    #[serde(rename = "28")]
    Pie,
    #[serde(rename = "29")]
    Q,
    #[serde(rename = "30")]
    R,
}

impl TargetApi {
    pub fn level(&self) -> u32 {
        match self {
            Self::JellyBean => 16,
            Self::JellyBeanMr1 => 17,
            Self::KitKat => 19,
            Self::Lollipop => 21,
            Self::Marshmallow => 23,
            Self::Oreo => 26,
            Self::Pie => 28,
            Self::Q => 29,
            Self::R => 30,
        }
    }
}

/// Attribute families gated by capability level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    /// `Start`/`End` margins and constraint names.
    RtlAttributes,
    /// `android:elevation`.
    Elevation,
    /// `layout_columnWeight` in grids.
    GridWeights,
    /// `layout_constraintWidth_percent` and friends.
    PercentDimensions,
    /// Circle constraints.
    CircularPositioning,
}

impl Feature {
    /// Oldest level supporting the feature.
    pub fn minimum(&self) -> TargetApi {
        match self {
            Self::RtlAttributes => TargetApi::JellyBeanMr1,
            Self::Elevation
            | Self::GridWeights
            | Self::PercentDimensions
            | Self::CircularPositioning => TargetApi::Lollipop,
        }
    }
}

/// Feature toggles and tolerances consumed by the compiler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Infer tabular structure for grid-shaped containers.
    pub grid_inference: bool,
    /// Distribute space with layout weights.
    pub weighted_layout: bool,
    /// Anchor free-form containers with constraints rather than relative rules.
    pub constraint_layout: bool,
    /// Largest perpendicular gap across which edges still match.
    pub whitespace_tolerance: f64,
    /// Chain slack below which members are packed.
    pub chain_packed_threshold: f64,
    /// Pixel difference under which two edges count as equal.
    pub edge_tolerance: f64,
    /// Decimal places of percent splits.
    pub percent_accuracy: u32,
    /// Screen density used for px to dp conversion.
    pub resolution_dpi: f64,
    pub target_api: TargetApi,
    /// Prefer start/end attribute names.
    pub locale_direction_rtl: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            grid_inference: true,
            weighted_layout: true,
            constraint_layout: true,
            whitespace_tolerance: 16.0,
            chain_packed_threshold: 14.0,
            edge_tolerance: 0.5,
            percent_accuracy: 2,
            resolution_dpi: 160.0,
            target_api: TargetApi::R,
            locale_direction_rtl: false,
        }
    }
}

impl Settings {
    /// Parse settings from JSON; missing fields take their defaults.
    pub fn from_json(source: &str) -> Result<Self> {
        serde_json::from_str(source).map_err(CompileError::Settings)
    }

    pub fn supports(&self, feature: Feature) -> bool {
        self.target_api >= feature.minimum()
    }

    /// Two coordinates count as the same edge.
    pub fn same_edge(&self, a: f64, b: f64) -> bool {
        (a - b).abs() <= self.edge_tolerance
    }

    /// Convert pixels to density-independent units.
    pub fn to_dp(&self, px: f64) -> f64 {
        px * 160.0 / self.resolution_dpi
    }

    /// Format a pixel length as a `dp` value.
    pub fn format_dp(&self, px: f64) -> String {
        format!("{}dp", format_number(self.to_dp(px)))
    }

    /// Format a pixel font size as an `sp` value.
    pub fn format_sp(&self, px: f64) -> String {
        format!("{}sp", format_number(self.to_dp(px)))
    }

    /// Round to the configured percent accuracy.
    pub fn round_percent(&self, value: f64) -> f64 {
        round_to(value, self.percent_accuracy)
    }
}

/// Round to a number of decimal places.
pub fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}

/// Format a number with at most two decimals and no trailing zeros.
pub fn format_number(value: f64) -> String {
    let rounded = round_to(value, 2);
    if rounded == rounded.trunc() {
        format!("{}", rounded as i64)
    } else {
        let text = format!("{rounded:.2}");
        text.trim_end_matches('0').to_string()
    }
}
