//! Immutable computed-style snapshot.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::geometry::Edges;

/// Computed style of one element, resolved once at ingestion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StyleMap {
    properties: IndexMap<String, String>,
}

/// Flex axis declared by a flex container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlexAxis {
    pub horizontal: bool,
    pub reverse: bool,
}

impl StyleMap {
    pub fn new(properties: IndexMap<String, String>) -> Self {
        Self { properties }
    }

    /// Look up a property value.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(|v| v.trim())
    }

    /// Check a property against a keyword.
    pub fn is(&self, name: &str, keyword: &str) -> bool {
        self.get(name).is_some_and(|v| v.eq_ignore_ascii_case(keyword))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.properties.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Parse a pixel length (`12px`, `12.5px`, `0`). `auto`, percentages and
    /// other units yield `None`.
    pub fn length(&self, name: &str) -> Option<f64> {
        parse_px(self.get(name)?)
    }

    /// Parse a percentage as a fraction (`50%` gives `0.5`).
    pub fn percent(&self, name: &str) -> Option<f64> {
        let value = self.get(name)?.strip_suffix('%')?;
        value.trim().parse::<f64>().ok().map(|p| p / 100.0)
    }

    /// Parse a plain number (`1`, `0.5`).
    pub fn number(&self, name: &str) -> Option<f64> {
        self.get(name)?.parse::<f64>().ok()
    }

    /// Read `<prefix>-<side><suffix>` for all four sides, treating missing
    /// or non-pixel values as zero.
    pub fn edges(&self, prefix: &str, suffix: &str) -> Edges {
        let side = |s: &str| self.length(&format!("{prefix}-{s}{suffix}")).unwrap_or(0.0);
        Edges::new(side("top"), side("right"), side("bottom"), side("left"))
    }

    pub fn margin(&self) -> Edges {
        self.edges("margin", "")
    }

    pub fn padding(&self) -> Edges {
        self.edges("padding", "")
    }

    /// Border widths; a side whose style is `none` contributes nothing.
    pub fn border(&self) -> Edges {
        let mut edges = self.edges("border", "-width");
        if self.is("border-top-style", "none") {
            edges.top = 0.0;
        }
        if self.is("border-right-style", "none") {
            edges.right = 0.0;
        }
        if self.is("border-bottom-style", "none") {
            edges.bottom = 0.0;
        }
        if self.is("border-left-style", "none") {
            edges.left = 0.0;
        }
        edges
    }

    /// `display: none` or `visibility: hidden`.
    pub fn is_hidden(&self) -> bool {
        self.is("display", "none") || self.is("visibility", "hidden") || self.is("visibility", "collapse")
    }

    /// Absolutely or fixed positioned.
    pub fn is_out_of_flow(&self) -> bool {
        self.is("position", "absolute") || self.is("position", "fixed")
    }

    /// Explicit stacking order (`auto` is 0).
    pub fn z_index(&self) -> i32 {
        self.get("z-index").and_then(|v| v.parse().ok()).unwrap_or(0)
    }

    pub fn is_flex_container(&self) -> bool {
        self.is("display", "flex") || self.is("display", "inline-flex")
    }

    pub fn is_table(&self) -> bool {
        self.is("display", "table") || self.is("display", "inline-table")
    }

    /// Declared main axis of a flex container.
    pub fn flex_axis(&self) -> FlexAxis {
        match self.get("flex-direction") {
            Some("column") => FlexAxis { horizontal: false, reverse: false },
            Some("column-reverse") => FlexAxis { horizontal: false, reverse: true },
            Some("row-reverse") => FlexAxis { horizontal: true, reverse: true },
            _ => FlexAxis { horizontal: true, reverse: false },
        }
    }

    /// True when the element grows or shrinks along a flex axis.
    pub fn is_elastic(&self) -> bool {
        self.number("flex-grow").is_some_and(|g| g > 0.0)
            || self.number("flex-shrink").is_some_and(|s| s > 1.0)
    }

    /// Scrolling overflow on the horizontal and vertical axes.
    pub fn scrolls(&self) -> (bool, bool) {
        let scrolling = |v: Option<&str>| matches!(v, Some("auto") | Some("scroll"));
        let both = scrolling(self.get("overflow"));
        (
            both || scrolling(self.get("overflow-x")),
            both || scrolling(self.get("overflow-y")),
        )
    }

    /// Numeric font weight (`bold` is 700).
    pub fn font_weight(&self) -> u16 {
        match self.get("font-weight") {
            Some("bold") | Some("bolder") => 700,
            Some("lighter") => 300,
            Some(v) => v.parse().unwrap_or(400),
            None => 400,
        }
    }

    pub fn is_baseline_aligned(&self) -> bool {
        self.get("vertical-align").map_or(true, |v| v == "baseline")
    }
}

/// Parse a CSS pixel length.
pub fn parse_px(value: &str) -> Option<f64> {
    let value = value.trim();
    if let Some(number) = value.strip_suffix("px") {
        return number.trim().parse().ok();
    }
    match value.parse::<f64>() {
        Ok(n) if n == 0.0 => Some(0.0),
        _ => None,
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for StyleMap {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self::new(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
