//! Rendered page snapshot consumed by the compiler.
//!
//! A snapshot lists every element of a rendered page in document order,
//! each with its computed style and on-screen rectangle. It is normally
//! produced by a browser-side collector and handed over as JSON; tests
//! build one in code with the builder methods.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use trellis_core::{BoxRect, CompileError, Result};

/// On-screen rectangle in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, width, height }
    }

    pub fn to_box(&self) -> BoxRect {
        BoxRect::from_xywh(self.left, self.top, self.width, self.height)
    }

    pub fn area(&self) -> f64 {
        self.width.max(0.0) * self.height.max(0.0)
    }
}

/// One element of the snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementSnapshot {
    pub id: u64,
    pub tag: String,
    #[serde(default)]
    pub parent: Option<u64>,
    #[serde(default)]
    pub bounds: Option<Rect>,
    /// Computed CSS values.
    #[serde(default)]
    pub style: IndexMap<String, String>,
    #[serde(default)]
    pub text: Option<String>,
    /// Rectangle of the element's own text run.
    #[serde(default)]
    pub text_bounds: Option<Rect>,
    /// Source attributes (`type`, `name`, `value`, `src`...).
    #[serde(default)]
    pub attributes: IndexMap<String, String>,
    /// Option labels of a `select`.
    #[serde(default)]
    pub options: Vec<String>,
}

impl ElementSnapshot {
    pub fn new(id: u64, tag: impl Into<String>) -> Self {
        Self {
            id,
            tag: tag.into(),
            parent: None,
            bounds: None,
            style: IndexMap::new(),
            text: None,
            text_bounds: None,
            attributes: IndexMap::new(),
            options: Vec::new(),
        }
    }

    pub fn parent(mut self, parent: u64) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn bounds(mut self, left: f64, top: f64, width: f64, height: f64) -> Self {
        self.bounds = Some(Rect::new(left, top, width, height));
        self
    }

    pub fn style(mut self, name: &str, value: &str) -> Self {
        self.style.insert(name.to_string(), value.to_string());
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.text = Some(text.to_string());
        self
    }

    pub fn text_bounds(mut self, left: f64, top: f64, width: f64, height: f64) -> Self {
        self.text_bounds = Some(Rect::new(left, top, width, height));
        self
    }

    pub fn attribute(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_string(), value.to_string());
        self
    }

    pub fn options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }
}

/// Every element of a page, in document order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub elements: Vec<ElementSnapshot>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a snapshot document.
    pub fn from_json(source: &str) -> Result<Self> {
        serde_json::from_str(source).map_err(CompileError::Snapshot)
    }

    pub fn push(&mut self, element: ElementSnapshot) {
        self.elements.push(element);
    }

    pub fn with(mut self, element: ElementSnapshot) -> Self {
        self.push(element);
        self
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_defaults() {
        let snapshot = Snapshot::from_json(
            r#"{ "elements": [
                { "id": 1, "tag": "div", "bounds": { "left": 0, "top": 0, "width": 10, "height": 5 } },
                { "id": 2, "tag": "span", "parent": 1, "text": "hi" }
            ] }"#,
        )
        .unwrap();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.elements[0].bounds.map(|b| b.to_box()), Some(BoxRect::new(0.0, 0.0, 10.0, 5.0)));
        assert_eq!(snapshot.elements[1].parent, Some(1));
        assert!(snapshot.elements[1].style.is_empty());
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(matches!(Snapshot::from_json("[1, 2"), Err(CompileError::Snapshot(_))));
    }

    #[test]
    fn test_builder() {
        let element = ElementSnapshot::new(3, "select")
            .parent(1)
            .bounds(0.0, 0.0, 80.0, 24.0)
            .style("color", "red")
            .options(["One", "Two"]);
        assert_eq!(element.options, vec!["One".to_string(), "Two".to_string()]);
        assert_eq!(element.style.get("color").map(String::as_str), Some("red"));
        assert_eq!(element.bounds.map(|b| b.area()), Some(80.0 * 24.0));
    }
}
