//! Per-run resource tables.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::table::Table;

/// Words kept when deriving a string resource name.
const NAME_WORDS: usize = 4;

/// A background shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeDrawable {
    /// Fill color resource name.
    pub solid: Option<String>,
    pub stroke: Option<Stroke>,
    /// Corner radius in dp.
    pub corner_radius: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    /// Width in dp.
    pub width: f64,
    /// Color resource name.
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Drawable {
    Shape(ShapeDrawable),
    /// External image referenced by its source path.
    Image { source: String },
}

/// A shared attribute set with an optional parent style.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StyleDefinition {
    /// Qualified attribute names (`android:textSize`) to values.
    pub attributes: IndexMap<String, String>,
    pub parent: Option<String>,
}

/// Every resource produced by one compilation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceTables {
    pub strings: Table<String>,
    /// Color names to `#RRGGBB` / `#AARRGGBB`.
    pub colors: Table<String>,
    pub string_arrays: Table<Vec<String>>,
    pub drawables: Table<Drawable>,
    pub styles: Table<StyleDefinition>,
}

impl ResourceTables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a display string and return its resource name.
    pub fn add_string(&mut self, value: &str) -> String {
        self.strings.intern(&string_name(value), value.to_string())
    }

    /// Intern a CSS color. Returns `None` when the value does not parse.
    pub fn add_color(&mut self, css: &str) -> Option<String> {
        let color = Color::parse(css)?;
        Some(self.colors.intern(&color.resource_name(), color.to_hex()))
    }

    pub fn add_string_array(&mut self, values: &[String]) -> String {
        let base = match values.first() {
            Some(first) => format!("{}_array", string_name(first)),
            None => "array".to_string(),
        };
        self.string_arrays.intern(&base, values.to_vec())
    }

    pub fn add_shape(&mut self, shape: ShapeDrawable) -> String {
        let base = match (&shape.solid, &shape.stroke) {
            (Some(fill), None) => format!("bg_{fill}"),
            (_, Some(_)) => "border".to_string(),
            (None, None) => "shape".to_string(),
        };
        self.drawables.intern(&base, Drawable::Shape(shape))
    }

    /// Intern an image, named after the file stem of its source.
    pub fn add_image(&mut self, source: &str) -> String {
        self.drawables.intern(&image_name(source), Drawable::Image { source: source.to_string() })
    }

    pub fn add_style(&mut self, base: &str, definition: StyleDefinition) -> String {
        self.styles.intern(base, definition)
    }

    /// Total number of resources across every table.
    pub fn len(&self) -> usize {
        self.strings.len() + self.colors.len() + self.string_arrays.len() + self.drawables.len() + self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Name for a string resource: its first words, lowercased and joined with
/// underscores. Values starting with a digit get a `text_` prefix.
pub fn string_name(value: &str) -> String {
    let words: Vec<String> = value
        .split_whitespace()
        .map(|word| {
            word.chars()
                .filter(|c| c.is_ascii_alphanumeric())
                .collect::<String>()
                .to_ascii_lowercase()
        })
        .filter(|word| !word.is_empty())
        .take(NAME_WORDS)
        .collect();
    let name = words.join("_");
    match name.chars().next() {
        None => "text".to_string(),
        Some(c) if c.is_ascii_digit() => format!("text_{name}"),
        Some(_) => name,
    }
}

/// Resource name from an image path: file stem, lowercased, with anything
/// outside `[a-z0-9_]` replaced by `_`.
pub fn image_name(source: &str) -> String {
    let file = source
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
        .rsplit('/')
        .next()
        .unwrap_or_default();
    let stem = file.rsplit_once('.').map_or(file, |(stem, _)| stem);
    let name: String = stem
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    match name.chars().next() {
        None => "image".to_string(),
        Some(c) if c.is_ascii_digit() => format!("img_{name}"),
        Some(_) => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_string_names() {
        assert_eq!(string_name("Hello, World!"), "hello_world");
        assert_eq!(string_name("The quick brown fox jumps"), "the_quick_brown_fox");
        assert_eq!(string_name("42 items"), "text_42_items");
        assert_eq!(string_name("   "), "text");
    }

    #[test]
    fn test_image_names() {
        assert_eq!(image_name("https://cdn.test/img/Logo-Dark.png?v=2"), "logo_dark");
        assert_eq!(image_name("2x.jpg"), "img_2x");
        assert_eq!(image_name(""), "image");
    }

    #[test]
    fn test_string_dedup_and_collision() {
        let mut tables = ResourceTables::new();
        let first = tables.add_string("Sign in");
        assert_eq!(first, "sign_in");
        assert_eq!(tables.add_string("Sign in"), first);
        assert_eq!(tables.add_string("Sign in!"), "sign_in_1");
        assert_eq!(tables.strings.len(), 2);
    }

    #[test]
    fn test_colors_normalize_before_dedup() {
        let mut tables = ResourceTables::new();
        assert_eq!(tables.add_color("#f00").as_deref(), Some("red"));
        assert_eq!(tables.add_color("rgb(255, 0, 0)").as_deref(), Some("red"));
        assert_eq!(tables.colors.get("red").map(String::as_str), Some("#FF0000"));
        assert_eq!(tables.add_color("inherit"), None);
        assert_eq!(tables.colors.len(), 1);
    }

    #[test]
    fn test_shapes_dedup_structurally() {
        let mut tables = ResourceTables::new();
        let shape = ShapeDrawable { solid: Some("red".into()), stroke: None, corner_radius: Some(4.0) };
        let first = tables.add_shape(shape.clone());
        assert_eq!(first, "bg_red");
        assert_eq!(tables.add_shape(shape), first);
        let square = ShapeDrawable { solid: Some("red".into()), stroke: None, corner_radius: None };
        assert_eq!(tables.add_shape(square), "bg_red_1");
    }

    proptest! {
        #[test]
        fn prop_string_insert_is_stable(value in "[A-Za-z0-9 ,.!]{0,24}") {
            let mut tables = ResourceTables::new();
            let first = tables.add_string(&value);
            let second = tables.add_string(&value);
            prop_assert_eq!(first, second);
        }

        #[test]
        fn prop_distinct_strings_distinct_names(a in "[A-Za-z ]{1,12}", b in "[A-Za-z ]{1,12}") {
            prop_assume!(a != b);
            let mut tables = ResourceTables::new();
            prop_assert_ne!(tables.add_string(&a), tables.add_string(&b));
        }

        #[test]
        fn prop_color_insert_is_stable(r in any::<u8>(), g in any::<u8>(), b in any::<u8>()) {
            let mut tables = ResourceTables::new();
            let css = format!("rgb({r}, {g}, {b})");
            let first = tables.add_color(&css);
            prop_assert!(first.is_some());
            prop_assert_eq!(first, tables.add_color(&css));
        }
    }
}
