//! Resource tables and style consolidation.
//!
//! Every table deduplicates by value: inserting a value already present
//! returns its existing generated name. The consolidator factors attribute
//! sets shared between nodes of the same kind into style definitions.

pub mod color;
pub mod consolidate;
pub mod table;
pub mod tables;

pub use color::Color;
pub use consolidate::{consolidate, ConsolidationReport, STYLE_ATTRIBUTE};
pub use table::Table;
pub use tables::{image_name, string_name, Drawable, ResourceTables, ShapeDrawable, Stroke, StyleDefinition};
