//! Core types for the Trellis layout compiler.
//!
//! This crate provides the data model shared by every compiler stage:
//! - Geometry model (`bounds`, `linear` and `box_rect` rectangles)
//! - The node arena (`NodeCache`) with source and render tree links
//! - Namespaced attribute store and widget classification
//! - Anchor and grid scratch state written by the solvers
//! - Settings, capability levels and error types

pub mod anchor;
pub mod attributes;
pub mod cache;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod node;
pub mod settings;
pub mod style;
pub mod widget;

pub use anchor::{Anchor, AnchorTarget, Axis, Circle, ConstraintScratch, Edge};
pub use attributes::{AttributeStore, Namespace};
pub use cache::NodeCache;
pub use error::{CompileError, Result};
pub use geometry::{BoxRect, Edges, Geometry};
pub use grid::GridScratch;
pub use node::{ElementId, Node, NodeId, NodeOrigin, WrapperKind};
pub use settings::{Feature, Settings, TargetApi};
pub use style::StyleMap;
pub use widget::{Orientation, Widget};
