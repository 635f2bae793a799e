//! Error types for the layout compiler.

use thiserror::Error;

use crate::node::{ElementId, NodeId};

/// Result type alias for compiler operations.
pub type Result<T> = std::result::Result<T, CompileError>;

/// Fatal errors. Geometric ambiguities are resolved locally and never
/// surface here; only broken input does.
#[derive(Debug, Error)]
pub enum CompileError {
    /// A visible element arrived without a bounding rectangle.
    #[error("Element {element} is visible but has no bounds")]
    MissingGeometry { element: ElementId },

    /// A parent link points outside the snapshot.
    #[error("Element {element} references unknown parent {parent}")]
    UnknownParent { element: ElementId, parent: ElementId },

    /// Two snapshot entries share an identity.
    #[error("Duplicate element identity {element}")]
    DuplicateElement { element: ElementId },

    /// A node id was looked up that the registry never issued.
    #[error("Unknown node {0}")]
    UnknownNode(NodeId),

    /// A style value needed for geometry is malformed.
    #[error("Invalid value for '{property}' on element {element}: {value}")]
    InvalidStyle {
        element: ElementId,
        property: String,
        value: String,
    },

    /// Nothing in the snapshot is visible.
    #[error("Snapshot has no visible root element")]
    NoRoot,

    /// Malformed settings document.
    #[error("Invalid settings: {0}")]
    Settings(#[source] serde_json::Error),

    /// Malformed snapshot document.
    #[error("Invalid snapshot: {0}")]
    Snapshot(#[source] serde_json::Error),
}
