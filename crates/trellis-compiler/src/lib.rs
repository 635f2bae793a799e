//! Compiles rendered page snapshots into native layout trees.
//!
//! A snapshot lists every element of a rendered page with its computed
//! style and on-screen rectangle. The compiler rebuilds the containment
//! tree, picks a layout strategy per container, anchors free-form children
//! with constraints and emits widget attributes plus shared resources.
//!
//! # Example
//!
//! ```ignore
//! use trellis_compiler::{compile, ElementSnapshot, Snapshot};
//! use trellis_core::Settings;
//!
//! let snapshot = Snapshot::new()
//!     .with(ElementSnapshot::new(1, "div").bounds(0.0, 0.0, 320.0, 480.0))
//!     .with(ElementSnapshot::new(2, "p").parent(1).bounds(0.0, 0.0, 320.0, 20.0).text("Hello"));
//! let document = compile(&snapshot, &Settings::default())?;
//! println!("{}", document.outline());
//! ```

pub mod compile;
pub mod context;
pub mod document;
pub mod emit;
pub mod ingest;
pub mod snapshot;

pub use compile::{compile, compile_json};
pub use context::CompilationContext;
pub use document::LayoutDocument;
pub use emit::Emitter;
pub use ingest::ingest;
pub use snapshot::{ElementSnapshot, Rect, Snapshot};
