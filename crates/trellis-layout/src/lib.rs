//! Layout tree construction for the Trellis layout compiler.
//!
//! Runs after ingestion, in order:
//!
//! 1. **Containment**: source parents for in-flow nodes, tightest enclosing
//!    candidates for out-of-flow nodes, depths and the render tree
//! 2. **Wrapping**: scroll and radio-group wrappers
//! 3. **Strategy selection**: stacked, linear, grid or free-form per container
//! 4. **Grid inference**: balanced and positional column detection

pub mod containment;
pub mod grid;
pub mod strategy;
pub mod wrappers;

pub use containment::{assign_depths, build_containment, build_render_tree, emission_order, flag_overflow};
pub use grid::{
    commit_grid, infer_balanced, infer_positional, partition_rows, table_rows, CellSlot, GridAmbiguity, GridMode,
    GridPlan, PlannedCell,
};
pub use strategy::{linear_x, linear_y, select_layouts, ContainerLayout, LayoutPlan, Strategy};
pub use wrappers::{wrap_radio_groups, wrap_scroll};
