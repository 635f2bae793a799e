//! Per-node scratch state written by the grid inferencer.

use serde::{Deserialize, Serialize};

use crate::node::NodeId;

/// Cell placement inside an inferred grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridScratch {
    /// Column index.
    pub index: usize,
    /// Row index.
    pub row: usize,
    pub column_span: usize,
    pub row_span: usize,
    /// First cell of the whole grid.
    pub first: bool,
    /// Last cell of the whole grid.
    pub last: bool,
    /// First cell within its row.
    pub row_start: bool,
    /// Last cell within its row.
    pub row_end: bool,
    /// Nodes collapsed into this cell along the row.
    pub siblings: Vec<NodeId>,
}

impl Default for GridScratch {
    fn default() -> Self {
        Self {
            index: 0,
            row: 0,
            column_span: 1,
            row_span: 1,
            first: false,
            last: false,
            row_start: false,
            row_end: false,
            siblings: Vec::new(),
        }
    }
}

impl GridScratch {
    pub fn new(row: usize, index: usize) -> Self {
        Self { row, index, ..Default::default() }
    }

    pub fn with_spans(mut self, column_span: usize, row_span: usize) -> Self {
        self.column_span = column_span.max(1);
        self.row_span = row_span.max(1);
        self
    }
}
