//! Column and grid inference.
//!
//! Two modes produce the same [`GridPlan`]:
//! - **Balanced**: rows of candidate columns are matched against the
//!   narrowest row by cell width.
//! - **Positional**: cells of explicit tables are placed by their left edge
//!   into a slot matrix, and empty slots become spacers that spans consume.
//!
//! [`commit_grid`] writes the plan into the node scratch state and rewires
//! the render tree so cells are direct render children of the grid.

use thiserror::Error;
use tracing::debug;
use trellis_core::{
    BoxRect, GridScratch, NodeCache, NodeId, Orientation, Settings, Widget, WrapperKind,
};

use crate::wrappers::{allocate_wrapper, reorder_render_children};

/// Why a container is not a grid. Every variant is recoverable; the caller
/// falls back to free-form layout.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GridAmbiguity {
    #[error("fewer than two rows")]
    TooFewRows,

    #[error("reference row has fewer than two columns")]
    SingleColumn,

    #[error("row {row} has {found} cells, reference row has {expected}")]
    MissingCells { row: usize, found: usize, expected: usize },

    #[error("row {row} diverges from the reference width at column {column}")]
    DivergingWidths { row: usize, column: usize },

    #[error("cells {first} and {second} claim the same slot in row {row}")]
    SlotCollision { row: usize, first: NodeId, second: NodeId },

    #[error("table has no cells")]
    Empty,
}

/// Which inference path produced a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridMode {
    Balanced,
    Positional,
}

/// Content of one grid slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellSlot {
    Node(NodeId),
    /// Empty slot that no span covers.
    Spacer,
}

/// One cell of an inferred grid.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedCell {
    pub slot: CellSlot,
    pub column: usize,
    pub column_span: usize,
    pub row_span: usize,
    /// Nodes merged into this cell along the row.
    pub siblings: Vec<NodeId>,
}

impl PlannedCell {
    fn node(id: NodeId, column: usize) -> Self {
        Self {
            slot: CellSlot::Node(id),
            column,
            column_span: 1,
            row_span: 1,
            siblings: Vec::new(),
        }
    }
}

/// Inferred tabular structure of one container.
#[derive(Debug, Clone, PartialEq)]
pub struct GridPlan {
    pub mode: GridMode,
    pub columns: usize,
    /// Cells per row, in column order.
    pub rows: Vec<Vec<PlannedCell>>,
    /// Left edge of every column.
    pub column_lefts: Vec<f64>,
    /// Top edge of every row.
    pub row_tops: Vec<f64>,
    /// Structural nodes (row and section elements) removed from the render tree.
    pub excluded: Vec<NodeId>,
}

impl GridPlan {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (usize, &PlannedCell)> {
        self.rows
            .iter()
            .enumerate()
            .flat_map(|(row, cells)| cells.iter().map(move |cell| (row, cell)))
    }
}

/// Partition nodes into visual lines: a node joins the current line while
/// its vertical extent overlaps the line's. Lines are top to bottom, cells
/// left to right.
pub fn partition_rows(cache: &NodeCache, ids: &[NodeId], settings: &Settings) -> Vec<Vec<NodeId>> {
    let mut sorted = ids.to_vec();
    sorted.sort_by(|&a, &b| {
        let (ra, rb) = (cache[a].linear(), cache[b].linear());
        ra.top
            .total_cmp(&rb.top)
            .then(ra.left.total_cmp(&rb.left))
            .then(a.cmp(&b))
    });

    let mut rows: Vec<(BoxRect, Vec<NodeId>)> = Vec::new();
    for id in sorted {
        let rect = *cache[id].linear();
        match rows.last_mut() {
            Some((extent, members)) if extent.overlaps_vertically(&rect, settings.edge_tolerance) => {
                *extent = extent.union(&rect);
                members.push(id);
            }
            _ => rows.push((rect, vec![id])),
        }
    }

    rows.into_iter()
        .map(|(_, mut members)| {
            members.sort_by(|&a, &b| cache[a].linear().left.total_cmp(&cache[b].linear().left).then(a.cmp(&b)));
            members
        })
        .collect()
}

/// Balanced inference over rows of candidate columns.
///
/// The row with the smallest total width is the reference. Every other row
/// must match its cell widths column by column, except in the last slot,
/// which absorbs any excess cells as siblings.
pub fn infer_balanced(
    cache: &NodeCache,
    rows: &[Vec<NodeId>],
    settings: &Settings,
) -> Result<GridPlan, GridAmbiguity> {
    if rows.len() < 2 {
        return Err(GridAmbiguity::TooFewRows);
    }

    let width = |id: NodeId| cache[id].linear().width();
    let total = |row: &Vec<NodeId>| row.iter().map(|&id| width(id)).sum::<f64>();
    let reference = rows
        .iter()
        .enumerate()
        .min_by(|(ia, a), (ib, b)| total(*a).total_cmp(&total(*b)).then(ia.cmp(ib)))
        .map(|(_, row)| row)
        .ok_or(GridAmbiguity::TooFewRows)?;
    let columns = reference.len();
    if columns < 2 {
        return Err(GridAmbiguity::SingleColumn);
    }

    let mut planned = Vec::with_capacity(rows.len());
    for (r, row) in rows.iter().enumerate() {
        if row.len() < columns {
            return Err(GridAmbiguity::MissingCells { row: r, found: row.len(), expected: columns });
        }
        for column in 0..columns - 1 {
            if !settings.same_edge(width(row[column]), width(reference[column])) {
                return Err(GridAmbiguity::DivergingWidths { row: r, column });
            }
        }
        let mut cells: Vec<PlannedCell> = row[..columns]
            .iter()
            .enumerate()
            .map(|(column, &id)| PlannedCell::node(id, column))
            .collect();
        if let Some(last) = cells.last_mut() {
            last.siblings = row[columns..].to_vec();
        }
        planned.push(cells);
    }

    let column_lefts = reference.iter().map(|&id| cache[id].linear().left).collect();
    let row_tops = rows
        .iter()
        .map(|row| row.iter().map(|&id| cache[id].linear().top).fold(f64::INFINITY, f64::min))
        .collect();

    Ok(GridPlan {
        mode: GridMode::Balanced,
        columns,
        rows: planned,
        column_lefts,
        row_tops,
        excluded: Vec::new(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Slot {
    Cell(NodeId),
    Spacer { used: bool },
}

/// Positional inference over the cells of explicit table rows.
pub fn infer_positional(
    cache: &NodeCache,
    rows: &[Vec<NodeId>],
    settings: &Settings,
) -> Result<GridPlan, GridAmbiguity> {
    let tolerance = settings.edge_tolerance;
    let rows: Vec<&Vec<NodeId>> = rows.iter().filter(|row| !row.is_empty()).collect();
    if rows.is_empty() {
        return Err(GridAmbiguity::Empty);
    }

    // Column starts are the distinct cell left edges; the running right
    // edge tracks where the last column ends.
    let mut lefts: Vec<f64> = rows
        .iter()
        .flat_map(|row| row.iter().map(|&id| cache[id].bounds().left))
        .collect();
    lefts.sort_by(f64::total_cmp);
    let mut column_lefts: Vec<f64> = Vec::new();
    let mut running_right = f64::NEG_INFINITY;
    for left in lefts {
        if column_lefts.last().is_some_and(|&last| (left - last).abs() <= tolerance) {
            continue;
        }
        column_lefts.push(left);
        let right = rows
            .iter()
            .flat_map(|row| row.iter())
            .filter(|&&id| (cache[id].bounds().left - left).abs() <= tolerance)
            .map(|&id| cache[id].bounds().right)
            .fold(f64::NEG_INFINITY, f64::max);
        running_right = running_right.max(right);
    }
    debug!(columns = column_lefts.len(), extent = running_right, "positional columns");

    let columns = column_lefts.len();
    let column_of = |x: f64| {
        column_lefts
            .iter()
            .position(|&left| (left - x).abs() <= tolerance)
            .unwrap_or(0)
    };

    let mut matrix = vec![vec![Slot::Spacer { used: false }; columns]; rows.len()];
    for (r, row) in rows.iter().enumerate() {
        for &id in row.iter() {
            let column = column_of(cache[id].bounds().left);
            match matrix[r][column] {
                Slot::Cell(first) => {
                    return Err(GridAmbiguity::SlotCollision { row: r, first, second: id });
                }
                Slot::Spacer { .. } => matrix[r][column] = Slot::Cell(id),
            }
        }
    }

    let row_tops: Vec<f64> = rows
        .iter()
        .map(|row| row.iter().map(|&id| cache[id].bounds().top).fold(f64::INFINITY, f64::min))
        .collect();

    // Spans count forward runs of unused spacers the cell's extent covers.
    let mut spans = vec![vec![(1usize, 1usize); columns]; rows.len()];
    for r in 0..rows.len() {
        for c in 0..columns {
            let Slot::Cell(id) = matrix[r][c] else {
                continue;
            };
            let bounds = *cache[id].bounds();

            let mut column_span = 1;
            while c + column_span < columns
                && column_lefts[c + column_span] < bounds.right - tolerance
                && matrix[r][c + column_span] == (Slot::Spacer { used: false })
            {
                column_span += 1;
            }

            let mut row_span = 1;
            'rows: while r + row_span < rows.len() && row_tops[r + row_span] < bounds.bottom - tolerance {
                for covered in c..c + column_span {
                    if matrix[r + row_span][covered] != (Slot::Spacer { used: false }) {
                        break 'rows;
                    }
                }
                row_span += 1;
            }

            for rr in r..r + row_span {
                for cc in c..c + column_span {
                    if (rr, cc) != (r, c) {
                        matrix[rr][cc] = Slot::Spacer { used: true };
                    }
                }
            }
            spans[r][c] = (column_span, row_span);
        }
    }

    let planned = matrix
        .iter()
        .enumerate()
        .map(|(r, slots)| {
            slots
                .iter()
                .enumerate()
                .filter_map(|(c, slot)| match *slot {
                    Slot::Cell(id) => {
                        let (column_span, row_span) = spans[r][c];
                        Some(PlannedCell {
                            slot: CellSlot::Node(id),
                            column: c,
                            column_span,
                            row_span,
                            siblings: Vec::new(),
                        })
                    }
                    Slot::Spacer { used: false } => Some(PlannedCell {
                        slot: CellSlot::Spacer,
                        column: c,
                        column_span: 1,
                        row_span: 1,
                        siblings: Vec::new(),
                    }),
                    Slot::Spacer { used: true } => None,
                })
                .collect()
        })
        .collect();

    Ok(GridPlan {
        mode: GridMode::Positional,
        columns,
        rows: planned,
        column_lefts,
        row_tops,
        excluded: Vec::new(),
    })
}

/// Row elements of an explicit table: direct children, or the children of
/// section elements (`thead`, `tbody`, `tfoot`). Returns the rows and the
/// structural nodes that hold them.
pub fn table_rows(cache: &NodeCache, table: NodeId) -> (Vec<Vec<NodeId>>, Vec<NodeId>) {
    let mut rows = Vec::new();
    let mut structural = Vec::new();
    for &child in cache.render_children(table) {
        let node = &cache[child];
        if matches!(node.tag.as_str(), "thead" | "tbody" | "tfoot") {
            structural.push(child);
            for &row in cache.render_children(child) {
                structural.push(row);
                rows.push(cache.render_children(row).to_vec());
            }
        } else {
            structural.push(child);
            rows.push(cache.render_children(child).to_vec());
        }
    }
    (rows, structural)
}

/// Write grid scratch state and rewire the render tree: cells become the
/// grid's render children in row-major order, structural nodes are
/// excluded, unused spacers become `Space` nodes and cells with siblings are
/// wrapped in a horizontal linear span wrapper.
pub fn commit_grid(cache: &mut NodeCache, grid: NodeId, plan: &GridPlan) -> Vec<NodeId> {
    for &structural in &plan.excluded {
        cache[structural].excluded = true;
        cache[structural].render_parent = None;
        cache[structural].render_children.clear();
    }
    for &child in &cache[grid].render_children.clone() {
        cache[child].render_parent = None;
    }
    cache[grid].render_children.clear();

    let base_index = cache[grid].document_index;
    let mut ordered: Vec<NodeId> = Vec::new();
    for (row, cells) in plan.rows.iter().enumerate() {
        for (position, cell) in cells.iter().enumerate() {
            let id = match cell.slot {
                CellSlot::Node(id) if cell.siblings.is_empty() => id,
                CellSlot::Node(id) => span_wrapper(cache, grid, id, &cell.siblings),
                CellSlot::Spacer => {
                    let left = plan.column_lefts.get(cell.column).copied().unwrap_or(0.0);
                    let top = plan.row_tops.get(row).copied().unwrap_or(0.0);
                    allocate_wrapper(
                        cache,
                        WrapperKind::GridSpacer,
                        Some(grid),
                        BoxRect::from_xywh(left, top, 1.0, 1.0),
                        base_index,
                        Widget::Space,
                    )
                }
            };
            let mut scratch = GridScratch::new(row, cell.column).with_spans(cell.column_span, cell.row_span);
            scratch.row_start = position == 0;
            scratch.row_end = position + 1 == cells.len();
            scratch.siblings = cell.siblings.clone();
            cache[id].grid = Some(scratch);
            cache[id].render_parent = None;
            cache.set_render_parent(id, grid);
            ordered.push(id);
        }
    }

    if let Some(scratch) = ordered.first().and_then(|&id| cache[id].grid.as_mut()) {
        scratch.first = true;
    }
    if let Some(scratch) = ordered.last().and_then(|&id| cache[id].grid.as_mut()) {
        scratch.last = true;
    }

    debug!(
        grid = %grid,
        mode = ?plan.mode,
        columns = plan.columns,
        rows = plan.row_count(),
        "committed grid"
    );
    ordered
}

fn span_wrapper(cache: &mut NodeCache, grid: NodeId, cell: NodeId, siblings: &[NodeId]) -> NodeId {
    let members: Vec<NodeId> = std::iter::once(cell).chain(siblings.iter().copied()).collect();
    let bounds = members
        .iter()
        .map(|&id| *cache[id].linear())
        .reduce(|a, b| a.union(&b))
        .unwrap_or_default();
    let document_index = cache[cell].document_index;
    let wrapper = allocate_wrapper(
        cache,
        WrapperKind::GridSpan,
        Some(grid),
        bounds,
        document_index,
        Widget::Linear(Orientation::Horizontal),
    );
    for &member in &members {
        cache[member].render_parent = None;
        cache.reparent(member, wrapper);
        cache.set_render_parent(member, wrapper);
        cache[member].depth = cache[wrapper].depth + 1;
    }
    reorder_render_children(cache, wrapper);
    wrapper
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::containment::{build_containment, build_render_tree};
    use trellis_core::{ElementId, Node, NodeOrigin, StyleMap};

    fn add(cache: &mut NodeCache, element: u64, parent: Option<u64>, tag: &str, rect: BoxRect) -> NodeId {
        let id = cache.allocate(|id| {
            let mut node = Node::new(id, NodeOrigin::Element(ElementId(element)), tag, StyleMap::default(), rect);
            node.source_parent = parent.map(ElementId);
            node
        });
        cache[id].document_index = id.index();
        id
    }

    /// Three lines of two 50px cells under one container.
    fn balanced_fixture() -> (NodeCache, NodeId, Vec<NodeId>) {
        let mut cache = NodeCache::new();
        let root = add(&mut cache, 1, None, "div", BoxRect::from_xywh(0.0, 0.0, 100.0, 60.0));
        let mut cells = Vec::new();
        for row in 0..3 {
            for column in 0..2 {
                let element = 10 + row * 2 + column;
                let rect = BoxRect::from_xywh(column as f64 * 50.0, row as f64 * 20.0, 50.0, 20.0);
                cells.push(add(&mut cache, element, Some(1), "div", rect));
            }
        }
        build_containment(&mut cache, &Settings::default()).unwrap();
        build_render_tree(&mut cache);
        (cache, root, cells)
    }

    #[test]
    fn test_partition_rows() {
        let (cache, root, cells) = balanced_fixture();
        let rows = partition_rows(&cache, cache.render_children(root), &Settings::default());
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1], vec![cells[2], cells[3]]);
    }

    #[test]
    fn test_balanced_two_columns() {
        let (mut cache, root, cells) = balanced_fixture();
        let settings = Settings::default();
        let rows = partition_rows(&cache, cache.render_children(root), &settings);
        let plan = infer_balanced(&cache, &rows, &settings).unwrap();
        assert_eq!(plan.columns, 2);
        assert_eq!(plan.row_count(), 3);

        let ordered = commit_grid(&mut cache, root, &plan);
        assert_eq!(ordered, cells);
        let firsts = ordered.iter().filter(|&&id| cache[id].grid.as_ref().is_some_and(|g| g.first)).count();
        let lasts = ordered.iter().filter(|&&id| cache[id].grid.as_ref().is_some_and(|g| g.last)).count();
        assert_eq!((firsts, lasts), (1, 1));
        let scratch = cache[cells[3]].grid.as_ref().unwrap();
        assert_eq!((scratch.row, scratch.index), (1, 1));
        assert!(scratch.row_end && !scratch.row_start);
    }

    #[test]
    fn test_balanced_excess_cells_become_siblings() {
        let mut cache = NodeCache::new();
        let root = add(&mut cache, 1, None, "div", BoxRect::from_xywh(0.0, 0.0, 120.0, 40.0));
        let a = add(&mut cache, 2, Some(1), "div", BoxRect::from_xywh(0.0, 0.0, 50.0, 20.0));
        let b = add(&mut cache, 3, Some(1), "div", BoxRect::from_xywh(50.0, 0.0, 50.0, 20.0));
        let c = add(&mut cache, 4, Some(1), "div", BoxRect::from_xywh(0.0, 20.0, 50.0, 20.0));
        let d = add(&mut cache, 5, Some(1), "div", BoxRect::from_xywh(50.0, 20.0, 30.0, 20.0));
        let e = add(&mut cache, 6, Some(1), "div", BoxRect::from_xywh(80.0, 20.0, 40.0, 20.0));
        build_containment(&mut cache, &Settings::default()).unwrap();
        build_render_tree(&mut cache);

        let settings = Settings::default();
        let rows = partition_rows(&cache, cache.render_children(root), &settings);
        let plan = infer_balanced(&cache, &rows, &settings).unwrap();
        assert_eq!(plan.columns, 2);
        assert_eq!(plan.rows[1][1].siblings, vec![e]);

        let ordered = commit_grid(&mut cache, root, &plan);
        assert_eq!(&ordered[..3], &[a, b, c]);
        let wrapper = ordered[3];
        assert_eq!(cache[wrapper].widget, Widget::Linear(Orientation::Horizontal));
        assert_eq!(cache.render_children(wrapper), &[d, e]);
        assert_eq!(cache[wrapper].grid.as_ref().unwrap().siblings, vec![e]);
    }

    #[test]
    fn test_balanced_diverging_widths() {
        let mut cache = NodeCache::new();
        add(&mut cache, 1, None, "div", BoxRect::from_xywh(0.0, 0.0, 100.0, 40.0));
        let a = add(&mut cache, 2, Some(1), "div", BoxRect::from_xywh(0.0, 0.0, 50.0, 20.0));
        let b = add(&mut cache, 3, Some(1), "div", BoxRect::from_xywh(50.0, 0.0, 10.0, 20.0));
        let c = add(&mut cache, 4, Some(1), "div", BoxRect::from_xywh(0.0, 20.0, 70.0, 20.0));
        let d = add(&mut cache, 5, Some(1), "div", BoxRect::from_xywh(70.0, 20.0, 10.0, 20.0));
        let rows = vec![vec![a, b], vec![c, d]];
        assert_eq!(
            infer_balanced(&cache, &rows, &Settings::default()),
            Err(GridAmbiguity::DivergingWidths { row: 1, column: 0 })
        );
    }

    #[test]
    fn test_positional_spans_and_spacers() {
        // | a (colspan 2) |
        // | b | c         |
        // |   | d         |  (first slot empty)
        let mut cache = NodeCache::new();
        let table = add(&mut cache, 1, None, "table", BoxRect::from_xywh(0.0, 0.0, 100.0, 60.0));
        let r0 = add(&mut cache, 2, Some(1), "tr", BoxRect::from_xywh(0.0, 0.0, 100.0, 20.0));
        let a = add(&mut cache, 3, Some(2), "td", BoxRect::from_xywh(0.0, 0.0, 100.0, 20.0));
        let r1 = add(&mut cache, 4, Some(1), "tr", BoxRect::from_xywh(0.0, 20.0, 100.0, 20.0));
        let b = add(&mut cache, 5, Some(4), "td", BoxRect::from_xywh(0.0, 20.0, 40.0, 20.0));
        let c = add(&mut cache, 6, Some(4), "td", BoxRect::from_xywh(40.0, 20.0, 60.0, 20.0));
        let r2 = add(&mut cache, 7, Some(1), "tr", BoxRect::from_xywh(0.0, 40.0, 100.0, 20.0));
        let d = add(&mut cache, 8, Some(7), "td", BoxRect::from_xywh(40.0, 40.0, 60.0, 20.0));
        build_containment(&mut cache, &Settings::default()).unwrap();
        build_render_tree(&mut cache);

        let (rows, structural) = table_rows(&cache, table);
        assert_eq!(structural, vec![r0, r1, r2]);
        let mut plan = infer_positional(&cache, &rows, &Settings::default()).unwrap();
        plan.excluded = structural;
        assert_eq!(plan.columns, 2);
        assert_eq!(plan.rows[0].len(), 1);
        assert_eq!(plan.rows[0][0].column_span, 2);
        assert_eq!(plan.rows[2][0].slot, CellSlot::Spacer);

        let ordered = commit_grid(&mut cache, table, &plan);
        assert_eq!(ordered.len(), 5);
        assert_eq!(&ordered[..3], &[a, b, c]);
        assert_eq!(cache[ordered[3]].widget, Widget::Space);
        assert_eq!(ordered[4], d);
        assert!(cache[r1].excluded);
        assert_eq!(cache[b].render_parent, Some(table));
        assert_eq!(cache[a].grid.as_ref().unwrap().column_span, 2);
    }

    #[test]
    fn test_positional_row_span_consumes_spacer() {
        let mut cache = NodeCache::new();
        add(&mut cache, 1, None, "table", BoxRect::from_xywh(0.0, 0.0, 100.0, 40.0));
        let tall = add(&mut cache, 3, Some(1), "td", BoxRect::from_xywh(0.0, 0.0, 50.0, 40.0));
        let top = add(&mut cache, 4, Some(1), "td", BoxRect::from_xywh(50.0, 0.0, 50.0, 20.0));
        let bottom = add(&mut cache, 5, Some(1), "td", BoxRect::from_xywh(50.0, 20.0, 50.0, 20.0));
        let rows = vec![vec![tall, top], vec![bottom]];
        let plan = infer_positional(&cache, &rows, &Settings::default()).unwrap();
        assert_eq!(plan.rows[0][0].row_span, 2);
        assert_eq!(plan.rows[1].len(), 1);
        assert_eq!(plan.rows[1][0].slot, CellSlot::Node(bottom));
    }
}
