//! Dependency index between cells.
//!
//! Edges are recorded in both directions so that dropping a cell's outgoing
//! edges removes exactly the edges that cell contributed. The index is derived
//! data: [`DependencyIndex::rebuild`] recomputes it from the grid.

use std::collections::{HashMap, HashSet};

use super::{Grid, Position};

#[derive(Debug, Default, Clone)]
pub struct DependencyIndex {
    /// Referenced cell -> cells whose formula references it
    dependents: HashMap<Position, HashSet<Position>>,
    /// Referencing cell -> cells its formula references
    precedents: HashMap<Position, HashSet<Position>>,
}

impl DependencyIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `cell` references every position in `referenced`.
    pub fn add_edges(&mut self, cell: Position, referenced: &[Position]) {
        if referenced.is_empty() {
            return;
        }
        let precedents = self.precedents.entry(cell).or_default();
        for &target in referenced {
            precedents.insert(target);
            self.dependents.entry(target).or_default().insert(cell);
        }
    }

    /// Drop every edge `cell` contributed as a referencer.
    ///
    /// Edges from other cells that reference `cell` are untouched; their
    /// formulas still mention it.
    pub fn remove_edges(&mut self, cell: Position) {
        let Some(precedents) = self.precedents.remove(&cell) else {
            return;
        };
        for target in precedents {
            if let Some(deps) = self.dependents.get_mut(&target) {
                deps.remove(&cell);
                if deps.is_empty() {
                    self.dependents.remove(&target);
                }
            }
        }
    }

    /// Cells whose formula references `cell` directly.
    pub fn dependents(&self, cell: Position) -> impl Iterator<Item = Position> + '_ {
        self.dependents.get(&cell).into_iter().flatten().copied()
    }

    /// Cells referenced directly by the formula at `cell`.
    pub fn precedents(&self, cell: Position) -> impl Iterator<Item = Position> + '_ {
        self.precedents.get(&cell).into_iter().flatten().copied()
    }

    /// Recompute every edge from the grid's live content.
    pub fn rebuild(&mut self, grid: &Grid) {
        self.dependents.clear();
        self.precedents.clear();
        for (pos, cell) in grid.iter() {
            self.add_edges(pos, cell.referenced_cells());
        }
    }

    /// Total number of recorded edges.
    pub fn edge_count(&self) -> usize {
        self.precedents.values().map(HashSet::len).sum()
    }
}
