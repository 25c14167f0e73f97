//! Sparse cell storage with a tracked printable area.

use log::trace;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{Cell, Position, Size};

/// Bounds on the positions a sheet accepts.
///
/// Values larger than the hard maxima in [`Position`] are clamped.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SheetLimits {
    pub max_rows: usize,
    pub max_cols: usize,
}

impl SheetLimits {
    pub fn new(max_rows: usize, max_cols: usize) -> SheetLimits {
        SheetLimits {
            max_rows: max_rows.min(Position::MAX_ROWS),
            max_cols: max_cols.min(Position::MAX_COLS),
        }
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.is_valid() && pos.row < self.max_rows && pos.col < self.max_cols
    }
}

impl Default for SheetLimits {
    fn default() -> Self {
        SheetLimits::new(Position::MAX_ROWS, Position::MAX_COLS)
    }
}

/// Sparse grid storage.
///
/// An untouched position has no record at all, which is distinct from a
/// record holding empty content.
#[derive(Debug)]
pub struct Grid {
    cells: HashMap<Position, Cell>,
    limits: SheetLimits,
    size: Size,
    area_valid: bool,
}

impl Grid {
    pub fn new() -> Grid {
        Grid::with_limits(SheetLimits::default())
    }

    pub fn with_limits(limits: SheetLimits) -> Grid {
        Grid {
            cells: HashMap::new(),
            limits: SheetLimits::new(limits.max_rows, limits.max_cols),
            size: Size::default(),
            area_valid: true,
        }
    }

    pub fn limits(&self) -> SheetLimits {
        self.limits
    }

    pub fn get(&self, pos: Position) -> Option<&Cell> {
        self.cells.get(&pos)
    }

    pub fn get_mut(&mut self, pos: Position) -> Option<&mut Cell> {
        self.cells.get_mut(&pos)
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.cells.contains_key(&pos)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Position, &Cell)> {
        self.cells.iter().map(|(pos, cell)| (*pos, cell))
    }

    /// Install a record, extending the printable area if needed.
    pub fn insert(&mut self, pos: Position, cell: Cell) -> Option<Cell> {
        self.size.rows = self.size.rows.max(pos.row + 1);
        self.size.cols = self.size.cols.max(pos.col + 1);
        self.cells.insert(pos, cell)
    }

    /// Remove a record. Removing one from the edge of the printable area
    /// marks the area stale until [`Grid::rescan`] runs.
    pub fn remove(&mut self, pos: Position) -> Option<Cell> {
        let removed = self.cells.remove(&pos)?;
        if self.size.is_on_boundary(pos) {
            self.area_valid = false;
        }
        Some(removed)
    }

    /// Recompute the printable area from every occupied position.
    pub fn rescan(&mut self) {
        let mut size = Size::default();
        for pos in self.cells.keys() {
            size.rows = size.rows.max(pos.row + 1);
            size.cols = size.cols.max(pos.col + 1);
        }
        self.size = size;
        self.area_valid = true;
    }

    /// The printable area, or `None` while it is stale.
    pub fn printable_size(&self) -> Option<Size> {
        self.area_valid.then_some(self.size)
    }

    /// Look up the record at `pos`, materializing an empty one if the
    /// position is untouched.
    ///
    /// This is a write: the new record stays in the grid (and extends the
    /// printable area) whatever the caller does next. Returns `false` only
    /// for positions outside the sheet limits, where nothing is created.
    pub fn resolve_or_create(&mut self, pos: Position) -> bool {
        if !self.limits.contains(pos) {
            return false;
        }
        if !self.cells.contains_key(&pos) {
            trace!("materializing empty cell at {}", pos);
            self.insert(pos, Cell::new_empty());
        }
        true
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new()
    }
}
