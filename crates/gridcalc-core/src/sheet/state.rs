use crate::error::{Result, SheetError};
use gridcalc_engine::engine::{
    Cell, DependencyIndex, FormulaError, Grid, Position, SheetLimits, Value,
};
use gridcalc_engine::formula::CellLookup;
use std::collections::HashSet;

/// UI-agnostic sheet state.
///
/// All writes go through `&mut self`, so an edit is one critical section:
/// no reader can observe a record whose content and dependency edges
/// disagree.
#[derive(Debug, Default)]
pub struct Sheet {
    /// Cell records and the printable area
    pub(crate) grid: Grid,
    /// Referenced cell -> cells that reference it (and the reverse)
    pub(crate) deps: DependencyIndex,
}

impl Sheet {
    /// Create an empty sheet accepting every valid position.
    pub fn new() -> Self {
        Self::with_limits(SheetLimits::default())
    }

    /// Create an empty sheet that only accepts positions within `limits`.
    pub fn with_limits(limits: SheetLimits) -> Self {
        Sheet {
            grid: Grid::with_limits(limits),
            deps: DependencyIndex::new(),
        }
    }

    pub fn limits(&self) -> SheetLimits {
        self.grid.limits()
    }

    pub(crate) fn check_position(&self, pos: Position) -> Result<()> {
        if self.grid.limits().contains(pos) {
            Ok(())
        } else {
            Err(SheetError::InvalidPosition(format!(
                "row {}, column {} is outside the sheet",
                pos.row, pos.col
            )))
        }
    }

    /// The record at `pos`, if the position has ever been written (or
    /// walked through by a cycle check) and not cleared since.
    pub fn get_cell(&self, pos: Position) -> Result<Option<&Cell>> {
        self.check_position(pos)?;
        Ok(self.grid.get(pos))
    }

    /// Computed value of the cell at `pos`, evaluating formulas on a cache miss.
    pub fn cell_value(&self, pos: Position) -> Result<Option<Value>> {
        let Some(cell) = self.get_cell(pos)? else {
            return Ok(None);
        };
        self.evaluate_precedents(pos);
        Ok(Some(cell.value(self)))
    }

    /// Fill the caches of every uncached formula `pos` depends on, deepest
    /// first.
    ///
    /// Formula evaluation asks the sheet for operand values, and an uncached
    /// operand evaluates its own formula in turn. Warming the caches in
    /// post-order with an explicit stack keeps that nesting one level deep
    /// however long the reference chain is.
    pub(crate) fn evaluate_precedents(&self, pos: Position) {
        let mut visited = HashSet::new();
        let mut stack = vec![(pos, false)];
        while let Some((cell_ref, expanded)) = stack.pop() {
            let Some(cell) = self.grid.get(cell_ref) else {
                continue;
            };
            if cell.is_cache_valid() {
                continue;
            }
            if expanded {
                cell.value(self);
                continue;
            }
            if !visited.insert(cell_ref) {
                continue;
            }
            stack.push((cell_ref, true));
            stack.extend(
                self.deps
                    .precedents(cell_ref)
                    .filter(|p| !visited.contains(p))
                    .map(|p| (p, false)),
            );
        }
    }

    /// Raw text of the cell at `pos`.
    pub fn cell_text(&self, pos: Position) -> Result<Option<String>> {
        Ok(self.get_cell(pos)?.map(Cell::text))
    }

    /// Cells whose formula references `pos` directly, in row-major order.
    pub fn dependents_of(&self, pos: Position) -> Vec<Position> {
        let mut cells: Vec<_> = self.deps.dependents(pos).collect();
        cells.sort();
        cells
    }

    /// Cells referenced directly by the formula at `pos`, in row-major order.
    pub fn precedents_of(&self, pos: Position) -> Vec<Position> {
        let mut cells: Vec<_> = self.deps.precedents(pos).collect();
        cells.sort();
        cells
    }

    /// Number of occupied positions.
    pub fn cell_count(&self) -> usize {
        self.grid.len()
    }
}

impl CellLookup for Sheet {
    fn operand(&self, pos: Position) -> std::result::Result<f64, FormulaError> {
        if !self.grid.limits().contains(pos) {
            return Err(FormulaError::Ref);
        }
        match self.grid.get(pos) {
            Some(cell) => cell.value(self).to_operand(),
            None => Ok(0.0),
        }
    }
}
