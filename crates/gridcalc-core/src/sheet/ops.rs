use super::Sheet;
use crate::error::{Result, SheetError};
use gridcalc_engine::engine::{Cell, CellContent, Position, detect_cycle};
use log::{debug, trace};
use std::collections::HashSet;

impl Sheet {
    /// Set cell contents from input text.
    ///
    /// The new content is built and checked before the live record is
    /// touched, so every error leaves the cell exactly as it was. The one
    /// lasting side effect of a rejected edit is the empty records a cycle
    /// check may have materialized.
    pub fn set_cell(&mut self, pos: Position, text: &str) -> Result<()> {
        self.check_position(pos)?;

        let content = CellContent::from_input(text)?;
        let referenced = content.referenced_cells().to_vec();

        if let Some(path) = detect_cycle(&mut self.grid, pos, &referenced) {
            debug!("rejected edit of {}: circular dependency via {:?}", pos, path);
            return Err(SheetError::CircularDependency { at: pos, path });
        }

        // Dependents must not keep values computed from the old content.
        self.invalidate_cell(pos);
        self.deps.remove_edges(pos);

        match self.grid.get_mut(pos) {
            Some(cell) => {
                cell.set_content(content);
            }
            None => {
                self.grid.insert(pos, Cell::new(content));
            }
        }
        self.deps.add_edges(pos, &referenced);

        debug!("set {} to {:?}", pos, text);
        Ok(())
    }

    /// Clear the specified cell. Clearing an untouched position is a no-op.
    pub fn clear_cell(&mut self, pos: Position) -> Result<()> {
        self.check_position(pos)?;
        if !self.grid.contains(pos) {
            return Ok(());
        }

        self.invalidate_cell(pos);
        self.grid.remove(pos);
        self.deps.remove_edges(pos);

        // Other cells may still sit on the same boundary, so the area is
        // recomputed from scratch.
        if self.grid.printable_size().is_none() {
            self.grid.rescan();
        }

        debug!("cleared {}", pos);
        Ok(())
    }

    /// Drop the cached value of every cell that depends (transitively) on `pos`.
    ///
    /// A formula is only evaluated after its precedents, so every dependent of
    /// an already-invalid cache is invalid too and the walk stops there.
    pub fn invalidate_cell(&mut self, pos: Position) {
        let mut to_process: Vec<Position> = self.deps.dependents(pos).collect();
        let mut visited = HashSet::new();
        while let Some(cell_ref) = to_process.pop() {
            if !visited.insert(cell_ref) {
                continue;
            }
            if let Some(cell) = self.grid.get_mut(cell_ref) {
                if !cell.is_cache_valid() {
                    continue;
                }
                trace!("invalidating {}", cell_ref);
                cell.invalidate_cache();
            }
            to_process.extend(self.deps.dependents(cell_ref));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Sheet;
    use crate::error::SheetError;
    use gridcalc_engine::engine::{FormulaError, Position, SheetLimits, Value};

    fn pos(name: &str) -> Position {
        Position::from_a1(name).unwrap()
    }

    fn value(sheet: &Sheet, name: &str) -> Value {
        sheet.cell_value(pos(name)).unwrap().unwrap()
    }

    fn text(sheet: &Sheet, name: &str) -> String {
        sheet.cell_text(pos(name)).unwrap().unwrap()
    }

    #[test]
    fn test_text_round_trips() {
        let mut sheet = Sheet::new();
        for input in ["hello", "  spaced  ", "'quoted", "=", "12.50", "'"] {
            sheet.set_cell(pos("A1"), input).unwrap();
            assert_eq!(text(&sheet, "A1"), input);
        }
    }

    #[test]
    fn test_escape_marker() {
        let mut sheet = Sheet::new();
        sheet.set_cell(pos("A1"), "'=5").unwrap();
        assert_eq!(value(&sheet, "A1"), Value::Text("=5".to_string()));
        assert_eq!(text(&sheet, "A1"), "'=5");
    }

    #[test]
    fn test_invalid_position_rejected() {
        let mut sheet = Sheet::new();
        let far = Position::new(Position::MAX_ROWS, 0);
        assert!(matches!(
            sheet.set_cell(far, "1"),
            Err(SheetError::InvalidPosition(_))
        ));
        assert!(matches!(
            sheet.clear_cell(Position::NONE),
            Err(SheetError::InvalidPosition(_))
        ));
        assert!(matches!(
            sheet.get_cell(far),
            Err(SheetError::InvalidPosition(_))
        ));
    }

    #[test]
    fn test_limits_restrict_positions() {
        let mut sheet = Sheet::with_limits(SheetLimits::new(2, 2));
        sheet.set_cell(pos("B2"), "ok").unwrap();
        assert!(matches!(
            sheet.set_cell(pos("C1"), "no"),
            Err(SheetError::InvalidPosition(_))
        ));
        // References beyond the limits evaluate to #REF! and create nothing.
        sheet.set_cell(pos("A1"), "=C1+1").unwrap();
        assert_eq!(value(&sheet, "A1"), Value::Error(FormulaError::Ref));
        assert_eq!(sheet.cell_count(), 2);
    }

    #[test]
    fn test_clear_untouched_is_noop() {
        let mut sheet = Sheet::new();
        sheet.clear_cell(pos("C3")).unwrap();
        assert!(sheet.get_cell(pos("C3")).unwrap().is_none());
        assert_eq!(sheet.cell_count(), 0);
    }

    #[test]
    fn test_two_cycle_rejected() {
        let mut sheet = Sheet::new();
        sheet.set_cell(pos("A1"), "=B1").unwrap();

        let err = sheet.set_cell(pos("B1"), "=A1").unwrap_err();
        assert!(matches!(err, SheetError::CircularDependency { at, .. } if at == pos("B1")));

        // B1 only holds the empty record the first cycle check created.
        let b1 = sheet.get_cell(pos("B1")).unwrap();
        assert!(b1.is_some_and(|cell| cell.is_empty()));
        assert_eq!(text(&sheet, "A1"), "=B1");
        assert!(sheet.precedents_of(pos("B1")).is_empty());
    }

    #[test]
    fn test_self_reference_rejected() {
        let mut sheet = Sheet::new();
        assert!(matches!(
            sheet.set_cell(pos("A1"), "=A1"),
            Err(SheetError::CircularDependency { .. })
        ));
        assert!(sheet.get_cell(pos("A1")).unwrap().is_none());

        sheet.set_cell(pos("A1"), "=2*3").unwrap();
        assert!(matches!(
            sheet.set_cell(pos("A1"), "=A1+1"),
            Err(SheetError::CircularDependency { .. })
        ));
        assert_eq!(text(&sheet, "A1"), "=2*3");
        assert_eq!(value(&sheet, "A1"), Value::Number(6.0));
    }

    #[test]
    fn test_rejected_cycle_keeps_dependencies() {
        let mut sheet = Sheet::new();
        sheet.set_cell(pos("A1"), "1").unwrap();
        sheet.set_cell(pos("B1"), "=A1").unwrap();
        sheet.set_cell(pos("C1"), "=B1").unwrap();
        assert_eq!(value(&sheet, "C1"), Value::Number(1.0));

        assert!(sheet.set_cell(pos("B1"), "=C1").is_err());
        assert_eq!(sheet.precedents_of(pos("B1")), vec![pos("A1")]);

        sheet.set_cell(pos("A1"), "7").unwrap();
        assert_eq!(value(&sheet, "C1"), Value::Number(7.0));
    }

    #[test]
    fn test_syntax_error_leaves_cell_untouched() {
        let mut sheet = Sheet::new();
        sheet.set_cell(pos("A1"), "=1+2").unwrap();
        sheet.set_cell(pos("B1"), "=A1").unwrap();
        assert_eq!(value(&sheet, "B1"), Value::Number(3.0));

        assert!(matches!(
            sheet.set_cell(pos("A1"), "=1+"),
            Err(SheetError::FormulaSyntax(_))
        ));
        assert_eq!(text(&sheet, "A1"), "=1+2");
        // The dependent's cache was not disturbed either.
        assert!(sheet.get_cell(pos("B1")).unwrap().unwrap().is_cache_valid());

        assert!(sheet.set_cell(pos("Z9"), "=)").is_err());
        assert!(sheet.get_cell(pos("Z9")).unwrap().is_none());
    }

    #[test]
    fn test_invalidation_is_transitive() {
        let mut sheet = Sheet::new();
        sheet.set_cell(pos("A1"), "1").unwrap();
        sheet.set_cell(pos("B1"), "=A1+1").unwrap();
        sheet.set_cell(pos("C1"), "=B1+1").unwrap();
        assert_eq!(value(&sheet, "C1"), Value::Number(3.0));

        sheet.set_cell(pos("A1"), "10").unwrap();
        assert!(!sheet.get_cell(pos("C1")).unwrap().unwrap().is_cache_valid());
        assert_eq!(value(&sheet, "C1"), Value::Number(12.0));

        // Repeated edits keep propagating.
        sheet.set_cell(pos("A1"), "20").unwrap();
        assert_eq!(value(&sheet, "C1"), Value::Number(22.0));
    }

    #[test]
    fn test_clear_invalidates_dependents() {
        let mut sheet = Sheet::new();
        sheet.set_cell(pos("A1"), "5").unwrap();
        sheet.set_cell(pos("B1"), "=A1*2").unwrap();
        assert_eq!(value(&sheet, "B1"), Value::Number(10.0));

        sheet.clear_cell(pos("A1")).unwrap();
        assert_eq!(value(&sheet, "B1"), Value::Number(0.0));

        sheet.set_cell(pos("A1"), "4").unwrap();
        assert_eq!(value(&sheet, "B1"), Value::Number(8.0));
    }

    #[test]
    fn test_invalidate_cell_is_idempotent() {
        let mut sheet = Sheet::new();
        sheet.set_cell(pos("A1"), "1").unwrap();
        sheet.set_cell(pos("B1"), "=A1").unwrap();

        sheet.invalidate_cell(pos("A1"));
        sheet.invalidate_cell(pos("A1"));
        sheet.invalidate_cell(pos("Q7"));
        assert!(!sheet.get_cell(pos("B1")).unwrap().unwrap().is_cache_valid());
        assert_eq!(value(&sheet, "B1"), Value::Number(1.0));
    }

    #[test]
    fn test_invalidation_stops_at_stale_dependents() {
        let mut sheet = Sheet::new();
        sheet.set_cell(pos("A1"), "1").unwrap();
        sheet.set_cell(pos("B1"), "=A1").unwrap();
        sheet.set_cell(pos("C1"), "=B1+1").unwrap();
        assert_eq!(value(&sheet, "B1"), Value::Number(1.0));
        assert!(!sheet.get_cell(pos("C1")).unwrap().unwrap().is_cache_valid());

        sheet.set_cell(pos("A1"), "2").unwrap();
        assert_eq!(value(&sheet, "C1"), Value::Number(3.0));

        sheet.set_cell(pos("A1"), "5").unwrap();
        assert!(!sheet.get_cell(pos("B1")).unwrap().unwrap().is_cache_valid());
        assert!(!sheet.get_cell(pos("C1")).unwrap().unwrap().is_cache_valid());
        assert_eq!(value(&sheet, "C1"), Value::Number(6.0));
    }

    #[test]
    fn test_long_reference_chain() {
        const LEN: usize = 12_000;
        let mut sheet = Sheet::new();
        for row in 1..LEN {
            sheet
                .set_cell(Position::new(row - 1, 0), &format!("=A{}+1", row + 1))
                .unwrap();
        }
        sheet.set_cell(Position::new(LEN - 1, 0), "1").unwrap();

        assert_eq!(value(&sheet, "A1"), Value::Number(LEN as f64));

        sheet.set_cell(Position::new(LEN - 1, 0), "0").unwrap();
        assert!(!sheet.get_cell(pos("A1")).unwrap().unwrap().is_cache_valid());
        assert_eq!(value(&sheet, "A1"), Value::Number((LEN - 1) as f64));
    }

    #[test]
    fn test_outgoing_edges_match_formula() {
        let mut sheet = Sheet::new();
        sheet.set_cell(pos("C1"), "=A1+B1").unwrap();
        assert_eq!(sheet.precedents_of(pos("C1")), vec![pos("A1"), pos("B1")]);

        sheet.set_cell(pos("C1"), "=B1*B1").unwrap();
        assert_eq!(sheet.precedents_of(pos("C1")), vec![pos("B1")]);
        assert!(sheet.dependents_of(pos("A1")).is_empty());

        sheet.set_cell(pos("C1"), "plain").unwrap();
        assert!(sheet.precedents_of(pos("C1")).is_empty());
        assert!(sheet.dependents_of(pos("B1")).is_empty());
    }

    #[test]
    fn test_clear_drops_outgoing_edges_only() {
        let mut sheet = Sheet::new();
        sheet.set_cell(pos("B1"), "=A1").unwrap();
        sheet.set_cell(pos("C1"), "=B1").unwrap();

        sheet.clear_cell(pos("B1")).unwrap();
        assert!(sheet.dependents_of(pos("A1")).is_empty());
        assert_eq!(sheet.dependents_of(pos("B1")), vec![pos("C1")]);
    }

    #[test]
    fn test_cycle_check_materializes_referenced_cells() {
        let mut sheet = Sheet::new();
        sheet.set_cell(pos("A1"), "=C3").unwrap();
        let c3 = sheet.get_cell(pos("C3")).unwrap().unwrap();
        assert!(c3.is_empty());
        assert_eq!(sheet.printable_size().unwrap().rows, 3);
        assert_eq!(value(&sheet, "A1"), Value::Number(0.0));
    }

    #[test]
    fn test_error_values_propagate() {
        let mut sheet = Sheet::new();
        sheet.set_cell(pos("A1"), "=1/0").unwrap();
        sheet.set_cell(pos("A2"), "text").unwrap();
        sheet.set_cell(pos("B1"), "=A1+1").unwrap();
        sheet.set_cell(pos("B2"), "=A2+1").unwrap();
        sheet.set_cell(pos("B3"), "=ZZZZZ1").unwrap();

        assert_eq!(value(&sheet, "A1"), Value::Error(FormulaError::Arithmetic));
        assert_eq!(value(&sheet, "B1"), Value::Error(FormulaError::Arithmetic));
        assert_eq!(value(&sheet, "B2"), Value::Error(FormulaError::Value));
        assert_eq!(value(&sheet, "B3"), Value::Error(FormulaError::Ref));
        assert_eq!(text(&sheet, "B3"), "=#REF!");
    }

    #[test]
    fn test_numeric_text_is_an_operand() {
        let mut sheet = Sheet::new();
        sheet.set_cell(pos("A1"), "2.5").unwrap();
        sheet.set_cell(pos("A2"), "").unwrap();
        sheet.set_cell(pos("B1"), "=A1*2+A2").unwrap();
        assert_eq!(value(&sheet, "A1"), Value::Text("2.5".to_string()));
        assert_eq!(value(&sheet, "B1"), Value::Number(5.0));
    }
}
