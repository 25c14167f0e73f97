//! Printable area and tab-separated output.

use super::Sheet;
use crate::error::{Result, SheetError};
use gridcalc_engine::engine::{Cell, Position, Size};
use std::io::Write;

impl Sheet {
    /// Smallest rectangle covering every occupied position.
    pub fn printable_size(&self) -> Result<Size> {
        self.grid.printable_size().ok_or_else(|| {
            SheetError::InvalidPosition("printable area must be recomputed".to_string())
        })
    }

    /// Write computed values: one line per row, cells separated by tabs.
    pub fn print_values<W: Write + ?Sized>(&self, output: &mut W) -> Result<()> {
        self.print_cells(output, |pos, cell| {
            self.evaluate_precedents(pos);
            cell.value(self).to_string()
        })
    }

    /// Write raw cell texts: one line per row, cells separated by tabs.
    pub fn print_texts<W: Write + ?Sized>(&self, output: &mut W) -> Result<()> {
        self.print_cells(output, |_, cell| cell.text())
    }

    fn print_cells<W, F>(&self, output: &mut W, render: F) -> Result<()>
    where
        W: Write + ?Sized,
        F: Fn(Position, &Cell) -> String,
    {
        let size = self.printable_size()?;
        for row in 0..size.rows {
            for col in 0..size.cols {
                if col > 0 {
                    output.write_all(b"\t")?;
                }
                let pos = Position::new(row, col);
                if let Some(cell) = self.grid.get(pos) {
                    output.write_all(render(pos, cell).as_bytes())?;
                }
            }
            output.write_all(b"\n")?;
        }
        Ok(())
    }
}
