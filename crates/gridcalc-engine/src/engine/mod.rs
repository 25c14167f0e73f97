//! Spreadsheet engine API.
//!
//! This module provides the core data structures of the spreadsheet:
//!
//! - [`Position`], [`Size`] - Cell coordinates (A1 notation ↔ row/col indices)
//! - [`Value`], [`FormulaError`] - Computed values and value-level errors
//! - [`Cell`], [`CellContent`] - Cell records and content classification
//! - [`Grid`], [`SheetLimits`] - Sparse storage with a tracked printable area
//! - [`DependencyIndex`] - Edges between referencing and referenced cells
//! - [`detect_cycle`] - Circular dependency detection
//! - [`format_number`] - Format numbers for display

mod cell;
mod cycle;
mod deps;
mod format;
mod grid;
mod position;
mod value;

pub use cell::{Cell, CellContent, ESCAPE_SIGN, FORMULA_SIGN};
pub use cycle::detect_cycle;
pub use deps::DependencyIndex;
pub use format::format_number;
pub use grid::{Grid, SheetLimits};
pub use position::{Position, Size};
pub use value::{FormulaError, Value};
