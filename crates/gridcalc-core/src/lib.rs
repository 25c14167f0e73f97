//! gridcalc-core - UI-agnostic sheet model: edits, invalidation and printing.

pub mod error;
pub mod sheet;

pub use error::{Result, SheetError};
pub use sheet::Sheet;

pub use gridcalc_engine::engine::{Cell, Position, SheetLimits, Size, Value};
