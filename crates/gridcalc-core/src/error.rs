//! Error types for Gridcalc core.

use thiserror::Error;

use gridcalc_engine::engine::Position;
use gridcalc_engine::formula::ParseError;

/// Errors that abort a sheet operation.
///
/// Evaluation problems such as division by zero are not errors here; they
/// are carried as [`gridcalc_engine::engine::FormulaError`] values.
#[derive(Error, Debug)]
pub enum SheetError {
    #[error("Invalid position: {0}")]
    InvalidPosition(String),

    #[error("Circular dependency detected at {at}: {}", format_path(.path))]
    CircularDependency { at: Position, path: Vec<Position> },

    #[error("Formula syntax error: {0}")]
    FormulaSyntax(#[from] ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn format_path(path: &[Position]) -> String {
    path.iter()
        .map(Position::to_string)
        .collect::<Vec<_>>()
        .join(" -> ")
}

pub type Result<T> = std::result::Result<T, SheetError>;
