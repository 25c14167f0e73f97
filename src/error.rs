//! Error types for the Gridcalc command line

use gridcalc_core::SheetError;
use thiserror::Error;

/// Errors that can occur while running sheet commands
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Line {line}: {source}")]
    Sheet {
        line: usize,
        #[source]
        source: SheetError,
    },
}

pub type Result<T> = std::result::Result<T, CommandError>;
