//! Computed cell values.

use std::fmt;
use thiserror::Error;

/// Error category produced while evaluating a formula.
///
/// These are values, not failures: a formula cell whose evaluation yields one
/// holds it as its computed [`Value`].
#[derive(Error, Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum FormulaError {
    /// Reference to a position outside the sheet.
    #[error("#REF!")]
    Ref,
    /// Operand that cannot be read as a number.
    #[error("#VALUE!")]
    Value,
    /// Non-finite arithmetic result (e.g. division by zero).
    #[error("#ARITHM!")]
    Arithmetic,
}

/// The externally visible value of a cell.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Number(f64),
    Text(String),
    Error(FormulaError),
}

impl Value {
    /// Convert the value to a formula operand.
    ///
    /// Empty text reads as zero, text is accepted only when the whole string
    /// is a finite number, and errors propagate unchanged.
    pub fn to_operand(&self) -> Result<f64, FormulaError> {
        match self {
            Value::Number(n) => Ok(*n),
            Value::Text(s) if s.is_empty() => Ok(0.0),
            Value::Text(s) => match s.parse::<f64>() {
                Ok(n) if n.is_finite() => Ok(n),
                _ => Err(FormulaError::Value),
            },
            Value::Error(e) => Err(*e),
        }
    }
}

impl From<Result<f64, FormulaError>> for Value {
    fn from(result: Result<f64, FormulaError>) -> Self {
        match result {
            Ok(n) if n.is_finite() => Value::Number(n),
            Ok(_) => Value::Error(FormulaError::Arithmetic),
            Err(e) => Value::Error(e),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => f.write_str(&super::format_number(*n)),
            Value::Text(s) => f.write_str(s),
            Value::Error(e) => write!(f, "{}", e),
        }
    }
}
