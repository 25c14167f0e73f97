//! Arithmetic formulas.
//!
//! A [`Formula`] is parsed from the text that follows the formula marker,
//! evaluates against any [`CellLookup`], and reports the positions it
//! references along with its canonical text.

mod ast;
mod parser;

pub use ast::{BinaryOperator, Expr, UnaryOperator};
pub use parser::ParseError;

use crate::engine::{FormulaError, Position};

/// Read access to cell operands during evaluation.
pub trait CellLookup {
    /// Numeric operand for `pos`, or the error that should propagate.
    fn operand(&self, pos: Position) -> Result<f64, FormulaError>;
}

impl<F> CellLookup for F
where
    F: Fn(Position) -> Result<f64, FormulaError>,
{
    fn operand(&self, pos: Position) -> Result<f64, FormulaError> {
        self(pos)
    }
}

/// A parsed formula.
#[derive(Debug, Clone, PartialEq)]
pub struct Formula {
    ast: Expr,
    referenced: Vec<Position>,
}

/// Parse formula text (without the leading `=`).
pub fn parse_formula(text: &str) -> Result<Formula, ParseError> {
    let ast = parser::parse(text)?;

    let mut referenced = Vec::new();
    ast.collect_cells(&mut referenced);
    referenced.retain(Position::is_valid);
    referenced.sort_unstable();
    referenced.dedup();

    Ok(Formula { ast, referenced })
}

impl Formula {
    pub fn evaluate(&self, lookup: &dyn CellLookup) -> Result<f64, FormulaError> {
        self.ast.evaluate(lookup)
    }

    /// Valid positions referenced by the formula, sorted and without duplicates.
    pub fn referenced_cells(&self) -> &[Position] {
        &self.referenced
    }

    /// Canonical text of the formula, without the leading `=`.
    pub fn expression(&self) -> String {
        self.ast.to_string()
    }

    pub fn ast(&self) -> &Expr {
        &self.ast
    }
}
