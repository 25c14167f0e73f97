//! Formula expression tree.
//!
//! `Display` produces the canonical text of an expression: no whitespace and
//! parentheses only where precedence or associativity requires them.

use std::fmt;

use super::CellLookup;
use crate::engine::{FormulaError, Position, format_number};

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl BinaryOperator {
    pub fn symbol(&self) -> char {
        match self {
            BinaryOperator::Add => '+',
            BinaryOperator::Subtract => '-',
            BinaryOperator::Multiply => '*',
            BinaryOperator::Divide => '/',
        }
    }

    fn precedence(&self) -> u8 {
        match self {
            BinaryOperator::Add | BinaryOperator::Subtract => 1,
            BinaryOperator::Multiply | BinaryOperator::Divide => 2,
        }
    }

    /// `a op (b op c)` differs from `a op b op c`.
    fn is_right_sensitive(&self) -> bool {
        matches!(self, BinaryOperator::Subtract | BinaryOperator::Divide)
    }

    fn apply(&self, left: f64, right: f64) -> f64 {
        match self {
            BinaryOperator::Add => left + right,
            BinaryOperator::Subtract => left - right,
            BinaryOperator::Multiply => left * right,
            BinaryOperator::Divide => left / right,
        }
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Plus,
    Minus,
}

const UNARY_PRECEDENCE: u8 = 3;
const ATOM_PRECEDENCE: u8 = 4;

/// Formula expression AST
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Non-negative numeric literal
    Number(f64),
    /// Cell reference; may be out of range, in which case it evaluates to `#REF!`
    Cell(Position),
    Unary {
        op: UnaryOperator,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOperator,
        left: Box<Expr>,
        right: Box<Expr>,
    },
}

impl Expr {
    fn precedence(&self) -> u8 {
        match self {
            Expr::Number(_) | Expr::Cell(_) => ATOM_PRECEDENCE,
            Expr::Unary { .. } => UNARY_PRECEDENCE,
            Expr::Binary { op, .. } => op.precedence(),
        }
    }

    /// Evaluate the expression. Every intermediate result must be finite.
    pub fn evaluate(&self, lookup: &dyn CellLookup) -> Result<f64, FormulaError> {
        match self {
            Expr::Number(n) => Ok(*n),
            Expr::Cell(pos) => {
                if !pos.is_valid() {
                    return Err(FormulaError::Ref);
                }
                lookup.operand(*pos)
            }
            Expr::Unary { op, operand } => {
                let value = operand.evaluate(lookup)?;
                Ok(match op {
                    UnaryOperator::Plus => value,
                    UnaryOperator::Minus => -value,
                })
            }
            Expr::Binary { op, left, right } => {
                let left = left.evaluate(lookup)?;
                let right = right.evaluate(lookup)?;
                let result = op.apply(left, right);
                if result.is_finite() {
                    Ok(result)
                } else {
                    Err(FormulaError::Arithmetic)
                }
            }
        }
    }

    /// Push every cell reference in the tree onto `out` (may repeat).
    pub fn collect_cells(&self, out: &mut Vec<Position>) {
        match self {
            Expr::Number(_) => {}
            Expr::Cell(pos) => out.push(*pos),
            Expr::Unary { operand, .. } => operand.collect_cells(out),
            Expr::Binary { left, right, .. } => {
                left.collect_cells(out);
                right.collect_cells(out);
            }
        }
    }
}

fn write_operand(f: &mut fmt::Formatter<'_>, expr: &Expr, parenthesize: bool) -> fmt::Result {
    if parenthesize {
        write!(f, "({})", expr)
    } else {
        write!(f, "{}", expr)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Number(n) => f.write_str(&format_number(*n)),
            Expr::Cell(pos) => write!(f, "{}", pos),
            Expr::Unary { op, operand } => {
                let sign = match op {
                    UnaryOperator::Plus => '+',
                    UnaryOperator::Minus => '-',
                };
                write!(f, "{}", sign)?;
                write_operand(f, operand, operand.precedence() < UNARY_PRECEDENCE)
            }
            Expr::Binary { op, left, right } => {
                let prec = op.precedence();
                write_operand(f, left, left.precedence() < prec)?;
                write!(f, "{}", op.symbol())?;
                let right_prec = right.precedence();
                let parenthesize =
                    right_prec < prec || (right_prec == prec && op.is_right_sensitive());
                write_operand(f, right, parenthesize)
            }
        }
    }
}
