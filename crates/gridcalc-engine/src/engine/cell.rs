//! Cell records.
//!
//! This module provides the core data types for representing cells:
//! - [`CellContent`] - What a cell holds (empty, literal text, or a formula)
//! - [`Cell`] - A cell record owning its content and, for formulas, a one-shot value cache

use std::cell::OnceCell;

use super::{Position, Value};
use crate::formula::{CellLookup, Formula, ParseError, parse_formula};

/// Leading character that marks a formula.
pub const FORMULA_SIGN: char = '=';
/// Leading character that makes the rest of the text literal.
pub const ESCAPE_SIGN: char = '\'';

/// The content stored in a cell.
#[derive(Clone, Debug)]
pub enum CellContent {
    Empty,
    /// Literal text, stored exactly as entered (escape marker included).
    Text(String),
    /// A parsed formula and its memoized value.
    Formula {
        formula: Formula,
        cache: OnceCell<Value>,
    },
}

impl CellContent {
    /// Classify user input.
    /// - Empty string -> Empty
    /// - `=` alone, or text not starting with `=` -> Text
    /// - Otherwise -> Formula (the text after `=` must parse)
    ///
    /// Building content never touches a live cell, so a parse error leaves
    /// the sheet as it was.
    pub fn from_input(text: &str) -> Result<CellContent, ParseError> {
        if text.is_empty() {
            return Ok(CellContent::Empty);
        }
        match text.strip_prefix(FORMULA_SIGN) {
            Some(body) if !body.is_empty() => Ok(CellContent::Formula {
                formula: parse_formula(body)?,
                cache: OnceCell::new(),
            }),
            _ => Ok(CellContent::Text(text.to_string())),
        }
    }

    pub fn referenced_cells(&self) -> &[Position] {
        match self {
            CellContent::Formula { formula, .. } => formula.referenced_cells(),
            CellContent::Empty | CellContent::Text(_) => &[],
        }
    }

    /// The raw text of the content, suitable for editing.
    pub fn text(&self) -> String {
        match self {
            CellContent::Empty => String::new(),
            CellContent::Text(s) => s.clone(),
            CellContent::Formula { formula, .. } => {
                format!("{}{}", FORMULA_SIGN, formula.expression())
            }
        }
    }
}

/// A cell record in the grid.
#[derive(Clone, Debug)]
pub struct Cell {
    content: CellContent,
}

impl Cell {
    pub fn new(content: CellContent) -> Cell {
        Cell { content }
    }

    pub fn new_empty() -> Cell {
        Cell::new(CellContent::Empty)
    }

    pub fn from_input(text: &str) -> Result<Cell, ParseError> {
        CellContent::from_input(text).map(Cell::new)
    }

    pub fn content(&self) -> &CellContent {
        &self.content
    }

    /// Replace the content, returning the previous one.
    pub fn set_content(&mut self, content: CellContent) -> CellContent {
        std::mem::replace(&mut self.content, content)
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.content, CellContent::Empty)
    }

    /// Compute the externally visible value.
    ///
    /// Formula results are memoized until [`Cell::invalidate_cache`] is called.
    pub fn value(&self, lookup: &dyn CellLookup) -> Value {
        match &self.content {
            CellContent::Empty => Value::Number(0.0),
            CellContent::Text(s) => {
                Value::Text(s.strip_prefix(ESCAPE_SIGN).unwrap_or(s).to_string())
            }
            CellContent::Formula { formula, cache } => cache
                .get_or_init(|| Value::from(formula.evaluate(lookup)))
                .clone(),
        }
    }

    pub fn text(&self) -> String {
        self.content.text()
    }

    pub fn referenced_cells(&self) -> &[Position] {
        self.content.referenced_cells()
    }

    /// Drop a memoized formula value. No-op for other content or an
    /// already-invalid cache.
    pub fn invalidate_cache(&mut self) {
        if let CellContent::Formula { cache, .. } = &mut self.content {
            cache.take();
        }
    }

    pub fn is_cache_valid(&self) -> bool {
        match &self.content {
            CellContent::Formula { cache, .. } => cache.get().is_some(),
            CellContent::Empty | CellContent::Text(_) => true,
        }
    }
}
