//! Cell positions and printable sizes.
//!
//! Provides bidirectional conversion between spreadsheet-style references
//! (e.g., "A1", "B2", "AA100") and zero-indexed row/column coordinates.
//!
//! # Examples
//!
//! ```ignore
//! let pos = Position::from_a1("B3").unwrap();
//! assert_eq!(pos.row, 2);  // 0-indexed
//! assert_eq!(pos.col, 1);
//! assert_eq!(pos.to_string(), "B3");
//! ```

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static A1_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?<letters>[A-Z]+)(?<numbers>[0-9]+)$").unwrap());

/// A cell coordinate (0-indexed).
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const MAX_ROWS: usize = 16384;
    pub const MAX_COLS: usize = 16384;

    /// A position that is never valid.
    pub const NONE: Position = Position {
        row: usize::MAX,
        col: usize::MAX,
    };

    pub const fn new(row: usize, col: usize) -> Position {
        Position { row, col }
    }

    pub fn is_valid(&self) -> bool {
        self.row < Self::MAX_ROWS && self.col < Self::MAX_COLS
    }

    /// Parse a position from A1 notation (e.g., "A1", "B2", "AA10").
    ///
    /// Column letters must be uppercase. The result may lie outside the
    /// valid range (e.g. "ZZZZ1"); callers check [`Position::is_valid`].
    /// Returns `None` when the text is not A1-shaped or overflows.
    pub fn from_a1(name: &str) -> Option<Position> {
        let caps = A1_RE.captures(name)?;
        let letters = &caps["letters"];
        let numbers = &caps["numbers"];

        let mut col_acc = 0usize;
        for c in letters.bytes() {
            let digit = (c - b'A') as usize + 1;
            col_acc = col_acc.checked_mul(26)?.checked_add(digit)?;
        }
        let col = col_acc.checked_sub(1)?;

        let row = numbers.parse::<usize>().ok()?.checked_sub(1)?;

        Some(Position::new(row, col))
    }

    /// Convert column index to spreadsheet-style letters (0 -> A, 25 -> Z, 26 -> AA).
    pub fn col_to_letters(col: usize) -> String {
        let mut result = String::new();
        let mut n = col as u128 + 1;
        while n > 0 {
            n -= 1;
            result.insert(0, (b'A' + (n % 26) as u8) as char);
            n /= 26;
        }
        result
    }
}

impl std::str::FromStr for Position {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_a1(s).ok_or_else(|| format!("Invalid cell reference: {}", s))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_valid() {
            return f.write_str("#REF!");
        }
        write!(f, "{}{}", Position::col_to_letters(self.col), self.row + 1)
    }
}

/// Dimensions of the printable area.
#[derive(Clone, Copy, Debug, Default, Hash, Eq, PartialEq)]
pub struct Size {
    pub rows: usize,
    pub cols: usize,
}

impl Size {
    pub const fn new(rows: usize, cols: usize) -> Size {
        Size { rows, cols }
    }

    /// Whether `pos` lies exactly on the last row or last column.
    pub fn is_on_boundary(&self, pos: Position) -> bool {
        pos.row + 1 == self.rows || pos.col + 1 == self.cols
    }
}
