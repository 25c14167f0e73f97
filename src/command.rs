//! Command mode: a line-oriented interface to a [`Sheet`].
//!
//! ```text
//! set A1 =B1+1     set a cell (everything after the position is the text)
//! clear A1         clear a cell
//! get A1           print the computed value
//! text A1          print the raw text
//! deps A1          print the cells that reference A1
//! size             print "rows cols" of the printable area
//! values           print every value, tab-separated
//! texts            print every text, tab-separated
//! ```
//!
//! Blank lines and lines starting with `#` are ignored.

use crate::error::{CommandError, Result};
use gridcalc_core::{Position, Sheet};
use std::io::Write;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Set(Position, String),
    Clear(Position),
    Get(Position),
    Text(Position),
    Deps(Position),
    Size,
    Values,
    Texts,
}

impl Command {
    /// Parse one input line. Returns `Ok(None)` for blank and comment lines.
    pub fn parse(line_no: usize, line: &str) -> Result<Option<Command>> {
        let line = line.strip_suffix('\r').unwrap_or(line);
        let trimmed = line.trim_start();
        if trimmed.trim_end().is_empty() || trimmed.starts_with('#') {
            return Ok(None);
        }

        let parse_error = |message: String| CommandError::Parse {
            line: line_no,
            message,
        };

        let (name, rest) = split_word(trimmed);
        let position = |arg: &str| {
            Position::from_a1(arg.trim())
                .ok_or_else(|| parse_error(format!("invalid cell reference '{}'", arg.trim())))
        };

        let command = match name {
            "set" => {
                let (cell, text) = split_word(rest);
                Command::Set(position(cell)?, text.to_string())
            }
            "clear" => Command::Clear(position(rest)?),
            "get" => Command::Get(position(rest)?),
            "text" => Command::Text(position(rest)?),
            "deps" => Command::Deps(position(rest)?),
            "size" => Command::Size,
            "values" => Command::Values,
            "texts" => Command::Texts,
            other => return Err(parse_error(format!("unknown command '{}'", other))),
        };
        Ok(Some(command))
    }
}

/// Split off the first whitespace-delimited word. Only the single separator
/// after the word is consumed; the remainder is kept verbatim.
fn split_word(s: &str) -> (&str, &str) {
    let s = s.trim_start();
    s.split_once(char::is_whitespace).unwrap_or((s, ""))
}

/// A sheet plus the commands run against it.
pub struct Session {
    pub sheet: Sheet,
}

impl Session {
    pub fn new(sheet: Sheet) -> Self {
        Session { sheet }
    }

    /// Parse and run a single line, writing any output to `out`.
    pub fn run_line<W: Write + ?Sized>(
        &mut self,
        line_no: usize,
        line: &str,
        out: &mut W,
    ) -> Result<()> {
        let Some(command) = Command::parse(line_no, line)? else {
            return Ok(());
        };
        let sheet_error = |source| CommandError::Sheet {
            line: line_no,
            source,
        };

        match command {
            Command::Set(pos, text) => self.sheet.set_cell(pos, &text).map_err(sheet_error)?,
            Command::Clear(pos) => self.sheet.clear_cell(pos).map_err(sheet_error)?,
            Command::Get(pos) => {
                let value = self.sheet.cell_value(pos).map_err(sheet_error)?;
                match value {
                    Some(value) => writeln!(out, "{}", value)?,
                    None => writeln!(out)?,
                }
            }
            Command::Text(pos) => {
                let text = self.sheet.cell_text(pos).map_err(sheet_error)?;
                writeln!(out, "{}", text.unwrap_or_default())?;
            }
            Command::Deps(pos) => {
                let deps: Vec<String> = self
                    .sheet
                    .dependents_of(pos)
                    .iter()
                    .map(Position::to_string)
                    .collect();
                writeln!(out, "{}", deps.join(" "))?;
            }
            Command::Size => {
                let size = self.sheet.printable_size().map_err(sheet_error)?;
                writeln!(out, "{} {}", size.rows, size.cols)?;
            }
            Command::Values => self.sheet.print_values(out).map_err(sheet_error)?,
            Command::Texts => self.sheet.print_texts(out).map_err(sheet_error)?,
        }
        Ok(())
    }
}
