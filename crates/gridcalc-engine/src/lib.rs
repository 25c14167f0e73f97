//! gridcalc_engine - Spreadsheet engine + arithmetic formulas.

pub mod engine;
pub mod formula;
