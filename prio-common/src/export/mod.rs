//! Report export

pub mod csv;

pub use self::csv::{records_to_csv, results_to_csv, sanitize_cell, Cell, CsvRecord};
