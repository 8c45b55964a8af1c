//! CSV export with spreadsheet formula-injection protection
//!
//! Two writers:
//! - [`results_to_csv`]: the fixed-layout ranked results report
//! - [`records_to_csv`]: any [`CsvRecord`], every cell passed through
//!   [`sanitize_cell`]

use crate::models::{FeatureWithVotes, VoteWithContext};

/// Header of the ranked results report
pub const RESULTS_HEADER: [&str; 6] = ["Rank", "Feature", "Total Points", "Votes", "Effort", "Impact"];

/// Placeholder for a missing effort or impact rating
const NOT_AVAILABLE: &str = "N/A";

/// Leading characters a spreadsheet may interpret as a formula
const FORMULA_TRIGGERS: [char; 6] = ['=', '+', '-', '@', '\t', '\r'];

/// A single CSV cell value before sanitization
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
}

impl Cell {
    fn render(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.clone(),
            Cell::Integer(n) => n.to_string(),
            Cell::Float(f) => f.to_string(),
            Cell::Bool(b) => b.to_string(),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<&String> for Cell {
    fn from(value: &String) -> Self {
        Cell::Text(value.clone())
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Integer(value)
    }
}

impl From<u32> for Cell {
    fn from(value: u32) -> Self {
        Cell::Integer(i64::from(value))
    }
}

impl From<u64> for Cell {
    fn from(value: u64) -> Self {
        i64::try_from(value)
            .map(Cell::Integer)
            .unwrap_or_else(|_| Cell::Text(value.to_string()))
    }
}

impl From<usize> for Cell {
    fn from(value: usize) -> Self {
        Cell::from(value as u64)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Float(value)
    }
}

impl From<bool> for Cell {
    fn from(value: bool) -> Self {
        Cell::Bool(value)
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Cell::Empty)
    }
}

/// Render a value as a safe CSV cell
///
/// Empty values become `""`. A value starting with `=`, `+`, `-`, `@`, tab
/// or carriage return gets a leading `'` so spreadsheets treat it as text.
/// Values containing a comma, quote or line break are then quoted with
/// inner quotes doubled.
pub fn sanitize_cell(value: impl Into<Cell>) -> String {
    let text = neutralize_formula(value.into().render());
    if text.is_empty() {
        return text;
    }

    if text.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", text.replace('"', "\"\""))
    } else {
        text
    }
}

/// Prefix `'` to text a spreadsheet would otherwise evaluate as a formula
fn neutralize_formula(mut text: String) -> String {
    if text.starts_with(FORMULA_TRIGGERS) {
        text.insert(0, '\'');
    }
    text
}

/// Wrap a value in double quotes, doubling any inner quotes
fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

fn rating(value: Option<i64>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Serialize ranked results to the results report
///
/// Rows keep the order given; `Rank` is the 1-based row index. Titles are
/// always quoted, after the same formula neutralization as [`sanitize_cell`].
/// Missing ratings render as `N/A`.
pub fn results_to_csv(results: &[FeatureWithVotes]) -> String {
    let mut lines = Vec::with_capacity(results.len() + 1);
    lines.push(RESULTS_HEADER.join(","));

    for (index, result) in results.iter().enumerate() {
        lines.push(format!(
            "{},{},{},{},{},{}",
            index + 1,
            quote(&neutralize_formula(result.feature.title.clone())),
            result.total_points,
            result.vote_count,
            rating(result.feature.effort),
            rating(result.feature.impact),
        ));
    }

    lines.join("\n")
}

/// A row type that can be exported through [`records_to_csv`]
pub trait CsvRecord {
    /// Column names, in output order
    fn headers() -> Vec<&'static str>;

    /// Cell values, one per header
    fn cells(&self) -> Vec<Cell>;
}

/// Serialize arbitrary records, sanitizing every header and cell
pub fn records_to_csv<R: CsvRecord>(records: &[R]) -> String {
    let mut lines = Vec::with_capacity(records.len() + 1);
    lines.push(
        R::headers()
            .into_iter()
            .map(|cell| sanitize_cell(cell))
            .collect::<Vec<_>>()
            .join(","),
    );

    for record in records {
        lines.push(
            record
                .cells()
                .into_iter()
                .map(|cell| sanitize_cell(cell))
                .collect::<Vec<_>>()
                .join(","),
        );
    }

    lines.join("\n")
}

impl CsvRecord for VoteWithContext {
    fn headers() -> Vec<&'static str> {
        vec!["Player", "Role", "Feature", "Points"]
    }

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::from(&self.player_name),
            Cell::from(self.player_role.clone()),
            Cell::from(&self.feature_title),
            Cell::from(self.points_allocated),
        ]
    }
}
