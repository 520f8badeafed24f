//! In-memory cell grid and merge-span model
//!
//! Rows and columns are 1-based throughout, matching the addressing used by
//! report authors ("data starts at row 3"). The grid is values-only: the
//! loader resolves formulas before it gets here.

use std::collections::HashMap;
use std::path::PathBuf;

/// A scalar cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Number(f64),
    Text(String),
    Bool(bool),
}

impl CellValue {
    /// Whether this value counts as "no data" for the sparsity filter.
    ///
    /// Trivial values are the empty cell, the empty string, numeric zero and
    /// the literal string "0". Report generators emit any of these
    /// interchangeably for a brand that was not observed.
    pub fn is_trivial(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Number(n) => *n == 0.0,
            CellValue::Text(s) => s.is_empty() || s == "0",
            CellValue::Bool(_) => false,
        }
    }

    /// Get the text content if this is a text cell.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

/// A rectangle of visually merged cells, 1-based inclusive bounds.
///
/// The merged region logically holds the value stored at
/// `(min_row, min_col)`; the other cells in the rectangle are empty in the
/// underlying grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub min_row: u32,
    pub min_col: u32,
    pub max_row: u32,
    pub max_col: u32,
}

/// A single worksheet as a sparse grid of scalar values plus merge metadata.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetGrid {
    pub name: String,
    /// Non-empty cells keyed by 1-based (row, col).
    pub cells: HashMap<(u32, u32), CellValue>,
    /// Last row of the used range (0 when the sheet is empty).
    pub max_row: u32,
    /// Last column of the used range (0 when the sheet is empty).
    pub max_col: u32,
    /// Merged cell regions, in file order.
    pub spans: Vec<Span>,
}

impl SheetGrid {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Insert a cell value, growing the used range as needed.
    pub fn insert(&mut self, row: u32, col: u32, value: CellValue) {
        self.max_row = self.max_row.max(row);
        self.max_col = self.max_col.max(col);
        self.cells.insert((row, col), value);
    }

    /// Get a cell value, or `None` when the cell is absent from the grid.
    pub fn get(&self, row: u32, col: u32) -> Option<&CellValue> {
        self.cells.get(&(row, col))
    }

    /// Get an owned cell value, treating absent cells as `Empty`.
    pub fn value(&self, row: u32, col: u32) -> CellValue {
        self.get(row, col).cloned().unwrap_or(CellValue::Empty)
    }

    /// Sparsity check for a single cell; absent cells are trivial.
    pub fn is_trivial_at(&self, row: u32, col: u32) -> bool {
        self.get(row, col).is_none_or(CellValue::is_trivial)
    }

    /// Non-blank text content of a cell, if any.
    pub fn text(&self, row: u32, col: u32) -> Option<&str> {
        self.get(row, col)
            .and_then(CellValue::as_text)
            .filter(|s| !s.trim().is_empty())
    }
}

/// A decoded workbook: values-only sheets with their merge metadata.
#[derive(Debug, Clone, Default)]
pub struct Workbook {
    pub path: PathBuf,
    pub sheets: Vec<SheetGrid>,
}

impl Workbook {
    /// Get a sheet by name.
    pub fn sheet(&self, name: &str) -> Option<&SheetGrid> {
        self.sheets.iter().find(|s| s.name == name)
    }

    /// Get all sheet names.
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }
}
