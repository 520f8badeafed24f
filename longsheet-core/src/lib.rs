//! longsheet-core: wide-to-long reshaping of grouped spreadsheet reports
//!
//! Marketing report generators emit "wide" sheets where each brand occupies
//! a band of columns under a merged header cell. This library detects that
//! grouped-column structure from the merge metadata (or infers it from
//! blank-cell runs when the metadata is missing) and explodes every data row
//! into one long-format row per brand that actually has data.

pub mod config;
pub mod error;
pub mod grid;
pub mod header;
pub mod pivot;
pub mod reader;
pub mod writer;

use anyhow::{Context, Result};
use std::path::Path;

pub use config::{DuplicatePolicy, IdentityColumn, PivotConfig, SheetLayout};
pub use error::PivotError;
pub use grid::{CellValue, SheetGrid, Span, Workbook};
pub use header::{Group, GroupMap};
pub use pivot::{LongTable, OutputRow};

/// Main transformation interface.
pub struct Pivoter {
    config: PivotConfig,
}

impl Pivoter {
    /// Create a pivoter with default configuration.
    pub fn new() -> Self {
        Self::with_config(PivotConfig::default())
    }

    /// Create a pivoter with custom configuration.
    pub fn with_config(config: PivotConfig) -> Self {
        Self { config }
    }

    /// Read a workbook file and pivot every configured sheet.
    pub fn pivot_file<P: AsRef<Path>>(&self, path: P) -> Result<Vec<LongTable>> {
        let workbook = reader::read_workbook(path)?;
        self.pivot_workbook(&workbook)
    }

    /// Pivot every configured sheet of an already loaded workbook.
    ///
    /// A configured sheet missing from the workbook fails the whole run;
    /// with no sheets configured, every sheet is pivoted with the global
    /// layout. Tables come back in workbook sheet order.
    pub fn pivot_workbook(&self, workbook: &Workbook) -> Result<Vec<LongTable>> {
        for name in self.config.configured_sheets() {
            if workbook.sheet(name).is_none() {
                return Err(PivotError::SheetNotFound {
                    name: name.to_string(),
                }
                .into());
            }
        }

        let select_all = self.config.sheets.is_empty();
        let mut tables = Vec::new();

        for sheet in &workbook.sheets {
            if !select_all && !self.config.sheets.contains_key(&sheet.name) {
                continue;
            }
            let table = self
                .pivot_sheet(sheet)
                .with_context(|| format!("Failed to pivot sheet '{}'", sheet.name))?;
            tables.push(table);
        }

        Ok(tables)
    }

    /// Pivot a single sheet grid into a materialized long table.
    pub fn pivot_sheet(&self, sheet: &SheetGrid) -> Result<LongTable, PivotError> {
        let layout = self.config.layout_for(&sheet.name);
        let groups = header::extract_groups(sheet, &layout)?;
        let rows = pivot::pivot(sheet, &groups, &layout);
        Ok(LongTable::from_rows(sheet.name.clone(), rows))
    }
}

impl Default for Pivoter {
    fn default() -> Self {
        Self::new()
    }
}
