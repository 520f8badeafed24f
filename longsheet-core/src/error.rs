//! Error taxonomy for the transformation

use thiserror::Error;

/// Structural failures that abort the transformation of a sheet.
///
/// Ragged sub-header rows are deliberately not represented here: a group
/// whose sub-header is missing degrades to empty-valued fields instead of
/// failing, so that partially irregular report formats still pivot.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PivotError {
    /// A sheet named in the configuration does not exist in the workbook.
    #[error("sheet not found: {name}")]
    SheetNotFound { name: String },

    /// The sheet exists but contains no rows at all.
    #[error("sheet '{name}' has no rows")]
    EmptySheet { name: String },

    /// Two groups carry the same label under the `error` duplicate policy.
    #[error("duplicate group label '{label}' in sheet '{sheet}'")]
    DuplicateGroup { sheet: String, label: String },
}
