//! Configuration for sheet layouts
//!
//! Report families share a layout (header row, sub-header row, where data
//! starts) but individual sheets override pieces of it, so every setting
//! resolves through a sheet -> global -> built-in default fallback chain.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Main pivot configuration, loaded from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PivotConfig {
    #[serde(default)]
    pub global: LayoutOverrides,
    /// Per-sheet overrides. When non-empty, the keys double as the set of
    /// sheets to pivot; when empty, every sheet in the workbook is pivoted
    /// with the global layout.
    #[serde(default)]
    pub sheets: HashMap<String, LayoutOverrides>,
}

impl PivotConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: PivotConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Resolve the effective layout for a sheet.
    pub fn layout_for(&self, sheet_name: &str) -> SheetLayout {
        let sheet = self.sheets.get(sheet_name);
        let pick = |f: fn(&LayoutOverrides) -> Option<u32>, default: u32| {
            sheet
                .and_then(f)
                .or_else(|| f(&self.global))
                .unwrap_or(default)
        };

        let identity_columns = sheet
            .and_then(|s| s.identity_columns.clone())
            .or_else(|| self.global.identity_columns.clone())
            .unwrap_or_else(|| vec![IdentityColumn::new(1, "keyword")]);

        let group_field = sheet
            .and_then(|s| s.group_field.clone())
            .or_else(|| self.global.group_field.clone())
            .unwrap_or_else(|| "brand".to_string());

        let qualifier_field = sheet
            .and_then(|s| s.qualifier_field.clone())
            .or_else(|| self.global.qualifier_field.clone())
            .unwrap_or_else(|| "classification".to_string());

        // An explicitly empty delimiter disables the qualifier split.
        let group_delimiter = sheet
            .and_then(|s| s.group_delimiter.clone())
            .or_else(|| self.global.group_delimiter.clone())
            .unwrap_or_else(|| "(".to_string());
        let group_delimiter = (!group_delimiter.is_empty()).then_some(group_delimiter);

        let duplicate_groups = sheet
            .and_then(|s| s.duplicate_groups)
            .or(self.global.duplicate_groups)
            .unwrap_or_default();

        SheetLayout {
            data_start_row: pick(|o| o.data_start_row, 3),
            sub_header_row: pick(|o| o.sub_header_row, 2),
            header_row: pick(|o| o.header_row, 1),
            identity_columns,
            group_field,
            qualifier_field,
            group_delimiter,
            duplicate_groups,
        }
    }

    /// Names of the sheets this configuration selects, sorted for
    /// deterministic reporting.
    pub fn configured_sheets(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.sheets.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// Partial layout, every field optional so it can sit at either level of the
/// fallback chain.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LayoutOverrides {
    /// First row of data (1-based).
    pub data_start_row: Option<u32>,
    /// Row holding per-column metric names beneath the group headers.
    pub sub_header_row: Option<u32>,
    /// Row scanned by the blank-run fallback when merge metadata is absent.
    pub header_row: Option<u32>,
    /// Leading columns copied verbatim into every output row.
    pub identity_columns: Option<Vec<IdentityColumn>>,
    /// Output field name for the group label.
    pub group_field: Option<String>,
    /// Output field name for the label qualifier.
    pub qualifier_field: Option<String>,
    /// Literal splitting a group label into name + qualifier. Empty string
    /// disables the split.
    pub group_delimiter: Option<String>,
    /// Policy for same-labelled groups.
    pub duplicate_groups: Option<DuplicatePolicy>,
}

/// One identity column: grid position plus its output field name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityColumn {
    pub col: u32,
    pub name: String,
}

impl IdentityColumn {
    pub fn new(col: u32, name: impl Into<String>) -> Self {
        Self {
            col,
            name: name.into(),
        }
    }
}

/// What to do when two detected groups carry the same label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
    /// Keep the first detected range.
    FirstWins,
    /// Overwrite with the later range, keeping the original position.
    #[default]
    LastWins,
    /// Fail the extraction.
    Error,
}

/// Fully resolved layout for one sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetLayout {
    pub data_start_row: u32,
    pub sub_header_row: u32,
    pub header_row: u32,
    pub identity_columns: Vec<IdentityColumn>,
    pub group_field: String,
    pub qualifier_field: String,
    /// `None` disables the qualifier split.
    pub group_delimiter: Option<String>,
    pub duplicate_groups: DuplicatePolicy,
}

impl Default for SheetLayout {
    fn default() -> Self {
        PivotConfig::default().layout_for("")
    }
}
