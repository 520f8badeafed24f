//! Workbook loader built on calamine
//!
//! Loads values-only grids (formulas come back as their cached results) and,
//! for XLSX containers, the merge metadata the header extractor needs.
//! calamine does not expose merged ranges, so those are pulled straight from
//! the worksheet XML parts of the archive.

use anyhow::{Context, Result};
use calamine::{Data, Range, Reader, Sheets, open_workbook_auto};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

pub mod xml_parser;

use crate::grid::{CellValue, SheetGrid, Workbook};

/// Read a workbook from a file path.
pub fn read_workbook<P: AsRef<Path>>(path: P) -> Result<Workbook> {
    let path = path.as_ref();
    let mut excel: Sheets<_> = open_workbook_auto(path)
        .with_context(|| format!("Failed to open workbook: {}", path.display()))?;

    // Merge metadata lives in the raw worksheet XML; open the container a
    // second time as a zip archive for XLSX input. Other formats load
    // without spans and rely on the blank-run fallback.
    let is_xlsx = path.extension().and_then(|s| s.to_str()) == Some("xlsx");
    let mut archive = if is_xlsx {
        let file =
            File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;
        Some(zip::ZipArchive::new(BufReader::new(file))?)
    } else {
        None
    };

    let sheet_names = excel.sheet_names();
    let mut sheets = Vec::new();

    for (index, sheet_name) in sheet_names.iter().enumerate() {
        let range = excel.worksheet_range(sheet_name).ok();
        let mut sheet = parse_sheet(sheet_name, range.as_ref());

        if let Some(ref mut archive_ref) = archive {
            if let Ok(spans) = xml_parser::extract_merged_cells(archive_ref, index) {
                sheet.spans = spans;
            }
        }

        sheets.push(sheet);
    }

    Ok(Workbook {
        path: path.to_path_buf(),
        sheets,
    })
}

fn parse_sheet(name: &str, range: Option<&Range<Data>>) -> SheetGrid {
    let mut grid = SheetGrid::new(name);

    let Some(range) = range else {
        return grid;
    };
    let (Some(start), Some(end)) = (range.start(), range.end()) else {
        return grid;
    };

    let (rows, cols) = range.get_size();
    for rel_row in 0..rows {
        for rel_col in 0..cols {
            if let Some(data) = range.get((rel_row, rel_col)) {
                if !matches!(data, Data::Empty) {
                    // calamine is 0-based; the grid is 1-based.
                    let row = start.0 + rel_row as u32 + 1;
                    let col = start.1 + rel_col as u32 + 1;
                    grid.insert(row, col, parse_cell_value(data));
                }
            }
        }
    }

    // The used range can extend past the last non-empty cell.
    grid.max_row = grid.max_row.max(end.0 + 1);
    grid.max_col = grid.max_col.max(end.1 + 1);
    grid
}

fn parse_cell_value(data: &Data) -> CellValue {
    match data {
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Bool(b) => CellValue::Bool(*b),
        // Cached error results come through as their display text, the same
        // way a values-only read of the original file shows them.
        Data::Error(e) => CellValue::Text(format!("{e:?}")),
        Data::Empty => CellValue::Empty,
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) => CellValue::Text(s.clone()),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
    }
}
