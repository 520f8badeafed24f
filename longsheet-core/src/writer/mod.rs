//! Long-format workbook output
//!
//! Serializes pivoted tables into a fresh XLSX workbook, one worksheet per
//! table, header row first. Field order is whatever [`LongTable`] collected
//! as first-seen; cells for fields a row does not carry stay blank.

use anyhow::{Context, Result};
use rust_xlsxwriter::Workbook;
use std::path::Path;

use crate::grid::CellValue;
use crate::pivot::LongTable;

/// Write the pivoted tables to an XLSX file at `path`.
pub fn write_workbook<P: AsRef<Path>>(path: P, tables: &[LongTable]) -> Result<()> {
    let path = path.as_ref();
    let mut workbook = Workbook::new();

    for table in tables {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&table.name)?;

        for (col, name) in table.columns.iter().enumerate() {
            worksheet.write_string(0, col as u16, name)?;
        }

        for (row_idx, row) in table.rows.iter().enumerate() {
            let out_row = row_idx as u32 + 1;
            for (col, name) in table.columns.iter().enumerate() {
                let col = col as u16;
                match row.get(name) {
                    Some(CellValue::Number(n)) => {
                        worksheet.write_number(out_row, col, *n)?;
                    }
                    Some(CellValue::Text(s)) => {
                        worksheet.write_string(out_row, col, s)?;
                    }
                    Some(CellValue::Bool(b)) => {
                        worksheet.write_boolean(out_row, col, *b)?;
                    }
                    Some(CellValue::Empty) | None => {}
                }
            }
        }
    }

    workbook
        .save(path)
        .with_context(|| format!("Failed to write workbook: {}", path.display()))?;
    Ok(())
}
