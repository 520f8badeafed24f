//! Merge-metadata extraction from raw XLSX worksheet XML

use crate::grid::Span;
use anyhow::Result;
use quick_xml::Reader;
use quick_xml::events::Event;
use std::io::BufReader;
use zip::ZipArchive;

/// Extract merged cell ranges from a worksheet.
///
/// Coordinates come back 1-based to match the grid model.
pub fn extract_merged_cells(
    archive: &mut ZipArchive<impl std::io::Read + std::io::Seek>,
    sheet_index: usize,
) -> Result<Vec<Span>> {
    let mut spans = Vec::new();

    // Sheet files are named sheet1.xml, sheet2.xml, etc. (1-indexed)
    let sheet_path = format!("xl/worksheets/sheet{}.xml", sheet_index + 1);

    let sheet_xml = match archive.by_name(&sheet_path) {
        Ok(file) => file,
        Err(_) => return Ok(spans),
    };

    let buf_reader = BufReader::new(sheet_xml);
    let mut reader = Reader::from_reader(buf_reader);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                if e.name().as_ref() == b"mergeCell" {
                    for attr in e.attributes().flatten() {
                        if attr.key.as_ref() == b"ref" {
                            let ref_str = String::from_utf8_lossy(&attr.value);
                            if let Some(span) = parse_cell_range(&ref_str) {
                                spans.push(span);
                            }
                        }
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(anyhow::anyhow!("XML parsing error: {}", e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(spans)
}

/// Parse a cell range like "A1:B2" into a [`Span`].
fn parse_cell_range(range: &str) -> Option<Span> {
    let (start, end) = range.split_once(':')?;
    let (min_row, min_col) = parse_cell_ref(start)?;
    let (max_row, max_col) = parse_cell_ref(end)?;
    Some(Span {
        min_row,
        min_col,
        max_row,
        max_col,
    })
}

/// Parse a cell reference like "B3" into 1-based (row, col).
fn parse_cell_ref(cell_ref: &str) -> Option<(u32, u32)> {
    let mut col = 0u32;
    let mut row_str = String::new();

    for ch in cell_ref.chars() {
        if ch.is_ascii_alphabetic() {
            col = col * 26 + (ch.to_ascii_uppercase() as u32 - 'A' as u32 + 1);
        } else if ch.is_ascii_digit() {
            row_str.push(ch);
        }
    }

    if row_str.is_empty() || col == 0 {
        return None;
    }

    let row = row_str.parse::<u32>().ok()?;
    Some((row, col))
}
