//! Row pivot engine
//!
//! Explodes each eligible source row into one output row per group that has
//! data, turning the wide brand-band layout into long format. The engine is
//! pure: it borrows the grid and the group mapping, keeps no state between
//! invocations, and yields rows lazily so a caller can stop consuming at any
//! point.

use crate::config::SheetLayout;
use crate::grid::{CellValue, SheetGrid};
use crate::header::{Group, GroupMap};

/// One long-format record: ordered (field name, value) pairs.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputRow {
    fields: Vec<(String, CellValue)>,
}

impl OutputRow {
    pub fn get(&self, name: &str) -> Option<&CellValue> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Pivot a sheet against its extracted group mapping.
///
/// The returned iterator visits source rows from `data_start_row` to the end
/// of the grid, groups in mapping order within each row, and emits exactly
/// one [`OutputRow`] per (row, group) pair that passes the identity and
/// sparsity checks.
pub fn pivot<'a>(grid: &'a SheetGrid, groups: &'a GroupMap, layout: &'a SheetLayout) -> PivotRows<'a> {
    PivotRows {
        grid,
        groups,
        layout,
        row: layout.data_start_row.max(1),
        group_idx: 0,
    }
}

/// Lazy sequence of pivoted rows. See [`pivot`].
pub struct PivotRows<'a> {
    grid: &'a SheetGrid,
    groups: &'a GroupMap,
    layout: &'a SheetLayout,
    row: u32,
    group_idx: usize,
}

impl<'a> PivotRows<'a> {
    /// A source row participates only when its primary identity cell holds
    /// something other than nothing or empty text.
    fn row_eligible(&self, row: u32) -> bool {
        let Some(primary) = self.layout.identity_columns.first() else {
            return false;
        };
        match self.grid.get(row, primary.col) {
            None | Some(CellValue::Empty) => false,
            Some(CellValue::Text(s)) => !s.is_empty(),
            Some(_) => true,
        }
    }

    /// Sparsity filter: a group emits nothing for a row when every cell in
    /// its column range is trivial.
    fn group_has_data(&self, row: u32, group: &Group) -> bool {
        (group.start_col..=group.end_col.min(self.grid.max_col))
            .any(|col| !self.grid.is_trivial_at(row, col))
    }

    fn emit(&self, row: u32, group: &Group) -> OutputRow {
        let mut fields = Vec::with_capacity(self.layout.identity_columns.len() + 2 + group.sub_labels.len());

        for identity in &self.layout.identity_columns {
            fields.push((identity.name.clone(), self.grid.value(row, identity.col)));
        }

        let (name, qualifier) = split_label(&group.label, self.layout.group_delimiter.as_deref());
        fields.push((self.layout.group_field.clone(), CellValue::Text(name)));
        if let Some(qualifier) = qualifier {
            fields.push((self.layout.qualifier_field.clone(), CellValue::Text(qualifier)));
        }

        for (offset, sub_label) in group.sub_labels.iter().enumerate() {
            if let Some(sub_label) = sub_label {
                let col = group.start_col + offset as u32;
                // Past the grid edge this degrades to Empty rather than
                // failing; ragged sub-headers are tolerated.
                fields.push((sub_label.clone(), self.grid.value(row, col)));
            }
        }

        OutputRow { fields }
    }
}

impl<'a> Iterator for PivotRows<'a> {
    type Item = OutputRow;

    fn next(&mut self) -> Option<OutputRow> {
        loop {
            if self.row > self.grid.max_row {
                return None;
            }
            if self.group_idx == 0 && !self.row_eligible(self.row) {
                self.row += 1;
                continue;
            }
            if self.group_idx >= self.groups.len() {
                self.row += 1;
                self.group_idx = 0;
                continue;
            }
            let group = &self.groups.as_slice()[self.group_idx];
            self.group_idx += 1;
            if self.group_has_data(self.row, group) {
                return Some(self.emit(self.row, group));
            }
        }
    }
}

/// Split a group label into name and qualifier on the configured delimiter,
/// e.g. `Acme(customer)` -> (`Acme`, `customer`). Labels without the
/// delimiter pass through whole.
fn split_label(label: &str, delimiter: Option<&str>) -> (String, Option<String>) {
    let Some(delimiter) = delimiter else {
        return (label.to_string(), None);
    };
    match label.split_once(delimiter) {
        Some((name, rest)) => {
            let rest = rest.trim();
            let qualifier = if delimiter == "(" {
                rest.strip_suffix(')').unwrap_or(rest)
            } else {
                rest
            };
            (name.trim().to_string(), Some(qualifier.trim().to_string()))
        }
        None => (label.to_string(), None),
    }
}

/// A fully materialized long-format table, ready for the writer.
///
/// Column order is the order field names were first seen across the rows;
/// groups with differing sub-label sets simply leave gaps in each other's
/// columns.
#[derive(Debug, Clone, PartialEq)]
pub struct LongTable {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<OutputRow>,
}

impl LongTable {
    pub fn from_rows(name: impl Into<String>, rows: impl IntoIterator<Item = OutputRow>) -> Self {
        let rows: Vec<OutputRow> = rows.into_iter().collect();
        let mut columns: Vec<String> = Vec::new();
        for row in &rows {
            for (field, _) in row.iter() {
                if !columns.iter().any(|c| c == field) {
                    columns.push(field.to_string());
                }
            }
        }
        Self {
            name: name.into(),
            columns,
            rows,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{IdentityColumn, SheetLayout};
    use crate::grid::Span;
    use crate::header::extract_groups;

    fn layout_two_identities() -> SheetLayout {
        SheetLayout {
            identity_columns: vec![
                IdentityColumn::new(1, "keyword"),
                IdentityColumn::new(2, "platform"),
            ],
            ..SheetLayout::default()
        }
    }

    /// One merged span "Acme(customer)" over the two metric columns, one
    /// data row. Mirrors the smallest real report shape.
    fn single_brand_grid() -> SheetGrid {
        let mut grid = SheetGrid::new("keywords");
        grid.insert(1, 1, "keyword".into());
        grid.insert(1, 3, "Acme(customer)".into());
        grid.insert(2, 3, "ratio".into());
        grid.insert(2, 4, "count".into());
        grid.insert(3, 1, "kw1".into());
        grid.insert(3, 2, "platformX".into());
        grid.insert(3, 3, 5.0.into());
        grid.insert(3, 4, 12.0.into());
        grid.spans.push(Span {
            min_row: 1,
            min_col: 3,
            max_row: 1,
            max_col: 4,
        });
        grid
    }

    #[test]
    fn test_single_brand_row() {
        let grid = single_brand_grid();
        let layout = layout_two_identities();
        let groups = extract_groups(&grid, &layout).unwrap();
        let rows: Vec<OutputRow> = pivot(&grid, &groups, &layout).collect();

        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.get("keyword"), Some(&"kw1".into()));
        assert_eq!(row.get("platform"), Some(&"platformX".into()));
        assert_eq!(row.get("brand"), Some(&"Acme".into()));
        assert_eq!(row.get("classification"), Some(&"customer".into()));
        assert_eq!(row.get("ratio"), Some(&CellValue::Number(5.0)));
        assert_eq!(row.get("count"), Some(&CellValue::Number(12.0)));
    }

    #[test]
    fn test_all_trivial_group_emits_nothing() {
        let mut grid = single_brand_grid();
        grid.insert(3, 3, CellValue::Empty);
        grid.insert(3, 4, 0.0.into());
        let layout = layout_two_identities();
        let groups = extract_groups(&grid, &layout).unwrap();

        assert_eq!(pivot(&grid, &groups, &layout).count(), 0);
    }

    #[test]
    fn test_single_nontrivial_cell_emits_one_row() {
        let mut grid = single_brand_grid();
        grid.insert(3, 3, "0".into());
        grid.insert(3, 4, 0.01.into());
        let layout = layout_two_identities();
        let groups = extract_groups(&grid, &layout).unwrap();
        let rows: Vec<OutputRow> = pivot(&grid, &groups, &layout).collect();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("ratio"), Some(&"0".into()));
        assert_eq!(rows[0].get("count"), Some(&CellValue::Number(0.01)));
    }

    #[test]
    fn test_row_without_identity_is_skipped() {
        let mut grid = single_brand_grid();
        grid.insert(4, 3, 9.0.into()); // data but no keyword in column 1
        grid.insert(5, 1, "".into()); // empty-string identity
        grid.insert(5, 3, 9.0.into());
        let layout = layout_two_identities();
        let groups = extract_groups(&grid, &layout).unwrap();

        let rows: Vec<OutputRow> = pivot(&grid, &groups, &layout).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("keyword"), Some(&"kw1".into()));
    }

    #[test]
    fn test_identity_copied_verbatim() {
        let mut grid = single_brand_grid();
        grid.insert(4, 1, 1001.0.into()); // numeric keyword stays numeric
        grid.insert(4, 3, 2.0.into());
        let layout = layout_two_identities();
        let groups = extract_groups(&grid, &layout).unwrap();

        let rows: Vec<OutputRow> = pivot(&grid, &groups, &layout).collect();
        assert_eq!(rows[1].get("keyword"), Some(&CellValue::Number(1001.0)));
        // Absent secondary identity cell copies through as Empty.
        assert_eq!(rows[1].get("platform"), Some(&CellValue::Empty));
    }

    /// Two eligible rows x two groups, every group populated everywhere:
    /// the row count reaches its upper bound.
    #[test]
    fn test_row_count_upper_bound() {
        let mut grid = SheetGrid::new("keywords");
        grid.insert(1, 2, "Acme".into());
        grid.insert(1, 4, "Globex".into());
        grid.spans.push(Span {
            min_row: 1,
            min_col: 2,
            max_row: 1,
            max_col: 3,
        });
        grid.spans.push(Span {
            min_row: 1,
            min_col: 4,
            max_row: 1,
            max_col: 5,
        });
        grid.insert(2, 2, "ratio".into());
        grid.insert(2, 3, "count".into());
        grid.insert(2, 4, "ratio".into());
        grid.insert(2, 5, "count".into());
        for row in 3..=4 {
            grid.insert(row, 1, format!("kw{row}").as_str().into());
            for col in 2..=5 {
                grid.insert(row, col, f64::from(row * col).into());
            }
        }

        let layout = SheetLayout::default();
        let groups = extract_groups(&grid, &layout).unwrap();
        let rows: Vec<OutputRow> = pivot(&grid, &groups, &layout).collect();

        assert_eq!(rows.len(), 4); // 2 eligible rows x 2 groups
        let brands: Vec<&CellValue> = rows.iter().filter_map(|r| r.get("brand")).collect();
        assert_eq!(
            brands,
            vec![&"Acme".into(), &"Globex".into(), &"Acme".into(), &"Globex".into()]
        );
    }

    #[test]
    fn test_unnamed_column_counts_for_sparsity_but_emits_no_field() {
        let mut grid = SheetGrid::new("keywords");
        grid.insert(1, 2, "Acme".into());
        grid.spans.push(Span {
            min_row: 1,
            min_col: 2,
            max_row: 1,
            max_col: 3,
        });
        grid.insert(2, 3, "count".into()); // column 2 has no sub-label
        grid.insert(3, 1, "kw1".into());
        grid.insert(3, 2, 8.0.into()); // only the unnamed column has data
        grid.insert(3, 3, 0.0.into());

        let layout = SheetLayout::default();
        let groups = extract_groups(&grid, &layout).unwrap();
        let rows: Vec<OutputRow> = pivot(&grid, &groups, &layout).collect();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("count"), Some(&CellValue::Number(0.0)));
        // keyword + brand + count: the unnamed column contributes no field.
        assert_eq!(rows[0].len(), 3);
    }

    #[test]
    fn test_delimiter_disabled_keeps_label_whole() {
        let grid = single_brand_grid();
        let mut layout = layout_two_identities();
        layout.group_delimiter = None;
        let groups = extract_groups(&grid, &layout).unwrap();
        let rows: Vec<OutputRow> = pivot(&grid, &groups, &layout).collect();

        assert_eq!(rows[0].get("brand"), Some(&"Acme(customer)".into()));
        assert_eq!(rows[0].get("classification"), None);
    }

    #[test]
    fn test_label_without_delimiter_has_no_qualifier() {
        assert_eq!(split_label("Globex", Some("(")), ("Globex".to_string(), None));
        assert_eq!(
            split_label("Acme(customer)", Some("(")),
            ("Acme".to_string(), Some("customer".to_string()))
        );
        assert_eq!(
            split_label("Acme - rival", Some(" - ")),
            ("Acme".to_string(), Some("rival".to_string()))
        );
    }

    #[test]
    fn test_pivot_is_pure() {
        let grid = single_brand_grid();
        let layout = layout_two_identities();
        let groups = extract_groups(&grid, &layout).unwrap();

        let first: Vec<OutputRow> = pivot(&grid, &groups, &layout).collect();
        let second: Vec<OutputRow> = pivot(&grid, &groups, &layout).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_table_columns_first_seen_order() {
        // Two groups with different sub-label sets produce a ragged union.
        let mut grid = SheetGrid::new("keywords");
        grid.insert(1, 2, "Acme".into());
        grid.insert(1, 3, "Globex".into());
        grid.spans.push(Span {
            min_row: 1,
            min_col: 2,
            max_row: 1,
            max_col: 2,
        });
        grid.spans.push(Span {
            min_row: 1,
            min_col: 3,
            max_row: 1,
            max_col: 3,
        });
        grid.insert(2, 2, "ratio".into());
        grid.insert(2, 3, "count".into());
        grid.insert(3, 1, "kw1".into());
        grid.insert(3, 2, 1.0.into());
        grid.insert(3, 3, 2.0.into());

        let layout = SheetLayout::default();
        let groups = extract_groups(&grid, &layout).unwrap();
        let table = LongTable::from_rows("keywords", pivot(&grid, &groups, &layout));

        assert_eq!(table.columns, vec!["keyword", "brand", "ratio", "count"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1].get("ratio"), None);
    }
}
