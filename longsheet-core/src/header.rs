//! Header structure extraction
//!
//! Wide reports encode the brand dimension as a band of merged header cells,
//! one merge per brand, with per-column metric names on the row beneath.
//! This module turns that header metadata into a mapping from group label to
//! column range plus sub-labels, which the pivot engine then consumes.

use crate::config::{DuplicatePolicy, SheetLayout};
use crate::error::PivotError;
use crate::grid::SheetGrid;
use std::collections::HashMap;

/// A categorical column group: one brand and its metric columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub label: String,
    /// 1-based inclusive column range.
    pub start_col: u32,
    pub end_col: u32,
    /// One entry per column in the range, in order, sliced from the
    /// sub-header row. `None` where the sub-header cell is blank; columns
    /// past the grid's used range are omitted entirely.
    pub sub_labels: Vec<Option<String>>,
}

impl Group {
    pub fn new(label: impl Into<String>, start_col: u32, end_col: u32) -> Self {
        Self {
            label: label.into(),
            start_col,
            end_col,
            sub_labels: Vec::new(),
        }
    }
}

/// Insertion-ordered mapping from group label to [`Group`].
///
/// Iteration order is the order groups were first registered; an overwrite
/// under [`DuplicatePolicy::LastWins`] replaces the range in place without
/// moving the entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupMap {
    groups: Vec<Group>,
    index: HashMap<String, usize>,
}

impl GroupMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a group under the given duplicate policy.
    pub fn insert(
        &mut self,
        group: Group,
        policy: DuplicatePolicy,
        sheet: &str,
    ) -> Result<(), PivotError> {
        match self.index.get(&group.label) {
            None => {
                self.index.insert(group.label.clone(), self.groups.len());
                self.groups.push(group);
            }
            Some(&pos) => match policy {
                DuplicatePolicy::FirstWins => {}
                DuplicatePolicy::LastWins => self.groups[pos] = group,
                DuplicatePolicy::Error => {
                    return Err(PivotError::DuplicateGroup {
                        sheet: sheet.to_string(),
                        label: group.label,
                    });
                }
            },
        }
        Ok(())
    }

    pub fn get(&self, label: &str) -> Option<&Group> {
        self.index.get(label).map(|&pos| &self.groups[pos])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Group> {
        self.groups.iter()
    }

    pub fn as_slice(&self) -> &[Group] {
        &self.groups
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// How group column ranges are detected from a sheet's header area.
pub trait HeaderStrategy {
    fn detect(&self, grid: &SheetGrid, layout: &SheetLayout) -> Result<GroupMap, PivotError>;
}

/// Detection from merge metadata: every span whose top-left cell holds a
/// non-empty string becomes a group over the span's column range.
pub struct SpanBased;

impl HeaderStrategy for SpanBased {
    fn detect(&self, grid: &SheetGrid, layout: &SheetLayout) -> Result<GroupMap, PivotError> {
        let mut groups = GroupMap::new();
        for span in &grid.spans {
            if let Some(label) = grid.text(span.min_row, span.min_col) {
                groups.insert(
                    Group::new(label, span.min_col, span.max_col),
                    layout.duplicate_groups,
                    &grid.name,
                )?;
            }
        }
        Ok(groups)
    }
}

/// Detection for formats that lost their merge metadata: a non-empty string
/// cell on the header row starts a group, and the range greedily extends
/// rightward over the blank cells a merge would have covered.
///
/// Identity columns never start a group; their header cells are captions,
/// not brands.
pub struct BlankRunHeuristic;

impl HeaderStrategy for BlankRunHeuristic {
    fn detect(&self, grid: &SheetGrid, layout: &SheetLayout) -> Result<GroupMap, PivotError> {
        let mut groups = GroupMap::new();
        let row = layout.header_row;
        let mut col = 1;
        while col <= grid.max_col {
            if layout.identity_columns.iter().any(|c| c.col == col) {
                col += 1;
                continue;
            }
            let Some(label) = grid.text(row, col) else {
                col += 1;
                continue;
            };
            let start_col = col;
            let mut end_col = col;
            while end_col + 1 <= grid.max_col && grid.text(row, end_col + 1).is_none() {
                // Only genuinely blank cells extend the run; a non-string
                // cell ends the group without joining it.
                if grid.get(row, end_col + 1).is_some() {
                    break;
                }
                end_col += 1;
            }
            groups.insert(
                Group::new(label, start_col, end_col),
                layout.duplicate_groups,
                &grid.name,
            )?;
            col = end_col + 1;
        }
        Ok(groups)
    }
}

/// Extract the group mapping for a sheet.
///
/// Span-based detection runs first; when the sheet carries no spans, or none
/// of them describe a labelled group, the blank-run heuristic takes over.
/// Sub-labels are sliced from the configured sub-header row afterwards, so
/// both strategies produce identically shaped groups.
pub fn extract_groups(grid: &SheetGrid, layout: &SheetLayout) -> Result<GroupMap, PivotError> {
    if grid.max_row == 0 {
        return Err(PivotError::EmptySheet {
            name: grid.name.clone(),
        });
    }

    let mut groups = SpanBased.detect(grid, layout)?;
    if groups.is_empty() {
        groups = BlankRunHeuristic.detect(grid, layout)?;
    }

    for group in &mut groups.groups {
        group.sub_labels = slice_sub_labels(grid, layout.sub_header_row, group);
    }
    Ok(groups)
}

fn slice_sub_labels(grid: &SheetGrid, sub_header_row: u32, group: &Group) -> Vec<Option<String>> {
    (group.start_col..=group.end_col.min(grid.max_col))
        .map(|col| grid.text(sub_header_row, col).map(str::to_string))
        .collect()
}
