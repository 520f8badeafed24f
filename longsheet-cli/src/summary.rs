//! Run summaries for pivoted tables

use anyhow::Result;
use colored::*;
use longsheet_core::LongTable;
use serde::Serialize;
use std::path::Path;

/// Print a colored per-sheet summary of the run.
pub fn print_human(input: &Path, output: Option<&Path>, tables: &[LongTable]) {
    println!("{}", format!("Reshaping: {}", input.display()).bold());
    println!();

    if tables.is_empty() {
        println!("{}", "No sheets were pivoted.".yellow().bold());
        return;
    }

    let mut total_rows = 0;
    for table in tables {
        println!("{} {}", "Sheet:".bold(), table.name.cyan().bold());
        println!(
            "  {} rows across {} columns",
            table.rows.len(),
            table.columns.len()
        );
        if table.is_empty() {
            println!("  {}", "no group had data in any eligible row".yellow());
        }
        total_rows += table.rows.len();
        println!();
    }

    match output {
        Some(path) => println!(
            "{}",
            format!("✓ {} long-format rows written to {}", total_rows, path.display())
                .green()
                .bold()
        ),
        None => println!(
            "{}",
            format!("✓ {total_rows} long-format rows (dry run, nothing written)")
                .green()
                .bold()
        ),
    }
}

#[derive(Serialize)]
struct RunSummary<'a> {
    input: String,
    output: Option<String>,
    sheets: Vec<SheetSummary<'a>>,
}

#[derive(Serialize)]
struct SheetSummary<'a> {
    name: &'a str,
    rows: usize,
    columns: &'a [String],
}

/// Print a machine-readable summary of the run.
pub fn print_json(input: &Path, output: Option<&Path>, tables: &[LongTable]) -> Result<()> {
    let summary = RunSummary {
        input: input.display().to_string(),
        output: output.map(|p| p.display().to_string()),
        sheets: tables
            .iter()
            .map(|t| SheetSummary {
                name: &t.name,
                rows: t.rows.len(),
                columns: &t.columns,
            })
            .collect(),
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
