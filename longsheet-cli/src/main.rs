use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use longsheet_core::{PivotConfig, Pivoter, writer};
use std::path::PathBuf;

mod summary;

#[derive(Parser)]
#[command(name = "longsheet")]
#[command(about = "Reshape brand-grouped wide reports into long-format tables", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the wide-format report to reshape
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Output workbook path (defaults to <input>_long.xlsx)
    #[arg(short, long, value_name = "OUT")]
    output: Option<PathBuf>,

    /// Path to layout configuration file (TOML)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Summary format
    #[arg(short, long, value_enum, default_value = "human")]
    format: OutputFormat,

    /// Pivot and summarize without writing the output workbook
    #[arg(long)]
    dry_run: bool,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Human-readable colored summary
    Human,
    /// JSON summary for scripting
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = if let Some(config_path) = &cli.config {
        PivotConfig::from_file(config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()))?
    } else {
        // Try to load default config from current directory if it exists
        let default_config_path = PathBuf::from("longsheet.toml");
        if default_config_path.exists() {
            PivotConfig::from_file(&default_config_path).with_context(|| {
                format!(
                    "Failed to load config from {}",
                    default_config_path.display()
                )
            })?
        } else {
            PivotConfig::default()
        }
    };

    let pivoter = Pivoter::with_config(config);
    let tables = pivoter
        .pivot_file(&cli.file)
        .with_context(|| format!("Failed to pivot file: {}", cli.file.display()))?;

    let output = cli.output.clone().unwrap_or_else(|| default_output(&cli.file));
    let written = if cli.dry_run {
        None
    } else {
        writer::write_workbook(&output, &tables)
            .with_context(|| format!("Failed to write output: {}", output.display()))?;
        Some(output.as_path())
    };

    match cli.format {
        OutputFormat::Human => summary::print_human(&cli.file, written, &tables),
        OutputFormat::Json => summary::print_json(&cli.file, written, &tables)?,
    }

    Ok(())
}

/// Derive an output path next to the input: `report.xlsx` -> `report_long.xlsx`.
fn default_output(input: &PathBuf) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    input.with_file_name(format!("{stem}_long.xlsx"))
}
