//! CLI entry point for the data-quality engine.

use anyhow::{Context, Result, anyhow, bail};
use chrono::Local;
use clap::{Parser, Subcommand, ValueEnum};
use polars::prelude::*;
use serde_json::json;
use std::fs::File;
use std::path::{Path, PathBuf};
use tabclean::profiler::DataProfiler;
use tabclean::{
    AnalysisConfig, CleaningError, CleaningSession, DatasetSummary, MissingStrategy,
    OutlierStrategy, Table, TransformKind, TransformPipeline,
};
use tracing::{debug, info};

/// CLI-compatible missing-value strategy enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliMissingStrategy {
    /// Drop every row with a missing cell
    Delete,
    /// Fill numeric columns with the column mean
    Mean,
    /// Fill numeric columns with the column median
    Median,
    /// Fill with the most frequent value
    Mode,
}

impl From<CliMissingStrategy> for MissingStrategy {
    fn from(cli: CliMissingStrategy) -> Self {
        match cli {
            CliMissingStrategy::Delete => MissingStrategy::Delete,
            CliMissingStrategy::Mean => MissingStrategy::Mean,
            CliMissingStrategy::Median => MissingStrategy::Median,
            CliMissingStrategy::Mode => MissingStrategy::Mode,
        }
    }
}

/// CLI-compatible outlier strategy enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliOutlierStrategy {
    /// Drop every row holding an outlier
    Delete,
    /// Replace outliers with the IQR bound they crossed
    Cap,
}

impl From<CliOutlierStrategy> for OutlierStrategy {
    fn from(cli: CliOutlierStrategy) -> Self {
        match cli {
            CliOutlierStrategy::Delete => OutlierStrategy::Delete,
            CliOutlierStrategy::Cap => OutlierStrategy::Cap,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Tabular data-quality and transformation engine",
    long_about = "Inspect data quality, clean missing values and outliers, and run \
                  column transformation pipelines over CSV files.\n\n\
                  EXAMPLES:\n  \
                  # Quality report\n  \
                  tabclean analyze -i data.csv\n\n  \
                  # Fill with medians, cap outliers\n  \
                  tabclean clean -i data.csv --missing median --outliers cap\n\n  \
                  # Normalize then one-hot encode\n  \
                  tabclean transform -i data.csv --step normalize:age --step oneHot:city"
)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    /// Suppress progress output (only show warnings and errors)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output JSON to stdout instead of a human-readable summary
    ///
    /// Disables all logs so stdout carries only JSON.
    #[arg(long, global = true)]
    json: bool,

    /// Analysis configuration as a JSON file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Report column types, missing values, outliers, and the quality score
    Analyze {
        /// Path to the CSV file
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Resolve missing values first, then outliers, and write the result
    Clean {
        /// Path to the CSV file
        #[arg(short, long)]
        input: PathBuf,

        /// Strategy for missing values
        #[arg(long, value_enum)]
        missing: Option<CliMissingStrategy>,

        /// Strategy for outliers
        #[arg(long, value_enum)]
        outliers: Option<CliOutlierStrategy>,

        /// Output file (.csv or .json)
        ///
        /// Defaults to cleaned_data_<timestamp>.csv
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run a transformation pipeline over the original data
    Transform {
        /// Path to the CSV file
        #[arg(short, long)]
        input: PathBuf,

        /// Step as kind:column (normalize, standardize, oneHot); repeatable
        #[arg(long = "step")]
        steps: Vec<String>,

        /// Load steps from a JSON recipe before any --step
        #[arg(long)]
        recipe: Option<PathBuf>,

        /// Save the final step list as a JSON recipe
        #[arg(long)]
        save_recipe: Option<PathBuf>,

        /// Output file (.csv or .json)
        ///
        /// Defaults to transformed_data.json
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet, args.json);

    let config = load_config(args.config.as_deref())?;

    match &args.command {
        Command::Analyze { input } => run_analyze(input, &config, args.json),
        Command::Clean {
            input,
            missing,
            outliers,
            output,
        } => run_clean(
            input,
            missing.map(Into::into),
            outliers.map(Into::into),
            output.as_deref(),
            &config,
            args.json,
        ),
        Command::Transform {
            input,
            steps,
            recipe,
            save_recipe,
            output,
        } => run_transform(
            input,
            steps,
            recipe.as_deref(),
            save_recipe.as_deref(),
            output.as_deref(),
            args.json,
        ),
    }
}

fn load_config(path: Option<&Path>) -> Result<AnalysisConfig> {
    let Some(path) = path else {
        return Ok(AnalysisConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let config: AnalysisConfig = serde_json::from_str(&text)?;
    config.validate()?;
    debug!("Loaded configuration: {:?}", config);
    Ok(config)
}

// =============================================================================
// Subcommands
// =============================================================================

fn run_analyze(input: &Path, config: &AnalysisConfig, json_output: bool) -> Result<()> {
    let table = load_table(input)?;
    let session = CleaningSession::with_config(table, config.clone());
    let report = session.report();
    let profiles = DataProfiler::profile_columns(session.current(), config);

    if json_output {
        let out = json!({
            "input": input.display().to_string(),
            "summary": report.summary,
            "columns": profiles,
            "missing": report.missing,
            "outliers": report.outliers,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("\n{}", "=".repeat(80));
    println!("DATA QUALITY REPORT");
    println!("{}\n", "=".repeat(80));
    println!("  File: {}", input.display());
    print_summary(&report.summary);

    println!("COLUMN PROFILES");
    println!("{}", "-".repeat(40));
    println!(
        "{:<20} {:<8} {:<10} {:<8} {:<12} {:<12}",
        "Column", "Type", "Missing %", "Unique", "Min", "Max"
    );
    println!("{}", "-".repeat(74));
    for col in &profiles {
        let (min, max) = col
            .numeric
            .as_ref()
            .map(|s| (format!("{:.2}", s.min), format!("{:.2}", s.max)))
            .unwrap_or_default();
        println!(
            "{:<20} {:<8} {:<10.1} {:<8} {:<12} {:<12}",
            truncate_str(&col.name, 19),
            col.inferred_type,
            col.missing_percentage,
            col.unique_count,
            min,
            max
        );
    }
    println!();

    if !report.outliers.is_empty() {
        println!("OUTLIERS");
        println!("{}", "-".repeat(40));
        for o in report.outliers.iter().take(10) {
            println!(
                "  row {:<6} {:<20} {} (bounds {:.2} .. {:.2})",
                o.row,
                truncate_str(&o.column, 19),
                o.value,
                o.bounds.lower,
                o.bounds.upper
            );
        }
        if report.outliers.len() > 10 {
            println!("  ... and {} more", report.outliers.len() - 10);
        }
        println!();
    }

    println!("{}", "=".repeat(80));
    Ok(())
}

fn run_clean(
    input: &Path,
    missing: Option<MissingStrategy>,
    outliers: Option<OutlierStrategy>,
    output: Option<&Path>,
    config: &AnalysisConfig,
    json_output: bool,
) -> Result<()> {
    if missing.is_none() && outliers.is_none() {
        bail!("Nothing to do: pass --missing and/or --outliers");
    }

    let table = load_table(input)?;
    let mut session = CleaningSession::with_config(table, config.clone());
    let score_before = session.report().score;

    let missing_outcome = missing.map(|method| session.apply_missing(method));
    let outlier_outcome = outliers
        .map(|method| session.apply_outliers(method))
        .transpose()?;

    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(default_clean_output);
    write_table(session.current(), &output)?;
    info!("Cleaned data written to: {}", output.display());

    if json_output {
        let out = json!({
            "input": input.display().to_string(),
            "output": output.display().to_string(),
            "score_before": score_before,
            "score_after": session.report().score,
            "missing": missing_outcome,
            "outliers": outlier_outcome,
            "changed_cells": session.changed(),
            "summary": session.report().summary,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("\n{}", "=".repeat(80));
    println!("CLEANING COMPLETE");
    println!("{}\n", "=".repeat(80));
    println!(
        "Input:  {} ({} rows x {} columns)",
        input.display(),
        session.original().row_count(),
        session.original().column_count()
    );
    println!(
        "Output: {} ({} rows x {} columns)",
        output.display(),
        session.current().row_count(),
        session.current().column_count()
    );
    println!();
    if let (Some(method), Some(outcome)) = (missing, &missing_outcome) {
        println!(
            "  Missing ({}): {} cells filled, {} rows removed",
            method, outcome.cells_changed, outcome.rows_removed
        );
    }
    if let (Some(method), Some(outcome)) = (outliers, &outlier_outcome) {
        println!(
            "  Outliers ({}): {} cells capped, {} rows removed",
            method, outcome.cells_changed, outcome.rows_removed
        );
    }
    println!(
        "  Quality score: {} -> {}",
        score_before,
        session.report().score
    );
    println!();
    println!("{}", "=".repeat(80));
    Ok(())
}

fn run_transform(
    input: &Path,
    steps: &[String],
    recipe: Option<&Path>,
    save_recipe: Option<&Path>,
    output: Option<&Path>,
    json_output: bool,
) -> Result<()> {
    let original = load_table(input)?;
    let mut pipeline = TransformPipeline::new();

    if let Some(path) = recipe {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read recipe {}", path.display()))?;
        pipeline.load_recipe_json(&text)?;
    }
    for arg in steps {
        let (kind, column) = parse_step(arg)?;
        pipeline.add_step(kind, column)?;
    }
    if pipeline.is_empty() {
        bail!("No steps given: pass --step kind:column or --recipe");
    }

    let transformed = pipeline.try_run(&original)?;

    if let Some(path) = save_recipe {
        std::fs::write(path, pipeline.to_recipe_json()?)
            .with_context(|| format!("Failed to write recipe {}", path.display()))?;
        info!("Recipe saved to: {}", path.display());
    }

    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("transformed_data.json"));
    write_table(&transformed, &output)?;
    info!("Transformed data written to: {}", output.display());

    if json_output {
        let out = json!({
            "input": input.display().to_string(),
            "output": output.display().to_string(),
            "steps": pipeline.steps(),
            "columns": transformed.columns(),
            "rows": transformed.row_count(),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("\n{}", "=".repeat(80));
    println!("TRANSFORMATION COMPLETE");
    println!("{}\n", "=".repeat(80));
    for (i, step) in pipeline.steps().iter().enumerate() {
        println!("  {}. {} '{}'", i + 1, step.kind, step.column);
    }
    println!();
    println!(
        "Output: {} ({} rows x {} columns)",
        output.display(),
        transformed.row_count(),
        transformed.column_count()
    );
    println!("{}", "=".repeat(80));
    Ok(())
}

// =============================================================================
// Helpers
// =============================================================================

fn print_summary(summary: &DatasetSummary) {
    println!("  Rows: {}", summary.rows);
    println!("  Columns: {} ({} numeric)", summary.columns, summary.numeric_columns);
    println!(
        "  Missing: {} ({:.1}% of cells)",
        summary.missing_count, summary.missing_percentage
    );
    println!(
        "  Outliers: {} ({:.1}% of numeric cells)",
        summary.outlier_count, summary.outlier_percentage
    );
    println!("  Quality score: {}/100", summary.score);
    println!();
}

/// Parse a `kind:column` step argument.
fn parse_step(arg: &str) -> Result<(TransformKind, String)> {
    let (kind, column) = arg
        .split_once(':')
        .ok_or_else(|| anyhow!("Invalid step '{}': expected kind:column", arg))?;
    if column.is_empty() {
        bail!("Invalid step '{}': column name is empty", arg);
    }
    Ok((kind.parse()?, column.to_string()))
}

fn default_clean_output() -> PathBuf {
    let timestamp = Local::now().format("%Y-%m-%dT%H-%M-%S");
    PathBuf::from(format!("cleaned_data_{}.csv", timestamp))
}

/// Truncate a string to max length with ellipsis
fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    }
}

/// Load a CSV file into a table.
///
/// Parser failures and files without data rows are ingestion errors.
fn load_table(path: &Path) -> Result<Table> {
    info!("Loading dataset from: {}", path.display());
    if !path.exists() {
        return Err(CleaningError::Ingestion(format!("input file not found: {}", path.display())).into());
    }

    let bytes = std::fs::read(path)
        .map_err(|e| CleaningError::Ingestion(format!("{}: {}", path.display(), e)))?;
    let table = Table::from_csv_bytes(bytes)
        .with_context(|| format!("Failed to load {}", path.display()))?;
    info!(
        "Dataset loaded: {} rows x {} columns",
        table.row_count(),
        table.column_count()
    );
    Ok(table)
}

/// Write a table as CSV, or as JSON records when the path ends in `.json`.
fn write_table(table: &Table, path: &Path) -> Result<()> {
    if table.row_count() == 0 {
        return Err(CleaningError::EmptyDataset).context("Nothing to export");
    }

    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));

    if is_json {
        std::fs::write(path, table.to_json_records()?)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    } else {
        let mut df = table.to_dataframe()?;
        let mut file =
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
        CsvWriter::new(&mut file)
            .include_header(true)
            .finish(&mut df)?;
    }
    Ok(())
}
