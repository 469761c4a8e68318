//! Integration tests for the data-quality engine.
//!
//! These tests load CSV fixtures through Polars and drive the public API end
//! to end: analysis, cleaning sessions, and transformation pipelines.

use polars::prelude::*;
use pretty_assertions::assert_eq;
use std::path::PathBuf;
use tabclean::quality::{find_missing, find_outliers, score_from_counts};
use tabclean::{
    AnalysisConfig, CellValue, CleaningError, CleaningSession, ColumnType, DataQualityAnalyzer,
    MissingStrategy, OutlierStrategy, SharedSession, StepId, Table, TransformKind,
    TransformPipeline,
};

// ============================================================================
// Helper Functions
// ============================================================================

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load_csv(filename: &str) -> Table {
    let bytes = std::fs::read(fixtures_path().join(filename)).expect("Failed to read fixture");
    Table::from_csv_bytes(bytes).expect("Failed to parse CSV fixture")
}

fn strings(table: &Table, column: &str) -> Vec<String> {
    let idx = table.column_index(column).expect("column exists");
    table.column_values(idx).map(|c| c.to_string()).collect()
}

// ============================================================================
// Analysis
// ============================================================================

#[test]
fn test_analyze_employees() {
    let table = load_csv("employees.csv");
    let report = DataQualityAnalyzer::analyze(&table, &AnalysisConfig::default());

    assert_eq!(report.column_type("age"), Some(ColumnType::Numeric));
    assert_eq!(report.column_type("salary"), Some(ColumnType::Numeric));
    assert_eq!(report.column_type("city"), Some(ColumnType::Text));

    assert_eq!(report.missing.len(), 4);
    assert_eq!(report.rows_with_missing().into_iter().collect::<Vec<_>>(), vec![1, 2, 5]);

    assert_eq!(report.outliers.len(), 1);
    let outlier = &report.outliers[0];
    assert_eq!((outlier.row, outlier.column.as_str()), (4, "salary"));
    assert_eq!(outlier.bounds.lower, 40500.0);
    assert_eq!(outlier.bounds.upper, 60500.0);

    assert_eq!(report.score, score_from_counts(40, 4, 1));
    assert_eq!(report.summary.total_cells, 40);
    assert!(!report.is_clean());
}

#[test]
fn test_sentinel_after_many_numeric_rows() {
    let table = load_csv("late_sentinel.csv");
    assert_eq!(table.row_count(), 151);

    let report = DataQualityAnalyzer::analyze(&table, &AnalysisConfig::default());
    assert_eq!(report.column_type("reading"), Some(ColumnType::Numeric));
    assert_eq!(report.missing.len(), 1);
    assert_eq!(report.missing[0].row, 150);
    assert!(report.outliers.is_empty());

    let mut session = CleaningSession::new(table);
    session.apply_missing(MissingStrategy::Mean);
    assert_eq!(session.current().cell(150, "reading"), Some(&CellValue::from("75.50")));
}

#[test]
fn test_nearest_rank_quartiles_keep_large_value() {
    let table = load_csv("quartiles.csv");
    assert!(find_outliers(&table, "a", &AnalysisConfig::default()).is_empty());

    let report = DataQualityAnalyzer::analyze(&table, &AnalysisConfig::default());
    assert_eq!(report.score, 100);
    assert!(report.is_clean());
}

#[test]
fn test_empty_table_degrades_gracefully() {
    let table = Table::from_json_records("[]").unwrap();
    let report = DataQualityAnalyzer::analyze(&table, &AnalysisConfig::default());
    assert_eq!(report.score, 0);
    assert!(report.missing.is_empty());

    let err = DataQualityAnalyzer::try_analyze(&table, &AnalysisConfig::default()).unwrap_err();
    assert!(matches!(err, CleaningError::EmptyDataset));
}

// ============================================================================
// Cleaning Sessions
// ============================================================================

#[test]
fn test_median_fill_then_cap() {
    let mut session = CleaningSession::new(load_csv("employees.csv"));

    let missing = session.apply_missing(MissingStrategy::Median);
    assert_eq!(missing.cells_changed, 4);
    assert_eq!(session.current().cell(1, "age"), Some(&CellValue::from("35.00")));
    assert_eq!(session.current().cell(2, "salary"), Some(&CellValue::from("51000.00")));
    assert_eq!(session.current().cell(5, "city"), Some(&CellValue::from("Seoul")));

    let outliers = session.apply_outliers(OutlierStrategy::Cap).unwrap();
    assert_eq!(outliers.cells_changed, 1);
    assert_eq!(session.current().cell(4, "salary"), Some(&CellValue::from("57500.00")));

    assert!(session.report().is_clean());
    assert_eq!(session.report().score, 100);
    assert_eq!(session.changed().len(), 5);
}

#[test]
fn test_delete_rows_leaves_no_missing() {
    let mut session = CleaningSession::new(load_csv("employees.csv"));
    let outcome = session.apply_missing(MissingStrategy::Delete);

    assert_eq!(outcome.rows_removed, 3);
    assert_eq!(session.current().row_count(), 5);
    assert!(find_missing(session.current()).is_empty());
    assert_eq!(strings(session.current(), "name"), vec!["Alice", "Dan", "Eve", "Grace", "Heidi"]);
}

#[test]
fn test_capping_keeps_values_within_previous_bounds() {
    let config = AnalysisConfig::default();
    let mut session = CleaningSession::new(load_csv("employees.csv"));
    let bounds = session.report().outliers[0].bounds;

    session.apply_outliers(OutlierStrategy::Cap).unwrap();
    let idx = session.current().column_index("salary").unwrap();
    for (_, value) in session.current().numeric_values(idx) {
        assert!(!bounds.is_outside(value));
    }
    assert!(find_outliers(session.current(), "salary", &config).is_empty());
}

#[test]
fn test_reset_and_export() {
    let mut session = CleaningSession::new(load_csv("employees.csv"));
    session.apply_missing(MissingStrategy::Delete);
    session.reset();
    assert_eq!(session.current(), session.original());

    let json = session.export_records().unwrap();
    let back = Table::from_json_records(&json).unwrap();
    assert_eq!(back.columns(), session.current().columns());
    assert_eq!(back.row_count(), 8);
}

#[test]
fn test_cleaned_table_exports_to_dataframe() {
    let mut session = CleaningSession::new(load_csv("employees.csv"));
    session.apply_missing(MissingStrategy::Median);
    let df = session.current().to_dataframe().unwrap();

    assert_eq!(df.shape(), (8, 5));
    assert_eq!(df.column("city").unwrap().dtype(), &DataType::String);

    // filled cells keep their fixed-decimal text
    let age = df.column("age").unwrap().as_materialized_series().clone();
    assert_eq!(age.dtype(), &DataType::String);
    assert_eq!(age.str().unwrap().get(1), Some("35.00"));
    assert_eq!(age.str().unwrap().get(0), Some("34"));
}

#[test]
fn test_transformed_columns_export_as_numbers() {
    let mut pipeline = TransformPipeline::new();
    pipeline.add_step(TransformKind::Normalize, "price").unwrap();
    let df = pipeline.run(&load_csv("products.csv")).to_dataframe().unwrap();

    assert_eq!(df.column("price").unwrap().dtype(), &DataType::Float64);
    assert_eq!(df.column("rating").unwrap().dtype(), &DataType::String);
}

#[test]
fn test_shared_session_across_threads() {
    let shared = SharedSession::from_table(load_csv("employees.csv"));
    let worker = shared.clone();

    std::thread::spawn(move || worker.apply_missing(MissingStrategy::Mode))
        .join()
        .unwrap();

    assert!(shared.report().missing.is_empty());
}

// ============================================================================
// Transformation Pipeline
// ============================================================================

#[test]
fn test_pipeline_over_products() {
    let original = load_csv("products.csv");
    let mut pipeline = TransformPipeline::new();
    pipeline.add_step(TransformKind::Normalize, "price").unwrap();
    pipeline.add_step(TransformKind::OneHot, "category").unwrap();

    let out = pipeline.run(&original);
    assert_eq!(
        out.columns(),
        &["product", "category_A", "category_B", "price", "rating"].map(String::from)
    );
    assert_eq!(strings(&out, "price"), vec!["0", "0.5", "1"]);
    assert_eq!(strings(&out, "category_A"), vec!["1", "0", "1"]);
    assert_eq!(strings(&out, "category_B"), vec!["0", "1", "0"]);

    // pure: same input and steps give the same output
    assert_eq!(pipeline.run(&original), out);
    assert_eq!(original, load_csv("products.csv"));
}

#[test]
fn test_pipeline_edits_recompute_from_original() {
    let original = load_csv("products.csv");
    let mut pipeline = TransformPipeline::new();
    let norm = pipeline.add_step(TransformKind::Normalize, "price").unwrap();
    let std = pipeline.add_step(TransformKind::Standardize, "price").unwrap();
    let before = pipeline.run(&original);

    pipeline.remove_step(std).unwrap();
    let after = pipeline.run(&original);
    assert_ne!(before, after);
    assert_eq!(strings(&after, "price"), vec!["0", "0.5", "1"]);

    pipeline.update_step(norm, Some(TransformKind::OneHot), Some("category".to_string())).unwrap();
    let encoded = pipeline.run(&original);
    assert!(encoded.column_index("category").is_none());
    assert_eq!(strings(&encoded, "price"), vec!["10", "20", "30"]);
}

#[test]
fn test_recipe_json_round_trip() {
    let recipe = r#"[
        {"id": 4, "type": "standardize", "column": "rating"},
        {"id": 2, "type": "oneHot", "column": "category"}
    ]"#;
    let mut pipeline = TransformPipeline::new();
    pipeline.load_recipe_json(recipe).unwrap();
    assert_eq!(pipeline.steps()[0].id, StepId(4));
    assert_eq!(pipeline.add_step(TransformKind::Normalize, "price").unwrap(), StepId(5));

    let saved = pipeline.to_recipe_json().unwrap();
    let mut reloaded = TransformPipeline::new();
    reloaded.load_recipe_json(&saved).unwrap();
    assert_eq!(reloaded.to_recipe(), pipeline.to_recipe());

    let original = load_csv("products.csv");
    assert_eq!(reloaded.run(&original), pipeline.run(&original));
}

#[test]
fn test_invalid_recipe_is_rejected() {
    let mut pipeline = TransformPipeline::new();
    let err = pipeline
        .load_recipe_json(r#"[{"id": 1, "type": "scale", "column": "a"}]"#)
        .unwrap_err();
    assert_eq!(err.error_code(), "JSON_ERROR");

    let err = pipeline
        .load_recipe_json(
            r#"[{"id": 1, "type": "normalize", "column": "a"},
                {"id": 1, "type": "normalize", "column": "b"}]"#,
        )
        .unwrap_err();
    assert_eq!(err.error_code(), "DUPLICATE_STEP_ID");
}
