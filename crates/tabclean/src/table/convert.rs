//! Conversions between [`Table`] and Polars `DataFrame`s.
//!
//! The CSV parser collaborator hands over a `DataFrame`; export goes back
//! through one. Numeric dtypes become [`CellValue::Number`], everything else
//! is carried as text, and nulls become [`CellValue::Missing`].
//!
//! CSV text is read with every column as a string. Numeric classification
//! happens later over the whole column, so a sentinel deep in the file
//! cannot break parsing.

use super::{CellValue, Table};
use crate::error::{CleaningError, Result, ResultExt};
use crate::utils::is_numeric_dtype;
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use tracing::debug;

impl Table {
    /// Convert a parsed `DataFrame` into a table.
    ///
    /// A frame with no columns is reported as an ingestion failure, not as
    /// an engine error.
    pub fn from_dataframe(df: &DataFrame) -> Result<Self> {
        if df.width() == 0 {
            return Err(CleaningError::Ingestion(
                "parsed data has no columns".to_string(),
            ));
        }

        let columns: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        let mut rows: Vec<Vec<CellValue>> =
            vec![Vec::with_capacity(columns.len()); df.height()];

        for col in df.get_columns() {
            let series = col.as_materialized_series();
            if is_numeric_dtype(series.dtype()) {
                let floats = series
                    .cast(&DataType::Float64)
                    .context(format!("Casting '{}' to Float64", series.name()))?;
                for (row, value) in rows.iter_mut().zip(floats.f64()?.into_iter()) {
                    row.push(value.map_or(CellValue::Missing, CellValue::Number));
                }
            } else {
                let strings = series
                    .cast(&DataType::String)
                    .context(format!("Casting '{}' to String", series.name()))?;
                for (row, value) in rows.iter_mut().zip(strings.str()?.into_iter()) {
                    row.push(value.map_or(CellValue::Missing, |s| CellValue::Text(s.to_string())));
                }
            }
        }

        debug!(
            "Converted DataFrame {:?} into table with {} columns",
            df.shape(),
            columns.len()
        );
        Table::from_rows(columns, rows)
    }

    /// Parse CSV bytes with a header row into a table of text cells.
    ///
    /// Empty fields become [`CellValue::Missing`]. A parse failure or a
    /// file with no data rows is an ingestion failure.
    pub fn from_csv_bytes(bytes: Vec<u8>) -> Result<Self> {
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .into_reader_with_file_handle(std::io::Cursor::new(bytes))
            .finish()
            .map_err(|e| CleaningError::Ingestion(e.to_string()))?;

        if df.height() == 0 {
            return Err(CleaningError::Ingestion("CSV has no data rows".to_string()));
        }
        Self::from_dataframe(&df)
    }

    /// Convert the table into a `DataFrame` for export.
    ///
    /// A column holding only numbers (and absent cells) becomes `Float64`.
    /// Any column with a text cell is written as text, including numeric
    /// text, so fills like `57500.00` and sentinels like `NA` keep their
    /// exact form.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let mut columns = Vec::with_capacity(self.column_count());

        for (idx, name) in self.columns().iter().enumerate() {
            let all_numbers = self
                .column_values(idx)
                .all(|c| matches!(c, CellValue::Number(_) | CellValue::Missing));
            let any_number = self
                .column_values(idx)
                .any(|c| matches!(c, CellValue::Number(_)));

            let column = if all_numbers && any_number {
                let values: Vec<Option<f64>> =
                    self.column_values(idx).map(CellValue::as_number).collect();
                Column::new(name.as_str().into(), values)
            } else {
                let values: Vec<Option<String>> = self
                    .column_values(idx)
                    .map(|c| match c {
                        CellValue::Missing => None,
                        other => Some(other.to_string()),
                    })
                    .collect();
                Column::new(name.as_str().into(), values)
            };
            columns.push(column);
        }

        Ok(DataFrame::new(columns)?)
    }
}
