//! In-memory table model.
//!
//! A [`Table`] is an ordered list of records sharing one column set. Records
//! are stored as rows of [`CellValue`]s aligned with the table's column list,
//! so every row always carries exactly one cell per column. Column order is
//! the insertion order of the first record's keys and is what rendering and
//! export use.

mod convert;

use crate::error::{CleaningError, Result};
use crate::utils::{format_number, parse_numeric_str};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{BTreeSet, HashMap};
use std::fmt;

// ============================================================================
// Cell values
// ============================================================================

/// A single cell as delivered by the CSV/XLSX parser: text, number, or absent.
///
/// Parsers frequently deliver numeric-looking values as text, so every
/// consumer goes through [`CellValue::as_number`] instead of matching on
/// `Number` alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Missing,
}

impl CellValue {
    /// Whether this cell counts as missing (absent, null-like, empty, or a
    /// sentinel token such as `NA`).
    pub fn is_missing(&self) -> bool {
        crate::quality::is_missing_value(self)
    }

    /// The finite numeric value of this cell, if it has one.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(v) if v.is_finite() => Some(*v),
            CellValue::Number(_) | CellValue::Missing => None,
            CellValue::Text(s) => parse_numeric_str(s),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Key used for equality in frequency counts and one-hot encoding.
    ///
    /// `Number(1.0)` and `Text("1")` share the key `"1"`; an absent cell is
    /// keyed as `"null"`.
    pub fn key(&self) -> String {
        match self {
            CellValue::Missing => "null".to_string(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Number(v) => f.write_str(&format_number(*v)),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Missing => Ok(()),
        }
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        CellValue::Number(v)
    }
}

impl From<i32> for CellValue {
    fn from(v: i32) -> Self {
        CellValue::Number(v as f64)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(CellValue::Missing, Into::into)
    }
}

impl From<serde_json::Value> for CellValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => CellValue::Missing,
            Value::Number(n) => n.as_f64().map_or(CellValue::Missing, CellValue::Number),
            Value::String(s) => CellValue::Text(s),
            Value::Bool(b) => CellValue::Text(b.to_string()),
            other => CellValue::Text(other.to_string()),
        }
    }
}

// ============================================================================
// Cell coordinates
// ============================================================================

/// A `(row, column)` coordinate into a table.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CellRef {
    pub row: usize,
    pub column: String,
}

impl CellRef {
    pub fn new(row: usize, column: impl Into<String>) -> Self {
        Self {
            row,
            column: column.into(),
        }
    }
}

/// Cells touched by the most recent remediation, kept for highlighting only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChangedCells(BTreeSet<CellRef>);

impl ChangedCells {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark(&mut self, row: usize, column: impl Into<String>) {
        self.0.insert(CellRef::new(row, column));
    }

    pub fn contains(&self, row: usize, column: &str) -> bool {
        self.0.iter().any(|c| c.row == row && c.column == column)
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CellRef> {
        self.0.iter()
    }

    pub fn extend(&mut self, other: ChangedCells) {
        self.0.extend(other.0);
    }
}

// ============================================================================
// Table
// ============================================================================

/// An ordered sequence of records sharing one column set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl Table {
    /// Create an empty table with the given columns.
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Create a table from aligned rows.
    ///
    /// Fails if a row's width differs from the column count or a column name
    /// repeats.
    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Result<Self> {
        let mut seen = BTreeSet::new();
        for name in &columns {
            if !seen.insert(name.as_str()) {
                return Err(CleaningError::Ingestion(format!(
                    "duplicate column name '{}'",
                    name
                )));
            }
        }
        if let Some((idx, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != columns.len())
        {
            return Err(CleaningError::Ingestion(format!(
                "row {} has {} cells, expected {}",
                idx,
                row.len(),
                columns.len()
            )));
        }
        Ok(Self { columns, rows })
    }

    /// Build a table from flat key/value records.
    ///
    /// Column order follows the first record's keys. A key missing from a
    /// record becomes [`CellValue::Missing`]; a key first seen in a later
    /// record is appended to the column order and back-filled as missing.
    pub fn from_records<I, R, K>(records: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = (K, CellValue)>,
        K: Into<String>,
    {
        let mut columns: Vec<String> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut rows: Vec<Vec<CellValue>> = Vec::new();

        for record in records {
            let mut row = vec![CellValue::Missing; columns.len()];
            for (key, value) in record {
                let key = key.into();
                let idx = match index.get(&key) {
                    Some(&idx) => idx,
                    None => {
                        let idx = columns.len();
                        index.insert(key.clone(), idx);
                        columns.push(key);
                        for earlier in rows.iter_mut() {
                            earlier.push(CellValue::Missing);
                        }
                        row.push(CellValue::Missing);
                        idx
                    }
                };
                row[idx] = value;
            }
            rows.push(row);
        }

        Self { columns, rows }
    }

    /// Parse a JSON array of flat objects into a table.
    pub fn from_json_records(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Render the table as a JSON array of flat objects in column order.
    pub fn to_json_records(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn total_cells(&self) -> usize {
        self.rows.len() * self.columns.len()
    }

    /// True when the table has no rows or no columns.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.columns.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Like [`Table::column_index`] but fails with `ColumnNotFound`.
    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| CleaningError::ColumnNotFound(name.to_string()))
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&CellValue> {
        let idx = self.column_index(column)?;
        self.rows.get(row).map(|r| &r[idx])
    }

    /// Iterate over one column's cells, top to bottom.
    pub fn column_values(&self, idx: usize) -> impl Iterator<Item = &CellValue> + '_ {
        self.rows.iter().map(move |row| &row[idx])
    }

    /// Parseable numeric values of a column paired with their row index.
    pub fn numeric_values(&self, idx: usize) -> Vec<(usize, f64)> {
        self.column_values(idx)
            .enumerate()
            .filter_map(|(row, cell)| cell.as_number().map(|v| (row, v)))
            .collect()
    }

    pub(crate) fn set_cell(&mut self, row: usize, idx: usize, value: CellValue) {
        self.rows[row][idx] = value;
    }

    /// Copy of this table without the given row indices.
    ///
    /// Indices refer to this table, so callers collect every index first and
    /// drop them in one pass.
    pub fn without_rows(&self, drop: &BTreeSet<usize>) -> Self {
        let rows = self
            .rows
            .iter()
            .enumerate()
            .filter(|(idx, _)| !drop.contains(idx))
            .map(|(_, row)| row.clone())
            .collect();
        Self {
            columns: self.columns.clone(),
            rows,
        }
    }

    /// Copy of this table with one column's cells rewritten by `f`.
    pub(crate) fn map_column<F>(&self, idx: usize, mut f: F) -> Self
    where
        F: FnMut(&CellValue) -> CellValue,
    {
        let mut out = self.clone();
        for row in out.rows.iter_mut() {
            row[idx] = f(&row[idx]);
        }
        out
    }

    /// Copy of this table with column `idx` replaced by `replacements`,
    /// inserted at the same position.
    ///
    /// An existing column whose name matches a replacement is dropped so the
    /// column set stays unique.
    pub(crate) fn splice_column(
        &self,
        idx: usize,
        replacements: Vec<(String, Vec<CellValue>)>,
    ) -> Self {
        let names: BTreeSet<&str> = replacements.iter().map(|(n, _)| n.as_str()).collect();
        let mut columns = Vec::with_capacity(self.columns.len() + replacements.len());
        let mut sources: Vec<Source> = Vec::with_capacity(columns.capacity());

        enum Source {
            Existing(usize),
            New(usize),
        }

        for (i, name) in self.columns.iter().enumerate() {
            if i == idx {
                for (j, (new_name, _)) in replacements.iter().enumerate() {
                    columns.push(new_name.clone());
                    sources.push(Source::New(j));
                }
            } else if !names.contains(name.as_str()) {
                columns.push(name.clone());
                sources.push(Source::Existing(i));
            }
        }

        let rows = self
            .rows
            .iter()
            .enumerate()
            .map(|(r, row)| {
                sources
                    .iter()
                    .map(|src| match src {
                        Source::Existing(i) => row[*i].clone(),
                        Source::New(j) => replacements[*j].1[r].clone(),
                    })
                    .collect()
            })
            .collect();

        Self { columns, rows }
    }
}

/// Borrowed view of one row, serialized as a map in column order.
struct RecordView<'a> {
    columns: &'a [String],
    row: &'a [CellValue],
}

impl Serialize for RecordView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (name, value) in self.columns.iter().zip(self.row) {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// A table serializes as an array of uniform records, keys in column order.
impl Serialize for Table {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.rows.len()))?;
        for row in &self.rows {
            seq.serialize_element(&RecordView {
                columns: &self.columns,
                row,
            })?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for Table {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let records = Vec::<serde_json::Map<String, serde_json::Value>>::deserialize(deserializer)?;
        Ok(Table::from_records(records.into_iter().map(|record| {
            record
                .into_iter()
                .map(|(k, v)| (k, CellValue::from(v)))
                .collect::<Vec<_>>()
        })))
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Build a table from column names and rows of convertible values.
    pub(crate) fn table(columns: &[&str], rows: Vec<Vec<CellValue>>) -> Table {
        Table::from_rows(columns.iter().map(|c| c.to_string()).collect(), rows)
            .expect("test table rows must match columns")
    }

    /// Single numeric column table.
    pub(crate) fn numeric_column(name: &str, values: &[f64]) -> Table {
        table(
            &[name],
            values.iter().map(|v| vec![CellValue::Number(*v)]).collect(),
        )
    }

    /// Single column of one table's cells, rendered as strings.
    pub(crate) fn column_strings(table: &Table, column: &str) -> Vec<String> {
        let idx = table.column_index(column).expect("column exists");
        table.column_values(idx).map(|c| c.to_string()).collect()
    }
}
