//! Missing-value detection.

use crate::table::{CellRef, CellValue, Table};

/// Literal tokens treated as missing. Case-sensitive, exact match.
pub const MISSING_SENTINELS: [&str; 4] = ["NA", "N/A", "null", "NaN"];

/// Coordinate of a missing cell. Recomputed on every analysis pass.
pub type MissingRef = CellRef;

/// Check whether a cell is missing: absent, a `NaN` number, an empty string,
/// or one of [`MISSING_SENTINELS`].
pub fn is_missing_value(cell: &CellValue) -> bool {
    match cell {
        CellValue::Missing => true,
        CellValue::Number(v) => v.is_nan(),
        CellValue::Text(s) => s.is_empty() || MISSING_SENTINELS.contains(&s.as_str()),
    }
}

/// Scan every cell, row-major, and return the coordinates of missing ones.
pub fn find_missing(table: &Table) -> Vec<MissingRef> {
    let columns = table.columns();
    table
        .rows()
        .iter()
        .enumerate()
        .flat_map(|(row, cells)| {
            cells
                .iter()
                .zip(columns)
                .filter(|(cell, _)| is_missing_value(cell))
                .map(move |(_, name)| CellRef::new(row, name.clone()))
        })
        .collect()
}
