use std::collections::HashSet;

use log::info;

use crate::{
    error::{ObfuscationError, Result},
    table::{Cell, Table},
};

/// Drops records repeating an earlier record's values across `unique_columns`.
///
/// The first occurrence wins, so callers concatenate sampling profiles in
/// processing order before calling this. An empty column list is a no-op.
pub fn enforce_uniqueness(table: Table, unique_columns: &[String]) -> Result<Table> {
    if unique_columns.is_empty() {
        return Ok(table);
    }
    let indices = unique_columns
        .iter()
        .map(|name| {
            table
                .column_index(name)
                .ok_or_else(|| ObfuscationError::MissingColumn {
                    column: name.clone(),
                })
        })
        .collect::<Result<Vec<_>>>()?;

    let Table { headers, rows } = table;
    let before = rows.len();
    let mut seen: HashSet<Vec<Cell>> = HashSet::with_capacity(before);
    let rows = rows
        .into_iter()
        .filter(|row| seen.insert(indices.iter().map(|&idx| row[idx].clone()).collect()))
        .collect::<Vec<_>>();

    let removed = before - rows.len();
    if removed > 0 {
        info!("Removed {removed} duplicate row(s) on {unique_columns:?}");
    }
    Ok(Table::with_rows(headers, rows))
}
