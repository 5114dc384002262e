//! In-memory result table plus a plain-text renderer for operator review.

use std::{borrow::Cow, fmt::Write as _, path::Path};

use anyhow::{Context, Result};
use log::debug;

use crate::{
    error::ObfuscationError,
    io_utils,
};

/// A single cell; `None` is SQL `NULL` (an empty CSV field).
pub type Cell = Option<String>;

pub const NULL_DISPLAY: &str = "NULL";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    pub fn with_rows(headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self { headers, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn column(&self, idx: usize) -> impl Iterator<Item = &Cell> + '_ {
        self.rows.iter().map(move |row| &row[idx])
    }

    /// Appends `other` below `self`; both must share the same header row.
    pub fn concat(mut self, other: Table) -> std::result::Result<Table, ObfuscationError> {
        if self.headers.is_empty() && self.rows.is_empty() {
            return Ok(other);
        }
        if self.headers != other.headers {
            return Err(ObfuscationError::HeaderMismatch {
                expected: self.headers,
                found: other.headers,
            });
        }
        self.rows.extend(other.rows);
        Ok(self)
    }

    pub fn read_csv(path: &Path, delimiter: u8) -> Result<Self> {
        let mut reader = io_utils::open_csv_reader_from_path(path, delimiter)?;
        let headers = reader
            .headers()
            .with_context(|| format!("Reading headers from {path:?}"))?
            .iter()
            .map(|h| h.to_string())
            .collect::<Vec<_>>();
        let mut table = Table::new(headers);
        for (idx, record) in reader.records().enumerate() {
            let record = record.with_context(|| format!("Reading row {} in {path:?}", idx + 2))?;
            let row = record
                .iter()
                .map(|field| {
                    if field.is_empty() {
                        None
                    } else {
                        Some(field.to_string())
                    }
                })
                .collect();
            table.rows.push(row);
        }
        debug!("Read {} row(s) from {path:?}", table.len());
        Ok(table)
    }

    pub fn write_csv(&self, path: Option<&Path>, delimiter: u8) -> Result<()> {
        let mut writer = io_utils::open_csv_writer(path, delimiter)?;
        writer
            .write_record(self.headers.iter())
            .context("Writing output headers")?;
        for (idx, row) in self.rows.iter().enumerate() {
            writer
                .write_record(row.iter().map(|cell| cell.as_deref().unwrap_or("")))
                .with_context(|| format!("Writing row {}", idx + 2))?;
        }
        writer.flush().context("Flushing output")?;
        Ok(())
    }
}

pub fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut widths = headers.iter().map(|h| display_width(h)).collect::<Vec<_>>();
    for row in rows {
        for (idx, cell) in row.iter().enumerate().take(widths.len()) {
            widths[idx] = widths[idx].max(display_width(cell));
        }
    }

    let mut output = String::new();
    let _ = writeln!(output, "{}", format_row(headers, &widths));
    let separators = widths
        .iter()
        .map(|w| "-".repeat((*w).max(3)))
        .collect::<Vec<_>>();
    let _ = writeln!(output, "{}", format_row(&separators, &widths));
    for row in rows {
        let _ = writeln!(output, "{}", format_row(row, &widths));
    }
    output
}

fn format_row(values: &[String], widths: &[usize]) -> String {
    let mut line = values
        .iter()
        .zip(widths)
        .map(|(value, width)| {
            let sanitized = sanitize_cell(value);
            let padding = width.saturating_sub(display_width(&sanitized));
            format!("{sanitized}{}", " ".repeat(padding))
        })
        .collect::<Vec<_>>()
        .join("  ");
    while line.ends_with(' ') {
        line.pop();
    }
    line
}

fn display_width(value: &str) -> usize {
    value.chars().count()
}

fn sanitize_cell(value: &str) -> Cow<'_, str> {
    if value.contains(['\n', '\r', '\t']) {
        Cow::Owned(value.replace(['\n', '\r', '\t'], " "))
    } else {
        Cow::Borrowed(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn concat_preserves_order_and_rejects_mismatch() {
        let first = Table::with_rows(headers(&["id"]), vec![vec![Some("1".into())]]);
        let second = Table::with_rows(headers(&["id"]), vec![vec![Some("2".into())]]);
        let joined = first.concat(second).unwrap();
        assert_eq!(
            joined.rows,
            vec![vec![Some("1".to_string())], vec![Some("2".to_string())]]
        );

        let other = Table::new(headers(&["name"]));
        assert!(matches!(
            joined.concat(other),
            Err(ObfuscationError::HeaderMismatch { .. })
        ));
    }

    #[test]
    fn concat_onto_empty_takes_other() {
        let other = Table::with_rows(headers(&["a"]), vec![vec![None]]);
        let joined = Table::default().concat(other.clone()).unwrap();
        assert_eq!(joined, other);
    }

    #[test]
    fn render_table_pads_columns_and_flattens_newlines() {
        let rendered = render_table(
            &headers(&["a", "b"]),
            &[vec!["x\ny".to_string(), "1".to_string()]],
        );
        let lines = rendered.lines().collect::<Vec<_>>();
        assert_eq!(lines[0], "a    b");
        assert_eq!(lines[1], "---  ---");
        assert_eq!(lines[2], "x y  1");
    }
}
