//! Whole-table obfuscation.
//!
//! Draws one [`RecordRandomness`] per record up front, then rewrites every column
//! that appears in the reconciled [`ObfuscationTable`]. Columns outside the table
//! (including opted-out ones) are left untouched. The row count and column layout
//! of the result always match the input.

use log::{info, warn};
use rand::Rng;

use crate::{
    config::ObfuscatorConfig,
    data::parse_timestamp_like,
    error::{ObfuscationError, Result},
    preview,
    profile::{ColumnKind, ObfuscationTable},
    randomness::{self, RecordRandomness},
    table::{Cell, Table},
    transform::ValueTransformer,
};

pub struct Obfuscator<'a> {
    config: &'a ObfuscatorConfig,
    transformer: ValueTransformer<'a>,
}

impl<'a> Obfuscator<'a> {
    pub fn new(config: &'a ObfuscatorConfig) -> Self {
        Self {
            config,
            transformer: ValueTransformer::new(&config.identifier_masks),
        }
    }

    /// Uses a fixed reference moment instead of the wall clock.
    pub fn with_transformer(config: &'a ObfuscatorConfig, transformer: ValueTransformer<'a>) -> Self {
        Self {
            config,
            transformer,
        }
    }

    pub fn obfuscate<R: Rng + ?Sized>(
        &self,
        table: Table,
        obfuscation_table: &ObfuscationTable,
        show_comparison: bool,
        rng: &mut R,
    ) -> Result<Table> {
        let bundles = randomness::generate(rng, table.len());
        self.obfuscate_with(table, obfuscation_table, show_comparison, &bundles)
    }

    /// Obfuscates with caller-supplied bundles; `bundles[i]` drives record `i`.
    pub fn obfuscate_with(
        &self,
        mut table: Table,
        obfuscation_table: &ObfuscationTable,
        show_comparison: bool,
        bundles: &[RecordRandomness],
    ) -> Result<Table> {
        if bundles.len() != table.len() {
            return Err(ObfuscationError::BundleCount {
                expected: table.len(),
                found: bundles.len(),
            });
        }

        let targets = table
            .headers
            .iter()
            .enumerate()
            .filter_map(|(idx, name)| {
                obfuscation_table
                    .kind_for(name)
                    .map(|kind| (idx, name.clone(), kind.clone()))
            })
            .collect::<Vec<_>>();

        if let Some((_, column, ColumnKind::Unsupported(dtype))) = targets
            .iter()
            .find(|(_, _, kind)| matches!(kind, ColumnKind::Unsupported(_)))
        {
            return Err(ObfuscationError::UnsupportedType {
                column: column.clone(),
                dtype: dtype.clone(),
            });
        }

        for (idx, column, kind) in &targets {
            let before = show_comparison.then(|| table.column(*idx).cloned().collect::<Vec<_>>());
            for (row, bundle) in table.rows.iter_mut().zip(bundles) {
                let cell = row[*idx].take();
                row[*idx] = self.obfuscate_cell(kind, column, cell, bundle)?;
            }
            if let Some(before) = before {
                let after = table.column(*idx).cloned().collect::<Vec<_>>();
                preview::print_comparison(column, &before, &after, self.config.preview_rows);
            }
        }

        info!(
            "Obfuscation complete: {} row(s), {} column(s) rewritten",
            table.len(),
            targets.len()
        );
        Ok(table)
    }

    /// Rewrites one cell according to its declared column kind.
    pub fn obfuscate_cell(
        &self,
        kind: &ColumnKind,
        column: &str,
        cell: Cell,
        bundle: &RecordRandomness,
    ) -> Result<Cell> {
        let Some(raw) = cell else {
            return Ok(None);
        };
        let obfuscated = match kind {
            ColumnKind::Int => self.obfuscate_int(column, raw, bundle),
            ColumnKind::Varchar => self.transformer.obfuscate_text(&raw, bundle, Some(column)),
            ColumnKind::Date | ColumnKind::Timestamp => self.obfuscate_timestamp(column, raw, bundle),
            ColumnKind::Super => {
                match self.transformer.obfuscate_super(Some(&raw), bundle, Some(column)) {
                    Some(encoded) => encoded,
                    None => raw,
                }
            }
            ColumnKind::Unsupported(dtype) => {
                return Err(ObfuscationError::UnsupportedType {
                    column: column.to_string(),
                    dtype: dtype.clone(),
                });
            }
        };
        Ok(Some(obfuscated))
    }

    fn obfuscate_int(&self, column: &str, raw: String, bundle: &RecordRandomness) -> String {
        let trimmed = raw.trim();
        if let Ok(value) = trimmed.parse::<i64>() {
            return self.transformer.obfuscate_integer(value, bundle);
        }
        match trimmed.parse::<f64>() {
            Ok(value) if value.is_nan() => raw,
            Ok(value) if value.is_finite() && value.abs() < i64::MAX as f64 => {
                self.transformer.obfuscate_integer(value.trunc() as i64, bundle)
            }
            _ => {
                warn!("Column '{column}': leaving non-integer value unchanged");
                raw
            }
        }
    }

    fn obfuscate_timestamp(&self, column: &str, raw: String, bundle: &RecordRandomness) -> String {
        let shifted = parse_timestamp_like(&raw)
            .and_then(|value| self.transformer.obfuscate_datetime(value, bundle));
        match shifted {
            Some(shifted) => shifted,
            None => {
                warn!("Column '{column}': leaving unparseable timestamp unchanged");
                raw
            }
        }
    }
}
