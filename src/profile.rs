//! Obfuscation profiles and their reconciliation against live table columns.
//!
//! A profile is a CSV file named `<schema>.<base_table>.csv` with the columns
//! `column_name, dtype, obfuscate, enforce_uniqueness` (the last two optional).
//! Reconciliation is all-or-nothing: either every table column is described by
//! exactly one profile row and vice versa, or nothing is returned.

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
    path::{Path, PathBuf},
    sync::OnceLock,
};

use anyhow::Context;
use log::{debug, info};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{
    config::ObfuscatorConfig,
    error::{ObfuscationError, Result},
    io_utils,
};

/// One profile row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProfileEntry {
    pub column_name: String,
    pub dtype: String,
    #[serde(default)]
    pub obfuscate: Option<String>,
    #[serde(default)]
    pub enforce_uniqueness: Option<String>,
}

impl ProfileEntry {
    /// Only an explicit "no" opts a column out.
    pub fn wants_obfuscation(&self) -> bool {
        !self
            .obfuscate
            .as_deref()
            .is_some_and(|flag| flag.trim().eq_ignore_ascii_case("no"))
    }

    pub fn enforces_uniqueness(&self) -> bool {
        self.enforce_uniqueness
            .as_deref()
            .is_some_and(|marker| !marker.trim().is_empty())
    }
}

/// The obfuscation kind a column is declared with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnKind {
    Int,
    Varchar,
    Date,
    Timestamp,
    Super,
    /// Kept so the failure surfaces when the column is actually obfuscated.
    Unsupported(String),
}

fn integer_family() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(int\d*|integer|bigint|smallint|tinyint)$")
            .expect("integer family pattern is a valid regex")
    })
}

impl ColumnKind {
    pub fn from_dtype(dtype: &str) -> Self {
        let normalized = dtype.trim().to_ascii_lowercase();
        if integer_family().is_match(&normalized) {
            return ColumnKind::Int;
        }
        match normalized.as_str() {
            "varchar" => ColumnKind::Varchar,
            "date" => ColumnKind::Date,
            "timestamp" => ColumnKind::Timestamp,
            "super" => ColumnKind::Super,
            _ => ColumnKind::Unsupported(dtype.trim().to_string()),
        }
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnKind::Int => write!(f, "int"),
            ColumnKind::Varchar => write!(f, "varchar"),
            ColumnKind::Date => write!(f, "date"),
            ColumnKind::Timestamp => write!(f, "timestamp"),
            ColumnKind::Super => write!(f, "super"),
            ColumnKind::Unsupported(raw) => write!(f, "{raw}"),
        }
    }
}

/// Columns selected for obfuscation, keyed (and ordered) by column name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObfuscationTable {
    columns: BTreeMap<String, ColumnKind>,
}

impl ObfuscationTable {
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, ColumnKind)>,
        S: Into<String>,
    {
        Self {
            columns: pairs
                .into_iter()
                .map(|(name, kind)| (name.into(), kind))
                .collect(),
        }
    }

    pub fn kind_for(&self, column: &str) -> Option<&ColumnKind> {
        self.columns.get(column)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ColumnKind)> {
        self.columns.iter().map(|(name, kind)| (name.as_str(), kind))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    pub obfuscation_table: ObfuscationTable,
    pub unique_columns: Vec<String>,
}

/// A column as reported by the live table catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogColumn {
    pub column_name: String,
    #[serde(default)]
    pub dtype: Option<String>,
}

impl CatalogColumn {
    pub fn named(name: &str) -> Self {
        Self {
            column_name: name.to_string(),
            dtype: None,
        }
    }
}

pub fn catalog_from_headers(headers: &[String]) -> Vec<CatalogColumn> {
    headers.iter().map(|h| CatalogColumn::named(h)).collect()
}

/// Reads a `column_name,dtype` catalog export.
pub fn load_catalog(path: &Path, delimiter: u8) -> anyhow::Result<Vec<CatalogColumn>> {
    let mut reader = io_utils::open_csv_reader_from_path(path, delimiter)?;
    reader
        .deserialize::<CatalogColumn>()
        .enumerate()
        .map(|(idx, row)| row.with_context(|| format!("Reading catalog row {} in {path:?}", idx + 2)))
        .collect()
}

/// Fails with [`ObfuscationError::SchemaMismatch`] naming every column found on only one side.
pub fn ensure_same_columns<'a, L, R>(left: L, right: R) -> Result<()>
where
    L: IntoIterator<Item = &'a str>,
    R: IntoIterator<Item = &'a str>,
{
    let left = left.into_iter().collect::<BTreeSet<_>>();
    let right = right.into_iter().collect::<BTreeSet<_>>();
    let mismatched = left
        .symmetric_difference(&right)
        .map(|name| name.to_string())
        .collect::<Vec<_>>();
    if mismatched.is_empty() {
        Ok(())
    } else {
        Err(ObfuscationError::SchemaMismatch {
            columns: mismatched,
        })
    }
}

/// Checks a result set's header row against the catalog it was reconciled with.
pub fn ensure_headers_match_catalog(headers: &[String], live_columns: &[CatalogColumn]) -> Result<()> {
    ensure_same_columns(
        headers.iter().map(String::as_str),
        live_columns.iter().map(|c| c.column_name.as_str()),
    )
}

/// Supplies the profile rows for a `(schema, base_table)` pair.
pub trait ProfileSource {
    fn load_profile(&self, schema: &str, base_table: &str) -> Result<Vec<ProfileEntry>>;
}

/// Profiles stored as `<dir>/<schema>.<base_table>.csv`.
#[derive(Debug, Clone)]
pub struct CsvProfileSource {
    dir: PathBuf,
}

impl CsvProfileSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn profile_path(&self, schema: &str, base_table: &str) -> PathBuf {
        self.dir.join(format!("{schema}.{base_table}.csv"))
    }
}

impl ProfileSource for CsvProfileSource {
    fn load_profile(&self, schema: &str, base_table: &str) -> Result<Vec<ProfileEntry>> {
        let path = self.profile_path(schema, base_table);
        if !path.is_file() {
            return Err(ObfuscationError::ProfileNotFound { path });
        }
        let format_error = |reason: String| ObfuscationError::ProfileFormat {
            path: path.clone(),
            reason,
        };
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_path(&path)
            .map_err(|err| format_error(err.to_string()))?;
        let mut entries = Vec::new();
        for (idx, row) in reader.deserialize::<ProfileEntry>().enumerate() {
            let entry = row.map_err(|err| format_error(format!("row {}: {err}", idx + 2)))?;
            entries.push(entry);
        }
        info!(
            "Reading in obfuscation profile from {}.{}.csv; located: {:?}",
            schema, base_table, self.dir
        );
        Ok(entries)
    }
}

/// Cross-checks a profile against the live column list.
pub struct Reconciler {
    source: Box<dyn ProfileSource>,
}

impl Reconciler {
    pub fn new(config: &ObfuscatorConfig) -> Self {
        Self::with_source(Box::new(CsvProfileSource::new(&config.profile_dir)))
    }

    pub fn with_source(source: Box<dyn ProfileSource>) -> Self {
        Self { source }
    }

    pub fn reconcile(
        &self,
        schema: &str,
        base_table: &str,
        live_columns: &[CatalogColumn],
    ) -> Result<Reconciliation> {
        let entries = self.source.load_profile(schema, base_table)?;

        let mut profile_names = BTreeSet::new();
        for entry in &entries {
            if !profile_names.insert(entry.column_name.as_str()) {
                return Err(ObfuscationError::ProfileFormat {
                    path: PathBuf::from(format!("{schema}.{base_table}")),
                    reason: format!("column '{}' is listed more than once", entry.column_name),
                });
            }
        }
        ensure_same_columns(
            live_columns.iter().map(|c| c.column_name.as_str()),
            profile_names,
        )?;

        let unique_columns = entries
            .iter()
            .filter(|entry| entry.enforces_uniqueness())
            .map(|entry| entry.column_name.clone())
            .collect::<Vec<_>>();

        let obfuscation_table = ObfuscationTable::from_pairs(
            entries
                .iter()
                .filter(|entry| entry.wants_obfuscation())
                .map(|entry| (entry.column_name.clone(), ColumnKind::from_dtype(&entry.dtype))),
        );

        info!(
            "Found {} column(s) to obfuscate: {}",
            obfuscation_table.len(),
            obfuscation_table
                .iter()
                .map(|(name, kind)| format!("{name} ({kind})"))
                .collect::<Vec<_>>()
                .join(", ")
        );
        debug!("Unique columns: {unique_columns:?}");

        Ok(Reconciliation {
            obfuscation_table,
            unique_columns,
        })
    }
}
