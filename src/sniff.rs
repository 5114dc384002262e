//! Recovers the effective type of semi-structured cells.
//!
//! A `super` cell is stored as text that may itself encode a list, a mapping, a
//! number or a date. Parsers are tried in a fixed priority order and the first
//! success decides the tag:
//!
//! 1. quoted structural literal ([`crate::literal::parse_literal`])
//! 2. JSON, which tolerates `null`
//! 3. `YYYY-MM-DD` calendar date, applied to whatever is still text
//!
//! Text that none of them accept stays [`SemanticValue::Text`]. A quoted string is
//! unwrapped and sniffed again, so `'[1, 2]'` still becomes a list.

use chrono::NaiveDate;

use crate::{data::SemanticValue, literal::parse_literal};

pub const SNIFF_DATE_FORMAT: &str = "%Y-%m-%d";

/// How many layers of quoting are unwrapped before the text is taken as-is.
const MAX_UNWRAP_DEPTH: usize = 4;

/// Sniffs a raw cell; `None` (SQL `NULL`) is returned as [`SemanticValue::Null`].
pub fn sniff_cell(raw: Option<&str>) -> SemanticValue {
    match raw {
        None => SemanticValue::Null,
        Some(text) => sniff_str(text),
    }
}

pub fn sniff_str(raw: &str) -> SemanticValue {
    sniff_at_depth(raw, 0)
}

fn sniff_at_depth(raw: &str, depth: usize) -> SemanticValue {
    match parse_literal(raw).or_else(|| parse_json(raw)) {
        Some(SemanticValue::Text(text)) if is_quoted(raw) && depth < MAX_UNWRAP_DEPTH => {
            sniff_at_depth(&text, depth + 1)
        }
        Some(SemanticValue::Text(text)) => match parse_date(&text) {
            Some(date) => SemanticValue::Date(date),
            None => SemanticValue::Text(text),
        },
        Some(parsed) => parsed,
        None => match parse_date(raw) {
            Some(date) => SemanticValue::Date(date),
            None => SemanticValue::Text(raw.to_string()),
        },
    }
}

fn is_quoted(raw: &str) -> bool {
    raw.trim_start().starts_with(['\'', '"'])
}

/// Re-sniffs container elements; only text can hide another type.
pub fn sniff_value(value: SemanticValue) -> SemanticValue {
    match value {
        SemanticValue::Text(text) => sniff_str(&text),
        other => other,
    }
}

pub fn parse_json(raw: &str) -> Option<SemanticValue> {
    serde_json::from_str::<serde_json::Value>(raw)
        .ok()
        .map(SemanticValue::from_json)
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, SNIFF_DATE_FORMAT).ok()
}
