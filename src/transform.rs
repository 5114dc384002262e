//! Format-preserving value transforms.
//!
//! Every transform is driven by one record's [`RecordRandomness`]:
//!
//! - **text**: ROT13 over ASCII letters, then each digit becomes
//!   `(digit + digit_shift) % 10`; identifier masks are applied last.
//! - **integer**: the digit shift over the canonical decimal string.
//! - **date-like**: moved `day_shift` days further away from "now" so past values
//!   stay in the past and future values stay in the future.
//! - **list / mapping**: element-wise recursion with every element re-sniffed.
//!   Mapping keys are preserved and become the field-name context of their values.
//!
//! `Null` maps to `Null` in every branch and booleans are left as they are.

use chrono::{Days, Local, NaiveDate, NaiveDateTime};
use log::{debug, warn};

use crate::{
    config::IdentifierMask,
    data::{OUTPUT_DATE_FORMAT, SemanticValue},
    randomness::RecordRandomness,
    sniff::{sniff_cell, sniff_value},
};

pub fn rot13(input: &str) -> String {
    input
        .chars()
        .map(|c| match c {
            'a'..='z' => (((c as u8 - b'a') + 13) % 26 + b'a') as char,
            'A'..='Z' => (((c as u8 - b'A') + 13) % 26 + b'A') as char,
            other => other,
        })
        .collect()
}

pub fn shift_digits(input: &str, digit_shift: u8) -> String {
    input
        .chars()
        .map(|c| match c.to_digit(10) {
            Some(d) if c.is_ascii_digit() => {
                char::from_digit((d + u32::from(digit_shift)) % 10, 10).unwrap_or(c)
            }
            _ => c,
        })
        .collect()
}

/// Inverse of [`shift_digits`] for the same `digit_shift`.
pub fn unshift_digits(input: &str, digit_shift: u8) -> String {
    shift_digits(input, 10 - digit_shift % 10)
}

/// Moves `value` `days` further from `reference`; values equal to the reference move forward.
pub fn shift_date_like<T>(value: T, reference: T, days: u32) -> Option<T>
where
    T: PartialOrd + DayArithmetic,
{
    if value < reference {
        value.minus_days(days)
    } else {
        value.plus_days(days)
    }
}

pub trait DayArithmetic: Sized {
    fn plus_days(self, days: u32) -> Option<Self>;
    fn minus_days(self, days: u32) -> Option<Self>;
}

impl DayArithmetic for NaiveDate {
    fn plus_days(self, days: u32) -> Option<Self> {
        self.checked_add_days(Days::new(u64::from(days)))
    }

    fn minus_days(self, days: u32) -> Option<Self> {
        self.checked_sub_days(Days::new(u64::from(days)))
    }
}

impl DayArithmetic for NaiveDateTime {
    fn plus_days(self, days: u32) -> Option<Self> {
        self.checked_add_days(Days::new(u64::from(days)))
    }

    fn minus_days(self, days: u32) -> Option<Self> {
        self.checked_sub_days(Days::new(u64::from(days)))
    }
}

/// Applies the per-record transforms against a fixed reference moment.
#[derive(Debug, Clone)]
pub struct ValueTransformer<'a> {
    masks: &'a [IdentifierMask],
    now: NaiveDateTime,
}

impl<'a> ValueTransformer<'a> {
    pub fn new(masks: &'a [IdentifierMask]) -> Self {
        Self::with_now(masks, Local::now().naive_local())
    }

    pub fn with_now(masks: &'a [IdentifierMask], now: NaiveDateTime) -> Self {
        Self { masks, now }
    }

    pub fn obfuscate_text(
        &self,
        input: &str,
        bundle: &RecordRandomness,
        field_name: Option<&str>,
    ) -> String {
        let rotated = rot13(input);
        let shifted = shift_digits(&rotated, bundle.digit_shift);
        match field_name.and_then(|name| self.masks.iter().find(|mask| mask.matches(name))) {
            Some(mask) => mask.apply(&shifted),
            None => shifted,
        }
    }

    pub fn obfuscate_integer(&self, value: i64, bundle: &RecordRandomness) -> String {
        shift_digits(&value.to_string(), bundle.digit_shift)
    }

    /// Shifts a date against today's date.
    pub fn obfuscate_date(&self, value: NaiveDate, bundle: &RecordRandomness) -> Option<String> {
        shift_date_like(value, self.now.date(), bundle.day_shift)
            .map(|d| d.format(OUTPUT_DATE_FORMAT).to_string())
    }

    /// Shifts a timestamp against the current moment; output keeps only the date part.
    pub fn obfuscate_datetime(
        &self,
        value: NaiveDateTime,
        bundle: &RecordRandomness,
    ) -> Option<String> {
        shift_date_like(value, self.now, bundle.day_shift)
            .map(|dt| dt.format(OUTPUT_DATE_FORMAT).to_string())
    }

    /// Recursive dispatch over an already-sniffed value.
    pub fn transform(
        &self,
        value: SemanticValue,
        bundle: &RecordRandomness,
        field_name: Option<&str>,
    ) -> SemanticValue {
        match value {
            SemanticValue::Null => SemanticValue::Null,
            SemanticValue::Boolean(b) => SemanticValue::Boolean(b),
            SemanticValue::Integer(i) => SemanticValue::Text(self.obfuscate_integer(i, bundle)),
            SemanticValue::Text(text) => {
                SemanticValue::Text(self.obfuscate_text(&text, bundle, field_name))
            }
            SemanticValue::Date(date) => match self.obfuscate_date(date, bundle) {
                Some(shifted) => SemanticValue::Text(shifted),
                None => {
                    debug!("Date {date} cannot be shifted by {} day(s)", bundle.day_shift);
                    SemanticValue::Date(date)
                }
            },
            SemanticValue::DateTime(dt) => match self.obfuscate_datetime(dt, bundle) {
                Some(shifted) => SemanticValue::Text(shifted),
                None => {
                    debug!("Timestamp {dt} cannot be shifted by {} day(s)", bundle.day_shift);
                    SemanticValue::DateTime(dt)
                }
            },
            SemanticValue::List(items) => SemanticValue::List(
                items
                    .into_iter()
                    .map(|item| self.transform(sniff_value(item), bundle, None))
                    .collect(),
            ),
            SemanticValue::Mapping(entries) => SemanticValue::Mapping(
                entries
                    .into_iter()
                    .map(|(key, item)| {
                        let transformed = self.transform(sniff_value(item), bundle, Some(&key));
                        (key, transformed)
                    })
                    .collect(),
            ),
        }
    }

    /// Entry point for semi-structured cells: sniff, transform, re-serialise as JSON.
    ///
    /// Any failure returns the original text (JSON-encoded so the column keeps one
    /// storage shape). `NULL` stays `NULL`.
    pub fn obfuscate_super(
        &self,
        raw: Option<&str>,
        bundle: &RecordRandomness,
        field_name: Option<&str>,
    ) -> Option<String> {
        let raw = raw?;
        let sniffed = sniff_cell(Some(raw));
        if sniffed.is_null() {
            return Some(SemanticValue::Null.to_json().to_string());
        }
        let transformed = self.transform(sniffed, bundle, field_name);
        match serde_json::to_string(&transformed.to_json()) {
            Ok(encoded) => Some(encoded),
            Err(err) => {
                warn!("Leaving semi-structured value unchanged: {err}");
                Some(serde_json::Value::String(raw.to_string()).to_string())
            }
        }
    }
}
