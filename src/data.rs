use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use serde_json::{Map, Number, Value as JsonValue};

pub const OUTPUT_DATE_FORMAT: &str = "%Y-%m-%d";

/// A cell value after its effective type has been recovered.
#[derive(Debug, Clone, PartialEq)]
pub enum SemanticValue {
    Null,
    /// Left untouched by every transform.
    Boolean(bool),
    Integer(i64),
    Text(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    List(Vec<SemanticValue>),
    /// Key order is preserved; keys are never rewritten.
    Mapping(Vec<(String, SemanticValue)>),
}

impl SemanticValue {
    pub fn is_null(&self) -> bool {
        matches!(self, SemanticValue::Null)
    }

    pub fn from_json(value: JsonValue) -> Self {
        match value {
            JsonValue::Null => SemanticValue::Null,
            JsonValue::Bool(b) => SemanticValue::Boolean(b),
            JsonValue::Number(n) => match n.as_i64() {
                Some(i) => SemanticValue::Integer(i),
                None => SemanticValue::Text(n.to_string()),
            },
            JsonValue::String(s) => SemanticValue::Text(s),
            JsonValue::Array(items) => {
                SemanticValue::List(items.into_iter().map(SemanticValue::from_json).collect())
            }
            JsonValue::Object(map) => SemanticValue::Mapping(
                map.into_iter()
                    .map(|(k, v)| (k, SemanticValue::from_json(v)))
                    .collect(),
            ),
        }
    }

    pub fn to_json(&self) -> JsonValue {
        match self {
            SemanticValue::Null => JsonValue::Null,
            SemanticValue::Boolean(b) => JsonValue::Bool(*b),
            SemanticValue::Integer(i) => JsonValue::Number(Number::from(*i)),
            SemanticValue::Text(s) => JsonValue::String(s.clone()),
            SemanticValue::Date(d) => JsonValue::String(d.format(OUTPUT_DATE_FORMAT).to_string()),
            SemanticValue::DateTime(dt) => {
                JsonValue::String(dt.format("%Y-%m-%d %H:%M:%S").to_string())
            }
            SemanticValue::List(items) => {
                JsonValue::Array(items.iter().map(SemanticValue::to_json).collect())
            }
            SemanticValue::Mapping(entries) => {
                let mut map = Map::with_capacity(entries.len());
                for (key, value) in entries {
                    map.insert(key.clone(), value.to_json());
                }
                JsonValue::Object(map)
            }
        }
    }
}

pub fn parse_naive_date(value: &str) -> Option<NaiveDate> {
    const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d-%m-%Y"];
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
}

pub fn parse_naive_datetime(value: &str) -> Option<NaiveDateTime> {
    const DATETIME_FORMATS: &[&str] = &[
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
        "%m/%d/%Y %H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
    ];
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
}

/// Parses timestamps carrying a UTC offset (`Z`, `+00`, `-05:00`, `+0530`).
pub fn parse_offset_datetime(value: &str) -> Option<DateTime<FixedOffset>> {
    const OFFSET_FORMATS: &[&str] = &[
        "%Y-%m-%d %H:%M:%S%.f%#z",
        "%Y-%m-%dT%H:%M:%S%.f%#z",
        "%Y-%m-%d %H:%M:%S%.f%:z",
        "%Y-%m-%dT%H:%M:%S%.f%:z",
        "%Y-%m-%d %H:%M:%S%.f %#z",
    ];
    DateTime::parse_from_rfc3339(value).ok().or_else(|| {
        OFFSET_FORMATS
            .iter()
            .find_map(|fmt| DateTime::parse_from_str(value, fmt).ok())
    })
}

/// Normalises a date or timestamp cell to a datetime; plain dates land on midnight.
///
/// Offset-qualified timestamps keep their wall-clock time as written.
pub fn parse_timestamp_like(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    parse_naive_datetime(trimmed)
        .or_else(|| parse_offset_datetime(trimmed).map(|dt| dt.naive_local()))
        .or_else(|| parse_naive_date(trimmed).and_then(|d| d.and_hms_opt(0, 0, 0)))
}
