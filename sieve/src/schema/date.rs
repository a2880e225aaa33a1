//! Date value normalization
//!
//! Every date leaves here as one of two canonical strings:
//! `YYYY-MM-DD HH:MM:SS`, or `YYYY-MM-DD` when the input was a bare date.

use crate::{Error, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

pub const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Index-side `format` parameter matching both canonical forms
pub const INDEX_DATE_FORMAT: &str = "yyyy-MM-dd HH:mm:ss||yyyy-MM-dd";

static BARE_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{2,4}[-.]\d{2}[-.]\d{2,4}$").expect("valid regex"));

static TIMESTAMP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?\d+$").expect("valid regex"));

const BARE_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d.%m.%Y", "%Y.%m.%d", "%d-%m-%Y"];

const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

const LOOSE_DATE_FORMATS: &[&str] = &["%Y/%m/%d", "%d/%m/%Y"];

/// Normalize a scalar date value.
///
/// Empty values (null, false, `""`, `"0"`, `0`) become null. Integers and
/// integer-like strings are Unix timestamps, rendered in UTC.
pub fn normalize_date(value: &Value) -> Result<Value> {
    match value {
        Value::Null | Value::Bool(false) => Ok(Value::Null),
        Value::Bool(true) => Err(Error::InvalidOperation(
            "boolean is not a date".to_string(),
        )),
        Value::Number(n) => {
            if let Some(secs) = n.as_i64() {
                return timestamp(secs);
            }
            match n.as_f64() {
                Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => timestamp(f as i64),
                _ => Err(Error::InvalidOperation(format!(
                    "{n} is not a valid timestamp"
                ))),
            }
        }
        Value::String(s) => normalize_date_str(s.trim()),
        Value::Array(_) | Value::Object(_) => Err(Error::InvalidOperation(format!(
            "cannot interpret {value} as a date"
        ))),
    }
}

/// Canonical representation of an already-typed date and time
pub fn date_time_value(dt: &NaiveDateTime) -> Value {
    Value::String(dt.format(DATE_TIME_FORMAT).to_string())
}

/// Canonical representation of a zoned date and time, in its own offset
pub fn zoned_date_time_value<Tz: TimeZone>(dt: &DateTime<Tz>) -> Value {
    date_time_value(&dt.naive_local())
}

fn normalize_date_str(s: &str) -> Result<Value> {
    if s.is_empty() || s == "0" {
        return Ok(Value::Null);
    }

    if BARE_DATE.is_match(s) {
        return BARE_DATE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
            .map(|d| Value::String(d.format(DATE_FORMAT).to_string()))
            .ok_or_else(|| Error::InvalidOperation(format!("cannot parse date {s:?}")));
    }

    if TIMESTAMP.is_match(s) {
        let secs: i64 = s
            .parse()
            .map_err(|_| Error::InvalidOperation(format!("{s:?} is not a valid timestamp")))?;
        return timestamp(secs);
    }

    parse_free_form(s)
        .map(|dt| date_time_value(&dt))
        .ok_or_else(|| Error::InvalidOperation(format!("cannot parse date {s:?}")))
}

fn parse_free_form(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.naive_local());
    }
    if let Some(dt) = DATE_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
    {
        return Some(dt);
    }
    LOOSE_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

fn timestamp(secs: i64) -> Result<Value> {
    if secs == 0 {
        return Ok(Value::Null);
    }
    DateTime::from_timestamp(secs, 0)
        .map(|dt| date_time_value(&dt.naive_utc()))
        .ok_or_else(|| Error::InvalidOperation(format!("timestamp {secs} is out of range")))
}
