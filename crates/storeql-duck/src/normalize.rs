//! Transport shaping of materialized rows.
//!
//! Temporal values render as fixed-format ISO-8601 text so JSON consumers
//! never see driver-specific encodings; every other scalar passes through
//! unchanged.

use chrono::{NaiveDateTime, NaiveTime, Timelike};
use serde_json::{Map, Number, Value};

use crate::rows::{RowSet, Scalar};

/// Renders a result set as JSON objects, one per row, keyed by column name.
/// Every column of every row is visited exactly once.
pub fn normalize_rows(result: &RowSet) -> Vec<Map<String, Value>> {
    result
        .rows
        .iter()
        .map(|row| {
            result
                .columns
                .iter()
                .zip(row)
                .map(|(column, scalar)| (column.clone(), scalar_to_json(scalar)))
                .collect()
        })
        .collect()
}

/// Converts one scalar for transport. Total over [`Scalar`]: temporal values
/// become ISO-8601 text, non-finite floats become null, everything else keeps
/// its JSON-native representation.
pub fn scalar_to_json(scalar: &Scalar) -> Value {
    match scalar {
        Scalar::Null => Value::Null,
        Scalar::Bool(b) => Value::Bool(*b),
        Scalar::Int(i) => Value::Number((*i).into()),
        Scalar::UInt(u) => Value::Number((*u).into()),
        Scalar::Float(f) => Number::from_f64(*f).map(Value::Number).unwrap_or(Value::Null),
        Scalar::Text(s) => Value::String(s.clone()),
        Scalar::Date(d) => Value::String(d.format("%Y-%m-%d").to_string()),
        Scalar::Time(t) => Value::String(format_time(t)),
        Scalar::Timestamp(ts) => Value::String(format_timestamp(ts)),
    }
}

/// `YYYY-MM-DDTHH:MM:SS`, with microseconds appended only when nonzero.
fn format_timestamp(ts: &NaiveDateTime) -> String {
    if ts.nanosecond() == 0 {
        ts.format("%Y-%m-%dT%H:%M:%S").to_string()
    } else {
        ts.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
    }
}

fn format_time(t: &NaiveTime) -> String {
    if t.nanosecond() == 0 {
        t.format("%H:%M:%S").to_string()
    } else {
        t.format("%H:%M:%S%.6f").to_string()
    }
}
