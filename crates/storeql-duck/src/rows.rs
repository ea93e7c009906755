//! Scalar materialization of driver values.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use duckdb::types::{TimeUnit, ValueRef};

/// Column value as pulled out of the driver. Temporal values stay typed until
/// normalization renders them for transport.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
    Date(NaiveDate),
    Time(NaiveTime),
    Timestamp(NaiveDateTime),
}

/// One materialized result set. Row order is whatever the database returned.
#[derive(Debug, Clone, PartialEq)]
pub struct RowSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Scalar>>,
}

impl RowSet {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Converts one driver value. Total: driver types with no mapping come
/// through as a placeholder string rather than an error.
pub(crate) fn value_ref_to_scalar(value: ValueRef<'_>) -> Scalar {
    match value {
        ValueRef::Null => Scalar::Null,
        ValueRef::Boolean(b) => Scalar::Bool(b),
        ValueRef::TinyInt(i) => Scalar::Int(i as i64),
        ValueRef::SmallInt(i) => Scalar::Int(i as i64),
        ValueRef::Int(i) => Scalar::Int(i as i64),
        ValueRef::BigInt(i) => Scalar::Int(i),
        ValueRef::HugeInt(i) => Scalar::Text(i.to_string()),
        ValueRef::UTinyInt(i) => Scalar::UInt(i as u64),
        ValueRef::USmallInt(i) => Scalar::UInt(i as u64),
        ValueRef::UInt(i) => Scalar::UInt(i as u64),
        ValueRef::UBigInt(i) => Scalar::UInt(i),
        ValueRef::Float(f) => Scalar::Float(f as f64),
        ValueRef::Double(f) => Scalar::Float(f),
        ValueRef::Text(bytes) => Scalar::Text(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => Scalar::Text(format!("<blob {} bytes>", bytes.len())),
        ValueRef::Date32(days) => date_from_epoch_days(days),
        ValueRef::Time64(unit, value) => time_from_unit(unit, value),
        ValueRef::Timestamp(unit, value) => timestamp_from_unit(unit, value),
        _ => Scalar::Text("<unsupported>".to_string()),
    }
}

fn to_micros(unit: TimeUnit, value: i64) -> i64 {
    match unit {
        TimeUnit::Second => value.saturating_mul(1_000_000),
        TimeUnit::Millisecond => value.saturating_mul(1_000),
        TimeUnit::Microsecond => value,
        TimeUnit::Nanosecond => value / 1_000,
    }
}

// Date32 counts days since 1970-01-01.
fn date_from_epoch_days(days: i32) -> Scalar {
    DateTime::from_timestamp((days as i64).saturating_mul(86_400), 0)
        .map(|dt| Scalar::Date(dt.date_naive()))
        .unwrap_or(Scalar::Null)
}

fn time_from_unit(unit: TimeUnit, value: i64) -> Scalar {
    let micros = to_micros(unit, value);
    if micros < 0 {
        return Scalar::Null;
    }
    NaiveTime::from_num_seconds_from_midnight_opt(
        (micros / 1_000_000) as u32,
        ((micros % 1_000_000) * 1_000) as u32,
    )
    .map(Scalar::Time)
    .unwrap_or(Scalar::Null)
}

fn timestamp_from_unit(unit: TimeUnit, value: i64) -> Scalar {
    DateTime::from_timestamp_micros(to_micros(unit, value))
        .map(|dt| Scalar::Timestamp(dt.naive_utc()))
        .unwrap_or(Scalar::Null)
}
