//! Parameterized CRUD statements for the table scaffold.
//!
//! Table and key-column identifiers come from the registry, never from the
//! request body; row values are always bound as parameters.

use duckdb::params_from_iter;
use duckdb::types::Value as DbValue;
use serde_json::Value as JsonValue;

use crate::rows::RowSet;
use crate::{Datastore, StoreError};

impl Datastore {
    /// All rows of one registered table.
    pub fn fetch_table(&self, table: &str) -> Result<RowSet, StoreError> {
        self.query_rows(&format!("SELECT * FROM {}", quote_ident(table)), [])
    }

    /// Inserts one row; returns the affected-row count.
    pub fn insert_row(
        &self,
        table: &str,
        columns: &[String],
        values: &[JsonValue],
    ) -> Result<usize, StoreError> {
        let column_list = columns
            .iter()
            .map(|c| quote_ident(c))
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = vec!["?"; values.len()].join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote_ident(table),
            column_list,
            placeholders
        );
        let params: Vec<DbValue> = values.iter().map(bind_value).collect();
        Ok(self.conn.execute(&sql, params_from_iter(params))?)
    }

    /// Applies the assignments to the row matching the key; returns the
    /// affected-row count (zero when no row matched).
    pub fn update_row(
        &self,
        table: &str,
        assignments: &[(String, JsonValue)],
        key_column: &str,
        key: &JsonValue,
    ) -> Result<usize, StoreError> {
        let set_clause = assignments
            .iter()
            .map(|(column, _)| format!("{} = ?", quote_ident(column)))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "UPDATE {} SET {} WHERE {} = ?",
            quote_ident(table),
            set_clause,
            quote_ident(key_column)
        );
        let mut params: Vec<DbValue> = assignments.iter().map(|(_, v)| bind_value(v)).collect();
        params.push(bind_value(key));
        Ok(self.conn.execute(&sql, params_from_iter(params))?)
    }

    /// Deletes the row matching the key; returns the affected-row count.
    pub fn delete_row(
        &self,
        table: &str,
        key_column: &str,
        key: &JsonValue,
    ) -> Result<usize, StoreError> {
        let sql = format!(
            "DELETE FROM {} WHERE {} = ?",
            quote_ident(table),
            quote_ident(key_column)
        );
        Ok(self.conn.execute(&sql, [bind_value(key)])?)
    }
}

/// Double-quotes an identifier. Callers validate the charset first; quoting
/// keeps reserved words usable as column names (`type`, `timestamp`).
fn quote_ident(ident: &str) -> String {
    format!("\"{ident}\"")
}

/// Binds one JSON value as a driver parameter. Numbers prefer integer
/// bindings; arrays and objects are bound as their JSON text.
fn bind_value(value: &JsonValue) -> DbValue {
    match value {
        JsonValue::Null => DbValue::Null,
        JsonValue::Bool(b) => DbValue::Boolean(*b),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                DbValue::BigInt(i)
            } else if let Some(u) = n.as_u64() {
                DbValue::UBigInt(u)
            } else {
                DbValue::Double(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        JsonValue::String(s) => DbValue::Text(s.clone()),
        other => DbValue::Text(other.to_string()),
    }
}
