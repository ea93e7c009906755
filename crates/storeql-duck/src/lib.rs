//! DuckDB datastore for StoreQL
//!
//! - [`Datastore`]: a scoped connection, opened per request and released by drop
//! - [`Datastore::run_select`]: executes validated SELECT text exactly as written
//! - [`rows`]: scalar materialization of driver values
//! - [`normalize`]: transport shaping (temporal values to ISO-8601 text)
//! - [`bootstrap`]: idempotent DDL derived from the schema descriptor
//! - [`crud`]: parameterized statements for the table scaffold

pub mod bootstrap;
pub mod crud;
pub mod normalize;
pub mod rows;

use std::path::Path;

use duckdb::Connection;
use storeql_core::safety::SafeQuery;
use thiserror::Error;

use crate::rows::{value_ref_to_scalar, RowSet};

/// Datastore failures, split by stage: acquiring the connection is a
/// dependency problem, running a statement is an execution problem. Callers
/// map the two to different responses.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Database error: {0}")]
    Execution(#[from] duckdb::Error),
}

/// A connection to the DuckDB database. Dropping the value releases the
/// connection, so every exit path cleans up.
pub struct Datastore {
    conn: Connection,
}

impl Datastore {
    /// Opens the database file, creating missing parent directories first.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| StoreError::Connection(e.to_string()))?;
            }
        }
        let conn = Connection::open(path).map_err(|e| StoreError::Connection(e.to_string()))?;
        Ok(Self { conn })
    }

    /// In-memory database, used by tests and tooling.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn =
            Connection::open_in_memory().map_err(|e| StoreError::Connection(e.to_string()))?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Runs a validated SELECT statement exactly as written and materializes
    /// every row. The parameter type is the safety invariant: only the
    /// validator can produce a [`SafeQuery`].
    pub fn run_select(&self, query: &SafeQuery) -> Result<RowSet, StoreError> {
        let result = self.query_rows(query.as_str(), [])?;
        tracing::debug!(rows = result.row_count(), "select executed");
        Ok(result)
    }

    /// Prepares `sql`, binds `params`, and materializes the full result.
    /// Column names are taken from the prepared statement so empty results
    /// still carry them.
    pub(crate) fn query_rows<P: duckdb::Params>(
        &self,
        sql: &str,
        params: P,
    ) -> Result<RowSet, StoreError> {
        let mut stmt = self.conn.prepare(sql)?;

        let column_count = stmt.column_count();
        let columns: Vec<String> = (0..column_count)
            .map(|i| {
                stmt.column_name(i)
                    .map(|name| name.to_string())
                    .unwrap_or_else(|_| format!("column_{i}"))
            })
            .collect();

        let mut rows = stmt.query(params)?;
        let mut materialized = Vec::new();
        while let Some(row) = rows.next()? {
            let mut record = Vec::with_capacity(column_count);
            for i in 0..column_count {
                record.push(value_ref_to_scalar(row.get_ref(i)?));
            }
            materialized.push(record);
        }

        Ok(RowSet {
            columns,
            rows: materialized,
        })
    }
}
