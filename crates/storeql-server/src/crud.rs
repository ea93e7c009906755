//! Row-level CRUD endpoints, registered per table from the registry.
//!
//! Each registered table gets an add, a dump, and a delete-by-key route,
//! plus the shared `/update-row` endpoint. Values travel as bound
//! parameters; identifiers are checked before they reach statement text.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::info;

use storeql_core::registry::TableEntry;
use storeql_duck::normalize::normalize_rows;

use crate::error::ApiError;
use crate::routes::{with_store, AppState};

/// Routes for one registered table: `/add-{label}`, `/get-{label}`, and
/// `/delete-{label}/:id`.
pub(crate) fn table_routes(entry: &TableEntry) -> Router<AppState> {
    let add_entry = entry.clone();
    let get_entry = entry.clone();
    let delete_entry = entry.clone();

    Router::new()
        .route(
            &format!("/add-{}", entry.label),
            post(move |state: State<AppState>, body: Json<Map<String, Value>>| {
                add_row(add_entry.clone(), state, body)
            }),
        )
        .route(
            &format!("/get-{}", entry.label),
            get(move |state: State<AppState>| get_all_rows(get_entry.clone(), state)),
        )
        .route(
            &format!("/delete-{}/:id", entry.label),
            delete(move |state: State<AppState>, id: Path<String>| {
                delete_row(delete_entry.clone(), state, id)
            }),
        )
}

async fn add_row(
    entry: TableEntry,
    State(state): State<AppState>,
    Json(body): Json<Map<String, Value>>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    if body.is_empty() {
        return Err(ApiError::BadRequest("No data provided".to_string()));
    }
    for column in body.keys() {
        if !valid_identifier(column) {
            return Err(ApiError::BadRequest(format!(
                "Invalid attribute name: {column}"
            )));
        }
    }

    let label = entry.label.clone();
    let (columns, values): (Vec<String>, Vec<Value>) = body.into_iter().unzip();
    let inserted = with_store(&state, move |store| {
        store.insert_row(&entry.table, &columns, &values)
    })
    .await?;

    info!(table = %label, rows = inserted, "row added");
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": format!("{label} added successfully"),
            "rows_inserted": inserted,
        })),
    ))
}

async fn get_all_rows(
    entry: TableEntry,
    State(state): State<AppState>,
) -> Result<Json<Vec<Map<String, Value>>>, ApiError> {
    let rows = with_store(&state, move |store| {
        store.fetch_table(&entry.table).map(|set| normalize_rows(&set))
    })
    .await?;
    Ok(Json(rows))
}

async fn delete_row(
    entry: TableEntry,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    // Numeric path segments bind as integers, anything else as text.
    let key = id
        .parse::<i64>()
        .map(Value::from)
        .unwrap_or_else(|_| Value::String(id.clone()));
    let label = entry.label.clone();
    let key_column = entry.key_column.clone();

    let deleted = with_store(&state, move |store| {
        store.delete_row(&entry.table, &entry.key_column, &key)
    })
    .await?;

    if deleted == 0 {
        return Err(ApiError::NotFound(format!(
            "No {label} found with {key_column}={id}"
        )));
    }

    info!(table = %label, rows = deleted, "row deleted");
    Ok(Json(json!({
        "message": format!("{label} deleted successfully"),
        "deleted_count": deleted,
    })))
}

#[derive(Debug, Deserialize)]
pub(crate) struct UpdateRowRequest {
    table_name: Option<String>,
    key: Option<Value>,
    attribute_list: Option<Map<String, Value>>,
}

/// Unified update endpoint: addresses any registered table by name and
/// primary key, setting the columns named in `attribute_list`.
pub(crate) async fn update_row(
    State(state): State<AppState>,
    Json(request): Json<UpdateRowRequest>,
) -> Result<Json<Value>, ApiError> {
    let table_name = request.table_name.unwrap_or_default();
    let key = request.key.unwrap_or(Value::Null);
    let attributes = request.attribute_list.unwrap_or_default();
    if table_name.is_empty() || key.is_null() || attributes.is_empty() {
        return Err(ApiError::BadRequest("Missing required fields".to_string()));
    }

    let entry = state
        .registry
        .get(&table_name)
        .ok_or_else(|| ApiError::BadRequest("Invalid table name".to_string()))?
        .clone();

    for name in attributes.keys() {
        if !valid_identifier(name) {
            return Err(ApiError::BadRequest(format!(
                "Invalid attribute name: {name}"
            )));
        }
    }

    let assignments: Vec<(String, Value)> = attributes.into_iter().collect();
    let key_display = display_key(&key);
    let label = entry.label.clone();
    let key_column = entry.key_column.clone();

    let modified = with_store(&state, move |store| {
        store.update_row(&entry.table, &assignments, &entry.key_column, &key)
    })
    .await?;

    if modified == 0 {
        return Err(ApiError::NotFound(format!(
            "No {label} found with {key_column}={key_display}"
        )));
    }

    info!(table = %label, rows = modified, "row updated");
    Ok(Json(json!({
        "message": format!("{label} updated successfully"),
        "modified_count": modified,
    })))
}

/// ASCII alphanumerics and underscores only.
fn valid_identifier(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Keys render without JSON quoting in not-found messages.
fn display_key(key: &Value) -> String {
    match key {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
