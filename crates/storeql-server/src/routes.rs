//! HTTP surface: router assembly and the natural-language query pipeline.
//!
//! The pipeline is strictly staged: prompt, generation, sanitation,
//! validation, execution, normalization. The first stage to fail ends the
//! request, and nothing downstream of a failed stage runs.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use storeql_core::prompt::build_prompt;
use storeql_core::registry::TableRegistry;
use storeql_core::safety::{validate, Verdict};
use storeql_core::sanitize::sanitize;
use storeql_core::schema::SchemaDescriptor;
use storeql_duck::normalize::normalize_rows;
use storeql_duck::rows::RowSet;
use storeql_duck::{Datastore, StoreError};

use crate::config::Config;
use crate::crud;
use crate::error::ApiError;
use crate::llm::SqlGenerator;

/// Shared application state. Everything is behind an `Arc` so the router
/// can clone it per request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub schema: Arc<SchemaDescriptor>,
    pub registry: Arc<TableRegistry>,
    pub generator: Arc<dyn SqlGenerator>,
}

/// Assembles the route table, including the per-table CRUD routes.
pub fn router(state: AppState) -> Router {
    let mut app = Router::new()
        .route("/", get(welcome))
        .route("/health", get(health_check))
        .route("/schema", get(get_schema))
        .route("/natural-query", post(natural_query))
        .route("/all-tables", get(all_tables))
        .route("/update-row", put(crud::update_row));

    for entry in state.registry.entries() {
        app = app.merge(crud::table_routes(entry));
    }

    app.with_state(state)
}

#[derive(Debug, Deserialize)]
struct NaturalQueryRequest {
    query: Option<String>,
}

/// Success envelope for `/natural-query`. Field order here is the wire
/// order.
#[derive(Debug, Serialize)]
struct NaturalQueryResponse {
    success: bool,
    natural_query: String,
    generated_sql: String,
    results: Vec<Map<String, Value>>,
    row_count: usize,
}

async fn welcome() -> Json<Value> {
    Json(json!({ "message": "Welcome to QuickCommerce API!" }))
}

async fn health_check() -> &'static str {
    "OK"
}

async fn get_schema(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let descriptor = serde_json::to_value(state.schema.as_ref())
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(Json(descriptor))
}

/// One natural-language query, one answer. An unreadable body and a missing
/// `query` field are the same input error.
async fn natural_query(
    State(state): State<AppState>,
    payload: Result<Json<NaturalQueryRequest>, JsonRejection>,
) -> Result<Json<NaturalQueryResponse>, ApiError> {
    let Json(request) = payload.map_err(|_| ApiError::MissingQuery)?;
    let natural_query = request
        .query
        .ok_or(ApiError::MissingQuery)?
        .trim()
        .to_string();
    if natural_query.is_empty() {
        return Err(ApiError::EmptyQuery);
    }

    let request_id = Uuid::new_v4();
    let span = info_span!("natural_query", %request_id);
    let response = run_pipeline(&state, natural_query).instrument(span).await?;
    Ok(Json(response))
}

async fn run_pipeline(
    state: &AppState,
    natural_query: String,
) -> Result<NaturalQueryResponse, ApiError> {
    let prompt = build_prompt(&state.schema, &natural_query);

    let generation_timeout = Duration::from_secs(state.config.generation.timeout_secs);
    let generation = state.generator.generate_sql(&prompt);
    let raw = match tokio::time::timeout(generation_timeout, generation).await {
        Ok(outcome) => outcome.map_err(|e| ApiError::Generation(e.to_string()))?,
        Err(_) => {
            return Err(ApiError::Generation(format!(
                "no response within {}s",
                state.config.generation.timeout_secs
            )))
        }
    };

    let generated_sql = sanitize(&raw);
    info!(generated_sql = %generated_sql, "sql generated");

    let safe = match validate(&generated_sql) {
        Verdict::Safe(safe) => safe,
        Verdict::Rejected { reason } => {
            warn!(%reason, generated_sql = %generated_sql, "query blocked");
            return Err(ApiError::Blocked {
                reason,
                generated_sql,
            });
        }
    };

    let path = state.config.database.path.clone();
    let task = tokio::task::spawn_blocking(move || -> Result<RowSet, StoreError> {
        let store = Datastore::open(&path)?;
        store.run_select(&safe)
    });

    // On timeout the blocking task is abandoned, not cancelled.
    let query_timeout = Duration::from_secs(state.config.database.query_timeout_secs);
    let outcome = match tokio::time::timeout(query_timeout, task).await {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(join_error)) => return Err(ApiError::Internal(join_error.to_string())),
        Err(_) => {
            return Err(ApiError::Execution {
                message: format!(
                    "no result within {}s",
                    state.config.database.query_timeout_secs
                ),
                generated_sql,
            })
        }
    };

    let row_set = match outcome {
        Ok(rows) => rows,
        Err(StoreError::Connection(message)) => {
            return Err(ApiError::Unavailable {
                message,
                generated_sql,
            })
        }
        Err(StoreError::Execution(error)) => {
            return Err(ApiError::Execution {
                message: error.to_string(),
                generated_sql,
            })
        }
    };

    let results = normalize_rows(&row_set);
    let row_count = results.len();
    info!(row_count, "query executed");

    Ok(NaturalQueryResponse {
        success: true,
        natural_query,
        generated_sql,
        results,
        row_count,
    })
}

/// Dump of every registered table, keyed by display label. A table that
/// cannot be read dumps as an empty list instead of failing the whole
/// response.
async fn all_tables(State(state): State<AppState>) -> Result<Json<Map<String, Value>>, ApiError> {
    let registry = Arc::clone(&state.registry);
    let dump = with_store(&state, move |store| {
        let mut dump = Map::new();
        for entry in registry.entries() {
            let rows: Vec<Value> = match store.fetch_table(&entry.table) {
                Ok(set) => normalize_rows(&set).into_iter().map(Value::Object).collect(),
                Err(error) => {
                    warn!(table = %entry.table, %error, "table dump failed");
                    Vec::new()
                }
            };
            dump.insert(entry.label.clone(), Value::Array(rows));
        }
        Ok(dump)
    })
    .await?;
    Ok(Json(dump))
}

/// Opens the datastore on the blocking pool and runs one operation against
/// it. The connection is scoped to the closure and drops with it.
pub(crate) async fn with_store<T, F>(state: &AppState, op: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&Datastore) -> Result<T, StoreError> + Send + 'static,
{
    let path = state.config.database.path.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        let store = Datastore::open(&path)?;
        op(&store)
    })
    .await
    .map_err(|e| ApiError::Internal(e.to_string()))?;
    outcome.map_err(|e| ApiError::Internal(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::GenerationError;
    use async_trait::async_trait;
    use axum::http::StatusCode;
    use std::path::{Path, PathBuf};
    use storeql_duck::bootstrap::apply_schema;
    use tempfile::TempDir;

    struct Canned(&'static str);

    #[async_trait]
    impl SqlGenerator for Canned {
        async fn generate_sql(&self, _prompt: &str) -> Result<String, GenerationError> {
            Ok(self.0.to_string())
        }
    }

    struct Failing;

    #[async_trait]
    impl SqlGenerator for Failing {
        async fn generate_sql(&self, _prompt: &str) -> Result<String, GenerationError> {
            Err(GenerationError::Request("connection refused".to_string()))
        }
    }

    struct Slow;

    #[async_trait]
    impl SqlGenerator for Slow {
        async fn generate_sql(&self, _prompt: &str) -> Result<String, GenerationError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok("SELECT 1".to_string())
        }
    }

    fn state_for(generator: Arc<dyn SqlGenerator>, db_path: &Path) -> AppState {
        let schema = SchemaDescriptor::darkstore();
        let registry = TableRegistry::from_schema(&schema);
        let mut config = Config::default();
        config.database.path = db_path.to_string_lossy().into_owned();
        AppState {
            config: Arc::new(config),
            schema: Arc::new(schema),
            registry: Arc::new(registry),
            generator,
        }
    }

    fn seeded_db(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("routes.duckdb");
        let store = Datastore::open(&path).unwrap();
        apply_schema(store.connection(), &SchemaDescriptor::darkstore()).unwrap();
        store
            .connection()
            .execute_batch(
                "INSERT INTO products (product_id, name, brand) VALUES
                     (1, 'Oat Milk', 'Havre'),
                     (2, 'Rye Bread', 'Baker Co'),
                     (3, 'Cold Brew', 'Northside');",
            )
            .unwrap();
        path
    }

    fn ask(query: &str) -> Result<Json<NaturalQueryRequest>, JsonRejection> {
        Ok(Json(NaturalQueryRequest {
            query: Some(query.to_string()),
        }))
    }

    #[tokio::test]
    async fn missing_query_field_is_reported_as_no_query() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_for(Arc::new(Canned("SELECT 1")), &dir.path().join("db.duckdb"));
        let error = natural_query(State(state), Ok(Json(NaturalQueryRequest { query: None })))
            .await
            .unwrap_err();
        assert_eq!(error.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error.to_string(), "No query provided");
    }

    #[tokio::test]
    async fn blank_query_is_reported_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_for(Arc::new(Canned("SELECT 1")), &dir.path().join("db.duckdb"));
        let error = natural_query(State(state), ask("   \n ")).await.unwrap_err();
        assert_eq!(error.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error.to_string(), "Empty query provided");
    }

    #[tokio::test]
    async fn fenced_generator_output_is_stripped_validated_and_executed() {
        let dir = tempfile::tempdir().unwrap();
        let path = seeded_db(&dir);
        let generator = Canned("```sql\nSELECT name FROM products ORDER BY product_id\n```");
        let state = state_for(Arc::new(generator), &path);

        let Json(response) = natural_query(State(state), ask("what products do we stock"))
            .await
            .unwrap();

        assert!(response.success);
        assert_eq!(response.natural_query, "what products do we stock");
        assert_eq!(
            response.generated_sql,
            "SELECT name FROM products ORDER BY product_id"
        );
        assert_eq!(response.row_count, 3);
        assert_eq!(response.results.len(), 3);
        assert_eq!(response.results[0]["name"], json!("Oat Milk"));
    }

    #[tokio::test]
    async fn empty_results_are_a_success_with_zero_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = seeded_db(&dir);
        let state = state_for(
            Arc::new(Canned("SELECT name FROM products WHERE product_id = 99")),
            &path,
        );

        let Json(response) = natural_query(State(state), ask("the missing product"))
            .await
            .unwrap();

        assert!(response.success);
        assert_eq!(response.row_count, 0);
        assert!(response.results.is_empty());
    }

    #[tokio::test]
    async fn mutating_statements_are_blocked_with_the_keyword_named() {
        let dir = tempfile::tempdir().unwrap();
        let path = seeded_db(&dir);
        let state = state_for(Arc::new(Canned("DROP TABLE orders")), &path);

        let error = natural_query(State(state), ask("remove the orders table"))
            .await
            .unwrap_err();

        assert_eq!(error.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            error.to_string(),
            "Query blocked for security reasons: Query contains dangerous keyword: DROP"
        );
        match error {
            ApiError::Blocked { generated_sql, .. } => {
                assert_eq!(generated_sql, "DROP TABLE orders")
            }
            other => panic!("expected blocked error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn generator_failures_surface_as_generation_errors() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_for(Arc::new(Failing), &dir.path().join("db.duckdb"));

        let error = natural_query(State(state), ask("anything"))
            .await
            .unwrap_err();

        assert_eq!(error.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            error.to_string(),
            "Failed to generate SQL query: connection refused"
        );
    }

    #[tokio::test]
    async fn slow_generation_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = state_for(Arc::new(Slow), &dir.path().join("db.duckdb"));
        let mut config = Config::default();
        config.generation.timeout_secs = 0;
        config.database.path = dir.path().join("db.duckdb").to_string_lossy().into_owned();
        state.config = Arc::new(config);

        let error = natural_query(State(state), ask("anything"))
            .await
            .unwrap_err();

        assert_eq!(error.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(error
            .to_string()
            .starts_with("Failed to generate SQL query: no response within"));
    }

    #[tokio::test]
    async fn unreachable_database_is_a_dependency_failure_with_the_sql_attached() {
        let dir = tempfile::tempdir().unwrap();
        // The directory itself cannot be opened as a database file.
        let state = state_for(Arc::new(Canned("SELECT 1")), dir.path());

        let error = natural_query(State(state), ask("anything"))
            .await
            .unwrap_err();

        assert_eq!(error.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(error.to_string().starts_with("Database connection failed:"));
        match error {
            ApiError::Unavailable { generated_sql, .. } => assert_eq!(generated_sql, "SELECT 1"),
            other => panic!("expected unavailable error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn execution_failures_carry_the_statement_that_failed() {
        let dir = tempfile::tempdir().unwrap();
        let path = seeded_db(&dir);
        let statement = "SELECT nonexistent_column FROM products";
        let state = state_for(Arc::new(Canned(statement)), &path);

        let error = natural_query(State(state), ask("anything"))
            .await
            .unwrap_err();

        assert_eq!(error.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(error.to_string().starts_with("Database error:"));
        match error {
            ApiError::Execution { generated_sql, .. } => assert_eq!(generated_sql, statement),
            other => panic!("expected execution error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn welcome_names_the_storefront() {
        let Json(body) = welcome().await;
        assert_eq!(body["message"], json!("Welcome to QuickCommerce API!"));
    }

    #[tokio::test]
    async fn schema_endpoint_serializes_the_descriptor() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_for(Arc::new(Canned("SELECT 1")), &dir.path().join("db.duckdb"));
        let Json(descriptor) = get_schema(State(state)).await.unwrap();
        assert_eq!(descriptor["database"], json!("quickCommerceDB"));
        assert_eq!(descriptor["tables"].as_array().unwrap().len(), 7);
    }

    #[tokio::test]
    async fn all_tables_keys_rows_by_display_label() {
        let dir = tempfile::tempdir().unwrap();
        let path = seeded_db(&dir);
        let state = state_for(Arc::new(Canned("SELECT 1")), &path);

        let Json(dump) = all_tables(State(state)).await.unwrap();

        assert_eq!(dump.len(), 7);
        assert_eq!(dump["Products"].as_array().unwrap().len(), 3);
        assert_eq!(dump["DarkStores"], json!([]));
        assert_eq!(dump["Orders"], json!([]));
    }

    #[tokio::test]
    async fn all_tables_dumps_unreadable_tables_as_empty_lists() {
        let dir = tempfile::tempdir().unwrap();
        // Fresh file, no tables applied: every per-table read fails.
        let state = state_for(Arc::new(Canned("SELECT 1")), &dir.path().join("bare.duckdb"));

        let Json(dump) = all_tables(State(state)).await.unwrap();

        assert_eq!(dump.len(), 7);
        for (label, rows) in &dump {
            assert_eq!(rows, &json!([]), "expected an empty dump for {label}");
        }
    }
}
