//! StoreQL server: natural language in, guarded DuckDB SELECT out.
//!
//! `/natural-query` builds a schema-aware prompt, asks OpenAI for a single
//! SELECT statement, strips code fences, runs the static safety gate, and
//! executes the surviving text against DuckDB. The CRUD scaffold and the
//! table dump endpoints share the same datastore.

use std::sync::Arc;

use storeql_core::registry::TableRegistry;
use storeql_core::schema::SchemaDescriptor;
use storeql_duck::bootstrap::apply_schema;
use storeql_duck::Datastore;
use tracing::info;

mod config;
mod crud;
mod error;
mod llm;
mod logging;
mod routes;

use config::Config;
use llm::OpenAiGenerator;
use routes::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Config::load_or_default("config.yaml")?;
    config.apply_logging_env();
    logging::init();

    // A missing OPENAI_API_KEY is fatal at startup, not at request time.
    let api_key = Config::get_openai_api_key()?;
    info!(model = %config.generation.model, "OpenAI client configured");

    let schema = SchemaDescriptor::darkstore();
    let registry = TableRegistry::from_schema(&schema);

    // Create the database file and its tables before accepting traffic.
    {
        let store = Datastore::open(&config.database.path)?;
        apply_schema(store.connection(), &schema)?;
    }
    info!(path = %config.database.path, tables = registry.len(), "database ready");

    let generator = OpenAiGenerator::new(api_key, config.generation.model.clone());
    let addr = format!("{}:{}", config.server.host, config.server.port);

    let state = AppState {
        config: Arc::new(config),
        schema: Arc::new(schema),
        registry: Arc::new(registry),
        generator: Arc::new(generator),
    };

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("StoreQL server listening on {}", addr);

    axum::serve(listener, routes::router(state)).await?;

    Ok(())
}
