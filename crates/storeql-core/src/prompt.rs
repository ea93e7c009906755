//! Prompt construction for the SQL generation model.

use crate::schema::SchemaDescriptor;

/// Fixed instruction block sent with every generation request. Rule 1 is
/// advisory only; the safety gate enforces it after the fact.
const GENERATION_RULES: &str = r#"IMPORTANT RULES:
1. Generate ONLY SELECT queries - no INSERT, UPDATE, DELETE, DROP, etc.
2. Use proper JOIN syntax when accessing related tables
3. Use double quotes around table and column names only if they contain special characters
4. Return only the SQL query, no explanations or additional text
5. Ensure the query is syntactically correct for DuckDB
6. Use appropriate WHERE clauses, ORDER BY, GROUP BY, HAVING as needed
7. For date/time comparisons, use DuckDB date functions such as CURRENT_DATE, date_trunc and INTERVAL arithmetic
8. Handle case-insensitive string matching with ILIKE when appropriate
9. Give unformatted text. No markdown, no code fences, no bold or italics. Just plain text."#;

/// Composes the complete prompt: role line, schema block, rules, and the
/// user's request. The request is embedded verbatim; it is prose for the
/// model, never something this service executes.
pub fn build_prompt(schema: &SchemaDescriptor, natural_query: &str) -> String {
    format!(
        "You are a SQL query generator for a darkstore inventory management system.\n\
         Generate ONLY a valid DuckDB SELECT query based on the user's natural language request.\n\n\
         {}\n{}\n\nUser's request: {}\n\nGenerate the SQL query:",
        schema.prompt_text(),
        GENERATION_RULES,
        natural_query
    )
}
