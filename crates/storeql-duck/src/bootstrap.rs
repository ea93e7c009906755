//! Bootstrap DDL derived from the schema descriptor.
//!
//! Applied once at startup so a fresh database file starts with the full
//! table set. `IF NOT EXISTS` keeps the batch idempotent across restarts.

use duckdb::Connection;
use storeql_core::schema::SchemaDescriptor;

use crate::StoreError;

/// Renders one `CREATE TABLE IF NOT EXISTS` statement per descriptor table.
pub fn create_tables_sql(schema: &SchemaDescriptor) -> String {
    let mut ddl = String::new();
    for table in &schema.tables {
        ddl.push_str(&format!("CREATE TABLE IF NOT EXISTS \"{}\" (\n", table.name));
        let columns: Vec<String> = table
            .columns
            .iter()
            .map(|column| match column.constraint {
                Some(constraint) => {
                    format!("    \"{}\" {} {}", column.name, column.sql_type, constraint)
                }
                None => format!("    \"{}\" {}", column.name, column.sql_type),
            })
            .collect();
        ddl.push_str(&columns.join(",\n"));
        ddl.push_str("\n);\n");
    }
    ddl
}

/// Applies the DDL batch on the given connection.
pub fn apply_schema(conn: &Connection, schema: &SchemaDescriptor) -> Result<(), StoreError> {
    conn.execute_batch(&create_tables_sql(schema))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Datastore;

    #[test]
    fn ddl_covers_every_table() {
        let schema = SchemaDescriptor::darkstore();
        let ddl = create_tables_sql(&schema);
        for table in &schema.tables {
            assert!(
                ddl.contains(&format!("CREATE TABLE IF NOT EXISTS \"{}\"", table.name)),
                "missing DDL for {}",
                table.name
            );
        }
        assert!(ddl.contains("\"store_id\" INTEGER PRIMARY KEY"));
        // Reserved words work as column names because everything is quoted.
        assert!(ddl.contains("\"type\" VARCHAR"));
    }

    #[test]
    fn apply_schema_is_idempotent() -> Result<(), Box<dyn std::error::Error>> {
        let schema = SchemaDescriptor::darkstore();
        let store = Datastore::open_in_memory()?;
        apply_schema(store.connection(), &schema)?;
        apply_schema(store.connection(), &schema)?;

        let mut stmt = store
            .connection()
            .prepare("SELECT count(*) FROM products")?;
        let count: i64 = stmt.query_row([], |row| row.get(0))?;
        assert_eq!(count, 0);
        Ok(())
    }
}
