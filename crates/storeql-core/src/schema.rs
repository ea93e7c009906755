//! Darkstore database schema, described once and consumed three ways: as
//! prompt text for the generation model, as bootstrap DDL, and as the source
//! of the CRUD table registry.

use serde::Serialize;

/// One column: SQL type, optional constraint, and a short description shown
/// to the generation model.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnDef {
    pub name: &'static str,
    pub sql_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constraint: Option<&'static str>,
    pub description: &'static str,
}

/// Foreign-key style link rendered in the prompt's RELATIONSHIPS block.
#[derive(Debug, Clone, Serialize)]
pub struct Relationship {
    pub from_column: &'static str,
    pub to_table: &'static str,
    pub to_column: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TableDef {
    /// SQL identifier of the table.
    pub name: &'static str,
    /// Display label used as the JSON key in table dumps.
    pub label: &'static str,
    pub columns: Vec<ColumnDef>,
    pub relationships: Vec<Relationship>,
}

/// The full schema the service answers questions about.
#[derive(Debug, Clone, Serialize)]
pub struct SchemaDescriptor {
    pub database: &'static str,
    pub tables: Vec<TableDef>,
}

fn col(
    name: &'static str,
    sql_type: &'static str,
    constraint: Option<&'static str>,
    description: &'static str,
) -> ColumnDef {
    ColumnDef {
        name,
        sql_type,
        constraint,
        description,
    }
}

fn rel(from_column: &'static str, to_table: &'static str, to_column: &'static str) -> Relationship {
    Relationship {
        from_column,
        to_table,
        to_column,
        note: None,
    }
}

const PK: Option<&str> = Some("PRIMARY KEY");

impl SchemaDescriptor {
    /// The darkstore inventory schema. Built once at startup and shared
    /// read-only from there.
    pub fn darkstore() -> Self {
        SchemaDescriptor {
            database: "quickCommerceDB",
            tables: vec![
                TableDef {
                    name: "darkstores",
                    label: "DarkStores",
                    columns: vec![
                        col("store_id", "INTEGER", PK, "Unique identifier for each darkstore"),
                        col("name", "VARCHAR", None, "Store name"),
                        col("location", "VARCHAR", None, "Store location/address"),
                        col("region", "VARCHAR", None, "Geographic region"),
                        col("contact_info", "VARCHAR", None, "Contact information"),
                    ],
                    relationships: vec![],
                },
                TableDef {
                    name: "products",
                    label: "Products",
                    columns: vec![
                        col("product_id", "INTEGER", PK, "Unique identifier for each product"),
                        col("name", "VARCHAR", None, "Product name"),
                        col("brand", "VARCHAR", None, "Product brand"),
                        col("barcode", "VARCHAR", None, "Product barcode"),
                        col("is_perishable", "BOOLEAN", None, "Whether product is perishable"),
                        col("unit_of_measure", "VARCHAR", None, "Unit of measurement"),
                    ],
                    relationships: vec![],
                },
                TableDef {
                    name: "inventory",
                    label: "Inventory",
                    columns: vec![
                        col("inventory_id", "INTEGER", PK, "Unique inventory record identifier"),
                        col("product_id", "INTEGER", None, "References products.product_id"),
                        col("store_id", "INTEGER", None, "References darkstores.store_id"),
                        col("quantity_available", "INTEGER", None, "Available stock quantity"),
                        col("quantity_reserved", "INTEGER", None, "Reserved stock quantity"),
                        col("reorder_threshold", "INTEGER", None, "Minimum stock level before reordering"),
                        col("last_updated", "TIMESTAMP", None, "Last update timestamp"),
                    ],
                    relationships: vec![
                        rel("product_id", "products", "product_id"),
                        rel("store_id", "darkstores", "store_id"),
                    ],
                },
                TableDef {
                    name: "users",
                    label: "Users",
                    columns: vec![
                        col("user_id", "INTEGER", PK, "Unique user identifier"),
                        col("name", "VARCHAR", None, "User full name"),
                        col("role", "VARCHAR", None, "User role (customer, staff, etc.)"),
                        col("store_id", "INTEGER", None, "References darkstores.store_id (NULL for customers)"),
                        col("login_credentials", "VARCHAR", None, "Login username"),
                    ],
                    relationships: vec![Relationship {
                        from_column: "store_id",
                        to_table: "darkstores",
                        to_column: "store_id",
                        note: Some("for staff only"),
                    }],
                },
                TableDef {
                    name: "orders",
                    label: "Orders",
                    columns: vec![
                        col("order_id", "INTEGER", PK, "Unique order identifier"),
                        col("customer_id", "INTEGER", None, "References users.user_id"),
                        col("store_id", "INTEGER", None, "References darkstores.store_id"),
                        col("order_timestamp", "TIMESTAMP", None, "When order was placed"),
                        col("status", "VARCHAR", None, "Order status (pending, processing, shipped, delivered)"),
                        col("delivery_slot", "VARCHAR", None, "Delivery time slot"),
                    ],
                    relationships: vec![
                        rel("customer_id", "users", "user_id"),
                        rel("store_id", "darkstores", "store_id"),
                    ],
                },
                TableDef {
                    name: "orderitems",
                    label: "OrderItems",
                    columns: vec![
                        col("order_item_id", "INTEGER", PK, "Unique order item identifier"),
                        col("order_id", "INTEGER", None, "References orders.order_id"),
                        col("product_id", "INTEGER", None, "References products.product_id"),
                        col("quantity", "INTEGER", None, "Quantity ordered"),
                        col("unit_price", "DOUBLE", None, "Price per unit"),
                        col("discount", "DOUBLE", None, "Discount percentage (0.0 to 1.0)"),
                    ],
                    relationships: vec![
                        rel("order_id", "orders", "order_id"),
                        rel("product_id", "products", "product_id"),
                    ],
                },
                TableDef {
                    name: "stockmovements",
                    label: "StockMovements",
                    columns: vec![
                        col("movement_id", "INTEGER", PK, "Unique movement identifier"),
                        col("product_id", "INTEGER", None, "References products.product_id"),
                        col("store_id", "INTEGER", None, "References darkstores.store_id"),
                        col("type", "VARCHAR", None, "Movement type (inbound, outbound, adjustment)"),
                        col("quantity", "INTEGER", None, "Quantity moved (positive for inbound, negative for outbound/adjustment)"),
                        col("timestamp", "TIMESTAMP", None, "When movement occurred"),
                        col("reference", "VARCHAR", None, "Reference number or reason"),
                    ],
                    relationships: vec![
                        rel("product_id", "products", "product_id"),
                        rel("store_id", "darkstores", "store_id"),
                    ],
                },
            ],
        }
    }

    /// Renders the schema as the model-readable block embedded in every
    /// generation prompt: numbered tables with annotated columns, then a
    /// flat RELATIONSHIPS section.
    pub fn prompt_text(&self) -> String {
        let mut text = format!("DATABASE SCHEMA for {}:\n", self.database);

        for (index, table) in self.tables.iter().enumerate() {
            text.push_str(&format!("\n{}. {} table:\n", index + 1, table.name));
            for column in &table.columns {
                match column.constraint {
                    Some(constraint) => text.push_str(&format!(
                        "   - {} ({}, {}): {}\n",
                        column.name, column.sql_type, constraint, column.description
                    )),
                    None => text.push_str(&format!(
                        "   - {} ({}): {}\n",
                        column.name, column.sql_type, column.description
                    )),
                }
            }
        }

        text.push_str("\nRELATIONSHIPS:\n");
        for table in &self.tables {
            for link in &table.relationships {
                match link.note {
                    Some(note) => text.push_str(&format!(
                        "- {}.{} -> {}.{} ({})\n",
                        table.name, link.from_column, link.to_table, link.to_column, note
                    )),
                    None => text.push_str(&format!(
                        "- {}.{} -> {}.{}\n",
                        table.name, link.from_column, link.to_table, link.to_column
                    )),
                }
            }
        }

        text
    }
}
