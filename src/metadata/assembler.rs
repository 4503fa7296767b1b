//! Table assembly from raw catalog rows.
//!
//! Source introspection queries return one row per column. Assembly groups
//! those rows into [`Table`] records keyed by the compact table name,
//! preserving first-seen table order and arrival order of columns.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::mapper::{DiagnosticSink, TypeMapping};
use super::types::{Column, Table, TableProperties};

/// One raw row from a source's column catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogRow {
    pub table_schema: String,
    pub table_name: String,
    #[serde(default)]
    pub table_comment: Option<String>,
    pub column_name: String,
    pub data_type: String,
    #[serde(default)]
    pub column_comment: Option<String>,
}

/// Join a schema and table name into the compact form used as the dedup key.
///
/// Known limitation: embedded dots are not escaped, so a schema or table
/// name containing a dot is indistinguishable from a different schema/table
/// pair and distinct tables can silently collide. This matches the engine's
/// naming contract and is preserved as-is.
pub fn compact_table_name(schema: &str, table: &str) -> String {
    format!("{}.{}", schema, table)
}

/// Group raw catalog rows into deduplicated tables.
///
/// The first row for a compact name creates the table shell (catalog is
/// always unset for sources without a catalog concept, primary key starts
/// unknown); every row appends one column, translated through `mapping`, in
/// arrival order. Result order is first-seen table order.
pub fn assemble(
    rows: Vec<CatalogRow>,
    mapping: &TypeMapping,
    diagnostics: &dyn DiagnosticSink,
) -> Vec<Table> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut tables: Vec<Table> = Vec::new();

    for row in rows {
        let compact = compact_table_name(&row.table_schema, &row.table_name);

        let slot = match index.get(&compact) {
            Some(&slot) => slot,
            None => {
                tables.push(Table {
                    name: compact.clone(),
                    description: row.table_comment.clone(),
                    columns: Vec::new(),
                    properties: TableProperties {
                        catalog: None,
                        schema: row.table_schema.clone(),
                        table: row.table_name.clone(),
                    },
                    primary_key: String::new(),
                });
                index.insert(compact, tables.len() - 1);
                tables.len() - 1
            }
        };

        tables[slot].columns.push(Column {
            name: row.column_name,
            column_type: mapping.map(&row.data_type, diagnostics),
            not_null: false,
            description: row.column_comment,
            properties: None,
        });
    }

    tables
}
