//! Integration tests for table assembly and type mapping.
//!
//! These drive the public metadata surface the way a surrounding service
//! would: raw catalog rows in, canonical tables out.

use gantry::metadata::{
    assemble, compact_table_name, CatalogRow, ClickHouseSource, CollectingSink, ColumnType,
    Diagnostic,
};

fn row(schema: &str, table: &str, column: &str, data_type: &str) -> CatalogRow {
    CatalogRow {
        table_schema: schema.to_string(),
        table_name: table.to_string(),
        table_comment: None,
        column_name: column.to_string(),
        data_type: data_type.to_string(),
        column_comment: None,
    }
}

#[test]
fn test_assembly_groups_and_translates() {
    let sink = CollectingSink::new();
    let tables = assemble(
        vec![
            row("s1", "t1", "a", "Int32"),
            row("s1", "t1", "b", "String"),
        ],
        ClickHouseSource::type_mapping(),
        &sink,
    );

    assert_eq!(tables.len(), 1);
    assert_eq!(tables[0].name, "s1.t1");

    let columns: Vec<(&str, ColumnType)> = tables[0]
        .columns
        .iter()
        .map(|c| (c.name.as_str(), c.column_type))
        .collect();
    assert_eq!(
        columns,
        vec![("a", ColumnType::Int4), ("b", ColumnType::Varchar)]
    );
    assert!(sink.events().is_empty());
}

#[test]
fn test_assembly_keeps_table_and_column_order() {
    let sink = CollectingSink::new();
    let tables = assemble(
        vec![
            row("shop", "orders", "id", "UInt64"),
            row("shop", "users", "id", "UInt64"),
            row("shop", "orders", "placed_at", "DateTime"),
            row("shop", "orders", "total", "Float64"),
            row("shop", "users", "email", "String"),
        ],
        ClickHouseSource::type_mapping(),
        &sink,
    );

    let names: Vec<&str> = tables.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["shop.orders", "shop.users"]);

    let order_columns: Vec<&str> = tables[0].columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(order_columns, vec!["id", "placed_at", "total"]);
}

#[test]
fn test_unmapped_types_produce_unknown_columns_and_diagnostics() {
    let sink = CollectingSink::new();
    let tables = assemble(
        vec![
            row("s", "t", "tags", "Array(String)"),
            row("s", "t", "id", "UInt64"),
        ],
        ClickHouseSource::type_mapping(),
        &sink,
    );

    assert_eq!(tables[0].columns[0].column_type, ColumnType::Unknown);
    assert_eq!(tables[0].columns[1].column_type, ColumnType::Int8);

    // One event per miss, carrying the original casing.
    assert_eq!(
        sink.drain(),
        vec![Diagnostic::UnmappedType {
            source_type: "Array(String)".to_string()
        }]
    );
}

#[test]
fn test_distinct_schema_table_pairs_stay_separate() {
    let sink = CollectingSink::new();
    let tables = assemble(
        vec![
            row("a", "events", "id", "UInt64"),
            row("b", "events", "id", "UInt64"),
        ],
        ClickHouseSource::type_mapping(),
        &sink,
    );

    assert_eq!(tables.len(), 2);
    assert_eq!(tables[0].properties.schema, "a");
    assert_eq!(tables[1].properties.schema, "b");
    assert!(tables.iter().all(|t| t.properties.catalog.is_none()));
    assert!(tables.iter().all(|t| t.primary_key.is_empty()));
}

#[test]
fn test_compact_name_is_plain_dot_join() {
    assert_eq!(compact_table_name("shop", "orders"), "shop.orders");
    // Embedded dots are not escaped; collisions are the documented contract.
    assert_eq!(compact_table_name("a.b", "c"), "a.b.c");
}
