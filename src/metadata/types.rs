//! Canonical schema shapes handed to the downstream engine.
//!
//! These types mirror the contract of the semantic engine's model layer.
//! Field casing on the wire (`notNull`, `primaryKey`) is part of that
//! contract and preserved through serde renames.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// Column Types
// ============================================================================

/// The closed vocabulary of column types understood by the engine.
///
/// The wire form is the uppercase name. Adding or removing members is a
/// breaking interface change; source-specific type strings are translated
/// into this vocabulary by each variant's mapping table, with `Unknown` as
/// the explicit unmappable sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ColumnType {
    Bool,
    Tinyint,
    Int2,
    Int4,
    Int8,
    Float4,
    Float8,
    Decimal,
    Date,
    Timestamp,
    Varchar,
    Char,
    Uuid,
    String,
    Inet,
    Unknown,
}

impl ColumnType {
    /// The wire-stable name of this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Bool => "BOOL",
            ColumnType::Tinyint => "TINYINT",
            ColumnType::Int2 => "INT2",
            ColumnType::Int4 => "INT4",
            ColumnType::Int8 => "INT8",
            ColumnType::Float4 => "FLOAT4",
            ColumnType::Float8 => "FLOAT8",
            ColumnType::Decimal => "DECIMAL",
            ColumnType::Date => "DATE",
            ColumnType::Timestamp => "TIMESTAMP",
            ColumnType::Varchar => "VARCHAR",
            ColumnType::Char => "CHAR",
            ColumnType::Uuid => "UUID",
            ColumnType::String => "STRING",
            ColumnType::Inet => "INET",
            ColumnType::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Table / Column / Constraint
// ============================================================================

/// A single column of a source table, in canonical form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Column name, unique within its table.
    pub name: String,
    /// Canonical engine type.
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    /// Whether the column is declared NOT NULL.
    #[serde(rename = "notNull")]
    pub not_null: bool,
    /// Column comment from the source catalog, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Source-specific column properties, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, String>>,
}

/// Physical location of a table within its source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableProperties {
    /// Catalog name; `None` for sources without a catalog concept.
    #[serde(default)]
    pub catalog: Option<String>,
    /// Schema (database) name, verbatim from the source.
    pub schema: String,
    /// Table name, verbatim from the source.
    pub table: String,
}

/// A source table in canonical form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Compact table name (`"schema.table"`), the dedup key during assembly.
    pub name: String,
    /// Table comment from the source catalog, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Columns in first-appearance order from the source rows.
    pub columns: Vec<Column>,
    /// Physical location within the source.
    pub properties: TableProperties,
    /// Primary key column; empty string when unknown.
    #[serde(rename = "primaryKey")]
    pub primary_key: String,
}

/// Kinds of relational constraints a source may expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConstraintType {
    PrimaryKey,
    ForeignKey,
    Unique,
}

/// A relational constraint reported by a source's catalog.
///
/// Sources without constraint introspection simply return no constraints;
/// that is success, not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Constraint {
    /// Constraint name from the source catalog.
    pub name: String,
    pub constraint_type: ConstraintType,
    /// Compact name of the constrained table.
    pub table: String,
    /// Constrained column.
    pub column: String,
    /// Compact name of the referenced table (foreign keys).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referenced_table: Option<String>,
    /// Referenced column (foreign keys).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referenced_column: Option<String>,
}
