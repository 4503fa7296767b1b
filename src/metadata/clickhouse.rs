//! ClickHouse metadata source.

use std::sync::Arc;

use async_trait::async_trait;
use once_cell::sync::Lazy;

use super::assembler::{self, CatalogRow};
use super::mapper::{DiagnosticSink, StderrSink, TypeMapping};
use super::source::{MetadataError, MetadataResult, MetadataSource};
use super::types::{ColumnType, Constraint, Table};
use crate::config::ConnectionConfig;
use crate::engine::protocol::SourceParams;
use crate::engine::EngineClient;

/// ClickHouse-specific type mapping. Owned by this variant; other sources
/// keep their own tables.
static CLICKHOUSE_TYPE_MAPPING: Lazy<TypeMapping> = Lazy::new(|| {
    TypeMapping::new(&[
        // Boolean Types
        ("boolean", ColumnType::Bool),
        // Integer Types
        ("int8", ColumnType::Tinyint),
        ("uint8", ColumnType::Int2),
        ("int16", ColumnType::Int2),
        ("uint16", ColumnType::Int2),
        ("int32", ColumnType::Int4),
        ("uint32", ColumnType::Int4),
        ("int64", ColumnType::Int8),
        ("uint64", ColumnType::Int8),
        // Float Types
        ("float32", ColumnType::Float4),
        ("float64", ColumnType::Float8),
        ("decimal", ColumnType::Decimal),
        // Date/Time Types
        ("date", ColumnType::Date),
        ("datetime", ColumnType::Timestamp),
        // String Types
        ("string", ColumnType::Varchar),
        ("fixedstring", ColumnType::Char),
        // Special Types
        ("uuid", ColumnType::Uuid),
        // Enums are surfaced as plain strings
        ("enum8", ColumnType::String),
        ("enum16", ColumnType::String),
        ("ipv4", ColumnType::Inet),
        ("ipv6", ColumnType::Inet),
    ])
});

/// Column catalog query. System databases are excluded.
const TABLE_LIST_SQL: &str = "\
SELECT
    c.database AS table_schema,
    c.table AS table_name,
    t.comment AS table_comment,
    c.name AS column_name,
    c.type AS data_type,
    c.comment AS column_comment
FROM
    system.columns AS c
JOIN
    system.tables AS t
    ON c.database = t.database
    AND c.table = t.name
WHERE
    c.database NOT IN ('system', 'INFORMATION_SCHEMA', 'information_schema', 'pg_catalog')";

/// MetadataSource implementation for ClickHouse.
///
/// Issues introspection SQL through the engine sidecar's connection layer
/// and assembles the resulting rows into canonical tables.
pub struct ClickHouseSource {
    client: Arc<EngineClient>,
    config: ConnectionConfig,
    diagnostics: Arc<dyn DiagnosticSink>,
}

impl ClickHouseSource {
    /// Create a new ClickHouse source with the default diagnostic sink.
    pub fn new(client: Arc<EngineClient>, config: ConnectionConfig) -> Self {
        Self::with_diagnostics(client, config, Arc::new(StderrSink))
    }

    /// Create a new ClickHouse source with an injected diagnostic sink.
    pub fn with_diagnostics(
        client: Arc<EngineClient>,
        config: ConnectionConfig,
        diagnostics: Arc<dyn DiagnosticSink>,
    ) -> Self {
        Self {
            client,
            config,
            diagnostics,
        }
    }

    /// The variant's type-mapping table.
    pub fn type_mapping() -> &'static TypeMapping {
        &CLICKHOUSE_TYPE_MAPPING
    }

    fn source_params(&self) -> SourceParams {
        SourceParams {
            driver: self.config.source_name().to_string(),
            dsn: self.config.to_dsn(),
        }
    }
}

#[async_trait]
impl MetadataSource for ClickHouseSource {
    async fn get_table_list(&self) -> MetadataResult<Vec<Table>> {
        let response = self
            .client
            .catalog_sql(self.source_params(), TABLE_LIST_SQL)
            .await
            .map_err(MetadataError::from_engine)?;

        let rows = response
            .rows
            .into_iter()
            .map(serde_json::from_value::<CatalogRow>)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| MetadataError::MalformedResponse(e.to_string()))?;

        Ok(assembler::assemble(
            rows,
            &CLICKHOUSE_TYPE_MAPPING,
            self.diagnostics.as_ref(),
        ))
    }

    async fn get_constraints(&self) -> MetadataResult<Vec<Constraint>> {
        // ClickHouse exposes no constraint catalog.
        Ok(vec![])
    }

    async fn get_version(&self) -> MetadataResult<String> {
        let response = self
            .client
            .catalog_sql(self.source_params(), "SELECT version()")
            .await
            .map_err(MetadataError::from_engine)?;

        let row = response.rows.into_iter().next().ok_or_else(|| {
            MetadataError::MalformedResponse("version query returned no rows".to_string())
        })?;

        row.as_object()
            .and_then(|fields| fields.values().next())
            .and_then(|value| value.as_str())
            .map(str::to_string)
            .ok_or_else(|| {
                MetadataError::MalformedResponse("version query returned no scalar".to_string())
            })
    }
}
