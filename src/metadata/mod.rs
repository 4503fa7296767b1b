//! Metadata discovery module.
//!
//! This module bridges source-database catalogs into the canonical schema
//! shapes the engine consumes: a capability trait for introspection, one
//! implementation per source family, the table-assembly algorithm, and the
//! per-variant type-mapping tables.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                       MetadataSource                         │
//! │   get_table_list() · get_constraints() · get_version()       │
//! └──────────────────────────────────────────────────────────────┘
//!            │ raw catalog rows            ▲ Vec<Table>
//!            ▼                             │
//! ┌──────────────────┐   type strings   ┌──────────────────────┐
//! │    assembler     │ ───────────────▶ │  TypeMapping (per    │
//! │  (group by       │ ◀─────────────── │  variant, static)    │
//! │   compact name)  │   ColumnType     └──────────────────────┘
//! └──────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use gantry::config::ConnectionConfig;
//! use gantry::metadata::{self, MetadataSourceExt};
//!
//! let config = ConnectionConfig::from_env()?;
//! let source = metadata::source_for(client, &config);
//!
//! let tables = source.get_table_list().await?;
//! let all = source.introspect().await?;
//! ```

mod assembler;
mod clickhouse;
mod mapper;
mod source;
mod types;

use std::sync::Arc;

use crate::config::{ConnectionConfig, SourceKind};
use crate::engine::EngineClient;

pub use assembler::{assemble, compact_table_name, CatalogRow};
pub use clickhouse::ClickHouseSource;
pub use mapper::{CollectingSink, Diagnostic, DiagnosticSink, StderrSink, TypeMapping};
pub use source::{Introspection, MetadataError, MetadataResult, MetadataSource, MetadataSourceExt};
pub use types::{Column, ColumnType, Constraint, ConstraintType, Table, TableProperties};

/// Construct the metadata source for a connection.
///
/// The concrete implementation is picked from the connection's
/// [`SourceKind`] here, at construction time.
pub fn source_for(client: Arc<EngineClient>, config: &ConnectionConfig) -> Box<dyn MetadataSource> {
    match config.kind {
        SourceKind::ClickHouse => Box::new(ClickHouseSource::new(client, config.clone())),
    }
}
