//! MetadataSource trait definition.
//!
//! The MetadataSource trait abstracts over source-database families. Each
//! implementation introspects one family's catalog views and returns the
//! canonical schema shapes; selection of the concrete type happens at
//! construction time from connection info.

use async_trait::async_trait;
use thiserror::Error;

use super::types::{Constraint, Table};
use crate::engine::EngineError;

/// Result type for metadata operations.
pub type MetadataResult<T> = Result<T, MetadataError>;

/// Errors surfaced by metadata operations.
///
/// Nothing here is retried by this layer; errors propagate verbatim to the
/// caller. An unmapped column type is not an error at all (it resolves to
/// `ColumnType::Unknown` plus a diagnostic).
#[derive(Error, Debug)]
pub enum MetadataError {
    /// The source database is unreachable or rejected authentication.
    #[error("source unreachable: {0}")]
    Connectivity(#[source] EngineError),

    /// The introspection query itself was rejected.
    #[error("catalog introspection failed: {0}")]
    Introspection(#[source] EngineError),

    /// The source answered with rows this layer cannot decode.
    #[error("malformed catalog response: {0}")]
    MalformedResponse(String),
}

impl MetadataError {
    /// Classify a transport error into the metadata taxonomy.
    pub fn from_engine(err: EngineError) -> Self {
        if err.is_connectivity() {
            MetadataError::Connectivity(err)
        } else {
            MetadataError::Introspection(err)
        }
    }
}

/// Capability contract for source-catalog introspection.
///
/// One implementation exists per source-database family; all of them return
/// the same canonical shapes. Calls block the calling task until the source
/// responds and hold no shared locks while doing so.
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// Fetch all user tables from the source catalog.
    ///
    /// The result is always already assembled: raw column rows are grouped
    /// into deduplicated [`Table`]s with translated column types.
    async fn get_table_list(&self) -> MetadataResult<Vec<Table>>;

    /// Fetch relational constraints from the source catalog.
    ///
    /// Sources without constraint introspection return an empty vec; that
    /// is success.
    async fn get_constraints(&self) -> MetadataResult<Vec<Constraint>>;

    /// Fetch the source engine's version string, verbatim.
    async fn get_version(&self) -> MetadataResult<String>;
}

/// Everything one full introspection pass produces.
#[derive(Debug, Clone)]
pub struct Introspection {
    /// All assembled tables.
    pub tables: Vec<Table>,
    /// Constraints, possibly empty.
    pub constraints: Vec<Constraint>,
    /// Source engine version.
    pub version: String,
}

/// Extension trait for MetadataSource with convenience methods.
#[async_trait]
pub trait MetadataSourceExt: MetadataSource {
    /// Run a full introspection pass: tables, constraints, and version
    /// fetched concurrently.
    async fn introspect(&self) -> MetadataResult<Introspection> {
        let (tables, constraints, version) = futures::future::try_join3(
            self.get_table_list(),
            self.get_constraints(),
            self.get_version(),
        )
        .await?;

        Ok(Introspection {
            tables,
            constraints,
            version,
        })
    }
}

// Blanket implementation for all MetadataSource implementations
impl<T: MetadataSource + ?Sized> MetadataSourceExt for T {}
