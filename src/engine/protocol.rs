//! Protocol types for engine sidecar communication.
//!
//! The engine sidecar speaks NDJSON over stdin/stdout. Every request is an
//! envelope with a correlation id; responses carry the same id back.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::session::PropertyValue;

/// Method names understood by the engine sidecar.
pub mod methods {
    /// Run a SQL statement against a source database's catalog.
    pub const CATALOG_SQL: &str = "catalog.sql";
    /// Construct an engine session from a manifest / function path / properties.
    pub const SESSION_CREATE: &str = "session.create";
    /// Parse a manifest payload into structured introspection results.
    pub const MANIFEST_EXTRACT: &str = "manifest.extract";
}

// ============================================================================
// Request/Response Envelope
// ============================================================================

/// Request envelope sent to the engine.
#[derive(Debug, Clone, Serialize)]
pub struct RequestEnvelope {
    /// Unique request ID for correlation.
    pub id: String,
    /// Method name (e.g., "catalog.sql").
    pub method: String,
    /// Method-specific parameters.
    pub params: serde_json::Value,
}

/// Response envelope received from the engine.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseEnvelope {
    /// Request ID this response corresponds to.
    pub id: String,
    /// Whether the request succeeded.
    pub success: bool,
    /// Result data (present if success = true).
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    /// Error information (present if success = false).
    #[serde(default)]
    pub error: Option<ErrorInfo>,
}

/// Error information in a failed response.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorInfo {
    /// Error code.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

// ============================================================================
// Source Connection Parameters
// ============================================================================

/// Parameters identifying the source database a request runs against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceParams {
    /// Source driver name (e.g., "clickhouse").
    pub driver: String,
    /// Driver-specific DSN.
    pub dsn: String,
}

// ============================================================================
// Catalog Methods
// ============================================================================

/// Parameters for `catalog.sql`.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogSqlParams {
    #[serde(flatten)]
    pub source: SourceParams,
    /// SQL statement to run.
    pub sql: String,
}

/// Response for `catalog.sql`: result rows as JSON objects keyed by column.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogSqlResponse {
    #[serde(default)]
    pub rows: Vec<serde_json::Value>,
}

// ============================================================================
// Session Methods
// ============================================================================

/// Parameters for `session.create`.
#[derive(Debug, Clone, Serialize)]
pub struct SessionCreateParams {
    /// Base64-encoded manifest, if the session is bound to one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest: Option<String>,
    /// Resolution path for engine-side function registries.
    pub function_path: String,
    /// Normalized session properties.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, PropertyValue>>,
}

/// Response for `session.create`.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionCreateResponse {
    /// Engine-side identifier of the constructed session.
    pub session_id: String,
}

// ============================================================================
// Manifest Methods
// ============================================================================

/// Parameters for `manifest.extract`.
#[derive(Debug, Clone, Serialize)]
pub struct ManifestExtractParams {
    /// Base64-encoded manifest payload.
    pub manifest: String,
}

/// Response for `manifest.extract`.
#[derive(Debug, Clone, Deserialize)]
pub struct ManifestExtractResponse {
    /// The parsed manifest document. Opaque to this crate.
    pub manifest: serde_json::Value,
}
