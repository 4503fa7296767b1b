//! Manifest transport encoding.
//!
//! The manifest itself is opaque to this crate; it crosses the boundary to
//! the engine as base64-encoded JSON text. Encoding must be deterministic
//! for a given manifest's logical content because the encoded string can
//! itself become part of a [`SessionKey`](super::SessionKey): serde_json
//! object maps are sorted, so equal content yields byte-identical output
//! regardless of how the value was built.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

use super::SessionResult;

/// Encode a manifest document for transport to the engine.
///
/// There is no decode on this side; the engine's companion extractor
/// ([`ManifestExtractor`](crate::engine::ManifestExtractor)) parses
/// payloads back into structured form.
pub fn to_json_base64(manifest: &serde_json::Value) -> SessionResult<String> {
    let json = serde_json::to_string(manifest)?;
    Ok(BASE64.encode(json.as_bytes()))
}
