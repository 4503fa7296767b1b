//! Session cache key identity.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::SessionError;

/// A scalar session property value.
///
/// Only scalars are admitted so the key stays comparable and hashable;
/// anything nested is rejected during normalization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Null,
    Bool(bool),
    Int(i64),
    Str(String),
}

/// Identity of one engine session.
///
/// Two keys are equal iff manifest, function path, and properties are all
/// equal by value; property order is irrelevant (the map is sorted).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionKey {
    /// Base64-encoded manifest payload, if the session is bound to one.
    pub manifest: Option<String>,
    /// Resolution path for engine-side function registries.
    pub function_path: String,
    /// Normalized properties, or the absent sentinel.
    pub properties: Option<BTreeMap<String, PropertyValue>>,
}

impl SessionKey {
    /// Build a key from raw inputs, normalizing properties.
    ///
    /// `properties` must be a JSON object whose values are strings,
    /// booleans, integers, or null. Arrays, nested objects, non-integer
    /// numbers, and non-object roots are rejected with
    /// [`SessionError::MalformedProperties`] before any construction
    /// attempt.
    pub fn new(
        manifest: Option<&str>,
        function_path: &str,
        properties: Option<&serde_json::Value>,
    ) -> Result<Self, SessionError> {
        let properties = properties.map(normalize_properties).transpose()?;

        Ok(Self {
            manifest: manifest.map(str::to_string),
            function_path: function_path.to_string(),
            properties,
        })
    }
}

/// Normalize an opaque JSON value into the order-irrelevant comparable form.
fn normalize_properties(
    value: &serde_json::Value,
) -> Result<BTreeMap<String, PropertyValue>, SessionError> {
    let object = value.as_object().ok_or_else(|| {
        SessionError::MalformedProperties(format!("expected an object, got {}", kind_of(value)))
    })?;

    let mut normalized = BTreeMap::new();
    for (key, value) in object {
        let scalar = match value {
            serde_json::Value::Null => PropertyValue::Null,
            serde_json::Value::Bool(b) => PropertyValue::Bool(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => PropertyValue::Int(i),
                None => {
                    return Err(SessionError::MalformedProperties(format!(
                        "property {:?} has non-integer number {}",
                        key, n
                    )))
                }
            },
            serde_json::Value::String(s) => PropertyValue::Str(s.clone()),
            other => {
                return Err(SessionError::MalformedProperties(format!(
                    "property {:?} has non-scalar value ({})",
                    key,
                    kind_of(other)
                )))
            }
        };
        normalized.insert(key.clone(), scalar);
    }

    Ok(normalized)
}

fn kind_of(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
