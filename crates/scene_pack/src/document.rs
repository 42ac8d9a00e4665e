//! Document codec — JSON text adapters for the packed value model.
//!
//! Every level of the model (scene, entity, component, pair, dependency,
//! metadata) is independently serializable, enabling partial or streamed
//! work. Field presence is optional on read: a missing field deserializes to
//! the type's default value rather than failing. Byte-for-byte text
//! stability is not guaranteed; decoded-value equality is.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::packed::PackedComponent;

/// Errors from document text conversion.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// Failed to render a packed value as document text.
    #[error("failed to write document: {0}")]
    Write(#[source] serde_json::Error),

    /// The document text is not structurally valid.
    #[error("failed to read document: {0}")]
    Read(#[source] serde_json::Error),
}

/// Render any packed value as compact document text.
///
/// # Errors
///
/// Returns [`DocumentError::Write`] if serialisation fails.
pub fn write_document<T: Serialize>(value: &T) -> Result<String, DocumentError> {
    serde_json::to_string(value).map_err(DocumentError::Write)
}

/// Render any packed value as human-readable, indented document text.
///
/// # Errors
///
/// Returns [`DocumentError::Write`] if serialisation fails.
pub fn write_document_pretty<T: Serialize>(value: &T) -> Result<String, DocumentError> {
    serde_json::to_string_pretty(value).map_err(DocumentError::Write)
}

/// Parse document text back into a packed value.
///
/// # Errors
///
/// Returns [`DocumentError::Read`] if the text is not structurally valid.
/// Missing optional fields within a valid document are not errors.
pub fn read_document<T: DeserializeOwned>(text: &str) -> Result<T, DocumentError> {
    serde_json::from_str(text).map_err(DocumentError::Read)
}

// A component's document form inlines its payload object rather than
// nesting an escaped string: `{"type": "Position", "x": 1.0, ...}`. A tag
// is the degenerate `{"type": "Frozen"}`.
impl Serialize for PackedComponent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut object = match serde_json::from_str::<Value>(&self.json_data) {
            Ok(Value::Object(map)) => map,
            // Tags have no payload text; a non-object payload has nothing
            // to inline beyond its identity.
            _ => Map::new(),
        };
        object.insert("type".to_string(), Value::String(self.type_name.clone()));
        Value::Object(object).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PackedComponent {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let Value::Object(object) = value else {
            // Wrong value kind: substitute the default and keep loading.
            return Ok(Self::default());
        };
        let type_name = object
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        // An object carrying only its identity reads back as a tag, so tags
        // never acquire spurious payload fields on a round-trip.
        let json_data = if object.len() <= 1 {
            String::new()
        } else {
            Value::Object(object).to_string()
        };
        Ok(Self {
            type_name,
            json_data,
        })
    }
}

/// Serde adapter for fields that hold JSON text but should appear in the
/// document as the value itself, not as an escaped string.
pub(crate) mod json_text {
    use super::*;

    pub fn serialize<S: Serializer>(text: &str, serializer: S) -> Result<S::Ok, S::Error> {
        match serde_json::from_str::<Value>(text) {
            Ok(value) => value.serialize(serializer),
            // Not valid JSON: carry the raw text through as a string.
            Err(_) => serializer.serialize_str(text),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(match value {
            Value::Null => String::new(),
            // Every non-null value re-encodes as canonical JSON text. A
            // string payload stays a *quoted* string here; returning the
            // bare contents would hand back text that is no longer JSON.
            other => other.to_string(),
        })
    }
}
