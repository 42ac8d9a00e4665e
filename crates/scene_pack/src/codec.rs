//! Component codec registry.
//!
//! Per-type (de)serialization is a closed registry lookup — a map from exact
//! type name to a pair of boxed encode/decode function values, not
//! compile-time polymorphism. Registration is by exact name match;
//! unregistered names are the only failure mode.

use std::collections::HashMap;

use serde_json::Value;
use thiserror::Error;

/// Errors from codec dispatch.
#[derive(Debug, Error)]
pub enum CodecError {
    /// No codec registered under the requested type name.
    #[error("no codec registered for component type '{0}'")]
    Unregistered(String),

    /// A registered codec rejected its input.
    #[error("codec for '{type_name}' failed: {message}")]
    Codec { type_name: String, message: String },
}

type EncodeFn = Box<dyn Fn(&Value) -> Result<String, String> + Send + Sync>;
type DecodeFn = Box<dyn Fn(&str) -> Result<Value, String> + Send + Sync>;

struct ComponentCodec {
    encode: EncodeFn,
    decode: DecodeFn,
}

/// Registry mapping component type names to their encode/decode functions.
#[derive(Default)]
pub struct CodecRegistry {
    codecs: HashMap<String, ComponentCodec>,
}

impl std::fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodecRegistry")
            .field("types", &self.codecs.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl CodecRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a custom codec for a component type. Replaces any existing
    /// codec under the same name.
    ///
    /// Encode output must be a JSON *object* for the component to be
    /// representable in a document; the packer omits components whose codec
    /// emits anything else.
    pub fn register<E, D>(&mut self, type_name: impl Into<String>, encode: E, decode: D)
    where
        E: Fn(&Value) -> Result<String, String> + Send + Sync + 'static,
        D: Fn(&str) -> Result<Value, String> + Send + Sync + 'static,
    {
        self.codecs.insert(
            type_name.into(),
            ComponentCodec {
                encode: Box::new(encode),
                decode: Box::new(decode),
            },
        );
    }

    /// Register the default JSON passthrough codec for a component type.
    ///
    /// Encode takes the component's payload object and emits it with a
    /// `type` member carrying the registered name; decode strips the `type`
    /// member back off.
    pub fn register_json(&mut self, type_name: impl Into<String>) {
        let type_name = type_name.into();
        let encode_name = type_name.clone();
        let decode_name = type_name.clone();
        self.register(
            type_name,
            move |value: &Value| {
                let mut object = match value {
                    Value::Object(map) => map.clone(),
                    Value::Null => serde_json::Map::new(),
                    other => return Err(format!("expected object payload, got {other}")),
                };
                object.insert(
                    "type".to_string(),
                    Value::String(encode_name.clone()),
                );
                Ok(Value::Object(object).to_string())
            },
            move |text: &str| {
                let value: Value =
                    serde_json::from_str(text).map_err(|e| e.to_string())?;
                let Value::Object(mut object) = value else {
                    return Err(format!("expected object payload for '{decode_name}'"));
                };
                object.remove("type");
                Ok(Value::Object(object))
            },
        );
    }

    /// Returns `true` if a codec is registered under the given name.
    #[must_use]
    pub fn contains(&self, type_name: &str) -> bool {
        self.codecs.contains_key(type_name)
    }

    /// Serialize a component payload through its registered codec.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Unregistered`] for an unknown type name, or
    /// [`CodecError::Codec`] if the codec rejects the payload.
    pub fn encode(&self, type_name: &str, value: &Value) -> Result<String, CodecError> {
        let codec = self
            .codecs
            .get(type_name)
            .ok_or_else(|| CodecError::Unregistered(type_name.to_string()))?;
        (codec.encode)(value).map_err(|message| CodecError::Codec {
            type_name: type_name.to_string(),
            message,
        })
    }

    /// Deserialize a component payload through its registered codec.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Unregistered`] for an unknown type name, or
    /// [`CodecError::Codec`] if the codec rejects the text.
    pub fn decode(&self, type_name: &str, text: &str) -> Result<Value, CodecError> {
        let codec = self
            .codecs
            .get(type_name)
            .ok_or_else(|| CodecError::Unregistered(type_name.to_string()))?;
        (codec.decode)(text).map_err(|message| CodecError::Codec {
            type_name: type_name.to_string(),
            message,
        })
    }
}
