//! Codecs translate between the intermediate document and raw text.
//!
//! The intermediate document is a JSON-like object: without a fingerprint it
//! maps each key to a `[value, index]` record, with one it nests that mapping
//! under the fingerprint key. Codecs only decide how that object is spelled as
//! text.

use crate::error::{Result, StoreError};
use serde_json::{Map, Value};

/// Intermediate representation handed to and returned from a [`Codec`].
///
/// Keys keep insertion order, so a captured dataset lists entries from most
/// to least recently used and [`JsonCodec`] writes them in that order.
pub type Document = Map<String, Value>;

/// Encodes documents for writing and decodes them after reading.
pub trait Codec {
    /// Serialize a document to the raw text stored by the backing medium.
    fn encode(&self, document: &Document) -> Result<String>;

    /// Parse raw text back into a document.
    ///
    /// Empty input must decode to an empty document.
    fn decode(&self, raw: &str) -> Result<Document>;
}

/// Compact JSON, the default codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode(&self, document: &Document) -> Result<String> {
        Ok(serde_json::to_string(document)?)
    }

    fn decode(&self, raw: &str) -> Result<Document> {
        if raw.trim().is_empty() {
            return Ok(Document::new());
        }

        match serde_json::from_str::<Value>(raw)? {
            Value::Object(document) => Ok(document),
            Value::Null => Ok(Document::new()),
            other => Err(StoreError::decode(format!(
                "expected a JSON object, found {}",
                json_kind(&other)
            ))),
        }
    }
}

/// Human-readable name of a JSON value's type, for error messages.
pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
