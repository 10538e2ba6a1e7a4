//! Store configuration.
//!
//! Constants live on `StoreConfig`; per-instance settings live on
//! `StoreOptions`, which is assembled once at construction.

use serde::{Deserialize, Serialize};

/// Store-wide constants.
pub struct StoreConfig;

impl StoreConfig {
    /// Budget value that disables eviction.
    pub const UNBOUNDED: i64 = -1;
    /// Serialized size is measured as two bytes per UTF-16 code unit.
    pub const BYTES_PER_CODE_UNIT: usize = 2;
}

/// Options recognized when constructing a store.
///
/// Adapters (storage and codec) are not part of the options since they are
/// behavior rather than data; pass them to the builder instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoreOptions {
    /// Namespace key wrapping this store's dataset inside the backing blob.
    pub fingerprint: Option<String>,
    /// Inclusive byte budget for the serialized form. Negative means unbounded.
    pub max_bytes: i64,
}

impl StoreOptions {
    /// Whether a byte budget is enforced.
    pub fn is_bounded(&self) -> bool {
        self.max_bytes >= 0
    }
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            fingerprint: None,
            max_bytes: StoreConfig::UNBOUNDED,
        }
    }
}

/// Measure a serialization the way the budget counts it.
pub fn byte_size(serialization: &str) -> usize {
    serialization.encode_utf16().count() * StoreConfig::BYTES_PER_CODE_UNIT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = StoreOptions::default();
        assert_eq!(options.fingerprint, None);
        assert_eq!(options.max_bytes, StoreConfig::UNBOUNDED);
        assert!(!options.is_bounded());
    }

    #[test]
    fn test_options_from_json() {
        let options: StoreOptions =
            serde_json::from_str(r#"{"fingerprint":"u1","maxBytes":512}"#).unwrap();
        assert_eq!(options.fingerprint.as_deref(), Some("u1"));
        assert_eq!(options.max_bytes, 512);

        let partial: StoreOptions = serde_json::from_str(r#"{"maxBytes":0}"#).unwrap();
        assert_eq!(partial.fingerprint, None);
        assert!(partial.is_bounded());
    }

    #[test]
    fn test_byte_size_counts_code_units() {
        assert_eq!(byte_size(""), 0);
        assert_eq!(byte_size("{}"), 4);
        // One BMP character, one astral character (surrogate pair).
        assert_eq!(byte_size("é"), 2);
        assert_eq!(byte_size("😀"), 4);
    }
}
