//! Builder for configuring a [`Store`].

use super::{Store, StoreValue};
use crate::codec::{Codec, JsonCodec};
use crate::config::StoreOptions;
use crate::storage::{NullStorage, Storage};
use std::marker::PhantomData;

/// Builder for configuring a [`Store`].
///
/// Every setting has a default, so `Store::builder().build()` is an
/// unbounded store that persists nowhere.
///
/// # Example
///
/// ```rust
/// use unreliable_store::{MemoryStorage, Store};
///
/// let backing = MemoryStorage::new();
/// let mut store: Store<String> = Store::builder()
///     .fingerprint("user-42")
///     .max_bytes(4096)
///     .storage(backing.clone())
///     .build();
///
/// store.set_item("greeting", "hello".to_string()).unwrap();
/// assert_eq!(
///     backing.data().as_deref(),
///     Some(r#"{"user-42":{"greeting":["hello",0]}}"#)
/// );
/// ```
pub struct StoreBuilder<V> {
    options: StoreOptions,
    storage: Option<Box<dyn Storage>>,
    codec: Option<Box<dyn Codec>>,
    _value: PhantomData<fn() -> V>,
}

impl<V: StoreValue> StoreBuilder<V> {
    pub fn new() -> Self {
        Self {
            options: StoreOptions::default(),
            storage: None,
            codec: None,
            _value: PhantomData,
        }
    }

    /// Replace all options at once.
    pub fn options(mut self, options: StoreOptions) -> Self {
        self.options = options;
        self
    }

    /// Nest this store's dataset under `fingerprint` in the backing blob.
    ///
    /// Default: none
    pub fn fingerprint(mut self, fingerprint: impl Into<String>) -> Self {
        self.options.fingerprint = Some(fingerprint.into());
        self
    }

    /// Inclusive byte budget for the serialization. Negative disables
    /// eviction.
    ///
    /// Default: `-1`
    pub fn max_bytes(mut self, max_bytes: i64) -> Self {
        self.options.max_bytes = max_bytes;
        self
    }

    /// Backing storage.
    ///
    /// Default: [`NullStorage`]
    pub fn storage(mut self, storage: impl Storage + 'static) -> Self {
        self.storage = Some(Box::new(storage));
        self
    }

    /// Codec between the intermediate document and raw text.
    ///
    /// Default: [`JsonCodec`]
    pub fn codec(mut self, codec: impl Codec + 'static) -> Self {
        self.codec = Some(Box::new(codec));
        self
    }

    /// Build the store. It stays cold until first use.
    ///
    /// An empty fingerprint is the same as no fingerprint.
    pub fn build(mut self) -> Store<V> {
        self.options.fingerprint = self.options.fingerprint.filter(|f| !f.is_empty());
        Store::from_parts(
            self.options,
            self.storage.unwrap_or_else(|| Box::new(NullStorage)),
            self.codec.unwrap_or_else(|| Box::new(JsonCodec)),
        )
    }
}

impl<V: StoreValue> Default for StoreBuilder<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    #[test]
    fn test_defaults() {
        let store: Store<String> = StoreBuilder::new().build();
        assert_eq!(store.fingerprint(), None);
        assert_eq!(store.max_bytes(), -1);
        assert!(!store.is_hydrated());
    }

    #[test]
    fn test_setters_override_options() {
        let store: Store<String> = StoreBuilder::new()
            .options(StoreOptions {
                fingerprint: Some("a".into()),
                max_bytes: 10,
            })
            .fingerprint("b")
            .build();

        assert_eq!(store.fingerprint(), Some("b"));
        assert_eq!(store.max_bytes(), 10);
    }

    #[test]
    fn test_empty_fingerprint_means_none() {
        let backing = MemoryStorage::new();
        let mut store: Store<String> = StoreBuilder::new()
            .fingerprint("")
            .storage(backing.clone())
            .build();

        assert_eq!(store.fingerprint(), None);
        store.set_item("a", "1".to_string()).unwrap();
        assert_eq!(backing.data().as_deref(), Some(r#"{"a":["1",0]}"#));

        let from_options: Store<String> = Store::with_options(StoreOptions {
            fingerprint: Some(String::new()),
            max_bytes: -1,
        });
        assert_eq!(from_options.fingerprint(), None);
    }
}
