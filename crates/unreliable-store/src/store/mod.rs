//! The size-bounded, lazily hydrated LRU store.
//!
//! A store starts cold. The first operation that needs its contents reads the
//! backing storage once, decodes it and replays the entries in their recorded
//! order. Every mutation re-serializes the whole dataset, evicts from the
//! least recently used end until the serialization fits `max_bytes`, then
//! writes it back.

mod builder;
mod entry;
mod proxy;
mod snapshot;

pub use builder::StoreBuilder;
pub use proxy::{BlobValue, ProxyStorage};

use crate::codec::Codec;
use crate::config::{byte_size, StoreOptions};
use crate::error::Result;
use crate::list::OrderedList;
use crate::storage::Storage;
use entry::Entry;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use tracing::{debug, error, warn};

/// Values a store can hold: anything that round-trips through the
/// intermediate document.
pub trait StoreValue: Serialize + DeserializeOwned + Clone {}

impl<T: Serialize + DeserializeOwned + Clone> StoreValue for T {}

/// Point-in-time statistics for a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreStats {
    /// Number of live entries.
    pub entry_count: usize,
    /// Size of the current serialization in bytes.
    pub serialized_bytes: usize,
    /// Configured budget (negative means unbounded).
    pub max_bytes: i64,
    /// Entries evicted over this instance's lifetime.
    pub evictions: u64,
    /// Writes issued to the backing storage over this instance's lifetime.
    pub writes: u64,
    /// Whether the store has loaded its backing content.
    pub hydrated: bool,
}

/// Key-value cache bounded by the byte size of its own serialization.
pub struct Store<V = serde_json::Value> {
    map: HashMap<String, Entry<V>>,
    order: OrderedList<String>,
    hydrated: bool,
    options: StoreOptions,
    storage: Box<dyn Storage>,
    codec: Box<dyn Codec>,
    evictions: u64,
    writes: u64,
}

impl<V: StoreValue> Store<V> {
    /// Create an unbounded, unfingerprinted store that persists nowhere.
    pub fn new() -> Self {
        StoreBuilder::new().build()
    }

    /// Create a store with the given options and default adapters.
    pub fn with_options(options: StoreOptions) -> Self {
        StoreBuilder::new().options(options).build()
    }

    /// Start configuring a store.
    pub fn builder() -> StoreBuilder<V> {
        StoreBuilder::new()
    }

    /// Create a store persisted as a single value of `parent` under `key`.
    ///
    /// Reads go through `parent.get_item(key)` and writes through
    /// `parent.set_item(key, blob)`, so the child's whole serialization is
    /// subject to the parent's own budget and recency.
    pub fn proxy<P>(parent: Rc<RefCell<Store<P>>>, key: impl Into<String>, options: StoreOptions) -> Self
    where
        P: StoreValue + BlobValue + 'static,
    {
        StoreBuilder::new()
            .options(options)
            .storage(ProxyStorage::new(parent, key))
            .build()
    }

    pub(crate) fn from_parts(
        options: StoreOptions,
        storage: Box<dyn Storage>,
        codec: Box<dyn Codec>,
    ) -> Self {
        Self {
            map: HashMap::new(),
            order: OrderedList::new(),
            hydrated: false,
            options,
            storage,
            codec,
            evictions: 0,
            writes: 0,
        }
    }

    /// Insert or replace `key`, making it the most recently used entry.
    ///
    /// Returns the stored value. If the value alone exceeds the budget it is
    /// evicted along with everything else, but the value is still returned.
    pub fn set_item(&mut self, key: impl Into<String>, value: V) -> Result<V> {
        self.hydrate();
        let key = key.into();

        match self.map.get_mut(&key) {
            Some(entry) => {
                entry.value = value.clone();
                entry.promote(&mut self.order);
            }
            None => {
                let node = self.order.push_front(key.clone());
                self.map.insert(key, Entry::new(value.clone(), node));
            }
        }

        self.persist()?;
        Ok(value)
    }

    /// Look up `key`. A hit counts as a use and is promoted.
    pub fn get_item(&mut self, key: &str) -> Result<Option<V>> {
        self.hydrate();

        let Some(entry) = self.map.get_mut(key) else {
            return Ok(None);
        };
        entry.promote(&mut self.order);
        let value = entry.value.clone();

        self.persist()?;
        Ok(Some(value))
    }

    /// Remove `key`, returning its value if it was present.
    pub fn remove_item(&mut self, key: &str) -> Result<Option<V>> {
        self.hydrate();

        let Some(entry) = self.map.remove(key) else {
            return Ok(None);
        };
        self.order.remove(entry.node);

        self.persist()?;
        Ok(Some(entry.value))
    }

    /// Drop every entry and write the empty state.
    ///
    /// This does not hydrate: clearing a cold store overwrites the backing
    /// content without reading it, and a later hydration reads the empty
    /// state back.
    pub fn clear(&mut self) -> Result<()> {
        self.map.clear();
        self.order.clear();
        self.persist()
    }

    /// Byte size of the current serialization. Does not write.
    pub fn bytes(&mut self) -> Result<usize> {
        self.hydrate();
        Ok(byte_size(&self.serialize()?))
    }

    /// Number of live entries.
    pub fn len(&mut self) -> usize {
        self.hydrate();
        self.map.len()
    }

    pub fn is_empty(&mut self) -> bool {
        self.len() == 0
    }

    /// Whether `key` is present. Does not count as a use.
    pub fn contains_key(&mut self, key: &str) -> bool {
        self.hydrate();
        self.map.contains_key(key)
    }

    /// Keys from most to least recently used. Does not count as a use.
    pub fn keys(&mut self) -> Vec<String> {
        self.hydrate();
        self.order.iter().cloned().collect()
    }

    pub fn stats(&mut self) -> Result<StoreStats> {
        let serialized_bytes = self.bytes()?;
        Ok(StoreStats {
            entry_count: self.map.len(),
            serialized_bytes,
            max_bytes: self.options.max_bytes,
            evictions: self.evictions,
            writes: self.writes,
            hydrated: self.hydrated,
        })
    }

    pub fn is_hydrated(&self) -> bool {
        self.hydrated
    }

    pub fn fingerprint(&self) -> Option<&str> {
        self.options.fingerprint.as_deref()
    }

    pub fn max_bytes(&self) -> i64 {
        self.options.max_bytes
    }

    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    /// Load the backing content once. Unreadable content becomes an empty
    /// dataset.
    fn hydrate(&mut self) {
        if self.hydrated {
            return;
        }

        let entries = match self.load() {
            Ok(entries) => entries,
            Err(e) if e.is_decode_fault() => {
                warn!(error = %e, fingerprint = ?self.options.fingerprint, "Discarding malformed store content");
                Vec::new()
            }
            Err(e) => {
                error!(error = %e, fingerprint = ?self.options.fingerprint, "Failed to read store content, starting empty");
                Vec::new()
            }
        };

        for (key, value) in entries {
            let node = self.order.push_back(key.clone());
            self.map.insert(key, Entry::new(value, node));
        }

        self.hydrated = true;
        debug!(
            entries = self.map.len(),
            fingerprint = ?self.options.fingerprint,
            "Hydrated store"
        );
    }

    fn load(&mut self) -> Result<Vec<(String, V)>> {
        let raw = self.storage.read()?.unwrap_or_default();
        let document = self.codec.decode(&raw)?;
        snapshot::restore(document, self.options.fingerprint.as_deref())
    }

    fn serialize(&self) -> Result<String> {
        let entries = self.order.iter().filter_map(|key| {
            let entry = self.map.get(key);
            debug_assert!(entry.is_some(), "ordered key {key:?} missing from map");
            entry.map(|entry| (key, &entry.value))
        });
        let document = snapshot::capture(entries, self.options.fingerprint.as_deref())?;
        self.codec.encode(&document)
    }

    /// Serialize, evicting from the tail until the budget holds, then write.
    fn persist(&mut self) -> Result<()> {
        loop {
            let serialization = self.serialize()?;
            let size = byte_size(&serialization);

            if self.over_budget(size) && !self.order.is_empty() {
                self.evict_lru(size);
                continue;
            }

            self.storage.write(&serialization)?;
            self.writes += 1;
            return Ok(());
        }
    }

    fn over_budget(&self, size: usize) -> bool {
        // A negative budget does not convert and means unbounded.
        usize::try_from(self.options.max_bytes)
            .map(|max| size > max)
            .unwrap_or(false)
    }

    fn evict_lru(&mut self, size: usize) {
        if let Some(key) = self.order.pop_back() {
            self.map.remove(&key);
            self.evictions += 1;
            debug!(
                key = %key,
                size,
                max_bytes = self.options.max_bytes,
                "Evicted least recently used entry"
            );
        }
    }
}

impl<V: StoreValue> Default for Store<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> fmt::Debug for Store<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("entries", &self.map.len())
            .field("hydrated", &self.hydrated)
            .field("options", &self.options)
            .field("evictions", &self.evictions)
            .field("writes", &self.writes)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn bounded(max_bytes: i64) -> (MemoryStorage, Store<String>) {
        let storage = MemoryStorage::new();
        let store = Store::builder()
            .max_bytes(max_bytes)
            .storage(storage.clone())
            .build();
        (storage, store)
    }

    #[test]
    fn test_starts_cold() {
        let (storage, mut store) = bounded(-1);
        assert!(!store.is_hydrated());
        assert_eq!(storage.reads(), 0);

        assert!(store.is_empty());
        assert!(store.is_hydrated());
        assert_eq!(storage.reads(), 1);
    }

    #[test]
    fn test_set_and_get() {
        let (storage, mut store) = bounded(-1);

        assert_eq!(store.set_item("a", "1".into()).unwrap(), "1");
        assert_eq!(store.get_item("a").unwrap().as_deref(), Some("1"));
        assert_eq!(storage.data().as_deref(), Some(r#"{"a":["1",0]}"#));
    }

    #[test]
    fn test_written_keys_follow_recency() {
        let (storage, mut store) = bounded(-1);
        store.set_item("a", "1".into()).unwrap();
        store.set_item("b", "2".into()).unwrap();
        assert_eq!(storage.data().as_deref(), Some(r#"{"b":["2",0],"a":["1",1]}"#));

        store.get_item("a").unwrap();
        assert_eq!(storage.data().as_deref(), Some(r#"{"a":["1",0],"b":["2",1]}"#));
    }

    #[test]
    fn test_update_replaces_and_promotes() {
        let (_storage, mut store) = bounded(-1);
        store.set_item("a", "1".into()).unwrap();
        store.set_item("b", "2".into()).unwrap();
        store.set_item("a", "updated".into()).unwrap();

        assert_eq!(store.keys(), vec!["a", "b"]);
        assert_eq!(store.len(), 2);
        assert_eq!(store.get_item("a").unwrap().as_deref(), Some("updated"));
    }

    #[test]
    fn test_get_miss_does_not_write() {
        let (storage, mut store) = bounded(-1);
        store.set_item("a", "1".into()).unwrap();
        let writes = storage.writes();

        assert_eq!(store.get_item("missing").unwrap(), None);
        assert_eq!(store.remove_item("missing").unwrap(), None);
        assert_eq!(storage.writes(), writes);
    }

    #[test]
    fn test_remove_item() {
        let (storage, mut store) = bounded(-1);
        store.set_item("a", "1".into()).unwrap();
        store.set_item("b", "2".into()).unwrap();

        assert_eq!(store.remove_item("a").unwrap().as_deref(), Some("1"));
        assert_eq!(store.keys(), vec!["b"]);
        assert_eq!(storage.data().as_deref(), Some(r#"{"b":["2",0]}"#));
    }

    #[test]
    fn test_bytes_does_not_write() {
        let (storage, mut store) = bounded(-1);
        store.set_item("a", "1".into()).unwrap();
        let writes = storage.writes();

        // {"a":["1",0]} is 13 characters.
        assert_eq!(store.bytes().unwrap(), 26);
        assert_eq!(storage.writes(), writes);
    }

    #[test]
    fn test_evicts_least_recently_used() {
        // {"a":["1",0]} is 26 bytes, two entries are 50.
        let (_storage, mut store) = bounded(40);
        store.set_item("a", "1".into()).unwrap();
        store.set_item("b", "2".into()).unwrap();

        assert_eq!(store.keys(), vec!["b"]);
        assert_eq!(store.stats().unwrap().evictions, 1);
    }

    #[test]
    fn test_oversized_value_empties_store() {
        let (storage, mut store) = bounded(10);
        let stored = store.set_item("big", "far too large".into()).unwrap();

        assert_eq!(stored, "far too large");
        assert!(store.is_empty());
        assert_eq!(storage.data().as_deref(), Some("{}"));
    }

    #[test]
    fn test_zero_budget_writes_empty_state() {
        let (storage, mut store) = bounded(0);
        store.set_item("a", "1".into()).unwrap();
        assert!(store.is_empty());
        assert_eq!(storage.data().as_deref(), Some("{}"));
    }

    #[test]
    fn test_clear_on_cold_store_skips_hydration() {
        let storage = MemoryStorage::with_data(r#"{"a":["1",0]}"#);
        let mut store: Store<String> = Store::builder().storage(storage.clone()).build();

        store.clear().unwrap();
        assert!(!store.is_hydrated());
        assert_eq!(storage.reads(), 0);
        assert_eq!(storage.data().as_deref(), Some("{}"));

        assert_eq!(store.get_item("a").unwrap(), None);
        assert!(store.is_hydrated());
    }

    #[test]
    fn test_clear_on_warm_store_keeps_hydrated() {
        let (_storage, mut store) = bounded(-1);
        store.set_item("a", "1".into()).unwrap();
        store.clear().unwrap();

        assert!(store.is_hydrated());
        assert!(store.is_empty());
    }

    #[test]
    fn test_stats() {
        let (_storage, mut store) = bounded(-1);
        store.set_item("a", "1".into()).unwrap();
        store.get_item("a").unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.entry_count, 1);
        assert_eq!(stats.serialized_bytes, 26);
        assert_eq!(stats.max_bytes, -1);
        assert_eq!(stats.writes, 2);
        assert!(stats.hydrated);
    }
}
