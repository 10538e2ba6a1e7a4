//! Unreliable Store - a size-bounded LRU key-value cache with lazy hydration.
//!
//! The store keeps its entries in memory, ordered by recency, and writes its
//! whole serialization to a pluggable [`Storage`] after every mutation. When
//! that serialization grows past `max_bytes`, the least recently used entries
//! are evicted until it fits. Nothing is read from storage until the first
//! operation that needs the contents.
//!
//! Several stores can share one backing blob by using different
//! fingerprints, and a store can live inside a single key of another store
//! (see [`Store::proxy`]).
//!
//! # Example
//!
//! ```rust
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use unreliable_store::{MemoryStorage, Store, StoreOptions};
//!
//! let backing = MemoryStorage::new();
//! let parent: Store<String> = Store::builder().storage(backing.clone()).build();
//! let parent = Rc::new(RefCell::new(parent));
//!
//! let mut session: Store<u32> = Store::proxy(
//!     Rc::clone(&parent),
//!     "session",
//!     StoreOptions { fingerprint: None, max_bytes: 1024 },
//! );
//! session.set_item("visits", 3).unwrap();
//!
//! assert_eq!(
//!     backing.data().as_deref(),
//!     Some(r#"{"session":["{\"visits\":[3,0]}",0]}"#)
//! );
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod list;
pub mod storage;
pub mod store;

pub use codec::{Codec, Document, JsonCodec};
pub use config::{StoreConfig, StoreOptions};
pub use error::{Result, StoreError};
pub use list::{NodeHandle, OrderedList};
pub use storage::{FileStorage, FnStorage, MemoryStorage, NullStorage, Storage};
pub use store::{BlobValue, ProxyStorage, Store, StoreBuilder, StoreStats, StoreValue};
