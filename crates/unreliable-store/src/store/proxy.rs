//! Storage that lives inside a single key of another store.

use super::{Store, StoreValue};
use crate::error::{Result, StoreError};
use crate::storage::Storage;
use serde_json::Value;
use std::cell::{RefCell, RefMut};
use std::rc::Rc;
use tracing::warn;

/// Values that can carry another store's raw serialization.
pub trait BlobValue {
    fn from_blob(blob: String) -> Self;

    /// The raw serialization held by this value, if it holds one.
    fn as_blob(&self) -> Option<&str>;
}

impl BlobValue for String {
    fn from_blob(blob: String) -> Self {
        blob
    }

    fn as_blob(&self) -> Option<&str> {
        Some(self)
    }
}

impl BlobValue for Value {
    fn from_blob(blob: String) -> Self {
        Value::String(blob)
    }

    fn as_blob(&self) -> Option<&str> {
        self.as_str()
    }
}

/// Reads and writes through `parent.get_item(key)` / `parent.set_item(key, _)`.
pub struct ProxyStorage<P> {
    parent: Rc<RefCell<Store<P>>>,
    key: String,
}

impl<P> ProxyStorage<P> {
    pub fn new(parent: Rc<RefCell<Store<P>>>, key: impl Into<String>) -> Self {
        Self {
            parent,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    fn parent(&self) -> Result<RefMut<'_, Store<P>>> {
        self.parent.try_borrow_mut().map_err(|_| {
            StoreError::storage(format!(
                "parent store is already in use while accessing key {:?}",
                self.key
            ))
        })
    }
}

impl<P: StoreValue + BlobValue> Storage for ProxyStorage<P> {
    fn read(&mut self) -> Result<Option<String>> {
        let value = self.parent()?.get_item(&self.key)?;
        Ok(value.and_then(|value| {
            let blob = value.as_blob().map(str::to_owned);
            if blob.is_none() {
                warn!(key = %self.key, "Parent value is not a serialized store, ignoring it");
            }
            blob
        }))
    }

    fn write(&mut self, data: &str) -> Result<()> {
        self.parent()?
            .set_item(self.key.clone(), P::from_blob(data.to_owned()))?;
        Ok(())
    }
}
