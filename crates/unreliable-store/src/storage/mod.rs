//! Backing storage adapters.
//!
//! A [`Storage`] reads and writes the store's whole serialization as one blob
//! of text. The store reads at most once per lifetime (on hydration) and
//! writes after every mutation.
//!
//! Provided adapters:
//! - [`NullStorage`]: reads nothing, writes nowhere (the default)
//! - [`MemoryStorage`]: a shareable in-memory blob
//! - [`FnStorage`]: wraps a pair of closures
//! - [`FileStorage`]: a single file, written atomically

mod file;

pub use file::FileStorage;

use crate::error::Result;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Raw text persistence for a store.
pub trait Storage {
    /// Return the current raw content, or `None` when nothing is stored.
    fn read(&mut self) -> Result<Option<String>>;

    /// Replace the raw content.
    fn write(&mut self, data: &str) -> Result<()>;
}

/// Storage that never holds anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullStorage;

impl Storage for NullStorage {
    fn read(&mut self) -> Result<Option<String>> {
        Ok(None)
    }

    fn write(&mut self, _data: &str) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Default)]
struct MemoryInner {
    data: Option<String>,
    reads: usize,
    writes: usize,
}

/// In-memory blob shared between clones.
///
/// Every clone reads and writes the same location, which makes it the
/// simplest way to put several fingerprinted stores on one backing blob.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    inner: Rc<RefCell<MemoryInner>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create storage pre-seeded with raw content.
    pub fn with_data(data: impl Into<String>) -> Self {
        let storage = Self::new();
        storage.inner.borrow_mut().data = Some(data.into());
        storage
    }

    /// Current raw content.
    pub fn data(&self) -> Option<String> {
        self.inner.borrow().data.clone()
    }

    /// Number of `read` calls served, across all clones.
    pub fn reads(&self) -> usize {
        self.inner.borrow().reads
    }

    /// Number of `write` calls served, across all clones.
    pub fn writes(&self) -> usize {
        self.inner.borrow().writes
    }
}

impl fmt::Debug for MemoryStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("MemoryStorage")
            .field("data", &inner.data)
            .field("reads", &inner.reads)
            .field("writes", &inner.writes)
            .finish()
    }
}

impl Storage for MemoryStorage {
    fn read(&mut self) -> Result<Option<String>> {
        let mut inner = self.inner.borrow_mut();
        inner.reads += 1;
        Ok(inner.data.clone())
    }

    fn write(&mut self, data: &str) -> Result<()> {
        let mut inner = self.inner.borrow_mut();
        inner.writes += 1;
        inner.data = Some(data.to_owned());
        Ok(())
    }
}

/// Storage built from a read closure and a write closure.
pub struct FnStorage<R, W> {
    read: R,
    write: W,
}

impl<R, W> FnStorage<R, W>
where
    R: FnMut() -> Option<String>,
    W: FnMut(&str),
{
    pub fn new(read: R, write: W) -> Self {
        Self { read, write }
    }
}

impl<R, W> Storage for FnStorage<R, W>
where
    R: FnMut() -> Option<String>,
    W: FnMut(&str),
{
    fn read(&mut self) -> Result<Option<String>> {
        Ok((self.read)())
    }

    fn write(&mut self, data: &str) -> Result<()> {
        (self.write)(data);
        Ok(())
    }
}
