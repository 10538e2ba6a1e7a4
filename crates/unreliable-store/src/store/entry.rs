use crate::list::{NodeHandle, OrderedList};

/// A live value together with its position in the recency order.
///
/// The map key is the entry's key; the list node carries the same key so the
/// tail can be resolved back to its map entry on eviction.
#[derive(Debug)]
pub(crate) struct Entry<V> {
    pub(crate) value: V,
    pub(crate) node: NodeHandle,
}

impl<V> Entry<V> {
    pub(crate) fn new(value: V, node: NodeHandle) -> Self {
        Self { value, node }
    }

    /// Move this entry to the most recently used position.
    pub(crate) fn promote(&mut self, order: &mut OrderedList<String>) {
        let key = order.remove(self.node);
        self.node = order.push_front(key);
    }
}
