//! Arena-backed doubly linked list used as the recency order.
//!
//! Nodes live in a `Vec` and link to each other by slot index, so there are
//! no ownership cycles between the list and the map that indexes it. Freed
//! slots are recycled through a free list. The head is the most recently used
//! position and the tail the least recently used one, but the list itself
//! knows nothing about caching.

/// Opaque handle to a node in an [`OrderedList`].
///
/// A handle stays valid until its node is removed. Using it afterwards is a
/// caller bug.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeHandle(usize);

#[derive(Debug)]
struct Node<T> {
    value: T,
    prev: Option<usize>,
    next: Option<usize>,
}

/// Doubly linked sequence with O(1) insertion at both ends, removal by
/// handle, and removal from the back.
#[derive(Debug)]
pub struct OrderedList<T> {
    slots: Vec<Option<Node<T>>>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
}

impl<T> OrderedList<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            len: 0,
        }
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Append a node at the tail.
    pub fn push_back(&mut self, value: T) -> NodeHandle {
        let idx = self.alloc(Node {
            value,
            prev: self.tail,
            next: None,
        });

        match self.tail {
            Some(tail) => self.node_mut(tail).next = Some(idx),
            None => self.head = Some(idx),
        }
        self.tail = Some(idx);
        self.len += 1;
        NodeHandle(idx)
    }

    /// Prepend a node at the head.
    pub fn push_front(&mut self, value: T) -> NodeHandle {
        let idx = self.alloc(Node {
            value,
            prev: None,
            next: self.head,
        });

        match self.head {
            Some(head) => self.node_mut(head).prev = Some(idx),
            None => self.tail = Some(idx),
        }
        self.head = Some(idx);
        self.len += 1;
        NodeHandle(idx)
    }

    /// Detach a node and return its value.
    ///
    /// # Panics
    ///
    /// Panics if `handle` does not refer to a live node of this list.
    pub fn remove(&mut self, handle: NodeHandle) -> T {
        let idx = handle.0;
        let node = self
            .slots
            .get_mut(idx)
            .and_then(Option::take)
            .expect("node handle does not belong to a live node");

        match node.prev {
            Some(prev) => self.node_mut(prev).next = node.next,
            None => self.head = node.next,
        }
        match node.next {
            Some(next) => self.node_mut(next).prev = node.prev,
            None => self.tail = node.prev,
        }

        self.free.push(idx);
        self.len -= 1;
        node.value
    }

    /// Remove the tail node, if any, and return its value.
    pub fn pop_back(&mut self) -> Option<T> {
        let tail = self.tail?;
        Some(self.remove(NodeHandle(tail)))
    }

    /// Value at the head (most recently used end).
    pub fn front(&self) -> Option<&T> {
        self.head.map(|idx| &self.node(idx).value)
    }

    /// Value at the tail (least recently used end).
    pub fn back(&self) -> Option<&T> {
        self.tail.map(|idx| &self.node(idx).value)
    }

    /// Drop every node and release the arena.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.head = None;
        self.tail = None;
        self.len = 0;
    }

    /// Iterate values from head to tail.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            cursor: self.head,
            remaining: self.len,
        }
    }

    fn alloc(&mut self, node: Node<T>) -> usize {
        if let Some(idx) = self.free.pop() {
            self.slots[idx] = Some(node);
            idx
        } else {
            self.slots.push(Some(node));
            self.slots.len() - 1
        }
    }

    fn node(&self, idx: usize) -> &Node<T> {
        self.slots[idx]
            .as_ref()
            .expect("linked slot must hold a node")
    }

    fn node_mut(&mut self, idx: usize) -> &mut Node<T> {
        self.slots[idx]
            .as_mut()
            .expect("linked slot must hold a node")
    }
}

impl<T> Default for OrderedList<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Head-to-tail iterator over an [`OrderedList`].
pub struct Iter<'a, T> {
    list: &'a OrderedList<T>,
    cursor: Option<usize>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let list = self.list;
        let node = list.node(self.cursor?);
        self.cursor = node.next;
        self.remaining -= 1;
        Some(&node.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<'a, T> IntoIterator for &'a OrderedList<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
