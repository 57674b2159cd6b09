//! LRU List Module
//!
//! Recency ordering for cache eviction, stored as a slab-backed doubly linked list.

// == Constants ==
/// Sentinel index meaning "no node".
const NIL: usize = usize::MAX;

/// Stable handle to a node in an [`LruList`].
pub type NodeId = usize;

#[derive(Debug)]
struct Node<T> {
    value: T,
    prev: usize,
    next: usize,
}

// == LRU List ==
/// Doubly linked list ordered by recency.
///
/// Nodes live in a `Vec` and link to each other by index, so every
/// structural operation is O(1):
/// - Front = Most recently used
/// - Back = Least recently used
///
/// Slots freed by removal are recycled by later pushes. A [`NodeId`] stays
/// valid until its node is removed.
#[derive(Debug)]
pub struct LruList<T> {
    slots: Vec<Option<Node<T>>>,
    free: Vec<usize>,
    head: usize,
    tail: usize,
    len: usize,
}

impl<T> Default for LruList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> LruList<T> {
    // == Constructor ==
    /// Creates a new empty list.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            head: NIL,
            tail: NIL,
            len: 0,
        }
    }

    // == Push Front ==
    /// Inserts a value as the most recently used node and returns its handle.
    pub fn push_front(&mut self, value: T) -> NodeId {
        let node = Node {
            value,
            prev: NIL,
            next: NIL,
        };
        let id = match self.free.pop() {
            Some(id) => {
                self.slots[id] = Some(node);
                id
            }
            None => {
                self.slots.push(Some(node));
                self.slots.len() - 1
            }
        };
        self.link_front(id);
        self.len += 1;
        id
    }

    // == Touch ==
    /// Marks a node as most recently used (moves to front).
    pub fn move_to_front(&mut self, id: NodeId) {
        if self.head == id || !self.contains(id) {
            return;
        }
        self.unlink(id);
        self.link_front(id);
    }

    // == Remove ==
    /// Removes a node and returns its value, `None` if the handle is stale.
    pub fn remove(&mut self, id: NodeId) -> Option<T> {
        if !self.contains(id) {
            return None;
        }
        self.unlink(id);
        let node = self.slots[id].take()?;
        self.free.push(id);
        self.len -= 1;
        Some(node.value)
    }

    // == Evict Oldest ==
    /// Returns and removes the least recently used value.
    pub fn pop_back(&mut self) -> Option<T> {
        if self.tail == NIL {
            return None;
        }
        self.remove(self.tail)
    }

    pub fn get(&self, id: NodeId) -> Option<&T> {
        self.slots.get(id)?.as_ref().map(|node| &node.value)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut T> {
        self.slots.get_mut(id)?.as_mut().map(|node| &mut node.value)
    }

    /// Checks whether `id` refers to a live node.
    pub fn contains(&self, id: NodeId) -> bool {
        matches!(self.slots.get(id), Some(Some(_)))
    }

    // == Length ==
    /// Returns the number of live nodes.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    // == Iteration ==
    /// Walks the list from most to least recently used.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            cursor: self.head,
        }
    }

    fn link_front(&mut self, id: usize) {
        let old_head = self.head;
        if let Some(node) = self.slots[id].as_mut() {
            node.prev = NIL;
            node.next = old_head;
        }
        if old_head != NIL {
            if let Some(head) = self.slots[old_head].as_mut() {
                head.prev = id;
            }
        } else {
            self.tail = id;
        }
        self.head = id;
    }

    fn unlink(&mut self, id: usize) {
        let (prev, next) = match self.slots[id].as_ref() {
            Some(node) => (node.prev, node.next),
            None => return,
        };

        if prev != NIL {
            if let Some(p) = self.slots[prev].as_mut() {
                p.next = next;
            }
        } else {
            self.head = next;
        }

        if next != NIL {
            if let Some(n) = self.slots[next].as_mut() {
                n.prev = prev;
            }
        } else {
            self.tail = prev;
        }

        if let Some(node) = self.slots[id].as_mut() {
            node.prev = NIL;
            node.next = NIL;
        }
    }
}

// == Iterator ==
/// Front-to-back iterator over `(NodeId, &T)` pairs.
pub struct Iter<'a, T> {
    list: &'a LruList<T>,
    cursor: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (NodeId, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor == NIL {
            return None;
        }
        let id = self.cursor;
        let node = self.list.slots.get(id)?.as_ref()?;
        self.cursor = node.next;
        Some((id, &node.value))
    }
}
