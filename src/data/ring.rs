//! Fixed-capacity ring window.

/// An ordered, fixed-capacity buffer that evicts its oldest entry when a new
/// one arrives at capacity.
///
/// Storage grows up to `capacity` and is then overwritten in place at `head`,
/// so eviction never shifts elements.
#[derive(Debug, Clone)]
pub struct RingWindow<T> {
    items: Vec<T>,
    head: usize,
    capacity: usize,
}

impl<T> RingWindow<T> {
    /// Create an empty window holding at most `capacity` items.
    pub fn new(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            head: 0,
            capacity,
        }
    }

    /// Append `item` as the newest entry.
    ///
    /// Returns the evicted oldest entry when the window was full. With a
    /// capacity of 0 the item itself is handed back.
    pub fn push(&mut self, item: T) -> Option<T> {
        if self.capacity == 0 {
            return Some(item);
        }
        if self.items.len() < self.capacity {
            self.items.push(item);
            return None;
        }
        let evicted = std::mem::replace(&mut self.items[self.head], item);
        self.head = (self.head + 1) % self.capacity;
        Some(evicted)
    }

    /// Entries from oldest to newest.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + '_ {
        let (newer, older) = self.items.split_at(self.head);
        older.iter().chain(newer.iter())
    }

    /// The oldest entry.
    pub fn first(&self) -> Option<&T> {
        self.iter().next()
    }

    /// The newest entry.
    pub fn last(&self) -> Option<&T> {
        self.iter().next_back()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether the next push will evict.
    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }

    /// Drop every entry, keeping the capacity.
    pub fn clear(&mut self) {
        self.items.clear();
        self.head = 0;
    }
}
