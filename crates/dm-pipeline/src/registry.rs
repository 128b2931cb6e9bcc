//! Named, prioritized stage registry.

/// An ordered collection of named items.
///
/// Items with a higher priority come first; items with equal priority keep
/// their registration order. Registering a name that already exists replaces
/// the previous item and its priority.
///
/// # Example
///
/// ```
/// use dm_pipeline::Registry;
///
/// let mut registry = Registry::new();
/// registry.register("late", 10, "b");
/// registry.register("early", 40, "a");
/// registry.register("also-late", 10, "c");
///
/// assert_eq!(registry.names().collect::<Vec<_>>(), ["early", "late", "also-late"]);
/// ```
#[derive(Debug)]
pub struct Registry<T> {
    entries: Vec<Entry<T>>,
    next_seq: u64,
}

#[derive(Debug)]
struct Entry<T> {
    name: String,
    priority: i32,
    /// Registration sequence, breaks priority ties.
    seq: u64,
    item: T,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Registry<T> {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_seq: 0,
        }
    }

    /// Register `item` under `name` with the given priority.
    pub fn register(&mut self, name: impl Into<String>, priority: i32, item: T) {
        let name = name.into();
        if self.deregister(&name) {
            tracing::debug!(name = %name, "Replacing registered stage");
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.push(Entry {
            name,
            priority,
            seq,
            item,
        });
        self.entries
            .sort_by(|a, b| b.priority.cmp(&a.priority).then(a.seq.cmp(&b.seq)));
    }

    /// Remove the item registered under `name`.
    ///
    /// Returns `true` if an item was removed.
    pub fn deregister(&mut self, name: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.name != name);
        self.entries.len() != before
    }

    /// Check whether `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|entry| entry.name == name)
    }

    /// Registered names in execution order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|entry| entry.name.as_str())
    }

    /// Registered items in execution order.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.entries.iter().map(|entry| &entry.item)
    }

    /// Registered `(name, item)` pairs in execution order.
    pub(crate) fn named(&self) -> impl Iterator<Item = (&str, &T)> + '_ {
        self.entries
            .iter()
            .map(|entry| (entry.name.as_str(), &entry.item))
    }

    /// Number of registered items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
