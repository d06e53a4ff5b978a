//! Specialized collection types
//!
//! Resource tables (textures, meshes, shader programs) are arena-owned slot maps.
//! Keys carry a generation, so a key that outlives a clear or removal fails the
//! lookup instead of reaching a recycled slot.

pub use slotmap::{SlotMap, Key};

slotmap::new_key_type! {
    /// Key into the texture registry
    pub struct TextureKey;

    /// Key into the shared mesh registry
    pub struct MeshKey;

    /// Key into the shader registry
    pub struct ShaderId;
}

/// Slot map that also remembers insertion order.
///
/// The editor lists resources in the order they were registered, which a plain
/// slot map does not guarantee once slots have been recycled.
#[derive(Debug)]
pub struct OrderedSlotMap<K: Key, V> {
    items: SlotMap<K, V>,
    order: Vec<K>,
}

impl<K: Key, V> OrderedSlotMap<K, V> {
    /// Create an empty map
    pub fn new() -> Self {
        Self {
            items: SlotMap::with_key(),
            order: Vec::new(),
        }
    }

    /// Insert a value, appending it to the iteration order
    pub fn insert(&mut self, value: V) -> K {
        let key = self.items.insert(value);
        self.order.push(key);
        key
    }

    /// Remove a value by key
    pub fn remove(&mut self, key: K) -> Option<V> {
        let value = self.items.remove(key)?;
        self.order.retain(|k| *k != key);
        Some(value)
    }

    /// Get a value by key, `None` for stale keys
    pub fn get(&self, key: K) -> Option<&V> {
        self.items.get(key)
    }

    /// Mutable access by key
    pub fn get_mut(&mut self, key: K) -> Option<&mut V> {
        self.items.get_mut(key)
    }

    /// Whether the key refers to a live value
    pub fn contains_key(&self, key: K) -> bool {
        self.items.contains_key(key)
    }

    /// Number of live values
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the map is empty
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Iterate in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (K, &V)> {
        self.order.iter().filter_map(|key| self.items.get(*key).map(|value| (*key, value)))
    }

    /// Keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = K> + '_ {
        self.order.iter().copied()
    }

    /// Remove everything, returning the values in insertion order.
    ///
    /// Every previously issued key becomes stale.
    pub fn drain(&mut self) -> Vec<V> {
        let order = std::mem::take(&mut self.order);
        order
            .into_iter()
            .filter_map(|key| self.items.remove(key))
            .collect()
    }
}

impl<K: Key, V> Default for OrderedSlotMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}
