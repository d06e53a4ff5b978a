//! Sparse-set component storage

/// Marks an index with no component in the sparse array
const EMPTY: usize = usize::MAX;

/// Per-type component container.
///
/// - `sparse[index]` is the slot in `dense`, or `EMPTY`
/// - `dense` holds components packed for iteration
/// - `ids` holds the entity index owning each dense slot
#[derive(Debug)]
pub struct SparseSet<T> {
    sparse: Vec<usize>,
    dense: Vec<T>,
    ids: Vec<u32>,
}

impl<T> Default for SparseSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SparseSet<T> {
    /// Create an empty set
    pub fn new() -> Self {
        Self {
            sparse: Vec::new(),
            dense: Vec::new(),
            ids: Vec::new(),
        }
    }

    fn slot(&self, index: u32) -> Option<usize> {
        self.sparse
            .get(index as usize)
            .copied()
            .filter(|&slot| slot != EMPTY)
    }

    /// Insert or replace the component for `index`, returning the previous one
    pub fn insert(&mut self, index: u32, value: T) -> Option<T> {
        if let Some(slot) = self.slot(index) {
            return Some(std::mem::replace(&mut self.dense[slot], value));
        }

        let i = index as usize;
        if i >= self.sparse.len() {
            self.sparse.resize(i + 1, EMPTY);
        }
        self.sparse[i] = self.dense.len();
        self.dense.push(value);
        self.ids.push(index);
        None
    }

    /// Component for `index`
    pub fn get(&self, index: u32) -> Option<&T> {
        self.slot(index).map(|slot| &self.dense[slot])
    }

    /// Mutable component for `index`
    pub fn get_mut(&mut self, index: u32) -> Option<&mut T> {
        self.slot(index).map(|slot| &mut self.dense[slot])
    }

    /// Whether `index` has a component
    pub fn contains(&self, index: u32) -> bool {
        self.slot(index).is_some()
    }

    /// Remove the component for `index`. Swap-remove: dense order changes.
    pub fn remove(&mut self, index: u32) -> Option<T> {
        let slot = self.slot(index)?;

        let value = self.dense.swap_remove(slot);
        self.ids.swap_remove(slot);

        // The former last element now lives at `slot`
        if let Some(&moved) = self.ids.get(slot) {
            self.sparse[moved as usize] = slot;
        }

        self.sparse[index as usize] = EMPTY;
        Some(value)
    }

    /// `(index, &component)` pairs in dense order
    pub fn iter(&self) -> impl Iterator<Item = (u32, &T)> {
        self.ids.iter().copied().zip(self.dense.iter())
    }

    /// Number of stored components
    pub fn len(&self) -> usize {
        self.dense.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.dense.is_empty()
    }

    /// Remove every component
    pub fn clear(&mut self) {
        self.sparse.clear();
        self.dense.clear();
        self.ids.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_get_replace() {
        let mut set = SparseSet::new();
        assert!(set.insert(5, "a").is_none());
        assert_eq!(set.get(5), Some(&"a"));
        assert_eq!(set.insert(5, "b"), Some("a"));
        assert_eq!(set.len(), 1);
        assert!(set.get(4).is_none());
        assert!(set.get(100).is_none());
    }

    #[test]
    fn test_swap_remove_keeps_mapping() {
        let mut set = SparseSet::new();
        set.insert(0, 10);
        set.insert(3, 30);
        set.insert(7, 70);

        assert_eq!(set.remove(0), Some(10));
        assert_eq!(set.get(7), Some(&70));
        assert_eq!(set.get(3), Some(&30));
        assert!(!set.contains(0));

        assert_eq!(set.remove(7), Some(70));
        assert_eq!(set.remove(7), None);
        let remaining: Vec<_> = set.iter().collect();
        assert_eq!(remaining, vec![(3, &30)]);
    }
}
