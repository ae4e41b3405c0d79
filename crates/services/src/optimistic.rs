//! Apply-then-reconcile collection used by cart removal and note CRUD.
//!
//! A mutation is applied to the local collection immediately, then the
//! network call runs; on failure the optimistic change is discarded by
//! replacing the whole collection with a re-fetched authoritative copy.
//! Re-fetching trades one extra round trip on the failure path for
//! guaranteed convergence, instead of maintaining inverse patches.

/// Local mirror of a server-owned collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptimisticCollection<T> {
    items: Vec<T>,
}

impl<T> OptimisticCollection<T> {
    #[must_use]
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Adopt the authoritative server copy (initial load or reconcile).
    pub fn replace_all(&mut self, items: Vec<T>) {
        self.items = items;
    }

    /// Optimistically add an item.
    pub fn insert(&mut self, item: T) {
        self.items.push(item);
    }

    /// Optimistically remove the first matching item, returning it so the
    /// caller can reference it after the network call settles.
    pub fn remove_where<F>(&mut self, mut pred: F) -> Option<T>
    where
        F: FnMut(&T) -> bool,
    {
        let index = self.items.iter().position(|item| pred(item))?;
        Some(self.items.remove(index))
    }

    #[must_use]
    pub fn find<F>(&self, mut pred: F) -> Option<&T>
    where
        F: FnMut(&T) -> bool,
    {
        self.items.iter().find(|item| pred(item))
    }

    /// Optimistically replace the first matching item, returning the old
    /// value for reference.
    pub fn update_where<F>(&mut self, mut pred: F, replacement: T) -> Option<T>
    where
        F: FnMut(&T) -> bool,
    {
        let slot = self.items.iter_mut().find(|item| pred(item))?;
        Some(std::mem::replace(slot, replacement))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remove_where_takes_only_the_first_match() {
        let mut collection = OptimisticCollection::new();
        collection.replace_all(vec![1, 2, 2, 3]);

        assert_eq!(collection.remove_where(|&n| n == 2), Some(2));
        assert_eq!(collection.items(), &[1, 2, 3]);
        assert_eq!(collection.remove_where(|&n| n == 9), None);
    }

    #[test]
    fn replace_all_discards_optimistic_state() {
        let mut collection = OptimisticCollection::new();
        collection.insert(1);
        collection.insert(2);
        collection.replace_all(vec![7]);
        assert_eq!(collection.items(), &[7]);
    }

    #[test]
    fn update_where_swaps_in_place() {
        let mut collection = OptimisticCollection::new();
        collection.replace_all(vec!["a", "b"]);
        assert_eq!(collection.update_where(|&s| s == "b", "c"), Some("b"));
        assert_eq!(collection.items(), &["a", "c"]);
    }
}
