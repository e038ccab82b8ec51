use super::RBTreeMap;
use crate::error::Result;
use crate::raw::RawRBTreeMap;

impl<K, V> RBTreeMap<K, V> {
    /// Creates an empty map with capacity for at least `capacity` elements.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree_map::RBTreeMap;
    ///
    /// let map: RBTreeMap<i32, i32> = RBTreeMap::with_capacity(32);
    /// assert!(map.is_empty());
    /// ```
    ///
    /// # Complexity
    ///
    /// O(capacity) for memory allocation.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        RBTreeMap {
            raw: RawRBTreeMap::with_capacity(capacity),
        }
    }

    /// Returns how many entries the map can hold without reallocating.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree_map::RBTreeMap;
    ///
    /// let map: RBTreeMap<i32, i32> = RBTreeMap::with_capacity(32);
    /// assert_eq!(map.capacity(), 32);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.raw.capacity()
    }

    /// Reserves room for at least `additional` more entries.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapacityExceeded`](crate::Error::CapacityExceeded) if the
    /// entries would not fit in the handle space, or [`Error::Alloc`](crate::Error::Alloc)
    /// if the allocator refuses. Either way the map is left as it was.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbtree_map::{Error, RBTreeMap};
    ///
    /// let mut map: RBTreeMap<u8, u8> = RBTreeMap::new();
    /// map.try_reserve(16).unwrap();
    /// assert!(map.capacity() >= 16);
    ///
    /// assert!(matches!(map.try_reserve(usize::MAX), Err(Error::CapacityExceeded { .. })));
    /// ```
    pub fn try_reserve(&mut self, additional: usize) -> Result<()> {
        self.raw.try_reserve(additional)
    }
}
