//! Fixed-capacity memo tables with oldest-inserted-first eviction.

use std::collections::VecDeque;
use std::hash::Hash;
use std::sync::RwLock;

use rustc_hash::FxHashMap;

/// Memo table bounded to `capacity` entries.
///
/// Eviction follows insertion order, not access order: reads never refresh an
/// entry, and overwriting an existing key keeps its original slot.
#[derive(Debug, Clone)]
pub struct BoundedCache<K, V> {
    capacity: usize,
    entries: FxHashMap<K, V>,
    order: VecDeque<K>,
}

impl<K, V> BoundedCache<K, V>
where
    K: Eq + Hash + Clone,
{
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: FxHashMap::default(),
            order: VecDeque::with_capacity(capacity),
        }
    }

    #[must_use]
    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.get(key)
    }

    #[must_use]
    pub fn has(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Insert or overwrite `key`. A new key arriving at a full cache evicts
    /// the oldest-inserted entry first.
    pub fn set(&mut self, key: K, value: V) {
        if self.capacity == 0 {
            return;
        }
        if let Some(slot) = self.entries.get_mut(&key) {
            *slot = value;
            return;
        }
        if self.entries.len() >= self.capacity
            && let Some(oldest) = self.order.pop_front()
        {
            self.entries.remove(&oldest);
        }
        self.order.push_back(key.clone());
        self.entries.insert(key, value);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}

/// [`BoundedCache`] behind a read-write lock for pipelines shared across threads.
///
/// A poisoned lock is recovered rather than propagated; the cache only holds
/// memoized values, so the worst case is a redundant re-parse.
#[derive(Debug)]
pub struct SyncCache<K, V> {
    inner: RwLock<BoundedCache<K, V>>,
}

impl<K, V> SyncCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: RwLock::new(BoundedCache::new(capacity)),
        }
    }

    #[must_use]
    pub fn get(&self, key: &K) -> Option<V> {
        let guard = self
            .inner
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        guard.get(key).cloned()
    }

    #[must_use]
    pub fn has(&self, key: &K) -> bool {
        let guard = self
            .inner
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        guard.has(key)
    }

    pub fn set(&self, key: K, value: V) {
        let mut guard = self
            .inner
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        guard.set(key, value);
    }

    pub fn clear(&self) {
        let mut guard = self
            .inner
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        guard.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        let guard = self
            .inner
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        guard.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use proptest::prelude::*;

    use super::{BoundedCache, SyncCache};

    #[test]
    fn overflow_evicts_exactly_the_first_inserted_key() {
        let mut cache = BoundedCache::new(3);
        for key in ["a", "b", "c", "d"] {
            cache.set(key.to_string(), key.len());
        }

        assert!(!cache.has(&"a".to_string()));
        for key in ["b", "c", "d"] {
            assert!(cache.has(&key.to_string()), "{key} should survive");
        }
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn reads_do_not_refresh_eviction_order() {
        let mut cache = BoundedCache::new(2);
        cache.set(1, "one");
        cache.set(2, "two");
        assert_eq!(cache.get(&1), Some(&"one"));
        cache.set(3, "three");

        assert!(!cache.has(&1));
        assert!(cache.has(&2));
        assert!(cache.has(&3));
    }

    #[test]
    fn overwrite_keeps_slot_and_does_not_evict() {
        let mut cache = BoundedCache::new(2);
        cache.set(1, "one");
        cache.set(2, "two");
        cache.set(1, "uno");

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&1), Some(&"uno"));

        cache.set(3, "three");
        assert!(!cache.has(&1), "overwritten key keeps its original age");
    }

    #[test]
    fn clear_empties_everything() {
        let mut cache = BoundedCache::new(4);
        cache.set("k", 1);
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.get(&"k"), None);
        assert_eq!(cache.capacity(), 4);
    }

    #[test]
    fn zero_capacity_never_stores() {
        let mut cache = BoundedCache::new(0);
        cache.set("k", 1);
        assert!(cache.is_empty());
    }

    #[test]
    fn sync_cache_is_shareable_across_threads() {
        let cache = Arc::new(SyncCache::new(64));
        let handles: Vec<_> = (0..4)
            .map(|worker| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    for index in 0..8 {
                        cache.set(format!("{worker}-{index}"), index);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("worker thread");
        }

        assert_eq!(cache.len(), 32);
        assert_eq!(cache.get(&"2-5".to_string()), Some(5));
        cache.clear();
        assert!(cache.is_empty());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_size_never_exceeds_capacity(
            capacity in 1_usize..16,
            keys in prop::collection::vec(0_u16..64, 0..128),
        ) {
            let mut cache = BoundedCache::new(capacity);
            for key in keys {
                cache.set(key, ());
                prop_assert!(cache.len() <= capacity);
            }
        }

        #[test]
        fn prop_capacity_plus_one_distinct_keys_drop_only_the_first(capacity in 1_usize..32) {
            let mut cache = BoundedCache::new(capacity);
            for key in 0..=capacity {
                cache.set(key, key);
            }
            prop_assert!(!cache.has(&0));
            for key in 1..=capacity {
                prop_assert!(cache.has(&key));
            }
        }
    }
}
