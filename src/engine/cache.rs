//! Bounded in-memory memo cache with a pluggable eviction policy.
//!
//! No TTL and no explicit invalidation: an entry lives until capacity
//! pressure pushes it out. The cache itself is not synchronized; the owner
//! wraps it in a lock.

use lru::LruCache;
use std::collections::{HashMap, VecDeque};
use std::hash::Hash;

use crate::config::EvictionKind;

// ---------------------------------------------------------------------------
// Eviction policies
// ---------------------------------------------------------------------------

/// Decides which key leaves the cache when it is full.
pub trait EvictionPolicy<K>: Send {
    /// A new key was inserted.
    fn on_insert(&mut self, key: &K);

    /// An existing key was read.
    fn on_access(&mut self, key: &K);

    /// Pick and forget the next key to evict.
    fn evict(&mut self) -> Option<K>;
}

/// Oldest inserted key is evicted first. Reads do not reorder.
pub struct InsertionOrder<K> {
    order: VecDeque<K>,
}

impl<K> Default for InsertionOrder<K> {
    fn default() -> Self {
        Self {
            order: VecDeque::new(),
        }
    }
}

impl<K: Clone + Send> EvictionPolicy<K> for InsertionOrder<K> {
    fn on_insert(&mut self, key: &K) {
        self.order.push_back(key.clone());
    }

    fn on_access(&mut self, _key: &K) {}

    fn evict(&mut self) -> Option<K> {
        self.order.pop_front()
    }
}

/// Least recently read (or inserted) key is evicted first.
///
/// Recency is tracked in an unbounded `LruCache`; the owning `MemoCache`
/// enforces the capacity.
pub struct LeastRecentlyUsed<K: Hash + Eq> {
    order: LruCache<K, ()>,
}

impl<K: Hash + Eq> Default for LeastRecentlyUsed<K> {
    fn default() -> Self {
        Self {
            order: LruCache::unbounded(),
        }
    }
}

impl<K: Clone + Hash + Eq + Send> EvictionPolicy<K> for LeastRecentlyUsed<K> {
    fn on_insert(&mut self, key: &K) {
        self.order.put(key.clone(), ());
    }

    fn on_access(&mut self, key: &K) {
        self.order.get(key);
    }

    fn evict(&mut self) -> Option<K> {
        self.order.pop_lru().map(|(key, _)| key)
    }
}

/// Build the policy selected in config.
pub fn policy_for<K>(kind: EvictionKind) -> Box<dyn EvictionPolicy<K>>
where
    K: Clone + Hash + Eq + Send + 'static,
{
    match kind {
        EvictionKind::Insertion => Box::new(InsertionOrder::default()),
        EvictionKind::Lru => Box::new(LeastRecentlyUsed::default()),
    }
}

// ---------------------------------------------------------------------------
// Cache
// ---------------------------------------------------------------------------

pub struct MemoCache<K, V> {
    entries: HashMap<K, V>,
    policy: Box<dyn EvictionPolicy<K>>,
    capacity: usize,
    evictions: u64,
}

impl<K, V> MemoCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// A cache holding at most `capacity` keys. `0` stores nothing.
    pub fn new(capacity: usize, policy: Box<dyn EvictionPolicy<K>>) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity),
            policy,
            capacity,
            evictions: 0,
        }
    }

    pub fn get(&mut self, key: &K) -> Option<V> {
        let value = self.entries.get(key).cloned()?;
        self.policy.on_access(key);
        Some(value)
    }

    /// Insert `value`, evicting per policy if the cache is full.
    /// Re-inserting an existing key replaces its value in place.
    pub fn insert(&mut self, key: K, value: V) {
        if self.capacity == 0 {
            return;
        }

        if let Some(slot) = self.entries.get_mut(&key) {
            *slot = value;
            return;
        }

        while self.entries.len() >= self.capacity {
            match self.policy.evict() {
                Some(victim) => {
                    if self.entries.remove(&victim).is_some() {
                        self.evictions += 1;
                    }
                }
                None => break,
            }
        }

        self.policy.on_insert(&key);
        self.entries.insert(key, value);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn evictions(&self) -> u64 {
        self.evictions
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
