use std::borrow::Borrow;
use std::hash::Hash;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use gatehouse_core::clock::SharedClock;

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    expires_at: DateTime<Utc>,
}

/// ## Summary
/// Concurrent map whose entries disappear once their deadline passes.
///
/// Expired entries are treated as absent on read and removed lazily, or in bulk
/// by [`ExpiringCache::purge_expired`].
#[derive(Debug)]
pub struct ExpiringCache<K, V>
where
    K: Eq + Hash,
{
    entries: DashMap<K, CacheEntry<V>>,
    clock: SharedClock,
}

fn deadline(now: DateTime<Utc>, ttl: Duration) -> DateTime<Utc> {
    now.checked_add_signed(ttl)
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

impl<K, V> ExpiringCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    #[must_use]
    pub fn new(clock: SharedClock) -> Self {
        Self {
            entries: DashMap::new(),
            clock,
        }
    }

    /// ## Summary
    /// Stores `value` under `key` for `ttl`, replacing any previous entry.
    ///
    /// Returns `false` without storing anything when `ttl` is not positive.
    pub fn insert(&self, key: K, value: V, ttl: Duration) -> bool {
        if ttl <= Duration::zero() {
            return false;
        }
        let expires_at = deadline(self.clock.now(), ttl);
        self.entries.insert(key, CacheEntry { value, expires_at });
        true
    }

    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        let now = self.clock.now();
        match self.entries.get(key) {
            Some(entry) if entry.expires_at > now => return Some(entry.value.clone()),
            Some(_) => {}
            None => return None,
        }
        self.entries.remove_if(key, |_, entry| entry.expires_at <= now);
        None
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.get(key).is_some()
    }

    /// Removes an entry, returning its value if it had not expired.
    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        let now = self.clock.now();
        self.entries
            .remove(key)
            .and_then(|(_, entry)| (entry.expires_at > now).then_some(entry.value))
    }

    /// Drops every expired entry and returns how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.expires_at > now);
        before.saturating_sub(self.entries.len())
    }

    /// Number of stored entries, including expired ones not yet purged.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K> ExpiringCache<K, u32>
where
    K: Eq + Hash,
{
    /// ## Summary
    /// Adds one to the counter under `key` and returns the new count.
    ///
    /// An absent or expired counter restarts at 1 with a deadline `ttl` from now;
    /// a live counter keeps its original deadline. The update holds the shard
    /// lock, so concurrent increments are never lost.
    pub fn increment(&self, key: K, ttl: Duration) -> u32 {
        let now = self.clock.now();
        let mut entry = self.entries.entry(key).or_insert_with(|| CacheEntry {
            value: 0,
            expires_at: deadline(now, ttl),
        });
        if entry.expires_at <= now {
            *entry = CacheEntry {
                value: 0,
                expires_at: deadline(now, ttl),
            };
        }
        entry.value = entry.value.saturating_add(1);
        entry.value
    }
}
