//! Shared TTL cache plumbing for provider lookups.
//!
//! Every provider cache is a keyed `DashMap` of independently computed,
//! idempotent values; concurrent analyses may read and refill entries at
//! will (last writer wins inside a TTL window).

use dashmap::DashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

/// A cached value with its fetch timestamp.
#[derive(Debug, Clone)]
pub struct Cached<V> {
    pub fetched_at: Instant,
    pub value: V,
}

impl<V> Cached<V> {
    pub fn new(value: V) -> Self {
        Self {
            fetched_at: Instant::now(),
            value,
        }
    }

    pub fn is_fresh(&self, ttl: Duration) -> bool {
        self.fetched_at.elapsed() <= ttl
    }
}

/// Look up a fresh entry, cloning the value out of the map.
pub fn fresh_value<K, V>(cache: &DashMap<K, Cached<V>>, key: &K, ttl: Duration) -> Option<V>
where
    K: Eq + Hash,
    V: Clone,
{
    cache
        .get(key)
        .filter(|entry| entry.is_fresh(ttl))
        .map(|entry| entry.value.clone())
}

/// Drop expired entries, then evict oldest-first down to `max_entries`.
pub fn prune<K, V>(cache: &DashMap<K, Cached<V>>, max_entries: usize, max_age: Duration)
where
    K: Clone + Eq + Hash,
{
    let now = Instant::now();
    let mut entries: Vec<(K, Instant)> = cache
        .iter()
        .map(|entry| (entry.key().clone(), entry.value().fetched_at))
        .collect();

    for (key, fetched_at) in &entries {
        if now.duration_since(*fetched_at) > max_age {
            cache.remove(key);
        }
    }

    if cache.len() <= max_entries {
        return;
    }

    entries.sort_by_key(|(_, fetched_at)| *fetched_at);
    for (key, _) in entries {
        if cache.len() <= max_entries {
            break;
        }
        cache.remove(&key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_value_respects_ttl() {
        let cache: DashMap<u32, Cached<String>> = DashMap::new();
        cache.insert(1, Cached::new("hit".to_string()));
        assert_eq!(
            fresh_value(&cache, &1, Duration::from_secs(60)),
            Some("hit".to_string())
        );
        assert_eq!(fresh_value(&cache, &2, Duration::from_secs(60)), None);
        // Zero-TTL entries are considered stale immediately after the
        // current instant passes.
        let stale = Cached {
            fetched_at: Instant::now() - Duration::from_secs(10),
            value: "old".to_string(),
        };
        cache.insert(3, stale);
        assert_eq!(fresh_value(&cache, &3, Duration::from_secs(1)), None);
    }

    #[test]
    fn prune_evicts_expired_then_oldest() {
        let cache: DashMap<u32, Cached<u32>> = DashMap::new();
        for i in 0..5u32 {
            cache.insert(
                i,
                Cached {
                    fetched_at: Instant::now() - Duration::from_secs(u64::from(i)),
                    value: i,
                },
            );
        }
        // Everything younger than 10s survives the age pass; the count
        // pass then evicts the oldest two.
        prune(&cache, 3, Duration::from_secs(10));
        assert_eq!(cache.len(), 3);
        assert!(cache.contains_key(&0));
        assert!(!cache.contains_key(&4));
    }

    #[test]
    fn prune_drops_entries_past_max_age() {
        let cache: DashMap<u32, Cached<u32>> = DashMap::new();
        cache.insert(
            1,
            Cached {
                fetched_at: Instant::now() - Duration::from_secs(600),
                value: 1,
            },
        );
        cache.insert(2, Cached::new(2));
        prune(&cache, 100, Duration::from_secs(120));
        assert!(!cache.contains_key(&1));
        assert!(cache.contains_key(&2));
    }
}
