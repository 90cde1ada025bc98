//! LRU result cache with per-entry time-to-live.
//!
//! The task service keeps one cache per query kind: task lists keyed by owner
//! email, and search pages keyed by the normalized query. Writes through the
//! service clear every entry.
//!
//! # Thread Safety
//!
//! The cache uses a `Mutex` to ensure safe concurrent access. Cache
//! operations are O(1) and the lock is never held across an `.await`.

use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use lru::LruCache;

use super::config::CacheConfig;

// =============================================================================
// Statistics
// =============================================================================

/// Hit and miss counters of a cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that found nothing usable.
    pub misses: u64,
}

impl CacheStats {
    /// Returns the fraction of lookups that hit, or 0 with no lookups.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

// =============================================================================
// Result Cache
// =============================================================================

#[derive(Debug, Clone)]
struct CachedEntry<V> {
    value: V,
    cached_at: Instant,
}

impl<V> CachedEntry<V> {
    fn new(value: V) -> Self {
        Self {
            value,
            cached_at: Instant::now(),
        }
    }
}

/// Entries plus the number of times they have been cleared.
struct CacheState<K: Hash + Eq, V> {
    entries: LruCache<K, CachedEntry<V>>,
    generation: u64,
}

/// A bounded LRU map whose entries expire after a fixed lifetime.
///
/// A disabled cache stores nothing and every lookup is a miss.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use todo_backend::service::ResultCache;
///
/// let cache: ResultCache<String, Vec<u32>> = ResultCache::new(100, Duration::from_secs(60));
///
/// assert!(cache.get(&"user@example.com".to_string()).is_none());
/// cache.put("user@example.com".to_string(), vec![1, 2, 3]);
/// assert_eq!(cache.get(&"user@example.com".to_string()), Some(vec![1, 2, 3]));
/// ```
pub struct ResultCache<K: Hash + Eq, V: Clone> {
    /// `None` when caching is disabled.
    cache: Option<Mutex<CacheState<K, V>>>,
    time_to_live: Duration,
    stats: Mutex<CacheStats>,
}

impl<K: Hash + Eq, V: Clone> ResultCache<K, V> {
    /// Creates an enabled cache with the specified capacity and TTL.
    ///
    /// A zero capacity yields a disabled cache.
    #[must_use]
    pub fn new(capacity: usize, time_to_live: Duration) -> Self {
        Self {
            cache: NonZeroUsize::new(capacity).map(|capacity| {
                Mutex::new(CacheState {
                    entries: LruCache::new(capacity),
                    generation: 0,
                })
            }),
            time_to_live,
            stats: Mutex::new(CacheStats::default()),
        }
    }

    /// Creates a cache that never stores anything.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            cache: None,
            time_to_live: Duration::ZERO,
            stats: Mutex::new(CacheStats::default()),
        }
    }

    /// Creates a cache from configuration.
    #[must_use]
    pub fn from_config(config: &CacheConfig) -> Self {
        if config.enabled {
            Self::new(config.capacity, config.time_to_live())
        } else {
            Self::disabled()
        }
    }

    /// Returns `true` if the cache stores entries.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.cache.is_some()
    }

    /// Gets a cached value if it exists and is not expired.
    ///
    /// Expired entries are removed and reported as misses.
    ///
    /// # Panics
    ///
    /// Panics if an internal mutex is poisoned. This should only happen if a
    /// thread panicked while holding the lock, which indicates a programming error.
    pub fn get(&self, key: &K) -> Option<V> {
        let found = self.cache.as_ref().and_then(|cache| {
            let mut state = cache.lock().expect("cache mutex poisoned");
            let fresh = state.entries.get(key).map(|entry| {
                (entry.cached_at.elapsed() < self.time_to_live).then(|| entry.value.clone())
            });
            match fresh {
                Some(Some(value)) => Some(value),
                Some(None) => {
                    tracing::debug!("Task cache entry expired");
                    state.entries.pop(key);
                    None
                }
                None => None,
            }
        });

        let mut stats = self.stats.lock().expect("stats mutex poisoned");
        if found.is_some() {
            stats.hits += 1;
        } else {
            stats.misses += 1;
        }
        found
    }

    /// Returns the current generation, which advances on every [`clear`](Self::clear).
    ///
    /// Read it before loading a value and hand it to
    /// [`put_if_generation`](Self::put_if_generation) afterwards.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.cache
            .as_ref()
            .map_or(0, |cache| cache.lock().expect("cache mutex poisoned").generation)
    }

    /// Stores a value, evicting the least recently used entry when full.
    ///
    /// Does nothing when the cache is disabled.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn put(&self, key: K, value: V) {
        if let Some(cache) = &self.cache {
            cache
                .lock()
                .expect("cache mutex poisoned")
                .entries
                .put(key, CachedEntry::new(value));
        }
    }

    /// Stores a value only if the cache was not cleared since `generation`.
    ///
    /// Returns `false` when the value was discarded or the cache is disabled.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn put_if_generation(&self, key: K, value: V, generation: u64) -> bool {
        let Some(cache) = &self.cache else {
            return false;
        };
        let mut state = cache.lock().expect("cache mutex poisoned");
        if state.generation != generation {
            return false;
        }
        state.entries.put(key, CachedEntry::new(value));
        true
    }

    /// Clears all entries and advances the generation. Statistics are kept.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn clear(&self) {
        if let Some(cache) = &self.cache {
            let mut state = cache.lock().expect("cache mutex poisoned");
            state.entries.clear();
            state.generation = state.generation.wrapping_add(1);
        }
    }

    /// Returns the current number of entries, expired ones included.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cache
            .as_ref()
            .map_or(0, |cache| cache.lock().expect("cache mutex poisoned").entries.len())
    }

    /// Returns true if the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the current cache statistics.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        *self.stats.lock().expect("stats mutex poisoned")
    }
}

impl<K: Hash + Eq, V: Clone> std::fmt::Debug for ResultCache<K, V> {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let stats = self.stats();
        formatter
            .debug_struct("ResultCache")
            .field("enabled", &self.is_enabled())
            .field("len", &self.len())
            .field("time_to_live", &self.time_to_live)
            .field("hits", &stats.hits)
            .field("misses", &stats.misses)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Tests
// =============================================================================
