//! Byte-bounded LRU store
//!
//! All state sits behind one exclusive lock. Reads take it too, since a hit
//! moves the key to the head of the recency list.
//!
//! Expiry is lazy: an expired entry answers `NotFound`, keeps its bytes and
//! its recency position, and is reclaimed only by eviction or by a new
//! write to the same key.

use super::recency::RecencyList;
use async_trait::async_trait;
use parking_lot::Mutex;
use replay_foundation::{CacheKey, CacheSettings, Error, Result, Store};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

// ============================================================================
// Config
// ============================================================================

/// Configuration for [`MemoryStore`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryStoreConfig {
    /// Maximum resident payload bytes
    pub capacity_bytes: usize,
}

impl Default for MemoryStoreConfig {
    fn default() -> Self {
        Self {
            capacity_bytes: usize::MAX,
        }
    }
}

impl MemoryStoreConfig {
    /// Config with a byte capacity, which must be greater than 1
    pub fn with_capacity(capacity_bytes: usize) -> Result<Self> {
        let config = Self { capacity_bytes };
        config.validate()?;
        Ok(config)
    }

    /// `capacity_bytes` from the settings file, unbounded when unset
    pub fn from_settings(settings: &CacheSettings) -> Result<Self> {
        match settings.capacity_bytes {
            Some(capacity) => Self::with_capacity(capacity),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.capacity_bytes <= 1 {
            return Err(Error::Config(format!(
                "capacity must be greater than 1, got {}",
                self.capacity_bytes
            )));
        }
        Ok(())
    }
}

// ============================================================================
// State
// ============================================================================

#[derive(Debug)]
struct Entry {
    data: Vec<u8>,
    /// `None` when `now + ttl` is not representable
    expires_at: Option<Instant>,
    slot: usize,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

#[derive(Debug)]
struct StoreState {
    entries: HashMap<CacheKey, Entry>,
    recency: RecencyList,
    resident_bytes: usize,
    capacity_bytes: usize,
    evictions: u64,
}

impl StoreState {
    fn new(capacity_bytes: usize) -> Self {
        Self {
            entries: HashMap::new(),
            recency: RecencyList::new(),
            resident_bytes: 0,
            capacity_bytes,
            evictions: 0,
        }
    }

    fn free_bytes(&self) -> usize {
        self.capacity_bytes - self.resident_bytes
    }

    fn get(&mut self, key: CacheKey, now: Instant) -> Result<Vec<u8>> {
        let entry = self.entries.get(&key).ok_or(Error::NotFound)?;
        if entry.is_expired(now) {
            return Err(Error::NotFound);
        }
        let data = entry.data.clone();
        self.recency.move_to_front(entry.slot);
        Ok(data)
    }

    fn set(&mut self, key: CacheKey, data: &[u8], ttl: Duration, now: Instant) -> Result<()> {
        let size = data.len();
        if size > self.capacity_bytes {
            return Err(Error::EntryTooBig {
                size,
                capacity: self.capacity_bytes,
            });
        }

        let existing = self.entries.get(&key).map(|e| (e.slot, e.data.len()));
        let bytes_needed = match existing {
            Some((_, old_size)) => size.saturating_sub(old_size),
            None => size,
        };

        // An overwritten key must not be chosen as its own victim
        if let Some((slot, _)) = existing {
            self.recency.detach(slot);
        }

        let free = self.free_bytes();
        if bytes_needed > free {
            self.evict(bytes_needed - free);
        }

        let expires_at = now.checked_add(ttl);
        match self.entries.get_mut(&key) {
            Some(entry) => {
                self.resident_bytes = self.resident_bytes - entry.data.len() + size;
                entry.data = data.to_vec();
                entry.expires_at = expires_at;
                self.recency.attach_front(entry.slot);
            }
            None => {
                let slot = self.recency.push_front(key);
                self.entries.insert(
                    key,
                    Entry {
                        data: data.to_vec(),
                        expires_at,
                        slot,
                    },
                );
                self.resident_bytes += size;
            }
        }
        Ok(())
    }

    /// Evict least recently used entries, one at a time, until `bytes` are freed
    ///
    /// Callers verify the demand fits in capacity first, so running out of
    /// victims means the byte accounting is broken.
    fn evict(&mut self, bytes: usize) {
        let mut freed = 0usize;
        while freed < bytes {
            let Some(victim) = self.recency.pop_back() else {
                panic!(
                    "recency list exhausted after freeing {} of {} bytes (resident {}, capacity {})",
                    freed, bytes, self.resident_bytes, self.capacity_bytes
                );
            };
            let Some(entry) = self.entries.remove(&victim) else {
                panic!("key {} in recency list has no entry", victim);
            };
            let victim_bytes = entry.data.len();
            freed += victim_bytes;
            self.resident_bytes -= victim_bytes;
            self.evictions += 1;
            trace!(key = %victim, bytes = victim_bytes, "Evicted LRU entry");
        }
        debug!(freed, requested = bytes, "Eviction burst finished");
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.recency.clear();
        self.resident_bytes = 0;
    }

    #[cfg(test)]
    fn invariants_hold(&self) -> bool {
        let sum: usize = self.entries.values().map(|e| e.data.len()).sum();
        let listed: std::collections::HashSet<CacheKey> = self.recency.keys().collect();
        sum == self.resident_bytes
            && self.resident_bytes <= self.capacity_bytes
            && self.recency.len() == self.entries.len()
            && listed.len() == self.entries.len()
            && self.entries.keys().all(|k| listed.contains(k))
    }
}

// ============================================================================
// MemoryStore
// ============================================================================

/// In-process store bounded by payload bytes, evicting least recently used
///
/// # Example
/// ```
/// use replay_foundation::CacheKey;
/// use replay_store::MemoryStore;
/// use std::time::Duration;
///
/// let store = MemoryStore::with_capacity(10).unwrap();
/// store.insert(CacheKey::new(1), b"data", Duration::from_secs(60)).unwrap();
/// assert_eq!(store.lookup(CacheKey::new(1)).unwrap(), b"data");
/// ```
#[derive(Debug)]
pub struct MemoryStore {
    state: Mutex<StoreState>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Store with an effectively unbounded capacity
    pub fn new() -> Self {
        Self::from_validated(MemoryStoreConfig::default())
    }

    /// Store holding at most `capacity_bytes` payload bytes
    pub fn with_capacity(capacity_bytes: usize) -> Result<Self> {
        MemoryStoreConfig::with_capacity(capacity_bytes).map(Self::from_validated)
    }

    pub fn with_config(config: MemoryStoreConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_validated(config))
    }

    fn from_validated(config: MemoryStoreConfig) -> Self {
        Self {
            state: Mutex::new(StoreState::new(config.capacity_bytes)),
        }
    }

    /// Copy of the live payload for `key`; a hit becomes most recently used
    pub fn lookup(&self, key: CacheKey) -> Result<Vec<u8>> {
        self.state.lock().get(key, Instant::now())
    }

    /// Store a copy of `data`, evicting LRU entries as needed
    ///
    /// A zero `ttl` stores an entry that is already expired on the next read.
    pub fn insert(&self, key: CacheKey, data: &[u8], ttl: Duration) -> Result<()> {
        self.state.lock().set(key, data, ttl, Instant::now())
    }

    /// Whether a live entry exists, without touching recency
    pub fn contains(&self, key: CacheKey) -> bool {
        let state = self.state.lock();
        state
            .entries
            .get(&key)
            .is_some_and(|e| !e.is_expired(Instant::now()))
    }

    /// Number of resident entries, expired ones included
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().entries.is_empty()
    }

    /// Payload bytes currently held, expired entries included
    pub fn resident_bytes(&self) -> usize {
        self.state.lock().resident_bytes
    }

    pub fn capacity_bytes(&self) -> usize {
        self.state.lock().capacity_bytes
    }

    /// Drop every entry
    pub fn clear(&self) {
        self.state.lock().clear();
    }

    pub fn stats(&self) -> MemoryStoreStats {
        let state = self.state.lock();
        let utilization = if state.capacity_bytes == usize::MAX {
            0.0
        } else {
            state.resident_bytes as f64 / state.capacity_bytes as f64
        };
        MemoryStoreStats {
            entries: state.entries.len(),
            resident_bytes: state.resident_bytes,
            capacity_bytes: state.capacity_bytes,
            evictions: state.evictions,
            utilization,
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get(&self, key: CacheKey) -> Result<Vec<u8>> {
        self.lookup(key)
    }

    async fn set(&self, key: CacheKey, value: &[u8], ttl: Duration) -> Result<()> {
        self.insert(key, value, ttl)
    }
}

/// Store statistics
#[derive(Debug, Clone)]
pub struct MemoryStoreStats {
    pub entries: usize,
    pub resident_bytes: usize,
    pub capacity_bytes: usize,
    /// Entries evicted under capacity pressure since creation
    pub evictions: u64,
    /// Resident / capacity (0.0 - 1.0, or 0 if unbounded)
    pub utilization: f64,
}
