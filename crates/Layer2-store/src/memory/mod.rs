//! In-process store
//!
//! - `MemoryStore`: byte-bounded LRU store with lazy TTL expiry
//! - `RecencyList`: arena-backed recency list used by the store

mod recency;
mod store;

pub use store::{MemoryStore, MemoryStoreConfig, MemoryStoreStats};
