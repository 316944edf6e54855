//! # replay-store
//!
//! Store layer for Replay: the in-process implementation of
//! [`replay_foundation::Store`].
//!
//! ## Design
//!
//! 1. **Byte-bounded** - capacity counts payload bytes only
//! 2. **LRU eviction** - one least recently used victim at a time, O(1) per victim
//! 3. **Lazy expiry** - no background sweeper; expired entries are reclaimed
//!    by eviction or by rewriting the key
//! 4. **No aliasing** - payloads are copied on the way in and on the way out
//!
//! ```rust,ignore
//! use replay_store::MemoryStore;
//! use std::sync::Arc;
//!
//! let store = Arc::new(MemoryStore::with_capacity(64 * 1024 * 1024)?);
//! ```

pub mod memory;

pub use memory::{MemoryStore, MemoryStoreConfig, MemoryStoreStats};
