//! Store contract
//!
//! Get/set of opaque byte blobs by [`CacheKey`] with a TTL. The in-process
//! engine lives in `replay-store`; a networked backend only needs to
//! implement this trait.
//!
//! Outcomes:
//! - `get` → payload, [`Error::NotFound`](crate::Error::NotFound) (a miss), or a fault
//! - `set` → `()`, [`Error::EntryTooBig`](crate::Error::EntryTooBig), or a fault
//!
//! Implementations must be safe under concurrent calls and must never hand
//! out or keep a reference to a caller's buffer.

use crate::key::CacheKey;
use crate::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

#[async_trait]
pub trait Store: Send + Sync {
    /// Copy of the live payload stored under `key`
    async fn get(&self, key: CacheKey) -> Result<Vec<u8>>;

    /// Store a copy of `value` under `key` for `ttl`
    async fn set(&self, key: CacheKey, value: &[u8], ttl: Duration) -> Result<()>;
}

#[async_trait]
impl<S: Store + ?Sized> Store for Arc<S> {
    async fn get(&self, key: CacheKey) -> Result<Vec<u8>> {
        (**self).get(key).await
    }

    async fn set(&self, key: CacheKey, value: &[u8], ttl: Duration) -> Result<()> {
        (**self).set(key, value, ttl).await
    }
}
