//! Caching interceptor
//!
//! 요청 하나의 처리 흐름:
//!
//! ```text
//! request ──► GET? && !bypass ──no──► PASSTHROUGH (next handler)
//!                 │ yes
//!                 ▼
//!            key = KeyGenerator(canonical URL)
//!                 │
//!            store.get (deadline)
//!          ┌──────┼───────────────────┐
//!          ▼      ▼                   ▼
//!         HIT   NotFound            fault / decode error
//!       replay  MISS: record,       DEGRADE: on_error,
//!               store if < 400      next handler
//! ```
//!
//! Store faults never fail the request. They go to the error callback and
//! the request is served by the wrapped handler.

use crate::config::MiddlewareConfig;
use crate::entry::CachedResponse;
use crate::recorder::ResponseRecorder;
use crate::stats::{CacheCounters, CacheStats};
use async_trait::async_trait;
use http::{HeaderMap, Method, StatusCode};
use replay_foundation::{
    replace_headers, CacheKey, CacheSettings, Error, Handler, Request, ResponseSink, Result, Store,
};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn};

/// Whether a request is eligible for caching at all
fn is_cacheable(req: &Request) -> bool {
    req.method() == Method::GET
}

/// Status codes that are recorded into the store
fn is_storable(status: StatusCode) -> bool {
    status.as_u16() < 400
}

// ============================================================================
// Middleware - 핸들러 팩토리
// ============================================================================

struct Shared<S> {
    store: S,
    config: MiddlewareConfig,
    counters: CacheCounters,
}

/// Caching middleware bound to one store and one configuration
///
/// ```rust,ignore
/// let store = Arc::new(MemoryStore::with_capacity(64 << 20)?);
/// let middleware = Middleware::new(store, MiddlewareConfig::new().with_ttl(ttl)?);
/// let handler = middleware.wrap(app);
/// ```
pub struct Middleware<S> {
    shared: Arc<Shared<S>>,
}

impl<S> Clone for Middleware<S> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<S: Store + 'static> Middleware<S> {
    pub fn new(store: S, config: MiddlewareConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                store,
                config,
                counters: CacheCounters::default(),
            }),
        }
    }

    /// Build with configuration taken from a settings file section
    pub fn from_settings(store: S, settings: &CacheSettings) -> Result<Self> {
        Ok(Self::new(store, MiddlewareConfig::from_settings(settings)?))
    }

    /// Wrap `next`. Every handler wrapped by one middleware shares its
    /// store, configuration and counters.
    pub fn wrap<H: Handler>(&self, next: H) -> CachedHandler<S, H> {
        CachedHandler {
            shared: self.shared.clone(),
            next,
        }
    }

    pub fn config(&self) -> &MiddlewareConfig {
        &self.shared.config
    }

    pub fn stats(&self) -> CacheStats {
        self.shared.counters.snapshot()
    }
}

// ============================================================================
// CachedHandler - 캐시 적용 핸들러
// ============================================================================

/// Handler produced by [`Middleware::wrap`]
pub struct CachedHandler<S, H> {
    shared: Arc<Shared<S>>,
    next: H,
}

impl<S: Store + 'static, H: Handler> CachedHandler<S, H> {
    pub fn stats(&self) -> CacheStats {
        self.shared.counters.snapshot()
    }

    /// Run a store call under the configured deadline
    async fn with_deadline<T>(&self, call: impl Future<Output = Result<T>>) -> Result<T> {
        match self.shared.config.timeout() {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| Error::Timeout(limit))?,
            None => call.await,
        }
    }

    /// Fetch and decode the entry for `key`
    async fn lookup(&self, key: CacheKey) -> Result<Replay> {
        let bytes = self.with_deadline(self.shared.store.get(key)).await?;
        let entry = CachedResponse::decode(&bytes)?;
        Ok(Replay {
            status: entry.status_code()?,
            headers: entry.header_map()?,
            body: entry.body,
        })
    }

    /// Write a stored response to the client
    async fn replay(&self, replay: Replay, sink: &mut dyn ResponseSink) {
        replace_headers(sink.headers_mut(), &replay.headers);
        sink.write_status(replay.status);
        if replay.body.is_empty() {
            return;
        }
        if let Err(e) = sink.write_body(&replay.body).await {
            self.report(Error::Io(e));
        }
    }

    /// Serve through the recorder, then store the response if eligible
    async fn record(&self, key: CacheKey, req: &Request, sink: &mut dyn ResponseSink) {
        let mut recorder = ResponseRecorder::new(sink);
        self.next.serve(req, &mut recorder).await;
        recorder.finish();

        let status = recorder.status().unwrap_or(StatusCode::OK);
        if !is_storable(status) {
            debug!(key = %key, status = status.as_u16(), "Response not cacheable");
            return;
        }

        match self.persist(key, recorder).await {
            Ok(size) => {
                self.shared.counters.stored();
                debug!(key = %key, size, "Response stored");
            }
            Err(e) => {
                self.shared.counters.store_failed();
                self.report(e);
            }
        }
    }

    async fn persist(&self, key: CacheKey, recorder: ResponseRecorder<'_>) -> Result<usize> {
        let blob = recorder.into_cached_response()?.encode()?;
        let ttl = self.shared.config.ttl();
        self.with_deadline(self.shared.store.set(key, &blob, ttl))
            .await?;
        Ok(blob.len())
    }

    fn report(&self, err: Error) {
        warn!(error = %err, "Cache error");
        self.shared.config.report(&err);
    }
}

/// Decoded entry ready to be written out
struct Replay {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

#[async_trait]
impl<S: Store + 'static, H: Handler> Handler for CachedHandler<S, H> {
    async fn serve(&self, req: &Request, sink: &mut dyn ResponseSink) {
        let config = &self.shared.config;

        if !is_cacheable(req) || config.bypasses(req) {
            debug!(method = %req.method(), uri = %req.uri(), "Cache passthrough");
            self.shared.counters.passthrough();
            self.next.serve(req, sink).await;
            return;
        }

        let key = config.key_generator().key_for(req.uri());

        match self.lookup(key).await {
            Ok(replay) => {
                debug!(key = %key, status = replay.status.as_u16(), "Cache hit");
                self.shared.counters.hit();
                self.replay(replay, sink).await;
            }
            Err(e) if e.is_miss() => {
                debug!(key = %key, uri = %req.uri(), "Cache miss");
                self.shared.counters.miss();
                self.record(key, req, sink).await;
            }
            Err(e) => {
                self.shared.counters.degraded();
                self.report(e);
                self.next.serve(req, sink).await;
            }
        }
    }
}
