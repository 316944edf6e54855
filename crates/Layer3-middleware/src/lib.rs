//! # replay-middleware
//!
//! Response replay middleware for Replay.
//!
//! - [`Middleware`]: 저장소와 설정을 묶고 핸들러를 감쌉니다
//! - [`CachedHandler`]: HIT / MISS / DEGRADE / PASSTHROUGH 상태 머신
//! - [`ResponseRecorder`]: 응답을 전달하면서 기록하는 tee
//! - [`CachedResponse`]: 저장소에 들어가는 응답 엔트리와 코덱
//! - [`MiddlewareConfig`]: TTL, 우회 조건, 에러 콜백, 타임아웃, 키 생성기
//!
//! ```rust,ignore
//! use replay_middleware::{Middleware, MiddlewareConfig};
//! use replay_store::MemoryStore;
//! use std::sync::Arc;
//!
//! let store = Arc::new(MemoryStore::with_capacity(64 << 20)?);
//! let config = MiddlewareConfig::new()
//!     .with_ttl(Duration::from_secs(300))?
//!     .with_timeout(Duration::from_millis(50))?
//!     .with_on_error(|e| tracing::warn!("cache: {}", e));
//!
//! let handler = Middleware::new(store, config).wrap(app);
//! ```

pub mod config;
pub mod entry;
pub mod interceptor;
pub mod recorder;
pub mod stats;

pub use config::{BypassPredicate, ErrorCallback, MiddlewareConfig};
pub use entry::CachedResponse;
pub use interceptor::{CachedHandler, Middleware};
pub use recorder::ResponseRecorder;
pub use stats::CacheStats;
