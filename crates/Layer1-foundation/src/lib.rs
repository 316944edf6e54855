//! # replay-foundation
//!
//! Foundation layer for Replay:
//! - Error: 중앙 에러 타입 (`Error`, `Result`)
//! - Config: TOML 캐시 설정 (`CacheSettings`)
//! - Key: URL 정규화 + FNV-1a 캐시 키
//! - Store: 저장소 계약 (`Store` trait)
//! - Handler: 요청/응답 계약 (`Handler`, `ResponseSink`)
//!
//! ## 아키텍처
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Layer3-Middleware                                      │
//! │  └── CachedHandler (HIT / MISS / DEGRADE / PASSTHROUGH) │
//! │                     │                                   │
//! │          ┌─────────┴─────────┐                         │
//! │          ▼                   ▼                         │
//! │   KeyGenerator          Store trait                    │
//! │   (Layer1)              ├── MemoryStore (Layer2)       │
//! │                         └── remote backends (외부)      │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod handler;
pub mod key;
pub mod store;

// ============================================================================
// Error
// ============================================================================
pub use error::{Error, Result};

// ============================================================================
// Config (설정)
// ============================================================================
pub use config::{CacheSettings, DEFAULT_BYPASS_HEADER, DEFAULT_TTL, DEFAULT_TTL_SECS};

// ============================================================================
// Key (캐시 키)
// ============================================================================
pub use key::{canonical_url, fnv1a_64, CacheKey, FnvKeyGenerator, KeyGenerator};

// ============================================================================
// Store / Handler (계약)
// ============================================================================
pub use handler::{replace_headers, BufferedSink, Handler, Request, ResponseSink};
pub use store::Store;
