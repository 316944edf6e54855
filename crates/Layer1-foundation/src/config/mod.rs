//! Config - 캐시 설정 관리
//!
//! - `settings.rs` - TOML 설정 파일 (`[cache]` 섹션)

mod settings;

pub use settings::{CacheSettings, DEFAULT_BYPASS_HEADER, DEFAULT_TTL, DEFAULT_TTL_SECS};
