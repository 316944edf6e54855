//! Error types for Replay
//!
//! 캐시 계층의 모든 에러를 중앙에서 관리합니다. `NotFound`는 정상적인 캐시 미스이고,
//! 나머지는 요청을 실패시키지 않고 우회(degrade)해야 하는 장애입니다.

use std::time::Duration;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Replay 에러 타입
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // 설정 관련
    // ========================================================================
    #[error("Configuration error: {0}")]
    Config(String),

    // ========================================================================
    // 저장소 관련
    // ========================================================================
    /// No live entry for the key. A cache miss, not a fault.
    #[error("not found")]
    NotFound,

    #[error("entry exceeds capacity: {size} bytes > {capacity} bytes")]
    EntryTooBig { size: usize, capacity: usize },

    #[error("store call timed out after {0:?}")]
    Timeout(Duration),

    #[error("Store error: {0}")]
    Store(String),

    // ========================================================================
    // 직렬화 관련
    // ========================================================================
    #[error("failed to encode cached response: {0}")]
    Encode(String),

    #[error("failed to decode cached response: {0}")]
    Decode(String),

    // ========================================================================
    // 외부 에러 변환
    // ========================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// 캐시 미스인지 확인
    pub fn is_miss(&self) -> bool {
        matches!(self, Error::NotFound)
    }

    /// Store 에러 생성 헬퍼
    pub fn store(message: impl Into<String>) -> Self {
        Error::Store(message.into())
    }

    /// Encode 에러 생성 헬퍼
    pub fn encode(message: impl ToString) -> Self {
        Error::Encode(message.to_string())
    }

    /// Decode 에러 생성 헬퍼
    pub fn decode(message: impl ToString) -> Self {
        Error::Decode(message.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_is_a_miss() {
        assert!(Error::NotFound.is_miss());
    }

    #[test]
    fn test_faults_are_not_misses() {
        assert!(!Error::Timeout(Duration::from_millis(5)).is_miss());
        assert!(!Error::store("connection refused").is_miss());
        assert!(!Error::decode("unexpected end").is_miss());
        assert!(!Error::EntryTooBig {
            size: 11,
            capacity: 10
        }
        .is_miss());
    }

    #[test]
    fn test_display() {
        let err = Error::EntryTooBig {
            size: 11,
            capacity: 10,
        };
        assert_eq!(
            err.to_string(),
            "entry exceeds capacity: 11 bytes > 10 bytes"
        );
        assert_eq!(Error::NotFound.to_string(), "not found");
    }
}
