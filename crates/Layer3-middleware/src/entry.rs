//! Cached response entry and its byte codec
//!
//! 저장소에는 불투명한 바이트만 들어갑니다. 상태 코드, 헤더(이름별 값 목록, 순서 유지),
//! 본문을 bincode(standard config)로 직렬화합니다.

use http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use replay_foundation::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A recorded response as it lives in the store
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CachedResponse {
    pub status: u16,
    /// Header name (lowercase) → values in arrival order
    pub headers: BTreeMap<String, Vec<String>>,
    pub body: Vec<u8>,
}

impl CachedResponse {
    /// Capture a committed response.
    ///
    /// Fails with [`Error::Encode`] when a header value is not visible
    /// ASCII, since it could not be replayed byte-for-byte.
    pub fn from_parts(status: StatusCode, headers: &HeaderMap, body: Vec<u8>) -> Result<Self> {
        let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (name, value) in headers {
            let value = value
                .to_str()
                .map_err(|_| Error::encode(format!("header '{}' is not visible ASCII", name)))?;
            grouped
                .entry(name.as_str().to_string())
                .or_default()
                .push(value.to_string());
        }

        Ok(Self {
            status: status.as_u16(),
            headers: grouped,
            body,
        })
    }

    // ========================================================================
    // Codec
    // ========================================================================

    pub fn encode(&self) -> Result<Vec<u8>> {
        bincode::serde::encode_to_vec(self, bincode::config::standard()).map_err(Error::encode)
    }

    /// Inverse of [`encode`](Self::encode).
    ///
    /// Only the exact bytes `encode` would produce are accepted: trailing
    /// bytes and non-minimal varints are errors.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let (entry, read): (Self, usize) =
            bincode::serde::decode_from_slice(bytes, bincode::config::standard())
                .map_err(Error::decode)?;
        if read != bytes.len() {
            return Err(Error::decode(format!(
                "{} trailing bytes after entry",
                bytes.len() - read
            )));
        }
        if entry.encode()? != bytes {
            return Err(Error::decode("non-canonical encoding"));
        }
        Ok(entry)
    }

    // ========================================================================
    // Replay
    // ========================================================================

    pub fn status_code(&self) -> Result<StatusCode> {
        StatusCode::from_u16(self.status).map_err(Error::decode)
    }

    /// Rebuild the header map, values kept in stored order
    pub fn header_map(&self) -> Result<HeaderMap> {
        let mut map = HeaderMap::with_capacity(self.headers.len());
        for (name, values) in &self.headers {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(Error::decode)?;
            for value in values {
                let value = HeaderValue::from_str(value).map_err(Error::decode)?;
                map.append(name.clone(), value);
            }
        }
        Ok(map)
    }
}
