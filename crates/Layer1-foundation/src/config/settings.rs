//! Cache settings
//!
//! Settings are read from the `[cache]` table of a TOML document:
//!
//! ```toml
//! [cache]
//! ttl_secs = 86400
//! bypass_header = "X-Bypass-Cache"
//! timeout_ms = 250
//! capacity_bytes = 67108864
//! ```
//!
//! Every field is optional. Missing fields take the defaults below; the
//! builders in the store and middleware crates apply the same validation.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// 기본 캐시 수명 (24시간)
pub const DEFAULT_TTL_SECS: u64 = 24 * 60 * 60;

/// 기본 캐시 수명
pub const DEFAULT_TTL: Duration = Duration::from_secs(DEFAULT_TTL_SECS);

/// 캐시 우회 헤더 기본값
pub const DEFAULT_BYPASS_HEADER: &str = "X-Bypass-Cache";

// ============================================================================
// CacheSettings
// ============================================================================

/// Cache settings as written in a settings file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheSettings {
    /// Lifetime of newly stored responses (seconds)
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,

    /// Requests carrying this header with a non-empty value skip the cache
    #[serde(default = "default_bypass_header")]
    pub bypass_header: String,

    /// Deadline for each store call (milliseconds). Unset means no deadline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,

    /// Byte capacity of the in-process store. Unset means unbounded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity_bytes: Option<usize>,
}

/// TOML document wrapper, only the `[cache]` table is read
#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    #[serde(default)]
    cache: CacheSettings,
}

fn default_ttl_secs() -> u64 {
    DEFAULT_TTL_SECS
}
fn default_bypass_header() -> String {
    DEFAULT_BYPASS_HEADER.to_string()
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
            bypass_header: default_bypass_header(),
            timeout_ms: None,
            capacity_bytes: None,
        }
    }
}

impl CacheSettings {
    /// Parse the `[cache]` table of a TOML document and validate it
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: SettingsFile = toml::from_str(content)?;
        file.cache.validate()?;
        Ok(file.cache)
    }

    /// Load settings from a file. A missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(content) => {
                debug!("Loading cache settings from {}", path.display());
                Self::from_toml_str(&content).map_err(|e| match e {
                    Error::Toml(inner) => {
                        Error::Config(format!("Invalid settings in {}: {}", path.display(), inner))
                    }
                    other => other,
                })
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No settings at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(Error::Io(e)),
        }
    }

    /// Check every field independently
    pub fn validate(&self) -> Result<()> {
        if self.ttl_secs == 0 {
            return Err(Error::Config("ttl_secs must be > 0".to_string()));
        }
        if self.bypass_header.trim().is_empty() {
            return Err(Error::Config("bypass_header must not be empty".to_string()));
        }
        if self.timeout_ms == Some(0) {
            return Err(Error::Config("timeout_ms must be > 0 when set".to_string()));
        }
        if let Some(capacity) = self.capacity_bytes {
            if capacity <= 1 {
                return Err(Error::Config(format!(
                    "capacity_bytes must be greater than 1, got {}",
                    capacity
                )));
            }
        }
        Ok(())
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let settings = CacheSettings::default();
        assert_eq!(settings.ttl(), DEFAULT_TTL);
        assert_eq!(settings.bypass_header, "X-Bypass-Cache");
        assert!(settings.timeout().is_none());
        assert!(settings.capacity_bytes.is_none());
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_partial_document() {
        let settings = CacheSettings::from_toml_str(
            r#"
            [cache]
            timeout_ms = 250
            capacity_bytes = 1024
            "#,
        )
        .unwrap();
        assert_eq!(settings.ttl_secs, DEFAULT_TTL_SECS);
        assert_eq!(settings.timeout(), Some(Duration::from_millis(250)));
        assert_eq!(settings.capacity_bytes, Some(1024));
    }

    #[test]
    fn test_missing_table_uses_defaults() {
        let settings = CacheSettings::from_toml_str("[other]\nkey = 1\n").unwrap();
        assert_eq!(settings, CacheSettings::default());
    }

    #[test]
    fn test_rejects_zero_ttl() {
        let err = CacheSettings::from_toml_str("[cache]\nttl_secs = 0\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_rejects_empty_header() {
        let err = CacheSettings::from_toml_str("[cache]\nbypass_header = \"\"\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_rejects_tiny_capacity() {
        let settings = CacheSettings {
            capacity_bytes: Some(1),
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_invalid_toml() {
        let err = CacheSettings::from_toml_str("[cache\n").unwrap_err();
        assert!(matches!(err, Error::Toml(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let settings = CacheSettings::load(dir.path().join("replay.toml")).unwrap();
        assert_eq!(settings, CacheSettings::default());
    }

    #[test]
    fn test_load_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[cache]\nttl_secs = 60\nbypass_header = \"X-No-Cache\"").unwrap();

        let settings = CacheSettings::load(file.path()).unwrap();
        assert_eq!(settings.ttl(), Duration::from_secs(60));
        assert_eq!(settings.bypass_header, "X-No-Cache");
    }

    #[test]
    fn test_load_invalid_file_names_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[cache]\nttl_secs = \"soon\"").unwrap();

        let err = CacheSettings::load(file.path()).unwrap_err();
        match err {
            Error::Config(msg) => assert!(msg.contains("Invalid settings")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
