//! Middleware configuration
//!
//! Each setter validates its own field, so a `MiddlewareConfig` value is
//! always usable. Defaults: 24h TTL, `X-Bypass-Cache` bypass header, no-op
//! error callback, no store deadline, FNV-1a keys.

use http::HeaderName;
use replay_foundation::{
    CacheSettings, Error, FnvKeyGenerator, KeyGenerator, Request, Result, DEFAULT_BYPASS_HEADER,
    DEFAULT_TTL,
};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Decides whether a request skips the cache entirely
pub type BypassPredicate = Arc<dyn Fn(&Request) -> bool + Send + Sync>;

/// Receives every non-fatal caching error
pub type ErrorCallback = Arc<dyn Fn(&Error) + Send + Sync>;

#[derive(Clone)]
pub struct MiddlewareConfig {
    ttl: Duration,
    bypass: BypassPredicate,
    on_error: ErrorCallback,
    timeout: Option<Duration>,
    key_generator: Arc<dyn KeyGenerator>,
}

impl Default for MiddlewareConfig {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            bypass: header_bypass(HeaderName::from_static("x-bypass-cache")),
            on_error: Arc::new(|_| {}),
            timeout: None,
            key_generator: Arc::new(FnvKeyGenerator),
        }
    }
}

impl fmt::Debug for MiddlewareConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MiddlewareConfig")
            .field("ttl", &self.ttl)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// Bypass when `name` is present with a non-empty first value
fn header_bypass(name: HeaderName) -> BypassPredicate {
    Arc::new(move |req: &Request| {
        req.headers()
            .get(&name)
            .is_some_and(|value| !value.is_empty())
    })
}

impl MiddlewareConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a settings file section
    pub fn from_settings(settings: &CacheSettings) -> Result<Self> {
        settings.validate()?;
        let mut config = Self::new()
            .with_ttl(settings.ttl())?
            .with_bypass_header(&settings.bypass_header)?;
        if let Some(timeout) = settings.timeout() {
            config = config.with_timeout(timeout)?;
        }
        Ok(config)
    }

    // ========================================================================
    // Setters
    // ========================================================================

    /// Lifetime of newly stored responses, must be > 0
    pub fn with_ttl(mut self, ttl: Duration) -> Result<Self> {
        if ttl.is_zero() {
            return Err(Error::Config("ttl must be > 0".to_string()));
        }
        self.ttl = ttl;
        Ok(self)
    }

    /// Bypass header name, must be a non-empty valid header name
    pub fn with_bypass_header(mut self, header: &str) -> Result<Self> {
        if header.is_empty() {
            return Err(Error::Config("header must not be empty".to_string()));
        }
        let name = HeaderName::from_bytes(header.as_bytes())
            .map_err(|e| Error::Config(format!("invalid bypass header '{}': {}", header, e)))?;
        self.bypass = header_bypass(name);
        Ok(self)
    }

    /// Custom bypass predicate, replaces the header check
    pub fn with_bypass<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Request) -> bool + Send + Sync + 'static,
    {
        self.bypass = Arc::new(predicate);
        self
    }

    pub fn with_on_error<F>(mut self, callback: F) -> Self
    where
        F: Fn(&Error) + Send + Sync + 'static,
    {
        self.on_error = Arc::new(callback);
        self
    }

    /// Deadline for each store call, must be > 0
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        if timeout.is_zero() {
            return Err(Error::Config("timeout must be > 0".to_string()));
        }
        self.timeout = Some(timeout);
        Ok(self)
    }

    pub fn with_key_generator(mut self, generator: impl KeyGenerator + 'static) -> Self {
        self.key_generator = Arc::new(generator);
        self
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn bypasses(&self, req: &Request) -> bool {
        (self.bypass)(req)
    }

    pub fn report(&self, err: &Error) {
        (self.on_error)(err)
    }

    pub fn key_generator(&self) -> &dyn KeyGenerator {
        self.key_generator.as_ref()
    }
}
