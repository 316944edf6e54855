//! Cache key derivation
//!
//! A request's identity is its URL. The query string is normalized before
//! hashing so that parameter order never splits the cache:
//!
//! - values of each parameter are sorted
//! - parameter names are sorted
//! - the query is re-encoded with `application/x-www-form-urlencoded` rules
//!
//! The canonical string is hashed with FNV-1a (64-bit). Collisions are an
//! accepted risk; the cache is never a source of truth.

use http::Uri;
use percent_encoding::percent_decode;
use std::collections::BTreeMap;
use std::fmt;
use url::form_urlencoded;

const FNV_OFFSET_BASIS: u64 = 0xcbf29ce484222325;
const FNV_PRIME: u64 = 0x100000001b3;

/// 64-bit cache key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(u64);

impl CacheKey {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl From<u64> for CacheKey {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

// ============================================================================
// KeyGenerator
// ============================================================================

/// Hashes a canonical URL into a cache key
pub trait KeyGenerator: Send + Sync {
    /// Hash an already-canonical URL string
    fn generate(&self, canonical: &str) -> CacheKey;

    /// Normalize `uri` and hash it
    fn key_for(&self, uri: &Uri) -> CacheKey {
        self.generate(&canonical_url(uri))
    }
}

/// FNV-1a 64-bit key generator (default)
#[derive(Debug, Clone, Copy, Default)]
pub struct FnvKeyGenerator;

impl KeyGenerator for FnvKeyGenerator {
    fn generate(&self, canonical: &str) -> CacheKey {
        CacheKey(fnv1a_64(canonical.as_bytes()))
    }
}

/// FNV-1a over raw bytes
pub fn fnv1a_64(bytes: &[u8]) -> u64 {
    let mut hash = FNV_OFFSET_BASIS;
    for byte in bytes {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Canonical form of a request URL
///
/// Scheme and authority are kept when the URI carries them; the path is kept
/// verbatim. An empty query produces no trailing `?`.
pub fn canonical_url(uri: &Uri) -> String {
    let mut canonical = String::new();
    if let Some(scheme) = uri.scheme_str() {
        canonical.push_str(scheme);
        canonical.push_str("://");
    }
    if let Some(authority) = uri.authority() {
        canonical.push_str(authority.as_str());
    }
    canonical.push_str(uri.path());

    if let Some(query) = uri.query() {
        let query = canonical_query(query);
        if !query.is_empty() {
            canonical.push('?');
            canonical.push_str(&query);
        }
    }
    canonical
}

/// Sort values per name, names lexicographically, then re-encode
///
/// Names and values are compared as decoded bytes, so escapes that are not
/// valid UTF-8 stay distinct.
fn canonical_query(query: &str) -> String {
    let mut params: BTreeMap<Vec<u8>, Vec<Vec<u8>>> = BTreeMap::new();
    for pair in query.split('&').filter(|pair| !pair.is_empty()) {
        let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
        params
            .entry(decode_component(name))
            .or_default()
            .push(decode_component(value));
    }

    let mut encoded = String::with_capacity(query.len());
    for (name, values) in params.iter_mut() {
        values.sort();
        for value in values.iter() {
            if !encoded.is_empty() {
                encoded.push('&');
            }
            encoded.extend(form_urlencoded::byte_serialize(name));
            encoded.push('=');
            encoded.extend(form_urlencoded::byte_serialize(value));
        }
    }
    encoded
}

/// `+` is a space, then percent-decode to raw bytes
fn decode_component(raw: &str) -> Vec<u8> {
    let spaced: Vec<u8> = raw
        .bytes()
        .map(|b| if b == b'+' { b' ' } else { b })
        .collect();
    percent_decode(&spaced).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(uri: &str) -> CacheKey {
        FnvKeyGenerator.key_for(&uri.parse::<Uri>().unwrap())
    }

    #[test]
    fn test_fnv_known_vectors() {
        // Reference values for FNV-1a 64
        assert_eq!(fnv1a_64(b""), 0xcbf29ce484222325);
        assert_eq!(fnv1a_64(b"a"), 0xaf63dc4c8601ec8c);
        assert_eq!(fnv1a_64(b"foobar"), 0x85944171f73967e8);
    }

    #[test]
    fn test_name_order_independent() {
        assert_eq!(key("/?foo=1&bar=2"), key("/?bar=2&foo=1"));
    }

    #[test]
    fn test_value_order_independent() {
        assert_eq!(key("/items?tag=b&tag=a&x=1"), key("/items?x=1&tag=a&tag=b"));
    }

    #[test]
    fn test_path_aware() {
        assert_ne!(key("/foo"), key("/bar"));
    }

    #[test]
    fn test_value_aware() {
        assert_ne!(key("/?foo=1"), key("/?foo=2"));
        assert_ne!(key("/?foo=1"), key("/?foo=1&foo=1"));
    }

    #[test]
    fn test_canonical_form() {
        let uri: Uri = "/search?q=rust+lang&a=2&a=1".parse().unwrap();
        assert_eq!(canonical_url(&uri), "/search?a=1&a=2&q=rust+lang");
    }

    #[test]
    fn test_encoding_normalized() {
        // %20 and + decode to the same space
        assert_eq!(key("/?q=a%20b"), key("/?q=a+b"));
    }

    #[test]
    fn test_non_utf8_values_stay_distinct() {
        let ff: Uri = "/item?id=%FF".parse().unwrap();
        assert_eq!(canonical_url(&ff), "/item?id=%FF");
        assert_ne!(key("/item?id=%FF"), key("/item?id=%FE"));
        assert_ne!(key("/item?id=%80"), key("/item?id=%EF%BF%BD"));
        assert_ne!(key("/item?%FF=1"), key("/item?%FE=1"));
    }

    #[test]
    fn test_non_utf8_values_sorted_as_bytes() {
        assert_eq!(key("/?b=%FF&b=%01"), key("/?b=%01&b=%FF"));
        let uri: Uri = "/?b=%FF&b=%01".parse().unwrap();
        assert_eq!(canonical_url(&uri), "/?b=%01&b=%FF");
    }

    #[test]
    fn test_bare_names_and_empty_pairs() {
        let uri: Uri = "/?flag&&a=1".parse().unwrap();
        assert_eq!(canonical_url(&uri), "/?a=1&flag=");
        assert_eq!(key("/?flag"), key("/?flag="));
    }

    #[test]
    fn test_empty_query() {
        let uri: Uri = "/plain?".parse().unwrap();
        assert_eq!(canonical_url(&uri), "/plain");
        assert_eq!(key("/plain?"), key("/plain"));
    }

    #[test]
    fn test_absolute_uri_keeps_authority() {
        let uri: Uri = "http://example.com/a?y=1&x=2".parse().unwrap();
        assert_eq!(canonical_url(&uri), "http://example.com/a?x=2&y=1");
        assert_ne!(key("http://example.com/a"), key("http://example.org/a"));
    }

    #[test]
    fn test_display_is_fixed_width_hex() {
        assert_eq!(CacheKey::new(0xff).to_string(), "00000000000000ff");
    }
}
