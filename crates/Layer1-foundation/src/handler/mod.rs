//! Request/response contracts
//!
//! The transport is external. A server adapter turns its request into a
//! [`Request`], hands a [`ResponseSink`] over its connection to a
//! [`Handler`], and handlers chain by wrapping one another.

mod sink;

pub use sink::BufferedSink;

use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use std::io;
use std::sync::Arc;

/// Inbound request (method, URI, headers, body)
pub type Request = http::Request<Bytes>;

// ============================================================================
// ResponseSink - 응답 출력
// ============================================================================

/// Writable response: headers, a one-shot status line, then a body stream
///
/// Implementations commit the status on the first `write_status` call and
/// ignore later ones. A body write before any status commits `200 OK`.
/// Headers must be final when the status is committed.
#[async_trait]
pub trait ResponseSink: Send {
    /// Headers to send with the status line
    fn headers_mut(&mut self) -> &mut HeaderMap;

    /// Commit the status code (first call wins)
    fn write_status(&mut self, status: StatusCode);

    /// Write one body chunk
    async fn write_body(&mut self, chunk: &[u8]) -> io::Result<()>;
}

// ============================================================================
// Handler - 요청 처리
// ============================================================================

/// Serves a request into a sink
#[async_trait]
pub trait Handler: Send + Sync {
    async fn serve(&self, req: &Request, sink: &mut dyn ResponseSink);
}

#[async_trait]
impl<H: Handler + ?Sized> Handler for Arc<H> {
    async fn serve(&self, req: &Request, sink: &mut dyn ResponseSink) {
        (**self).serve(req, sink).await
    }
}

#[async_trait]
impl<H: Handler + ?Sized> Handler for Box<H> {
    async fn serve(&self, req: &Request, sink: &mut dyn ResponseSink) {
        (**self).serve(req, sink).await
    }
}

/// Copy `src` into `dst`, replacing every name present in `src`
///
/// Values of one name keep their order.
pub fn replace_headers(dst: &mut HeaderMap, src: &HeaderMap) {
    for name in src.keys() {
        dst.remove(name);
        for value in src.get_all(name) {
            dst.append(name.clone(), value.clone());
        }
    }
}
