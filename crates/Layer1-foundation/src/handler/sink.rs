//! In-memory response sink

use super::ResponseSink;
use async_trait::async_trait;
use http::{HeaderMap, StatusCode};
use std::io;

/// Response sink that keeps everything in memory
///
/// Behaves like a connection: the status is one-shot, and the headers seen
/// by [`BufferedSink::headers`] after commit are the ones sent with the
/// status line. Adapters use it to collect a full response; tests use it as
/// the client side.
#[derive(Debug, Default)]
pub struct BufferedSink {
    status: Option<StatusCode>,
    headers: HeaderMap,
    sent_headers: Option<HeaderMap>,
    body: Vec<u8>,
}

impl BufferedSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Committed status, if any
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    /// Headers sent with the status, or the pending headers before commit
    pub fn headers(&self) -> &HeaderMap {
        self.sent_headers.as_ref().unwrap_or(&self.headers)
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn is_committed(&self) -> bool {
        self.status.is_some()
    }

    /// Split into `(status, headers, body)`; an uncommitted sink reports `200 OK`
    pub fn into_parts(self) -> (StatusCode, HeaderMap, Vec<u8>) {
        let status = self.status.unwrap_or(StatusCode::OK);
        let headers = self.sent_headers.unwrap_or(self.headers);
        (status, headers, self.body)
    }
}

#[async_trait]
impl ResponseSink for BufferedSink {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    fn write_status(&mut self, status: StatusCode) {
        if self.status.is_some() {
            return;
        }
        self.status = Some(status);
        self.sent_headers = Some(self.headers.clone());
    }

    async fn write_body(&mut self, chunk: &[u8]) -> io::Result<()> {
        if self.status.is_none() {
            self.write_status(StatusCode::OK);
        }
        self.body.extend_from_slice(chunk);
        Ok(())
    }
}
