//! Response recorder
//!
//! 실제 응답 싱크를 감싸서 모든 쓰기를 그대로 전달하면서, 커밋된 상태 코드와
//! 헤더 스냅샷, 본문 바이트를 함께 기록합니다.

use crate::entry::CachedResponse;
use async_trait::async_trait;
use http::{HeaderMap, StatusCode};
use replay_foundation::{replace_headers, ResponseSink, Result};
use std::io;

/// Tee over a real sink
///
/// Headers staged through [`headers_mut`](ResponseSink::headers_mut) reach
/// the real sink when the status is committed, so the captured headers are
/// exactly the ones the client received. A body chunk the real sink rejects
/// is not captured.
pub struct ResponseRecorder<'a> {
    inner: &'a mut dyn ResponseSink,
    headers: HeaderMap,
    committed: Option<(StatusCode, HeaderMap)>,
    body: Vec<u8>,
}

impl<'a> ResponseRecorder<'a> {
    pub fn new(inner: &'a mut dyn ResponseSink) -> Self {
        Self {
            inner,
            headers: HeaderMap::new(),
            committed: None,
            body: Vec::new(),
        }
    }

    /// Committed status, if any
    pub fn status(&self) -> Option<StatusCode> {
        self.committed.as_ref().map(|(status, _)| *status)
    }

    /// Bytes the real sink accepted so far
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Commit `200 OK` if the handler never wrote anything
    pub fn finish(&mut self) {
        if self.committed.is_none() {
            self.write_status(StatusCode::OK);
        }
    }

    /// Captured response, committing `200 OK` first if needed
    pub fn into_cached_response(mut self) -> Result<CachedResponse> {
        self.finish();
        let (status, headers) = self
            .committed
            .take()
            .unwrap_or((StatusCode::OK, HeaderMap::new()));
        CachedResponse::from_parts(status, &headers, self.body)
    }
}

#[async_trait]
impl<'a> ResponseSink for ResponseRecorder<'a> {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    fn write_status(&mut self, status: StatusCode) {
        if self.committed.is_some() {
            return;
        }
        replace_headers(self.inner.headers_mut(), &self.headers);
        self.inner.write_status(status);
        self.committed = Some((status, self.headers.clone()));
    }

    async fn write_body(&mut self, chunk: &[u8]) -> io::Result<()> {
        if self.committed.is_none() {
            self.write_status(StatusCode::OK);
        }
        self.inner.write_body(chunk).await?;
        self.body.extend_from_slice(chunk);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header::{CONTENT_TYPE, SET_COOKIE};
    use http::HeaderValue;
    use replay_foundation::BufferedSink;

    /// Sink whose body writes always fail
    #[derive(Default)]
    struct BrokenPipe {
        headers: HeaderMap,
        status: Option<StatusCode>,
    }

    #[async_trait]
    impl ResponseSink for BrokenPipe {
        fn headers_mut(&mut self) -> &mut HeaderMap {
            &mut self.headers
        }

        fn write_status(&mut self, status: StatusCode) {
            self.status.get_or_insert(status);
        }

        async fn write_body(&mut self, _chunk: &[u8]) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "client went away"))
        }
    }

    #[tokio::test]
    async fn test_tee_forwards_everything() {
        let mut sink = BufferedSink::new();
        let mut recorder = ResponseRecorder::new(&mut sink);

        recorder
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        recorder.write_status(StatusCode::ACCEPTED);
        recorder.write_body(b"hel").await.unwrap();
        recorder.write_body(b"lo").await.unwrap();

        assert_eq!(recorder.status(), Some(StatusCode::ACCEPTED));
        assert_eq!(recorder.body(), b"hello");

        let entry = recorder.into_cached_response().unwrap();
        assert_eq!(entry.status, 202);
        assert_eq!(entry.headers["content-type"], vec!["text/plain"]);
        assert_eq!(entry.body, b"hello");

        assert_eq!(sink.status(), Some(StatusCode::ACCEPTED));
        assert_eq!(sink.headers().get(CONTENT_TYPE).unwrap(), "text/plain");
        assert_eq!(sink.body(), b"hello");
    }

    #[tokio::test]
    async fn test_first_status_wins() {
        let mut sink = BufferedSink::new();
        let mut recorder = ResponseRecorder::new(&mut sink);

        recorder.write_status(StatusCode::NOT_FOUND);
        recorder.write_status(StatusCode::OK);
        assert_eq!(recorder.status(), Some(StatusCode::NOT_FOUND));
        drop(recorder);

        assert_eq!(sink.status(), Some(StatusCode::NOT_FOUND));
    }

    #[tokio::test]
    async fn test_body_write_commits_ok() {
        let mut sink = BufferedSink::new();
        let mut recorder = ResponseRecorder::new(&mut sink);

        recorder.write_body(b"x").await.unwrap();
        assert_eq!(recorder.status(), Some(StatusCode::OK));
        drop(recorder);

        assert_eq!(sink.status(), Some(StatusCode::OK));
    }

    #[tokio::test]
    async fn test_finish_without_writes() {
        let mut sink = BufferedSink::new();
        let mut recorder = ResponseRecorder::new(&mut sink);
        assert_eq!(recorder.status(), None);

        recorder.finish();
        assert_eq!(recorder.status(), Some(StatusCode::OK));

        let entry = recorder.into_cached_response().unwrap();
        assert_eq!(entry.status, 200);
        assert!(entry.body.is_empty());
        assert!(sink.is_committed());
    }

    #[tokio::test]
    async fn test_headers_after_commit_not_captured() {
        let mut sink = BufferedSink::new();
        let mut recorder = ResponseRecorder::new(&mut sink);

        recorder
            .headers_mut()
            .append(SET_COOKIE, HeaderValue::from_static("a=1"));
        recorder.write_status(StatusCode::OK);
        recorder
            .headers_mut()
            .append(SET_COOKIE, HeaderValue::from_static("late=1"));

        let entry = recorder.into_cached_response().unwrap();
        assert_eq!(entry.headers["set-cookie"], vec!["a=1"]);
        assert_eq!(sink.headers().get_all(SET_COOKIE).iter().count(), 1);
    }

    #[tokio::test]
    async fn test_staged_headers_replace_inner() {
        let mut sink = BufferedSink::new();
        sink.headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/octet-stream"));
        sink.headers_mut()
            .insert("x-request-id", HeaderValue::from_static("abc"));

        let mut recorder = ResponseRecorder::new(&mut sink);
        recorder
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("text/html"));
        recorder.write_status(StatusCode::OK);
        drop(recorder);

        assert_eq!(sink.headers().get(CONTENT_TYPE).unwrap(), "text/html");
        assert_eq!(sink.headers().get("x-request-id").unwrap(), "abc");
    }

    #[tokio::test]
    async fn test_failed_write_not_captured() {
        let mut sink = BrokenPipe::default();
        let mut recorder = ResponseRecorder::new(&mut sink);

        let err = recorder.write_body(b"lost").await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        assert!(recorder.body().is_empty());
        assert_eq!(recorder.status(), Some(StatusCode::OK));
        drop(recorder);

        assert_eq!(sink.status, Some(StatusCode::OK));
    }
}
