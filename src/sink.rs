//! Per-request response handle.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use http::header::{HeaderName, HeaderValue};
use http::{HeaderMap, StatusCode};

/// Response-side handle handed to each request.
///
/// Handlers that take a `ResponseSink` parameter can set the status or add
/// headers; the [`Endpoint`](crate::Endpoint) applies them when it builds the
/// response. Clones share the same state. A sink is created per request and
/// never outlives it.
#[derive(Clone, Debug, Default)]
pub struct ResponseSink {
    inner: Arc<Mutex<SinkState>>,
}

#[derive(Debug, Default)]
struct SinkState {
    status: Option<StatusCode>,
    headers: HeaderMap,
}

impl ResponseSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the success status (default `200 OK`).
    pub fn set_status(&self, status: StatusCode) {
        self.state().status = Some(status);
    }

    pub fn insert_header(&self, name: HeaderName, value: HeaderValue) {
        self.state().headers.insert(name, value);
    }

    pub fn status(&self) -> Option<StatusCode> {
        self.state().status
    }

    pub fn headers(&self) -> HeaderMap {
        self.state().headers.clone()
    }

    fn state(&self) -> MutexGuard<'_, SinkState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_state() {
        let sink = ResponseSink::new();
        let handle = sink.clone();

        handle.set_status(StatusCode::CREATED);
        handle.insert_header(
            HeaderName::from_static("location"),
            HeaderValue::from_static("/orders/9"),
        );

        assert_eq!(sink.status(), Some(StatusCode::CREATED));
        assert_eq!(sink.headers()["location"], "/orders/9");
    }
}
