//! Incoming request handle.
//!
//! The head (method, uri, headers, extensions) is readable any number of
//! times. The body is a single-use stream: [`Request::read_body`] moves it out,
//! reads it to the end and drops it before returning, whether the read
//! succeeded or not. Nothing downstream ever sees a half-read stream.

use std::convert::Infallible;

use bytes::Bytes;
use http::request::Parts;
use http::{HeaderMap, Method, Uri};
use http_body::Body as HttpBody;
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Empty};

use crate::error::{BoxError, PayloadDecodeError};

type Body = UnsyncBoxBody<Bytes, BoxError>;

/// An incoming request: head plus a body stream.
pub struct Request {
    head: Parts,
    body: Body,
    consumed: bool,
}

impl Request {
    pub fn new<B>(req: http::Request<B>) -> Self
    where
        B: HttpBody<Data = Bytes> + Send + 'static,
        B::Error: Into<BoxError>,
    {
        let (head, body) = req.into_parts();
        Self {
            head,
            body: body.map_err(Into::into).boxed_unsync(),
            consumed: false,
        }
    }

    pub fn method(&self) -> &Method { &self.head.method }
    pub fn uri(&self) -> &Uri { &self.head.uri }
    pub fn path(&self) -> &str { self.head.uri.path() }
    pub fn headers(&self) -> &HeaderMap { &self.head.headers }
    pub fn head(&self) -> &Parts { &self.head }

    /// Header lookup. Names are case-insensitive; non-UTF-8 values are skipped.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.head.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn extension<T: Clone + Send + Sync + 'static>(&self) -> Option<&T> {
        self.head.extensions.get::<T>()
    }

    /// `true` once the body stream has been taken by [`read_body`](Self::read_body).
    pub fn body_consumed(&self) -> bool {
        self.consumed
    }

    /// Takes the body stream and reads it to the end.
    ///
    /// The stream is released before this returns, on success and on error.
    /// A second call yields empty bytes.
    pub async fn read_body(&mut self) -> Result<Bytes, PayloadDecodeError> {
        let body = std::mem::replace(&mut self.body, empty_body());
        self.consumed = true;
        let collected = body.collect().await.map_err(PayloadDecodeError::Read)?;
        Ok(collected.to_bytes())
    }
}

impl<B> From<http::Request<B>> for Request
where
    B: HttpBody<Data = Bytes> + Send + 'static,
    B::Error: Into<BoxError>,
{
    fn from(req: http::Request<B>) -> Self {
        Self::new(req)
    }
}

fn empty_body() -> Body {
    Empty::<Bytes>::new()
        .map_err(|never: Infallible| -> BoxError { match never {} })
        .boxed_unsync()
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::Full;

    fn post(body: &'static str) -> Request {
        http::Request::post("/orders?limit=2")
            .header("X-Trace", "abc")
            .body(Full::new(Bytes::from_static(body.as_bytes())))
            .unwrap()
            .into()
    }

    #[test]
    fn head_accessors() {
        let req = post("");
        assert_eq!(req.method(), Method::POST);
        assert_eq!(req.path(), "/orders");
        assert_eq!(req.uri().query(), Some("limit=2"));
        assert_eq!(req.header("x-trace"), Some("abc"));
        assert!(req.header("missing").is_none());
    }

    #[tokio::test]
    async fn body_is_single_use() {
        let mut req = post(r#"{"a":1}"#);
        assert!(!req.body_consumed());

        let first = req.read_body().await.unwrap();
        assert_eq!(&first[..], br#"{"a":1}"#);
        assert!(req.body_consumed());

        let second = req.read_body().await.unwrap();
        assert!(second.is_empty());
    }
}
