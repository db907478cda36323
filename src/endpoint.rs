//! Wiring an [`Adapter`] to HTTP.
//!
//! The endpoint is the layer around the core: it builds the per-request
//! inputs, invokes the adapter and turns the resulting triple into an
//! `http::Response` with a JSON body.

use std::sync::Arc;

use bytes::Bytes;
use http_body::Body;
use tracing::{debug, error, warn};

use crate::adapter::Adapter;
use crate::context::Context;
use crate::error::{BoxError, InvokeError};
use crate::request::Request;
use crate::response::{HttpResponse, encode};
use crate::sink::ResponseSink;

/// One handler, served over HTTP. Cheap to clone.
#[derive(Clone, Debug)]
pub struct Endpoint {
    adapter: Arc<Adapter>,
}

impl Endpoint {
    pub fn new(adapter: Adapter) -> Self {
        Self { adapter: Arc::new(adapter) }
    }

    pub fn adapter(&self) -> &Adapter {
        &self.adapter
    }

    /// Handles one request.
    ///
    /// The context starts as the [`Context`] found in the request extensions,
    /// if any, otherwise empty.
    pub async fn handle<B>(&self, req: http::Request<B>) -> HttpResponse
    where
        B: Body<Data = Bytes> + Send + 'static,
        B::Error: Into<BoxError>,
    {
        let ctx = req.extensions().get::<Context>().cloned().unwrap_or_default();
        let sink = ResponseSink::new();
        let mut req = Request::new(req);

        let inv = self.adapter.invoke(ctx, &sink, &mut req).await;

        match inv.error() {
            Some(e @ InvokeError::Decode(_)) => warn!(path = req.path(), "rejected request: {e}"),
            Some(e @ InvokeError::Handler(_)) => error!(path = req.path(), "handler failed: {e}"),
            None => debug!(path = req.path(), "request handled"),
        }

        encode(inv, &sink)
    }
}
