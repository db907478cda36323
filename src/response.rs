//! Turning an [`Invocation`] into an HTTP response.
//!
//! | Invocation | Status | Body |
//! |---|---|---|
//! | payload | sink status, else `200 OK` | payload as JSON |
//! | decode error | `400 Bad Request` | `{"error": "..."}` |
//! | handler error | `500 Internal Server Error` | `{"error": "..."}` |
//! | payload fails to encode | `500 Internal Server Error` | `{"error": "..."}` |
//!
//! Headers set on the [`ResponseSink`] are copied onto every response.

use bytes::Bytes;
use http::header::{CONTENT_TYPE, HeaderValue};
use http::StatusCode;
use http_body_util::Full;
use tracing::error;

use crate::error::InvokeError;
use crate::outcome::Invocation;
use crate::sink::ResponseSink;

pub type HttpResponse = http::Response<Full<Bytes>>;

pub(crate) fn encode(inv: Invocation, sink: &ResponseSink) -> HttpResponse {
    let (_ctx, payload, err) = inv.into_parts();

    let mut response = match (payload, err) {
        (_, Some(err)) => failure(&err),
        (Some(payload), None) => match payload.to_json() {
            Ok(bytes) => json(sink.status().unwrap_or(StatusCode::OK), bytes),
            Err(e) => {
                error!("payload encoding failed: {e}");
                error_body(StatusCode::INTERNAL_SERVER_ERROR, &format!("payload encoding failed: {e}"))
            }
        },
        // Every accepted return shape yields a payload or an error; handlers
        // returning nothing are rejected at registration.
        (None, None) => unreachable!("invocation carries neither payload nor error"),
    };

    response.headers_mut().extend(sink.headers());
    response
}

fn failure(err: &InvokeError) -> HttpResponse {
    let status = if err.is_client_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    error_body(status, &err.to_string())
}

fn json(status: StatusCode, body: Vec<u8>) -> HttpResponse {
    let mut response = empty(status);
    *response.body_mut() = Full::new(Bytes::from(body));
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}

fn error_body(status: StatusCode, message: &str) -> HttpResponse {
    let body = serde_json::json!({ "error": message }).to_string();
    json(status, body.into_bytes())
}

fn empty(status: StatusCode) -> HttpResponse {
    let mut response = http::Response::new(Full::new(Bytes::new()));
    *response.status_mut() = status;
    response
}
