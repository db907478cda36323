//! Invocation strategies.
//!
//! Three executors share one contract:
//! `invoke(target, context, sink, request) -> Invocation`.
//! Which one an adapter uses is decided from its descriptor at registration.
//!
//! | Strategy | Signature | Per-call work |
//! |---|---|---|
//! | [`Plain`](Strategy::Plain) | only `Context` params, or none | no body I/O, no decoding |
//! | [`Unary`](Strategy::Unary) | exactly one `Payload<T>` | read body, decode once |
//! | [`General`](Strategy::General) | any mix | read body if needed, resolve each slot |
//!
//! Every call resolves a brand-new argument tuple. Nothing produced for one
//! request is kept for the next.

use std::fmt;

use bytes::Bytes;

use crate::classify::HandlerDescriptor;
use crate::context::Context;
use crate::error::PayloadDecodeError;
use crate::handler::{BoxFuture, Target};
use crate::outcome::Invocation;
use crate::params::{ParamKind, Slots};
use crate::request::Request;
use crate::sink::ResponseSink;

/// The execution path an adapter takes on every call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strategy {
    Plain,
    Unary,
    General { reads_body: bool },
}

impl Strategy {
    pub fn for_descriptor(descriptor: &HandlerDescriptor) -> Self {
        let params = descriptor.params();
        if params.iter().all(|p| *p == ParamKind::Context) {
            Self::Plain
        } else if params.len() == 1 && params[0].is_payload() {
            Self::Unary
        } else {
            Self::General { reads_body: descriptor.payload().is_some() }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::Unary => "unary",
            Self::General { .. } => "general",
        }
    }

    pub(crate) async fn invoke(
        &self,
        target: &dyn Target,
        ctx: Context,
        sink: &ResponseSink,
        req: &mut Request,
    ) -> Invocation {
        match *self {
            Self::Plain => plain(target, ctx, sink, req).await,
            Self::Unary => unary(target, ctx, sink, req).await,
            Self::General { reads_body } => general(target, ctx, sink, req, reads_body).await,
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Context-only handlers. The request body is left untouched.
async fn plain(
    target: &dyn Target,
    ctx: Context,
    sink: &ResponseSink,
    req: &mut Request,
) -> Invocation {
    let started = start(target, &ctx, sink, req, None);
    finish(ctx, started).await
}

/// A single payload parameter: read, decode, call.
async fn unary(
    target: &dyn Target,
    ctx: Context,
    sink: &ResponseSink,
    req: &mut Request,
) -> Invocation {
    general(target, ctx, sink, req, true).await
}

/// Any mix of ambient, context and payload parameters, resolved in declared
/// order. The body is only read when a payload is declared.
async fn general(
    target: &dyn Target,
    ctx: Context,
    sink: &ResponseSink,
    req: &mut Request,
    reads_body: bool,
) -> Invocation {
    let body = if reads_body {
        match req.read_body().await {
            Ok(body) => Some(body),
            Err(e) => return Invocation::aborted(ctx, e),
        }
    } else {
        None
    };
    let started = start(target, &ctx, sink, req, body);
    finish(ctx, started).await
}

/// Resolves the arguments and starts the handler.
///
/// Synchronous on purpose: the `&Request` borrow ends here and is never held
/// across an await point.
fn start(
    target: &dyn Target,
    ctx: &Context,
    sink: &ResponseSink,
    req: &Request,
    body: Option<Bytes>,
) -> Result<BoxFuture, PayloadDecodeError> {
    let mut slots = Slots::new(ctx, req, sink, body);
    target.call(&mut slots)
}

async fn finish(ctx: Context, started: Result<BoxFuture, PayloadDecodeError>) -> Invocation {
    match started {
        Ok(call) => call.await,
        Err(e) => Invocation::aborted(ctx, e),
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use http::Method;
    use serde::Deserialize;

    use super::*;
    use crate::classify::classify;
    use crate::payload::Payload;

    #[derive(Deserialize)]
    #[allow(dead_code)]
    struct Order {
        id: String,
    }

    type Out = Result<(), io::Error>;

    fn strategy_of<A: crate::params::Params>() -> Strategy {
        Strategy::for_descriptor(&classify::<A, Out>().unwrap())
    }

    #[test]
    fn selection_follows_parameter_shape() {
        assert_eq!(strategy_of::<()>(), Strategy::Plain);
        assert_eq!(strategy_of::<(Context,)>(), Strategy::Plain);
        assert_eq!(strategy_of::<(Payload<Order>,)>(), Strategy::Unary);
        assert_eq!(
            strategy_of::<(Context, Payload<Order>)>(),
            Strategy::General { reads_body: true },
        );
        assert_eq!(
            strategy_of::<(Method, Context)>(),
            Strategy::General { reads_body: false },
        );
    }
}
