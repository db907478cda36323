//! Normalising handler return values.
//!
//! Handlers return one of two shapes:
//!
//! ```text
//! Result<T, E>              → (incoming context, payload, error)
//! (Context, Result<T, E>)   → (returned context, payload, error)
//! ```
//!
//! [`Outcome`] turns either into an [`Invocation`], the uniform triple the
//! wiring layer consumes.

use std::any::Any;
use std::fmt;

use serde::Serialize;

use crate::context::Context;
use crate::error::{BoxError, InvokeError};

// ── Reply ─────────────────────────────────────────────────────────────────────

/// A type-erased response payload.
///
/// Implemented for every `Serialize + Send + 'static` type. The wiring layer
/// encodes it with [`Reply::to_json`]; tests inspect it with
/// [`downcast_ref`](trait.Reply.html#method.downcast_ref).
pub trait Reply: Any + Send {
    fn to_json(&self) -> serde_json::Result<Vec<u8>>;

    #[doc(hidden)]
    fn as_any(&self) -> &dyn Any;
}

impl<T: Serialize + Send + 'static> Reply for T {
    fn to_json(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl dyn Reply {
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

impl fmt::Debug for dyn Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Reply")
    }
}

// ── Invocation ────────────────────────────────────────────────────────────────

/// The result of one adapter call: `(context, payload, error)`.
#[derive(Debug)]
pub struct Invocation {
    context: Context,
    payload: Option<Box<dyn Reply>>,
    error: Option<InvokeError>,
}

impl Invocation {
    pub(crate) fn new(
        context: Context,
        payload: Option<Box<dyn Reply>>,
        error: Option<InvokeError>,
    ) -> Self {
        Self { context, payload, error }
    }

    /// The call never reached the handler.
    pub(crate) fn aborted(context: Context, error: impl Into<InvokeError>) -> Self {
        Self::new(context, None, Some(error.into()))
    }

    pub fn context(&self) -> &Context { &self.context }
    pub fn payload(&self) -> Option<&dyn Reply> { self.payload.as_deref() }
    pub fn error(&self) -> Option<&InvokeError> { self.error.as_ref() }

    pub fn into_parts(self) -> (Context, Option<Box<dyn Reply>>, Option<InvokeError>) {
        (self.context, self.payload, self.error)
    }
}

// ── Outcome ───────────────────────────────────────────────────────────────────

/// The declared return shape of a handler.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReturnShape {
    /// `(payload, error)`
    Plain,
    /// `(context, payload, error)`
    WithContext,
    /// Anything else; `values` is how many values the handler yields.
    Unsupported { values: usize },
}

/// A handler return type.
pub trait Outcome: Send + 'static {
    fn shape() -> ReturnShape;

    fn normalize(self, incoming: Context) -> Invocation;
}

impl<T, E> Outcome for Result<T, E>
where
    T: Serialize + Send + 'static,
    E: Into<BoxError> + Send + 'static,
{
    fn shape() -> ReturnShape {
        ReturnShape::Plain
    }

    fn normalize(self, incoming: Context) -> Invocation {
        split(incoming, self)
    }
}

impl<T, E> Outcome for (Context, Result<T, E>)
where
    T: Serialize + Send + 'static,
    E: Into<BoxError> + Send + 'static,
{
    fn shape() -> ReturnShape {
        ReturnShape::WithContext
    }

    fn normalize(self, _incoming: Context) -> Invocation {
        let (context, result) = self;
        split(context, result)
    }
}

/// A handler that returns nothing. Accepted by the type system so that
/// registration can reject it with a clear error instead of a trait-bound
/// failure.
impl Outcome for () {
    fn shape() -> ReturnShape {
        ReturnShape::Unsupported { values: 0 }
    }

    // Never called: `classify` fails before such a handler is wrapped.
    fn normalize(self, _incoming: Context) -> Invocation {
        unreachable!("handlers returning nothing are rejected at registration")
    }
}

fn split<T, E>(context: Context, result: Result<T, E>) -> Invocation
where
    T: Serialize + Send + 'static,
    E: Into<BoxError>,
{
    match result {
        Ok(payload) => {
            let payload: Box<dyn Reply> = Box::new(payload);
            Invocation::new(context, Some(payload), None)
        }
        Err(e) => Invocation::new(context, None, Some(InvokeError::Handler(e.into()))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Tenant(&'static str);

    #[test]
    fn plain_result_keeps_incoming_context() {
        let incoming = Context::new().with_value(Tenant("a"));
        let inv = Ok::<_, std::io::Error>(5u32).normalize(incoming);

        assert_eq!(inv.context().value::<Tenant>(), Some(&Tenant("a")));
        assert_eq!(inv.payload().and_then(|p| p.downcast_ref::<u32>()), Some(&5));
        assert!(inv.error().is_none());
    }

    #[test]
    fn returned_context_replaces_incoming() {
        let incoming = Context::new().with_value(Tenant("a"));
        let returned = Context::new().with_value(Tenant("b"));
        let inv = (returned, Ok::<_, std::io::Error>("done")).normalize(incoming);

        assert_eq!(inv.context().value::<Tenant>(), Some(&Tenant("b")));
        assert_eq!(inv.payload().unwrap().to_json().unwrap(), br#""done""#);
    }

    #[test]
    fn error_is_carried_verbatim() {
        let err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such order");
        let inv = Err::<u32, _>(err).normalize(Context::new());

        assert!(inv.payload().is_none());
        let e = inv.error().unwrap();
        assert!(!e.is_client_error());
        let io = e.handler_error().unwrap().downcast_ref::<std::io::Error>().unwrap();
        assert_eq!(io.kind(), std::io::ErrorKind::NotFound);
    }

    #[test]
    fn shapes() {
        assert_eq!(<Result<u8, std::io::Error>>::shape(), ReturnShape::Plain);
        assert_eq!(<(Context, Result<u8, std::io::Error>)>::shape(), ReturnShape::WithContext);
        assert_eq!(<()>::shape(), ReturnShape::Unsupported { values: 0 });
    }
}
