//! The adapter facade.
//!
//! [`register`] classifies a handler once and freezes the result into an
//! [`Adapter`]. [`Adapter::invoke`] is pure delegation to the strategy chosen
//! at that point.
//!
//! An adapter is immutable after registration. It can be shared by reference
//! or behind an `Arc` across any number of concurrent requests; each call
//! builds its own arguments and decode target, and no argument state survives
//! a call.

use std::sync::Arc;

use tracing::debug;

use crate::classify::{HandlerDescriptor, classify};
use crate::context::Context;
use crate::error::RegistrationError;
use crate::handler::{FnTarget, Handler, Target};
use crate::outcome::Invocation;
use crate::params::Params;
use crate::request::Request;
use crate::sink::ResponseSink;
use crate::strategy::Strategy;

/// A registered handler, ready to be invoked.
pub struct Adapter {
    descriptor: HandlerDescriptor,
    strategy: Strategy,
    target: Arc<dyn Target>,
}

impl Adapter {
    /// Classifies `handler` and selects its invocation strategy.
    ///
    /// Fails if the handler declares two payload types, a payload that does
    /// not decode from a record, or an unsupported return shape.
    pub fn new<H, A>(handler: H) -> Result<Self, RegistrationError>
    where
        H: Handler<A>,
        A: Params,
    {
        let descriptor = classify::<A, H::Output>()?;
        let strategy = Strategy::for_descriptor(&descriptor);

        debug!(
            handler = std::any::type_name::<H>(),
            strategy = strategy.name(),
            arity = descriptor.arity(),
            accepts_context = descriptor.accepts_context(),
            returns_context = descriptor.returns_context(),
            "handler registered"
        );

        Ok(Self {
            descriptor,
            strategy,
            target: Arc::new(FnTarget::<H, A>::new(handler)),
        })
    }

    pub fn descriptor(&self) -> &HandlerDescriptor {
        &self.descriptor
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Resolves arguments from the request, calls the handler and normalises
    /// its result.
    ///
    /// Decode failures come back as an [`Invocation`] whose error is
    /// [`InvokeError::Decode`](crate::InvokeError::Decode); the handler is not
    /// called in that case. Handler errors come back untouched.
    pub async fn invoke(&self, ctx: Context, sink: &ResponseSink, req: &mut Request) -> Invocation {
        self.strategy.invoke(self.target.as_ref(), ctx, sink, req).await
    }
}

impl std::fmt::Debug for Adapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Adapter")
            .field("descriptor", &self.descriptor)
            .field("strategy", &self.strategy)
            .finish_non_exhaustive()
    }
}

/// Registers `handler`. Shorthand for [`Adapter::new`].
///
/// ```rust
/// use nex::{Payload, register};
/// # #[derive(serde::Deserialize)] struct Ping { id: String }
/// # #[derive(serde::Serialize)] struct Pong { id: String }
///
/// async fn ping(Payload(p): Payload<Ping>) -> Result<Pong, std::io::Error> {
///     Ok(Pong { id: p.id })
/// }
///
/// let adapter = register(ping).unwrap();
/// assert_eq!(adapter.strategy().name(), "unary");
/// ```
pub fn register<H, A>(handler: H) -> Result<Adapter, RegistrationError>
where
    H: Handler<A>,
    A: Params,
{
    Adapter::new(handler)
}
