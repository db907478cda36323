//! Handler trait and type erasure.
//!
//! # How typed handlers are stored
//!
//! An [`Adapter`](crate::Adapter) must hold handlers whose parameter lists
//! differ in length and type, so the concrete handler is hidden behind a
//! trait object (`dyn Target`) once the signature has been classified.
//!
//! ```text
//! async fn create(Payload(o): Payload<Order>) -> Result<Receipt, E>   ← user writes this
//!        ↓ register(create)
//! Handler<(Payload<Order>,)>                  ← blanket impl, one per arity
//!        ↓
//! Arc::new(FnTarget { handler: create, .. })  ← stored as Arc<dyn Target>
//!        ↓
//! target.call(&mut slots)  at request time    ← one vtable dispatch
//!        ↓
//! <(Payload<Order>,)>::resolve(slots)?        ← fresh arguments, declared order
//!        ↓
//! Box::pin(async { create(args).await.normalize(ctx) })
//! ```

use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;

use crate::error::PayloadDecodeError;
use crate::outcome::{Invocation, Outcome};
use crate::params::{Param, Params, Slots};

/// A heap-allocated, type-erased future resolving to an [`Invocation`].
pub(crate) type BoxFuture = Pin<Box<dyn Future<Output = Invocation> + Send + 'static>>;

/// Implemented for every `async fn` usable as an endpoint.
///
/// You never implement this yourself. It is satisfied by any function or
/// closure of up to twelve [`Param`] arguments whose future resolves to an
/// [`Outcome`]:
///
/// ```text
/// async fn name(p1: P1, .., pn: Pn) -> Result<T, E>
/// async fn name(p1: P1, .., pn: Pn) -> (Context, Result<T, E>)
/// ```
///
/// The trait is **sealed**: only the blanket impls below can satisfy it.
pub trait Handler<Args>: private::Sealed<Args> + Send + Sync + 'static {
    type Output: Outcome;
    type Future: Future<Output = Self::Output> + Send + 'static;

    #[doc(hidden)]
    fn call(&self, args: Args) -> Self::Future;
}

mod private {
    pub trait Sealed<Args> {}
}

macro_rules! impl_handler {
    ($($ty:ident),*) => {
        impl<F, Fut, $($ty,)*> private::Sealed<($($ty,)*)> for F
        where
            F: Fn($($ty),*) -> Fut + Send + Sync + 'static,
            Fut: Future + Send + 'static,
            Fut::Output: Outcome,
            $($ty: Param,)*
        {
        }

        impl<F, Fut, $($ty,)*> Handler<($($ty,)*)> for F
        where
            F: Fn($($ty),*) -> Fut + Send + Sync + 'static,
            Fut: Future + Send + 'static,
            Fut::Output: Outcome,
            $($ty: Param,)*
        {
            type Output = Fut::Output;
            type Future = Fut;

            #[allow(non_snake_case)]
            fn call(&self, ($($ty,)*): ($($ty,)*)) -> Fut {
                (self)($($ty),*)
            }
        }
    };
}

impl_handler!();
impl_handler!(A);
impl_handler!(A, B);
impl_handler!(A, B, C);
impl_handler!(A, B, C, D);
impl_handler!(A, B, C, D, E);
impl_handler!(A, B, C, D, E, F1);
impl_handler!(A, B, C, D, E, F1, G);
impl_handler!(A, B, C, D, E, F1, G, H);
impl_handler!(A, B, C, D, E, F1, G, H, I);
impl_handler!(A, B, C, D, E, F1, G, H, I, J);
impl_handler!(A, B, C, D, E, F1, G, H, I, J, K);
impl_handler!(A, B, C, D, E, F1, G, H, I, J, K, L);

// ── Erased handler ────────────────────────────────────────────────────────────

/// Internal dispatch interface: resolve arguments, start the call.
///
/// Returning `Err` means the handler was never called.
pub(crate) trait Target: Send + Sync {
    fn call(&self, slots: &mut Slots<'_>) -> Result<BoxFuture, PayloadDecodeError>;
}

/// Holds a concrete handler `H` and implements [`Target`], bridging the typed
/// world to the trait-object world.
pub(crate) struct FnTarget<H, A> {
    handler: H,
    _args: PhantomData<fn() -> A>,
}

impl<H, A> FnTarget<H, A> {
    pub(crate) fn new(handler: H) -> Self {
        Self { handler, _args: PhantomData }
    }
}

impl<H, A> Target for FnTarget<H, A>
where
    H: Handler<A>,
    A: Params,
{
    fn call(&self, slots: &mut Slots<'_>) -> Result<BoxFuture, PayloadDecodeError> {
        let args = A::resolve(slots)?;
        let incoming = slots.context().clone();
        let fut = self.handler.call(args);
        Ok(Box::pin(async move { fut.await.normalize(incoming) }))
    }
}
