//! Handler parameters.
//!
//! Every handler parameter type implements [`Param`], which answers two
//! questions:
//!
//! - at registration, *what kind of parameter is this?* ([`Param::kind`])
//! - per request, *give me a fresh value* ([`Param::resolve`])
//!
//! The first answer feeds the classifier and is computed once. The second runs
//! on every call against a [`Slots`] value holding the request inputs.
//!
//! Three families implement it:
//!
//! | Type | Kind |
//! |---|---|
//! | [`Context`] | `Context` |
//! | [`Payload<T>`](crate::Payload) | `Payload` |
//! | `Method`, `Uri`, `HeaderMap`, [`ResponseSink`], ... | `Ambient` |
//!
//! Ambient types live in the `ambient` module. Downstream crates add their own
//! ambient values by implementing `Param` with [`ParamKind::Ambient`].

use std::any::type_name;

use bytes::Bytes;

use crate::context::Context;
use crate::error::PayloadDecodeError;
use crate::payload::PayloadShape;
use crate::request::Request;
use crate::sink::ResponseSink;

/// Classification of one handler parameter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParamKind {
    /// Derived from the request head or the response sink.
    Ambient { type_name: &'static str },
    /// The request-scoped [`Context`].
    Context,
    /// Decoded from the request body.
    Payload {
        type_name: &'static str,
        shape: PayloadShape,
    },
}

impl ParamKind {
    pub fn ambient<T>() -> Self {
        Self::Ambient { type_name: type_name::<T>() }
    }

    pub fn is_payload(&self) -> bool {
        matches!(self, Self::Payload { .. })
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Ambient { type_name } | Self::Payload { type_name, .. } => type_name,
            Self::Context => type_name::<Context>(),
        }
    }
}

/// The inputs a strategy gathered for one call.
///
/// `body` is only present when the strategy acquired the request body, which
/// it does exactly when the handler declares a payload.
pub struct Slots<'a> {
    context: &'a Context,
    request: &'a Request,
    sink: &'a ResponseSink,
    body: Option<Bytes>,
}

impl<'a> Slots<'a> {
    pub(crate) fn new(
        context: &'a Context,
        request: &'a Request,
        sink: &'a ResponseSink,
        body: Option<Bytes>,
    ) -> Self {
        Self { context, request, sink, body }
    }

    pub fn context(&self) -> &Context { self.context }
    pub fn request(&self) -> &Request { self.request }
    pub fn sink(&self) -> &ResponseSink { self.sink }

    /// Takes the acquired body. Later calls, and calls on a strategy that
    /// acquired nothing, get empty bytes.
    pub fn take_body(&mut self) -> Bytes {
        self.body.take().unwrap_or_default()
    }
}

/// A type that can appear in a handler's parameter list.
pub trait Param: Sized + Send + 'static {
    fn kind() -> ParamKind;

    fn resolve(slots: &mut Slots<'_>) -> Result<Self, PayloadDecodeError>;
}

impl Param for Context {
    fn kind() -> ParamKind {
        ParamKind::Context
    }

    fn resolve(slots: &mut Slots<'_>) -> Result<Self, PayloadDecodeError> {
        Ok(slots.context().clone())
    }
}

/// An ordered parameter list: implemented for tuples of [`Param`]s.
pub trait Params: Sized + Send + 'static {
    fn kinds() -> Vec<ParamKind>;

    /// Resolves every parameter in declared order, stopping at the first
    /// failure.
    fn resolve(slots: &mut Slots<'_>) -> Result<Self, PayloadDecodeError>;
}

macro_rules! impl_params {
    ($($ty:ident),*) => {
        impl<$($ty: Param,)*> Params for ($($ty,)*) {
            fn kinds() -> Vec<ParamKind> {
                vec![$($ty::kind()),*]
            }

            #[allow(non_snake_case, unused_variables)]
            fn resolve(slots: &mut Slots<'_>) -> Result<Self, PayloadDecodeError> {
                $(let $ty = $ty::resolve(slots)?;)*
                Ok(($($ty,)*))
            }
        }
    };
}

impl_params!();
impl_params!(A);
impl_params!(A, B);
impl_params!(A, B, C);
impl_params!(A, B, C, D);
impl_params!(A, B, C, D, E);
impl_params!(A, B, C, D, E, F);
impl_params!(A, B, C, D, E, F, G);
impl_params!(A, B, C, D, E, F, G, H);
impl_params!(A, B, C, D, E, F, G, H, I);
impl_params!(A, B, C, D, E, F, G, H, I, J);
impl_params!(A, B, C, D, E, F, G, H, I, J, K);
impl_params!(A, B, C, D, E, F, G, H, I, J, K, L);
