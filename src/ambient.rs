//! Ambient values: parameters read straight from the request head or the
//! response sink, with no body decoding.
//!
//! Each impl maps one type to a `(request, sink) -> value` provider. The
//! classifier only sees [`ParamKind::Ambient`]; the strategies only call
//! `resolve`.

use http::request::Parts;
use http::{HeaderMap, Method, Uri, Version};

use crate::error::PayloadDecodeError;
use crate::params::{Param, ParamKind, Slots};
use crate::sink::ResponseSink;

macro_rules! ambient {
    ($($ty:ty => |$slots:ident| $provide:expr;)*) => {$(
        impl Param for $ty {
            fn kind() -> ParamKind {
                ParamKind::ambient::<$ty>()
            }

            fn resolve($slots: &mut Slots<'_>) -> Result<Self, PayloadDecodeError> {
                Ok($provide)
            }
        }
    )*};
}

ambient! {
    Method       => |slots| slots.request().method().clone();
    Uri          => |slots| slots.request().uri().clone();
    Version      => |slots| slots.request().head().version;
    HeaderMap    => |slots| slots.request().headers().clone();
    Parts        => |slots| slots.request().head().clone();
    ResponseSink => |slots| slots.sink().clone();
}
