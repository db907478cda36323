//! The payload parameter and its shape probe.
//!
//! A handler receives its request body through one [`Payload<T>`] parameter.
//! Each call decodes into a freshly built `T`; nothing is reused between
//! calls.
//!
//! At registration the classifier needs to know whether `T` is a record (a
//! struct or a map) before any request arrives. serde already knows: a
//! derived `Deserialize` for a struct calls `deserialize_struct`, a map calls
//! `deserialize_map`, an integer calls `deserialize_u32`, and so on. The
//! [`ShapeProbe`] deserializer records which entry point `T` asked for and
//! halts immediately, so probing allocates nothing and reads no input.

use std::any::type_name;
use std::fmt;
use std::ops::{Deref, DerefMut};

use serde::de::{self, DeserializeOwned, Deserializer, Unexpected, Visitor};

use crate::error::PayloadDecodeError;
use crate::params::{Param, ParamKind, Slots};

/// A handler parameter decoded from the JSON request body.
///
/// ```rust
/// use nex::Payload;
/// # #[derive(serde::Deserialize)] struct CreateOrder { sku: String }
/// # #[derive(serde::Serialize)] struct Order { id: u64 }
///
/// async fn create(Payload(req): Payload<CreateOrder>) -> Result<Order, std::io::Error> {
///     # let _ = req.sku;
///     Ok(Order { id: 1 })
/// }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Payload<T>(pub T);

impl<T> Payload<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for Payload<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> DerefMut for Payload<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.0
    }
}

impl<T> Param for Payload<T>
where
    T: DeserializeOwned + Send + 'static,
{
    fn kind() -> ParamKind {
        ParamKind::Payload { type_name: type_name::<T>(), shape: probe::<T>() }
    }

    fn resolve(slots: &mut Slots<'_>) -> Result<Self, PayloadDecodeError> {
        decode(&slots.take_body()).map(Payload)
    }
}

/// Decodes a JSON object into a fresh `T`.
///
/// Derived struct visitors also accept a JSON array and fill fields by
/// position. A record's fields are named on the wire, so arrays are refused
/// before serde sees them.
fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, PayloadDecodeError> {
    let malformed = |source| PayloadDecodeError::Malformed { type_name: type_name::<T>(), source };

    let first = body.iter().find(|b| !b.is_ascii_whitespace());
    if first == Some(&b'[') && probe::<T>().is_record_like() {
        let source = <serde_json::Error as de::Error>::invalid_type(Unexpected::Seq, &"a JSON object");
        return Err(malformed(source));
    }

    serde_json::from_slice(body).map_err(malformed)
}

// ── Shape ─────────────────────────────────────────────────────────────────────

/// What a payload type deserializes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PayloadShape {
    /// A struct with named fields.
    Record {
        name: &'static str,
        fields: &'static [&'static str],
    },
    /// A map (`HashMap`, `BTreeMap`, flattened structs).
    Map,
    /// Anything else: scalars, sequences, enums, self-describing values.
    Other(&'static str),
}

impl PayloadShape {
    /// Records and maps can be decoded from a JSON object into a fresh value.
    pub fn is_record_like(&self) -> bool {
        matches!(self, Self::Record { .. } | Self::Map)
    }
}

impl fmt::Display for PayloadShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Record { name, .. } => write!(f, "record `{name}`"),
            Self::Map => f.write_str("map"),
            Self::Other(hint) => f.write_str(hint),
        }
    }
}

/// Discovers the shape `T` deserializes from without reading any input.
pub fn probe<T: DeserializeOwned>() -> PayloadShape {
    match T::deserialize(ShapeProbe) {
        Err(Halt(shape)) => shape,
        Ok(_) => PayloadShape::Other("a value built without input"),
    }
}

#[derive(Debug)]
struct Halt(PayloadShape);

impl fmt::Display for Halt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "shape probe halted at {}", self.0)
    }
}

impl std::error::Error for Halt {}

impl de::Error for Halt {
    fn custom<M: fmt::Display>(_msg: M) -> Self {
        Halt(PayloadShape::Other("a custom deserializer"))
    }
}

struct ShapeProbe;

macro_rules! halt_with {
    ($hint:literal => $($method:ident)*) => {$(
        fn $method<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value, Halt> {
            Err(Halt(PayloadShape::Other($hint)))
        }
    )*};
}

impl<'de> Deserializer<'de> for ShapeProbe {
    type Error = Halt;

    halt_with! { "a self-describing value" => deserialize_any }
    halt_with! { "a scalar" =>
        deserialize_bool deserialize_i8 deserialize_i16 deserialize_i32 deserialize_i64
        deserialize_i128 deserialize_u8 deserialize_u16 deserialize_u32 deserialize_u64
        deserialize_u128 deserialize_f32 deserialize_f64 deserialize_char deserialize_str
        deserialize_string deserialize_bytes deserialize_byte_buf deserialize_identifier
        deserialize_ignored_any
    }
    halt_with! { "an optional value" => deserialize_option }
    halt_with! { "unit" => deserialize_unit }
    halt_with! { "a sequence" => deserialize_seq }

    fn deserialize_map<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value, Halt> {
        Err(Halt(PayloadShape::Map))
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        fields: &'static [&'static str],
        _visitor: V,
    ) -> Result<V::Value, Halt> {
        Err(Halt(PayloadShape::Record { name, fields }))
    }

    /// Newtypes are transparent on the wire; look through to the inner type.
    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Halt> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_unit_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _visitor: V,
    ) -> Result<V::Value, Halt> {
        Err(Halt(PayloadShape::Other("unit")))
    }

    fn deserialize_tuple<V: Visitor<'de>>(self, _len: usize, _visitor: V) -> Result<V::Value, Halt> {
        Err(Halt(PayloadShape::Other("a tuple")))
    }

    fn deserialize_tuple_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _len: usize,
        _visitor: V,
    ) -> Result<V::Value, Halt> {
        Err(Halt(PayloadShape::Other("a tuple")))
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        _visitor: V,
    ) -> Result<V::Value, Halt> {
        Err(Halt(PayloadShape::Other("an enum")))
    }
}
