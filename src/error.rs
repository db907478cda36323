//! Error types.
//!
//! Three moments can fail, and each has its own type:
//!
//! | When | Type | Recovery |
//! |---|---|---|
//! | registration | [`RegistrationError`] | fix the handler signature |
//! | per request, before the call | [`PayloadDecodeError`] | report a client-input failure |
//! | per request, inside the handler | [`InvokeError::Handler`] | whatever the handler meant |
//!
//! [`Error`] covers the server's own infrastructure failures.

use thiserror::Error;

/// A boxed, thread-safe error. Handler errors travel through the adapter in
/// this form, untouched.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Infrastructure failure: binding to a port or accepting a connection.
///
/// Request-level failures never surface here. They are carried by
/// [`Invocation`](crate::Invocation) and mapped to a status code by the
/// [`Endpoint`](crate::Endpoint).
#[derive(Debug, Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

/// The handler signature cannot be adapted. Raised by
/// [`register`](crate::register), never at request time.
#[derive(Debug, Error)]
pub enum RegistrationError {
    /// Two parameters are neither ambient values nor the context.
    #[error("handler accepts more than one payload type: `{first}` and `{second}`")]
    DuplicatePayloadType {
        first: &'static str,
        second: &'static str,
    },

    /// The payload type does not decode from a structured record.
    #[error("payload type `{type_name}` must deserialize from a record, found {found}")]
    UnsupportedPayloadShape {
        type_name: &'static str,
        found: String,
    },

    /// The handler returns something other than `Result<T, E>` or
    /// `(Context, Result<T, E>)`.
    #[error("handler returns {values} value(s); expected (payload, error) or (context, payload, error)")]
    UnsupportedReturnShape { values: usize },
}

/// The request body could not be turned into the handler's payload.
#[derive(Debug, Error)]
pub enum PayloadDecodeError {
    #[error("failed to read request body: {0}")]
    Read(#[source] BoxError),

    #[error("malformed payload for `{type_name}`: {source}")]
    Malformed {
        type_name: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// The error slot of an [`Invocation`](crate::Invocation).
#[derive(Debug, Error)]
pub enum InvokeError {
    /// Argument resolution failed; the handler was not called.
    #[error(transparent)]
    Decode(#[from] PayloadDecodeError),

    /// The handler's own error, exactly as it returned it.
    #[error(transparent)]
    Handler(BoxError),
}

impl InvokeError {
    /// `true` when the request itself was at fault.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Decode(_))
    }

    /// The handler's error, if this is one.
    pub fn handler_error(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            Self::Handler(e) => Some(e.as_ref()),
            Self::Decode(_) => None,
        }
    }
}
