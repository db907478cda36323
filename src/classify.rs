//! Signature classification.
//!
//! Runs once per handler, at registration. Everything the request path needs
//! to know about the signature is decided here and frozen into a
//! [`HandlerDescriptor`]; no validation happens per request.

use crate::error::RegistrationError;
use crate::outcome::{Outcome, ReturnShape};
use crate::params::{ParamKind, Params};

/// Immutable description of a registered handler's signature.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HandlerDescriptor {
    params: Vec<ParamKind>,
    accepts_context: bool,
    returns_context: bool,
}

impl HandlerDescriptor {
    /// Parameter kinds in declared order.
    pub fn params(&self) -> &[ParamKind] { &self.params }
    pub fn arity(&self) -> usize { self.params.len() }
    pub fn accepts_context(&self) -> bool { self.accepts_context }
    pub fn returns_context(&self) -> bool { self.returns_context }

    /// The payload parameter, if the handler declares one.
    pub fn payload(&self) -> Option<&ParamKind> {
        self.params.iter().find(|p| p.is_payload())
    }
}

/// Builds the descriptor for a handler taking `A` and returning `O`.
pub fn classify<A: Params, O: Outcome>() -> Result<HandlerDescriptor, RegistrationError> {
    describe(A::kinds(), O::shape())
}

fn describe(
    params: Vec<ParamKind>,
    shape: ReturnShape,
) -> Result<HandlerDescriptor, RegistrationError> {
    let mut payload: Option<&'static str> = None;

    for param in &params {
        let &ParamKind::Payload { type_name, shape: ref found } = param else {
            continue;
        };
        if let Some(first) = payload {
            return Err(RegistrationError::DuplicatePayloadType { first, second: type_name });
        }
        if !found.is_record_like() {
            return Err(RegistrationError::UnsupportedPayloadShape {
                type_name,
                found: found.to_string(),
            });
        }
        payload = Some(type_name);
    }

    let returns_context = match shape {
        ReturnShape::Plain => false,
        ReturnShape::WithContext => true,
        ReturnShape::Unsupported { values } => {
            return Err(RegistrationError::UnsupportedReturnShape { values });
        }
    };

    let accepts_context = params.iter().any(|p| *p == ParamKind::Context);

    Ok(HandlerDescriptor { params, accepts_context, returns_context })
}

#[cfg(test)]
mod tests {
    use std::io;

    use http::{HeaderMap, Method};
    use serde::Deserialize;

    use super::*;
    use crate::context::Context;
    use crate::payload::{Payload, PayloadShape};

    #[derive(Deserialize)]
    #[allow(dead_code)]
    struct Order {
        id: String,
    }

    #[derive(Deserialize)]
    #[allow(dead_code)]
    struct Refund {
        id: String,
    }

    type Plain = Result<(), io::Error>;
    type WithCtx = (Context, Result<(), io::Error>);

    #[test]
    fn mixed_signature_in_declared_order() {
        let d = classify::<(Method, Context, Payload<Order>, HeaderMap), WithCtx>().unwrap();

        assert_eq!(d.arity(), 4);
        assert!(d.accepts_context());
        assert!(d.returns_context());
        assert_eq!(d.params()[0], ParamKind::ambient::<Method>());
        assert_eq!(d.params()[1], ParamKind::Context);
        assert_eq!(d.params()[3], ParamKind::ambient::<HeaderMap>());
        assert_eq!(
            d.payload(),
            Some(&ParamKind::Payload {
                type_name: std::any::type_name::<Order>(),
                shape: PayloadShape::Record { name: "Order", fields: &["id"] },
            }),
        );
    }

    #[test]
    fn no_parameters() {
        let d = classify::<(), Plain>().unwrap();
        assert_eq!(d.arity(), 0);
        assert!(!d.accepts_context());
        assert!(!d.returns_context());
        assert!(d.payload().is_none());
    }

    #[test]
    fn two_payloads_are_rejected() {
        let err = classify::<(Payload<Order>, Method, Payload<Refund>), Plain>().unwrap_err();
        match err {
            RegistrationError::DuplicatePayloadType { first, second } => {
                assert!(first.ends_with("Order"));
                assert!(second.ends_with("Refund"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn duplicate_is_reported_before_second_shape() {
        let err = classify::<(Payload<Order>, Payload<u32>), Plain>().unwrap_err();
        assert!(matches!(err, RegistrationError::DuplicatePayloadType { .. }));
    }

    #[test]
    fn non_record_payload_is_rejected() {
        let err = classify::<(Payload<u32>,), Plain>().unwrap_err();
        match err {
            RegistrationError::UnsupportedPayloadShape { type_name, found } => {
                assert_eq!(type_name, "u32");
                assert_eq!(found, "a scalar");
            }
            other => panic!("unexpected error: {other}"),
        }

        let err = classify::<(Payload<Vec<Order>>,), Plain>().unwrap_err();
        assert!(matches!(err, RegistrationError::UnsupportedPayloadShape { .. }));
    }

    #[test]
    fn unit_return_is_rejected() {
        let err = classify::<(Context,), ()>().unwrap_err();
        assert!(matches!(err, RegistrationError::UnsupportedReturnShape { values: 0 }));
    }
}
