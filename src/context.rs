//! Request-scoped context.
//!
//! A [`Context`] is threaded into handlers that ask for it and may be replaced
//! by handlers that return one. It is immutable: [`Context::with_value`] builds
//! a new context and leaves the original untouched, so a context can be cloned
//! into as many tasks as needed without synchronisation.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

type Values = HashMap<TypeId, Arc<dyn Any + Send + Sync>>;

/// Typed, immutable key-value carrier keyed by value type.
#[derive(Clone, Default)]
pub struct Context {
    values: Arc<Values>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a new context holding `value`, replacing any previous value of
    /// the same type.
    pub fn with_value<T: Send + Sync + 'static>(&self, value: T) -> Self {
        let mut values = Values::clone(&self.values);
        values.insert(TypeId::of::<T>(), Arc::new(value));
        Self { values: Arc::new(values) }
    }

    pub fn value<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.values
            .get(&TypeId::of::<T>())
            .and_then(|v| v.downcast_ref::<T>())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context").field("values", &self.values.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct RequestId(u64);

    #[test]
    fn with_value_leaves_parent_untouched() {
        let root = Context::new();
        let child = root.with_value(RequestId(7));

        assert!(root.value::<RequestId>().is_none());
        assert_eq!(child.value::<RequestId>(), Some(&RequestId(7)));
    }

    #[test]
    fn same_type_is_replaced() {
        let ctx = Context::new().with_value(RequestId(1)).with_value(RequestId(2));
        assert_eq!(ctx.value::<RequestId>(), Some(&RequestId(2)));
        assert_eq!(ctx.len(), 1);
    }

    #[test]
    fn distinct_types_coexist() {
        let ctx = Context::new().with_value(RequestId(3)).with_value("tenant-a");
        assert_eq!(ctx.value::<RequestId>(), Some(&RequestId(3)));
        assert_eq!(ctx.value::<&'static str>(), Some(&"tenant-a"));
    }
}
