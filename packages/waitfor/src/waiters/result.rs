//! The `result` waiter: unwraps nested asynchronous shapes down to a plain value.

use super::{Exhaust, Promise, Stream};
use crate::{
    error::Result,
    registry::{Registry, Waiter},
    value::Value,
};

/// The asynchronous shapes `result` knows how to unwrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// A [`Deferred`](crate::Deferred), unwrapped by the `promise` waiter.
    Deferred,
    /// A [`Generator`](crate::Generator) or [`GeneratorFn`](crate::GeneratorFn), unwrapped by
    /// the `generator` waiter.
    Generator,
    /// A [`ReadableStream`](crate::ReadableStream), unwrapped by the `stream` waiter.
    Stream,
    /// Anything else. Returned as is.
    Plain,
}

impl Shape {
    /// Classifies `value`.
    #[must_use]
    pub const fn classify(value: &Value) -> Self {
        match value {
            Value::Deferred(_) => Self::Deferred,
            Value::Generator(_) | Value::GeneratorFn(_) => Self::Generator,
            Value::Stream(_) => Self::Stream,
            _ => Self::Plain,
        }
    }

    /// Name of the waiter that unwraps this shape by one level.
    #[must_use]
    pub const fn waiter(self) -> Option<&'static str> {
        match self {
            Self::Deferred => Some(Promise::NAME),
            Self::Generator => Some(Exhaust::NAME),
            Self::Stream => Some(Stream::NAME),
            Self::Plain => None,
        }
    }
}

/// `result(value)`: repeatedly unwraps `value` through the matching waiter until it is
/// [`Shape::Plain`].
///
/// Each level is delegated by name, so replacing `promise`, `generator` or `stream` in the
/// registry changes how `result` unwraps that shape.
#[derive(Debug, Clone, Copy, Default)]
pub struct Normalize;

impl Normalize {
    /// The registered name.
    pub const NAME: &'static str = "result";
}

impl Waiter for Normalize {
    fn wait(&self, registry: &Registry, args: Vec<Value>) -> Result {
        let mut value = args.into_iter().next().unwrap_or_default();

        while let Some(waiter) = Shape::classify(&value).waiter() {
            log::trace!("unwrapping {} through `{waiter}`", value.kind());
            value = registry.call(waiter, vec![value])?;
        }

        Ok(value)
    }

    fn name(&self) -> Option<&str> {
        Some(Self::NAME)
    }
}
