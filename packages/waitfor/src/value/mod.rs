//! Dynamically shaped values passed to and returned from waiters.
//!
//! Waiters are invoked by name with a variable list of arguments, so everything crossing the
//! registry boundary is a [`Value`]. Plain data (numbers, strings, bytes, lists) is owned. The
//! asynchronous shapes a waiter can block on, such as [`Deferred`] values, [`ReadableStream`]s,
//! [`Generator`]s and [`EventEmitter`]s, are shared handles that compare by identity.

mod deferred;
mod emitter;
mod function;
mod generator;
mod object;
mod stream;

use std::{fmt, time::SystemTime};

pub use deferred::{Deferred, Resolver};
pub use emitter::{EventEmitter, ListenerId};
pub use function::Function;
pub use generator::{Generator, GeneratorFn, GeneratorState};
pub use object::{Array, Object};
pub use stream::{Chunk, ReadableStream};

/// A value of any shape a waiter may accept or produce.
#[derive(Clone, Default)]
pub enum Value {
    /// The absence of a value.
    #[default]
    Null,
    /// A boolean.
    Bool(bool),
    /// A number. Durations are expressed in (fractional) seconds.
    Number(f64),
    /// A text string.
    String(String),
    /// Raw bytes.
    Bytes(Vec<u8>),
    /// An owned, ordered list of values.
    List(Vec<Value>),
    /// A shared sequence that can grow while someone waits on it.
    Array(Array),
    /// A shared record of named fields.
    Object(Object),
    /// A point in wall-clock time.
    Date(SystemTime),
    /// A callable.
    Function(Function),
    /// A single-resolution asynchronous result.
    Deferred(Deferred),
    /// A readable stream of chunks.
    Stream(ReadableStream),
    /// A started, resumable generator.
    Generator(Generator),
    /// A generator factory.
    GeneratorFn(GeneratorFn),
    /// A source of named events.
    Emitter(EventEmitter),
}

impl Value {
    /// Strict equality: primitives by value, lists element-wise, handles by identity.
    #[must_use]
    pub fn strict_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            #[allow(clippy::float_cmp)]
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Bytes(a), Self::Bytes(b)) => a == b,
            (Self::List(a), Self::List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(a, b)| a.strict_eq(b))
            }
            (Self::Date(a), Self::Date(b)) => a == b,
            (Self::Array(a), Self::Array(b)) => a.ptr_eq(b),
            (Self::Object(a), Self::Object(b)) => a.ptr_eq(b),
            (Self::Function(a), Self::Function(b)) => a.ptr_eq(b),
            (Self::Deferred(a), Self::Deferred(b)) => a.ptr_eq(b),
            (Self::Stream(a), Self::Stream(b)) => a.ptr_eq(b),
            (Self::Generator(a), Self::Generator(b)) => a.ptr_eq(b),
            (Self::GeneratorFn(a), Self::GeneratorFn(b)) => a.ptr_eq(b),
            (Self::Emitter(a), Self::Emitter(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    /// Whether this value counts as "true" when a predicate produces it.
    ///
    /// `Null`, `false`, `0`, `NaN` and the empty string are falsy; everything else is truthy.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Bool(b) => *b,
            Self::Number(n) => *n != 0.0 && !n.is_nan(),
            Self::String(s) => !s.is_empty(),
            _ => true,
        }
    }

    /// Returns `true` if the value is [`Value::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Short name of this value's shape, used in diagnostics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Bytes(_) => "bytes",
            Self::List(_) => "list",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
            Self::Date(_) => "date",
            Self::Function(_) => "function",
            Self::Deferred(_) => "deferred",
            Self::Stream(_) => "stream",
            Self::Generator(_) => "generator",
            Self::GeneratorFn(_) => "generator function",
            Self::Emitter(_) => "emitter",
        }
    }

    /// Returns the number if this is a [`Value::Number`].
    #[must_use]
    pub const fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the string slice if this is a [`Value::String`].
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the bytes if this is a [`Value::Bytes`].
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Returns the elements if this is a [`Value::List`].
    #[must_use]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.strict_eq(other)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "{s:?}"),
            Self::Bytes(b) => write!(f, "<bytes len={}>", b.len()),
            Self::List(items) => f.debug_list().entries(items).finish(),
            Self::Array(array) => f.debug_list().entries(array.to_vec()).finish(),
            Self::Date(date) => write!(f, "{date:?}"),
            other => write!(f, "[{}]", other.kind()),
        }
    }
}

macro_rules! impl_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Self::$variant(value.into())
                }
            }
        )*
    };
}

impl_from! {
    bool => Bool,
    f64 => Number,
    f32 => Number,
    i32 => Number,
    u32 => Number,
    String => String,
    &str => String,
    Vec<u8> => Bytes,
    Vec<Value> => List,
    SystemTime => Date,
    Array => Array,
    Object => Object,
    Function => Function,
    Deferred => Deferred,
    ReadableStream => Stream,
    Generator => Generator,
    GeneratorFn => GeneratorFn,
    EventEmitter => Emitter,
}

impl From<()> for Value {
    fn from((): ()) -> Self {
        Self::Null
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn primitives_compare_by_value() {
        assert_eq!(Value::from(1), Value::from(1.0));
        assert_eq!(Value::from("a"), Value::from(String::from("a")));
        assert_ne!(Value::from(f64::NAN), Value::from(f64::NAN));
        assert_ne!(Value::from(0), Value::Null);
        assert_eq!(
            Value::from(vec![Value::from("bar"), Value::from(2)]),
            Value::List(vec!["bar".into(), 2.into()])
        );
    }

    #[test]
    fn handles_compare_by_identity() {
        let a = Object::new();
        let b = Object::new();
        assert_eq!(Value::from(a.clone()), Value::from(a));
        assert_ne!(Value::from(b), Value::from(Object::new()));
    }

    #[test]
    fn truthiness() {
        assert!(!Value::Null.is_truthy());
        assert!(!Value::from(false).is_truthy());
        assert!(!Value::from(0).is_truthy());
        assert!(!Value::from(f64::NAN).is_truthy());
        assert!(!Value::from("").is_truthy());
        assert!(Value::from("x").is_truthy());
        assert!(Value::from(Vec::<Value>::new()).is_truthy());
        assert!(Value::from(Object::new()).is_truthy());
    }

    #[test]
    fn option_maps_none_to_null() {
        assert!(Value::from(None::<i32>).is_null());
        assert_eq!(Value::from(Some("x")), Value::from("x"));
    }
}
