//! Errors raised by waiters, registration and composition.
//!
//! A failure of the *awaited* operation is never one of these. A rejected [`Deferred`] is handed
//! back from the `promise` waiter as an ordinary [`Value`], and a Node-style callback's error
//! argument is returned like any other result.
//!
//! [`Deferred`]: crate::value::Deferred
//! [`Value`]: crate::value::Value

use snafu::Snafu;

use crate::value::Value;

/// Errors that can occur when registering, composing or invoking waiters.
#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum WaitError {
    /// A waiter received an argument of the wrong shape.
    ///
    /// Raised before the waiter starts any asynchronous work.
    #[snafu(display("wait.for.{waiter}(..) :: invalid <{argument}> argument {value}"))]
    InvalidArgument {
        /// Name of the waiter that rejected the call.
        waiter: String,
        /// Name of the offending parameter.
        argument: &'static str,
        /// Debug rendering of the value that was passed.
        value: String,
    },

    /// A registration matched none of the accepted shapes.
    #[snafu(display("<wait-for-stuff>.use(..) :: invalid arguments ({reason})"))]
    InvalidRegistration {
        /// What was missing or malformed.
        reason: &'static str,
    },

    /// No waiter is registered under the given name.
    #[snafu(display("unknown waiter \"{name}\""))]
    UnknownWaiter {
        /// The name that failed to resolve.
        name: String,
    },

    /// A custom waiter failed.
    #[snafu(display("wait.for.{waiter}(..) :: {message}"))]
    Custom {
        /// Name of the failing waiter.
        waiter: String,
        /// Description of the failure.
        message: String,
    },
}

/// A result type that makes returning waiter errors easier.
pub type Result<T = Value> = core::result::Result<T, WaitError>;

/// Builds an [`WaitError::InvalidArgument`] for `waiter`'s parameter `argument`.
pub(crate) fn invalid_argument<T>(
    waiter: &str,
    argument: &'static str,
    value: Option<&Value>,
) -> Result<T> {
    InvalidArgumentSnafu {
        waiter,
        argument,
        value: value.map_or_else(|| "undefined".to_owned(), |value| format!("{value:?}")),
    }
    .fail()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn invalid_argument_message() {
        let err = invalid_argument::<()>("time", "seconds", Some(&Value::from("soon"))).unwrap_err();
        assert_eq!(
            err.to_string(),
            "wait.for.time(..) :: invalid <seconds> argument \"soon\""
        );
    }

    #[test]
    fn missing_argument_renders_as_undefined() {
        let err = invalid_argument::<()>("array", "array", None).unwrap_err();
        assert!(err.to_string().ends_with("argument undefined"));
    }
}
