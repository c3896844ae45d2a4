use std::{fmt, rc::Rc};

use super::Value;

/// A shared callable taking a list of values and producing a value.
///
/// Callback-style waiters hand one of these to the function they wrap as its trailing
/// completion callback.
#[derive(Clone)]
pub struct Function {
    f: Rc<dyn Fn(Vec<Value>) -> Value>,
}

impl Function {
    /// Wraps a closure.
    pub fn new(f: impl Fn(Vec<Value>) -> Value + 'static) -> Self {
        Self { f: Rc::new(f) }
    }

    /// Wraps a zero-argument boolean closure, for use with the `predicate` waiter.
    pub fn predicate(f: impl Fn() -> bool + 'static) -> Self {
        Self::new(move |_| Value::Bool(f()))
    }

    /// Invokes the function.
    pub fn call(&self, args: Vec<Value>) -> Value {
        (self.f)(args)
    }

    /// Returns `true` if both handles refer to the same function.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.f, &other.f)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[Function]")
    }
}
