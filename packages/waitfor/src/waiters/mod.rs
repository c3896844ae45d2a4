//! The built-in waiters.
//!
//! Each waiter is a unit struct registered under its own [`name`](Waiter::name). Arguments are
//! validated up front, before any task is spawned, so a bad call fails without side effects.

mod callback;
mod event;
mod generator;
mod poll;
mod promise;
pub mod result;
mod stream;
mod time;

use std::{rc::Rc, vec};

pub use callback::{Callback, FunctionWaiter};
pub use event::Event;
pub use generator::{Exhaust, Yield};
pub use poll::{Membership, Predicate, Property, ValueEquals};
pub use promise::Promise;
pub use result::{Normalize, Shape};
pub use stream::Stream;
pub use time::{Date, Time};

use crate::{
    error::{Result, invalid_argument},
    registry::{Registration, Registry, Waiter},
    value::{Generator, Value},
};

/// Adds every built-in waiter to `registry`, plus the `condition` alias of `predicate`.
pub(crate) fn install(registry: &Registry) {
    let builtins: [Rc<dyn Waiter>; 14] = [
        Rc::new(Time),
        Rc::new(Promise),
        Rc::new(Predicate),
        Rc::new(ValueEquals),
        Rc::new(Property),
        Rc::new(Event),
        Rc::new(Date),
        Rc::new(Stream),
        Rc::new(Yield),
        Rc::new(Exhaust),
        Rc::new(Callback),
        Rc::new(FunctionWaiter),
        Rc::new(Membership),
        Rc::new(Normalize),
    ];

    for waiter in builtins {
        let registered = registry.register(Registration::SelfNamed(waiter));
        debug_assert!(registered.is_ok(), "built-in waiters are always named");
    }
    registry.alias(Predicate::NAME, "condition");
}

/// Positional arguments of one waiter call.
pub(crate) struct Args {
    waiter: &'static str,
    values: vec::IntoIter<Value>,
}

impl Args {
    pub(crate) fn new(waiter: &'static str, values: Vec<Value>) -> Self {
        Self {
            waiter,
            values: values.into_iter(),
        }
    }

    /// Takes the next argument, converting it with `extract`.
    ///
    /// `extract` hands back the value it rejected so the error can show it.
    pub(crate) fn take<T>(
        &mut self,
        argument: &'static str,
        extract: impl FnOnce(Value) -> core::result::Result<T, Value>,
    ) -> Result<T> {
        let Some(value) = self.values.next() else {
            return invalid_argument(self.waiter, argument, None);
        };
        extract(value).or_else(|rejected| invalid_argument(self.waiter, argument, Some(&rejected)))
    }

    /// Takes the next argument, or `Null` if there is none.
    pub(crate) fn optional(&mut self) -> Value {
        self.values.next().unwrap_or_default()
    }

    /// Every argument not taken yet.
    pub(crate) fn rest(self) -> Vec<Value> {
        self.values.collect()
    }

    /// Takes a generator argument, starting a fresh one if given a generator function.
    pub(crate) fn generator(&mut self) -> Result<Generator> {
        self.take("generator", |value| match value {
            Value::Generator(generator) => Ok(generator),
            Value::GeneratorFn(factory) => Ok(factory.start()),
            other => Err(other),
        })
    }

    /// Takes a field name argument.
    pub(crate) fn string(&mut self, argument: &'static str) -> Result<String> {
        self.take(argument, |value| match value {
            Value::String(s) => Ok(s),
            other => Err(other),
        })
    }
}
