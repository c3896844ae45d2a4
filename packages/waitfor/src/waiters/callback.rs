//! Waiters for functions that report completion through a trailing callback argument.

use super::Args;
use crate::{
    bridge::Completion,
    error::Result,
    registry::{Registry, Waiter},
    value::{Function, Value},
};

fn function(args: &mut Args, argument: &'static str) -> Result<Function> {
    args.take(argument, |value| match value {
        Value::Function(function) => Ok(function),
        other => Err(other),
    })
}

/// Calls `function` with `args` plus a completion callback, then waits for the callback.
///
/// Returns the arguments the callback was invoked with.
fn call_with_callback(registry: &Registry, function: &Function, mut args: Vec<Value>) -> Vec<Value> {
    let done = Completion::new();
    args.push(
        Function::new({
            let done = done.clone();
            move |results| {
                done.complete(results);
                Value::Null
            }
        })
        .into(),
    );

    function.call(args);
    registry.wait_for(&done)
}

/// `callback(f, ...args)`: calls a Node-style `f(...args, (error, ...results))`.
///
/// Null arguments to the callback are dropped. Returns the single remaining value, all of them
/// as a list if there are several, or `Null` if none are left.
#[derive(Debug, Clone, Copy, Default)]
pub struct Callback;

impl Callback {
    /// The registered name.
    pub const NAME: &'static str = "callback";
}

impl Waiter for Callback {
    fn wait(&self, registry: &Registry, args: Vec<Value>) -> Result {
        let mut args = Args::new(Self::NAME, args);
        let function = function(&mut args, "nodeAsyncFunction")?;

        let mut results: Vec<_> = call_with_callback(registry, &function, args.rest())
            .into_iter()
            .filter(|result| !result.is_null())
            .collect();

        Ok(if results.len() > 1 {
            Value::List(results)
        } else {
            results.pop().unwrap_or_default()
        })
    }

    fn name(&self) -> Option<&str> {
        Some(Self::NAME)
    }
}

/// `function(f, ...args)`: calls `f(...args, callback)` and returns every callback argument,
/// unfiltered, as a list.
#[derive(Debug, Clone, Copy, Default)]
pub struct FunctionWaiter;

impl FunctionWaiter {
    /// The registered name.
    pub const NAME: &'static str = "function";
}

impl Waiter for FunctionWaiter {
    fn wait(&self, registry: &Registry, args: Vec<Value>) -> Result {
        let mut args = Args::new(Self::NAME, args);
        let function = function(&mut args, "customAsyncFunction")?;

        Ok(Value::List(call_with_callback(
            registry,
            &function,
            args.rest(),
        )))
    }

    fn name(&self) -> Option<&str> {
        Some(Self::NAME)
    }
}
