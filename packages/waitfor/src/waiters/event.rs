use super::Args;
use crate::{
    bridge::Completion,
    error::Result,
    registry::{Registry, Waiter},
    value::Value,
};

/// `event(emitter, name)`: waits for the next emit of `name`.
///
/// Only the first emit after the call is observed. Returns the emitted argument if there was
/// exactly one, and otherwise all of them as a list.
#[derive(Debug, Clone, Copy, Default)]
pub struct Event;

impl Event {
    /// The registered name.
    pub const NAME: &'static str = "event";
}

impl Waiter for Event {
    fn wait(&self, registry: &Registry, args: Vec<Value>) -> Result {
        let mut args = Args::new(Self::NAME, args);
        let emitter = args.take("emitter", |value| match value {
            Value::Emitter(emitter) => Ok(emitter),
            other => Err(other),
        })?;
        let event = args.string("eventName")?;

        let done = Completion::new();
        emitter.once(event, {
            let done = done.clone();
            move |args: &[Value]| done.complete(args.to_vec())
        });

        Ok(match <[Value; 1]>::try_from(registry.wait_for(&done)) {
            Ok([single]) => single,
            Err(all) => Value::List(all),
        })
    }

    fn name(&self) -> Option<&str> {
        Some(Self::NAME)
    }
}
