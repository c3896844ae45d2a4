use super::Args;
use crate::{
    error::Result,
    registry::{Registry, Waiter},
    value::{GeneratorState, Value},
};

/// `yield(generator, target)`: resumes `generator` once per bridge iteration until it produces
/// `target`, and returns that value.
///
/// A generator function is started first. A generator that finishes without ever producing
/// `target` is resumed forever.
#[derive(Debug, Clone, Copy, Default)]
pub struct Yield;

impl Yield {
    /// The registered name.
    pub const NAME: &'static str = "yield";
}

impl Waiter for Yield {
    fn wait(&self, registry: &Registry, args: Vec<Value>) -> Result {
        let mut args = Args::new(Self::NAME, args);
        let generator = args.generator()?;
        let target = args.optional();

        let mut produced = Value::Null;
        registry.block_until(|| {
            if produced.strict_eq(&target) {
                return true;
            }
            produced = generator.resume().into_value();
            false
        });

        Ok(produced)
    }

    fn name(&self) -> Option<&str> {
        Some(Self::NAME)
    }
}

/// `generator(generator)`: resumes `generator` once per bridge iteration until it completes,
/// and returns its return value.
#[derive(Debug, Clone, Copy, Default)]
pub struct Exhaust;

impl Exhaust {
    /// The registered name.
    pub const NAME: &'static str = "generator";
}

impl Waiter for Exhaust {
    fn wait(&self, registry: &Registry, args: Vec<Value>) -> Result {
        let generator = Args::new(Self::NAME, args).generator()?;

        let mut state = GeneratorState::Yielded(Value::Null);
        registry.block_until(|| {
            state = generator.resume();
            state.is_complete()
        });

        Ok(state.into_value())
    }

    fn name(&self) -> Option<&str> {
        Some(Self::NAME)
    }
}
