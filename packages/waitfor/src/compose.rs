//! Right-to-left composition of registered waiters.

use std::{fmt, rc::Rc};

use crate::{
    error::{Result, UnknownWaiterSnafu},
    registry::{Registry, Waiter},
    value::Value,
};

struct Stage {
    name: String,
    waiter: Rc<dyn Waiter>,
}

/// A pipeline of waiters built by [`Registry::compose`].
///
/// The waiters are resolved when the pipeline is built, so later changes to the registry do not
/// affect it.
pub struct Composed {
    /// Stages in execution order, which is the reverse of declaration order.
    stages: Vec<Stage>,
}

impl Registry {
    /// Builds a pipeline from registered waiter names.
    ///
    /// `compose(&["a", "b"])` runs `b` with the call's arguments, then `a` with `b`'s result as
    /// its only argument.
    ///
    /// # Errors
    ///
    /// Returns [`WaitError::UnknownWaiter`](crate::WaitError::UnknownWaiter) for the first name
    /// that is not registered.
    pub fn compose(&self, names: &[&str]) -> Result<Composed> {
        let stages = names
            .iter()
            .rev()
            .map(|&name| match self.lookup(name) {
                Some(waiter) => Ok(Stage {
                    name: name.to_owned(),
                    waiter,
                }),
                None => UnknownWaiterSnafu { name }.fail(),
            })
            .collect::<Result<Vec<_>>>()?;

        log::debug!("composed waiters {names:?}");
        Ok(Composed { stages })
    }
}

impl Composed {
    /// Runs the pipeline through `registry`.
    ///
    /// # Errors
    ///
    /// Returns the first error any stage returns. Later stages do not run.
    pub fn call(&self, registry: &Registry, args: Vec<Value>) -> Result {
        let mut args = args;
        for stage in &self.stages {
            log::trace!("running composed stage `{}`", stage.name);
            let result = stage.waiter.wait(registry, args)?;
            args = vec![result];
        }

        Ok(args.into_iter().next().unwrap_or_default())
    }

    /// The stage names in execution order.
    pub fn stages(&self) -> impl Iterator<Item = &str> {
        self.stages.iter().map(|stage| stage.name.as_str())
    }
}

impl Waiter for Composed {
    fn wait(&self, registry: &Registry, args: Vec<Value>) -> Result {
        self.call(registry, args)
    }
}

impl fmt::Debug for Composed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.stages()).finish()
    }
}
