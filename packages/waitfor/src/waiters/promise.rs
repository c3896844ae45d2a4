use super::Args;
use crate::{
    bridge::Completion,
    error::Result,
    registry::{Registry, Waiter},
    value::Value,
};

/// `promise(deferred)`: waits for a [`Deferred`](crate::Deferred) to settle.
///
/// Both outcomes are returned as values. A rejection is *not* an error of the waiter.
#[derive(Debug, Clone, Copy, Default)]
pub struct Promise;

impl Promise {
    /// The registered name.
    pub const NAME: &'static str = "promise";
}

impl Waiter for Promise {
    fn wait(&self, registry: &Registry, args: Vec<Value>) -> Result {
        let deferred = Args::new(Self::NAME, args).take("promise", |value| match value {
            Value::Deferred(deferred) => Ok(deferred),
            other => Err(other),
        })?;

        let done = Completion::new();
        waitfor_async::spawn({
            let done = done.clone();
            async move {
                match deferred.await {
                    Ok(value) | Err(value) => done.complete(value),
                }
            }
        })
        .detach();

        Ok(registry.wait_for(&done))
    }

    fn name(&self) -> Option<&str> {
        Some(Self::NAME)
    }
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use waitfor_async::time::sleep;

    use super::*;
    use crate::{Deferred, WaitConfig, WaitError};

    #[test]
    fn returns_resolution() {
        let registry = Registry::with_builtins(WaitConfig::default());
        let (deferred, resolver) = Deferred::new();

        waitfor_async::spawn(async move {
            sleep(Duration::from_millis(20)).await;
            resolver.resolve(123);
        })
        .detach();

        assert_eq!(registry.call("promise", vec![deferred.into()]), Ok(123.into()));
    }

    #[test]
    fn returns_rejection_as_value() {
        let registry = Registry::with_builtins(WaitConfig::default());
        let deferred = Deferred::from_future(async {
            sleep(Duration::from_millis(20)).await;
            Err("boo".into())
        });

        assert_eq!(
            registry.call("promise", vec![deferred.into()]),
            Ok("boo".into())
        );
    }

    #[test]
    fn settled_values_are_stable() {
        let registry = Registry::with_builtins(WaitConfig::default());
        let deferred = Deferred::resolved("done");

        for _ in 0..2 {
            assert_eq!(
                registry.call("promise", vec![deferred.clone().into()]),
                Ok("done".into())
            );
        }
    }

    #[test]
    fn rejects_non_deferred() {
        let registry = Registry::with_builtins(WaitConfig::default());
        assert!(matches!(
            registry.call("promise", vec![123.into()]),
            Err(WaitError::InvalidArgument { .. })
        ));
    }
}
