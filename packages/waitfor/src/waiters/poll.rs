//! Waiters that re-check a condition on every bridge iteration.

use super::Args;
use crate::{
    error::Result,
    registry::{Registry, Waiter},
    value::{Array, Object, Value},
};

fn object(value: Value) -> core::result::Result<Object, Value> {
    match value {
        Value::Object(object) => Ok(object),
        other => Err(other),
    }
}

/// `predicate(f)`: waits until `f()` returns a truthy value.
///
/// `f` is called exactly once per bridge iteration.
#[derive(Debug, Clone, Copy, Default)]
pub struct Predicate;

impl Predicate {
    /// The registered name.
    pub const NAME: &'static str = "predicate";
}

impl Waiter for Predicate {
    fn wait(&self, registry: &Registry, args: Vec<Value>) -> Result {
        let predicate = Args::new(Self::NAME, args).take("predicate", |value| match value {
            Value::Function(f) => Ok(f),
            other => Err(other),
        })?;

        registry.block_until(|| predicate.call(Vec::new()).is_truthy());
        Ok(Value::Null)
    }

    fn name(&self) -> Option<&str> {
        Some(Self::NAME)
    }
}

/// `value(owner, field, target)`: waits until `owner[field]` strictly equals `target`.
///
/// A missing field reads as `Null`, as does an omitted `target`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueEquals;

impl ValueEquals {
    /// The registered name.
    pub const NAME: &'static str = "value";
}

impl Waiter for ValueEquals {
    fn wait(&self, registry: &Registry, args: Vec<Value>) -> Result {
        let mut args = Args::new(Self::NAME, args);
        let owner = args.take("owner", object)?;
        let field = args.string("propertyName")?;
        let target = args.optional();

        registry.block_until(|| owner.get(&field).unwrap_or_default().strict_eq(&target));
        Ok(Value::Null)
    }

    fn name(&self) -> Option<&str> {
        Some(Self::NAME)
    }
}

/// `property(owner, field)`: waits until `owner` has `field`, directly or via its prototype.
#[derive(Debug, Clone, Copy, Default)]
pub struct Property;

impl Property {
    /// The registered name.
    pub const NAME: &'static str = "property";
}

impl Waiter for Property {
    fn wait(&self, registry: &Registry, args: Vec<Value>) -> Result {
        let mut args = Args::new(Self::NAME, args);
        let owner = args.take("owner", object)?;
        let field = args.string("property")?;

        registry.block_until(|| owner.has(&field));
        Ok(Value::Null)
    }

    fn name(&self) -> Option<&str> {
        Some(Self::NAME)
    }
}

/// `array(array, target)`: waits until `array` contains `target`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Membership;

impl Membership {
    /// The registered name.
    pub const NAME: &'static str = "array";
}

impl Waiter for Membership {
    fn wait(&self, registry: &Registry, args: Vec<Value>) -> Result {
        let mut args = Args::new(Self::NAME, args);
        let array: Array = args.take("array", |value| match value {
            Value::Array(array) => Ok(array),
            other => Err(other),
        })?;
        let target = args.optional();

        registry.block_until(|| array.contains(&target));
        Ok(Value::Null)
    }

    fn name(&self) -> Option<&str> {
        Some(Self::NAME)
    }
}

#[cfg(test)]
mod test {
    use std::{
        cell::Cell,
        rc::Rc,
        time::{Duration, Instant},
    };

    use waitfor_async::time::sleep;

    use super::*;
    use crate::{Function, WaitConfig, WaitError};

    fn registry() -> Registry {
        Registry::with_builtins(WaitConfig::default())
    }

    fn later(delay_ms: u64, f: impl FnOnce() + 'static) {
        waitfor_async::spawn(async move {
            sleep(Duration::from_millis(delay_ms)).await;
            f();
        })
        .detach();
    }

    #[test]
    fn predicate_is_checked_once_per_iteration() {
        let calls = Rc::new(Cell::new(0));
        let predicate = Function::predicate({
            let calls = calls.clone();
            move || {
                calls.set(calls.get() + 1);
                calls.get() == 5
            }
        });

        registry()
            .call("predicate", vec![predicate.into()])
            .unwrap();
        assert_eq!(calls.get(), 5);
    }

    #[test]
    fn predicate_uses_truthiness() {
        let start = Instant::now();
        let predicate = Function::new(move |_| {
            if start.elapsed() >= Duration::from_millis(30) {
                "yes".into()
            } else {
                0.into()
            }
        });

        registry()
            .call("condition", vec![predicate.into()])
            .unwrap();
        assert!(start.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn value_waits_for_field() {
        let owner = Object::new();
        owner.set("foo", "bar");
        later(20, {
            let owner = owner.clone();
            move || {
                owner.set("foo", "baz");
            }
        });

        registry()
            .call("value", vec![owner.clone().into(), "foo".into(), "baz".into()])
            .unwrap();
        assert_eq!(owner.get("foo"), Some("baz".into()));
    }

    #[test]
    fn missing_field_equals_null() {
        let owner = Object::new();
        assert_eq!(
            registry().call("value", vec![owner.into(), "missing".into()]),
            Ok(Value::Null)
        );
    }

    #[test]
    fn value_validates_arguments() {
        let registry = registry();
        assert!(matches!(
            registry.call("value", vec!["owner".into(), "foo".into()]),
            Err(WaitError::InvalidArgument {
                argument: "owner",
                ..
            })
        ));
        assert!(matches!(
            registry.call("value", vec![Object::new().into(), 1.into()]),
            Err(WaitError::InvalidArgument {
                argument: "propertyName",
                ..
            })
        ));
    }

    #[test]
    fn property_sees_inherited_fields() {
        let prototype = Object::new();
        let owner = Object::with_prototype(prototype.clone());
        later(20, move || {
            prototype.set("foo", "bar");
        });

        registry()
            .call("property", vec![owner.clone().into(), "foo".into()])
            .unwrap();
        assert!(owner.has("foo"));
        assert!(!owner.has_own("foo"));
    }

    #[test]
    fn array_waits_for_membership() {
        let array = Array::new();
        later(20, {
            let array = array.clone();
            move || array.push("hello world")
        });

        registry()
            .call("array", vec![array.clone().into(), "hello world".into()])
            .unwrap();
        assert!(array.contains(&"hello world".into()));
    }

    #[test]
    fn array_requires_an_array() {
        assert!(matches!(
            registry().call("array", vec![Value::List(Vec::new()), 1.into()]),
            Err(WaitError::InvalidArgument {
                argument: "array",
                ..
            })
        ));
    }
}
