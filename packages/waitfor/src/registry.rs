//! The name-indexed set of waiters.
//!
//! A [`Registry`] maps names to [`Waiter`] strategies. Registering a name that already exists
//! replaces its waiter; an alias binds a second name to the waiter that is registered *at that
//! moment*, so replacing the original later does not affect the alias.

use std::{cell::RefCell, collections::HashMap, fmt, rc::Rc};

use snafu::ensure;

use crate::{
    bridge::{self, Completion, LocalScheduler, Scheduler},
    config::WaitConfig,
    error::{InvalidRegistrationSnafu, Result, UnknownWaiterSnafu},
    value::Value,
    waiters,
};

/// A strategy that turns one shape of asynchronous source into a blocking call.
pub trait Waiter {
    /// Blocks until the waited-for condition holds, then returns its result.
    ///
    /// `registry` is the registry the waiter was invoked through, which gives access to the
    /// blocking bridge and to other waiters.
    ///
    /// # Errors
    ///
    /// Implementations return [`WaitError::InvalidArgument`](crate::WaitError::InvalidArgument)
    /// for arguments of the wrong shape, before starting any asynchronous work.
    fn wait(&self, registry: &Registry, args: Vec<Value>) -> Result;

    /// The name this waiter registers itself under, if it has one.
    fn name(&self) -> Option<&str> {
        None
    }
}

/// A [`Waiter`] backed by a closure. Created by [`waiter_fn`].
#[derive(Clone, Copy)]
pub struct WaiterFn<F> {
    f: F,
}

/// Creates a [`Waiter`] from a closure.
pub const fn waiter_fn<F>(f: F) -> WaiterFn<F>
where
    F: Fn(&Registry, Vec<Value>) -> Result,
{
    WaiterFn { f }
}

impl<F> Waiter for WaiterFn<F>
where
    F: Fn(&Registry, Vec<Value>) -> Result,
{
    fn wait(&self, registry: &Registry, args: Vec<Value>) -> Result {
        (self.f)(registry, args)
    }
}

impl<F> fmt::Debug for WaiterFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WaiterFn").finish_non_exhaustive()
    }
}

/// A name and waiter supplied as one record.
#[derive(Clone, Default)]
pub struct WaiterDescriptor {
    /// The name to register under.
    pub name: Option<String>,
    /// The waiter to register.
    pub waiter: Option<Rc<dyn Waiter>>,
}

/// The accepted ways of adding a waiter to a [`Registry`].
#[derive(Clone)]
pub enum Registration {
    /// An explicit name and a waiter.
    Named {
        /// The name to register under.
        name: String,
        /// The waiter to register.
        waiter: Rc<dyn Waiter>,
    },
    /// A waiter that carries its own [`name`](Waiter::name).
    SelfNamed(Rc<dyn Waiter>),
    /// A descriptor record.
    Descriptor(WaiterDescriptor),
}

impl Registration {
    /// Registers `waiter` under `name`.
    pub fn named(name: impl Into<String>, waiter: impl Waiter + 'static) -> Self {
        Self::Named {
            name: name.into(),
            waiter: Rc::new(waiter),
        }
    }

    /// Registers `waiter` under its own name.
    pub fn self_named(waiter: impl Waiter + 'static) -> Self {
        Self::SelfNamed(Rc::new(waiter))
    }

    /// Registers whatever the descriptor holds.
    #[must_use]
    pub const fn descriptor(descriptor: WaiterDescriptor) -> Self {
        Self::Descriptor(descriptor)
    }

    fn resolve(self) -> Result<(String, Rc<dyn Waiter>)> {
        let (name, waiter) = match self {
            Self::Named { name, waiter } => (Some(name), Some(waiter)),
            Self::SelfNamed(waiter) => (waiter.name().map(str::to_owned), Some(waiter)),
            Self::Descriptor(WaiterDescriptor { name, waiter }) => (name, waiter),
        };

        let name = name.unwrap_or_default();
        ensure!(
            is_identifier(&name),
            InvalidRegistrationSnafu {
                reason: "a non-empty, identifier-like name is required",
            }
        );
        let Some(waiter) = waiter else {
            return InvalidRegistrationSnafu {
                reason: "a waiter implementation is required",
            }
            .fail();
        };

        Ok((name, waiter))
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named { name, .. } => f.debug_struct("Named").field("name", name).finish(),
            Self::SelfNamed(waiter) => f
                .debug_tuple("SelfNamed")
                .field(&waiter.name())
                .finish(),
            Self::Descriptor(descriptor) => f
                .debug_struct("Descriptor")
                .field("name", &descriptor.name)
                .field("has_waiter", &descriptor.waiter.is_some())
                .finish(),
        }
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|first| first.is_alphabetic() || first == '_' || first == '$')
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

/// A name-indexed set of waiters, together with the scheduler they block on.
pub struct Registry {
    waiters: RefCell<HashMap<String, Rc<dyn Waiter>>>,
    scheduler: Rc<dyn Scheduler>,
    config: WaitConfig,
}

impl Registry {
    /// Creates an empty registry driving the current thread's executor.
    #[must_use]
    pub fn new(config: WaitConfig) -> Self {
        Self::with_scheduler(config, Rc::new(LocalScheduler))
    }

    /// Creates an empty registry driving `scheduler`.
    #[must_use]
    pub fn with_scheduler(config: WaitConfig, scheduler: Rc<dyn Scheduler>) -> Self {
        Self {
            waiters: RefCell::new(HashMap::new()),
            scheduler,
            config,
        }
    }

    /// Creates a registry preloaded with every built-in waiter.
    #[must_use]
    pub fn with_builtins(config: WaitConfig) -> Self {
        let registry = Self::new(config);
        waiters::install(&registry);
        registry
    }

    /// The registry's configuration.
    #[must_use]
    pub const fn config(&self) -> &WaitConfig {
        &self.config
    }

    /// Adds (or replaces) a waiter.
    ///
    /// # Errors
    ///
    /// Returns [`WaitError::InvalidRegistration`](crate::WaitError::InvalidRegistration) if the
    /// registration has no usable name or no waiter.
    pub fn register(&self, registration: Registration) -> Result<()> {
        let (name, waiter) = registration.resolve()?;
        log::debug!("registering waiter `{name}`");
        self.waiters.borrow_mut().insert(name, waiter);
        Ok(())
    }

    /// Binds `alias` to the waiter currently registered as `existing`.
    ///
    /// Returns `false`, creating nothing, if `existing` is not registered.
    pub fn alias(&self, existing: &str, alias: impl Into<String>) -> bool {
        let alias = alias.into();
        let Some(waiter) = self.lookup(existing) else {
            log::debug!("not aliasing `{alias}`: no waiter named `{existing}`");
            return false;
        };

        log::debug!("aliasing `{alias}` to `{existing}`");
        self.waiters.borrow_mut().insert(alias, waiter);
        true
    }

    /// Looks up the waiter registered as `name`.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<Rc<dyn Waiter>> {
        self.waiters.borrow().get(name).cloned()
    }

    /// Whether a waiter is registered as `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.waiters.borrow().contains_key(name)
    }

    /// Every registered name, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.waiters.borrow().keys().cloned().collect();
        names.sort_unstable();
        names
    }

    /// Invokes the waiter registered as `name` with `args`.
    ///
    /// # Errors
    ///
    /// Returns [`WaitError::UnknownWaiter`](crate::WaitError::UnknownWaiter) if no waiter is
    /// registered as `name`, and otherwise whatever the waiter returns.
    pub fn call(&self, name: &str, args: Vec<Value>) -> Result {
        let Some(waiter) = self.lookup(name) else {
            return UnknownWaiterSnafu { name }.fail();
        };
        log::trace!("wait.for.{name}({} args)", args.len());
        waiter.wait(self, args)
    }

    /// Pumps the scheduler until `done` returns `true`.
    pub fn block_until(&self, done: impl FnMut() -> bool) {
        bridge::block_until(&*self.scheduler, self.config.idle_backoff, done);
    }

    /// Pumps the scheduler until `completion` is done, then takes its value.
    pub fn wait_for<T>(&self, completion: &Completion<T>) -> T {
        let mut value = None;
        self.block_until(|| {
            value = completion.take();
            value.is_some()
        });

        match value {
            Some(value) => value,
            None => unreachable!("the bridge only returns once the completion is taken"),
        }
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("waiters", &self.names())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

thread_local! {
    static DEFAULT: Rc<Registry> = Rc::new(Registry::with_builtins(WaitConfig::default()));
}

/// The default registry, preloaded with the built-in waiters.
///
/// There is one per thread: waiting is single-threaded, so the thread is the "process" every
/// waiter and executor task shares.
#[must_use]
pub fn registry() -> Rc<Registry> {
    DEFAULT.with(Rc::clone)
}

/// Invokes a waiter by name, converting every argument into a [`Value`].
///
/// `wait_for!(registry, time, 1.5)` is `registry.call("time", vec![Value::from(1.5)])`.
///
/// # Examples
///
/// ```
/// use waitfor::{registry, wait_for, Deferred};
///
/// let wait = registry();
/// let value = wait_for!(wait, promise, Deferred::resolved(123)).unwrap();
/// assert_eq!(value, 123.into());
/// ```
#[macro_export]
macro_rules! wait_for {
    ($registry:expr, $waiter:ident $(, $arg:expr)* $(,)?) => {
        $registry.call(
            ::core::stringify!($waiter),
            ::std::vec![$($crate::Value::from($arg)),*],
        )
    };
}

#[cfg(test)]
mod test {
    use std::cell::Cell;

    use super::*;
    use crate::error::WaitError;

    struct Named;

    impl Waiter for Named {
        fn wait(&self, _: &Registry, _: Vec<Value>) -> Result {
            Ok("named".into())
        }

        fn name(&self) -> Option<&str> {
            Some("named")
        }
    }

    fn constant(value: &'static str) -> impl Waiter {
        waiter_fn(move |_, _| Ok(value.into()))
    }

    #[test]
    fn lookup_delegates_to_registered_waiter() {
        let registry = Registry::new(WaitConfig::default());
        let seen = Rc::new(Cell::new(0));

        registry
            .register(Registration::named(
                "count",
                waiter_fn({
                    let seen = seen.clone();
                    move |_, args| {
                        seen.set(args.len());
                        Ok(Value::Null)
                    }
                }),
            ))
            .unwrap();

        let waiter = registry.lookup("count").unwrap();
        waiter.wait(&registry, vec![1.into(), 2.into()]).unwrap();
        assert_eq!(seen.get(), 2);
    }

    #[test]
    fn accepts_all_registration_shapes() {
        let registry = Registry::new(WaitConfig::default());

        registry
            .register(Registration::named("a", constant("a")))
            .unwrap();
        registry.register(Registration::self_named(Named)).unwrap();
        registry
            .register(Registration::descriptor(WaiterDescriptor {
                name: Some("c".into()),
                waiter: Some(Rc::new(constant("c"))),
            }))
            .unwrap();

        assert_eq!(registry.names(), ["a", "c", "named"]);
        assert_eq!(registry.call("named", vec![]), Ok("named".into()));
        assert_eq!(registry.call("c", vec![]), Ok("c".into()));
    }

    #[test]
    fn rejects_unusable_registrations() {
        let registry = Registry::new(WaitConfig::default());

        for registration in [
            Registration::named("", constant("x")),
            Registration::named("not a name", constant("x")),
            Registration::self_named(constant("anonymous")),
            Registration::descriptor(WaiterDescriptor::default()),
            Registration::descriptor(WaiterDescriptor {
                name: Some("missing".into()),
                waiter: None,
            }),
        ] {
            assert!(matches!(
                registry.register(registration),
                Err(WaitError::InvalidRegistration { .. })
            ));
        }
        assert!(registry.names().is_empty());
    }

    #[test]
    fn reregistering_replaces() {
        let registry = Registry::new(WaitConfig::default());
        registry
            .register(Registration::named("x", constant("old")))
            .unwrap();
        registry
            .register(Registration::named("x", constant("new")))
            .unwrap();
        assert_eq!(registry.call("x", vec![]), Ok("new".into()));
    }

    #[test]
    fn alias_binds_current_waiter() {
        let registry = Registry::new(WaitConfig::default());
        registry
            .register(Registration::named("original", constant("old")))
            .unwrap();

        assert!(registry.alias("original", "copy"));
        assert!(Rc::ptr_eq(
            &registry.lookup("original").unwrap(),
            &registry.lookup("copy").unwrap()
        ));

        registry
            .register(Registration::named("original", constant("new")))
            .unwrap();
        assert_eq!(registry.call("copy", vec![]), Ok("old".into()));
        assert_eq!(registry.call("original", vec![]), Ok("new".into()));
    }

    #[test]
    fn aliasing_a_missing_name_does_nothing() {
        let registry = Registry::new(WaitConfig::default());
        assert!(!registry.alias("missing", "other"));
        assert!(!registry.contains("other"));
    }

    #[test]
    fn calling_unknown_waiter_fails() {
        let registry = Registry::new(WaitConfig::default());
        assert_eq!(
            registry.call("nope", vec![]),
            Err(WaitError::UnknownWaiter {
                name: "nope".into()
            })
        );
    }

    #[test]
    fn waiters_may_register_reentrantly() {
        let registry = Registry::new(WaitConfig::default());
        registry
            .register(Registration::named(
                "installer",
                waiter_fn(|registry, _| {
                    registry.register(Registration::named("late", constant("late")))?;
                    registry.call("late", vec![])
                }),
            ))
            .unwrap();

        assert_eq!(registry.call("installer", vec![]), Ok("late".into()));
    }

    #[test]
    fn default_registry_has_builtins() {
        let wait = registry();
        for name in [
            "time",
            "promise",
            "predicate",
            "condition",
            "value",
            "property",
            "event",
            "date",
            "stream",
            "yield",
            "generator",
            "callback",
            "function",
            "array",
            "result",
        ] {
            assert!(wait.contains(name), "missing built-in `{name}`");
        }
        assert!(Rc::ptr_eq(&wait, &registry()));
    }
}
