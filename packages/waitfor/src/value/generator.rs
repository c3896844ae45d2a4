use std::{cell::RefCell, fmt, rc::Rc};

use super::Value;

/// The outcome of resuming a [`Generator`] once.
#[derive(Debug, Clone, PartialEq)]
pub enum GeneratorState {
    /// The generator produced an intermediate value and can be resumed again.
    Yielded(Value),
    /// The generator finished, with its return value.
    Complete(Value),
}

impl GeneratorState {
    /// The produced value, whether yielded or returned.
    #[must_use]
    pub fn into_value(self) -> Value {
        match self {
            Self::Yielded(value) | Self::Complete(value) => value,
        }
    }

    /// Whether the generator signalled that it is finished.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        matches!(self, Self::Complete(_))
    }
}

struct GeneratorInner {
    resume: Box<dyn FnMut() -> GeneratorState>,
    finished: bool,
}

/// A started, resumable producer of values.
///
/// Resuming a finished generator keeps returning `Complete(Null)`, so its return value is only
/// observed once.
#[derive(Clone)]
pub struct Generator {
    inner: Rc<RefCell<GeneratorInner>>,
}

impl Generator {
    /// Creates a generator whose steps are produced by `resume`.
    pub fn from_fn(resume: impl FnMut() -> GeneratorState + 'static) -> Self {
        Self {
            inner: Rc::new(RefCell::new(GeneratorInner {
                resume: Box::new(resume),
                finished: false,
            })),
        }
    }

    /// Creates a generator that yields every item of `iter`, then completes with `returns`.
    pub fn yielding<I>(iter: I, returns: impl Into<Value>) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
        I::IntoIter: 'static,
    {
        let mut iter = iter.into_iter();
        let mut returns = Some(returns.into());
        Self::from_fn(move || match iter.next() {
            Some(item) => GeneratorState::Yielded(item.into()),
            None => GeneratorState::Complete(returns.take().unwrap_or_default()),
        })
    }

    /// Advances the generator by one step.
    ///
    /// # Panics
    ///
    /// Panics if called from inside this generator's own step.
    pub fn resume(&self) -> GeneratorState {
        let Ok(mut inner) = self.inner.try_borrow_mut() else {
            panic!("generator is already running");
        };
        if inner.finished {
            return GeneratorState::Complete(Value::Null);
        }

        let state = (inner.resume)();
        inner.finished = state.is_complete();
        state
    }

    /// Whether the generator has completed.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.inner.try_borrow().is_ok_and(|inner| inner.finished)
    }

    /// Returns `true` if both handles refer to the same generator.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Generator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Generator")
            .field("finished", &self.is_finished())
            .finish_non_exhaustive()
    }
}

/// A generator factory. Every [`start`](GeneratorFn::start) begins a fresh run.
#[derive(Clone)]
pub struct GeneratorFn {
    start: Rc<dyn Fn() -> Generator>,
}

impl GeneratorFn {
    /// Wraps a factory closure.
    pub fn new(start: impl Fn() -> Generator + 'static) -> Self {
        Self {
            start: Rc::new(start),
        }
    }

    /// Starts a new generator.
    #[must_use]
    pub fn start(&self) -> Generator {
        (self.start)()
    }

    /// Returns `true` if both handles refer to the same factory.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.start, &other.start)
    }
}

impl fmt::Debug for GeneratorFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[GeneratorFunction]")
    }
}
