use std::{
    cell::RefCell,
    fmt,
    future::Future,
    mem,
    pin::Pin,
    rc::Rc,
    task::{Context, Poll, Waker},
};

use super::Value;

enum State {
    Pending(Vec<Waker>),
    Settled(Result<Value, Value>),
}

/// A single-resolution asynchronous result: it eventually settles as either a success value or
/// an error value, exactly once.
///
/// `Deferred` is a [`Future`] and can be awaited by any number of clones; each receives a clone
/// of the settled result.
#[derive(Clone)]
pub struct Deferred {
    state: Rc<RefCell<State>>,
}

/// The settling half of a [`Deferred`].
///
/// Only the first call to [`resolve`](Resolver::resolve) or [`reject`](Resolver::reject) has
/// any effect.
#[derive(Clone)]
pub struct Resolver {
    state: Rc<RefCell<State>>,
}

impl Deferred {
    /// Creates a pending deferred value and the resolver that settles it.
    #[must_use]
    pub fn new() -> (Self, Resolver) {
        let state = Rc::new(RefCell::new(State::Pending(Vec::new())));
        (
            Self {
                state: state.clone(),
            },
            Resolver { state },
        )
    }

    /// A deferred value that has already succeeded with `value`.
    #[must_use]
    pub fn resolved(value: impl Into<Value>) -> Self {
        Self {
            state: Rc::new(RefCell::new(State::Settled(Ok(value.into())))),
        }
    }

    /// A deferred value that has already failed with `error`.
    #[must_use]
    pub fn rejected(error: impl Into<Value>) -> Self {
        Self {
            state: Rc::new(RefCell::new(State::Settled(Err(error.into())))),
        }
    }

    /// Spawns `future` on the current thread's executor and settles with its output.
    pub fn from_future(future: impl Future<Output = Result<Value, Value>> + 'static) -> Self {
        let (deferred, resolver) = Self::new();
        waitfor_async::spawn(async move {
            resolver.settle(future.await);
        })
        .detach();
        deferred
    }

    /// Whether the value has settled.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        matches!(*self.state.borrow(), State::Settled(_))
    }

    /// The settled result, if any.
    #[must_use]
    pub fn settled(&self) -> Option<Result<Value, Value>> {
        match &*self.state.borrow() {
            State::Settled(result) => Some(result.clone()),
            State::Pending(_) => None,
        }
    }

    /// Returns `true` if both handles refer to the same deferred value.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }
}

impl Future for Deferred {
    type Output = Result<Value, Value>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match &mut *self.state.borrow_mut() {
            State::Settled(result) => Poll::Ready(result.clone()),
            State::Pending(wakers) => {
                if !wakers.iter().any(|waker| waker.will_wake(cx.waker())) {
                    wakers.push(cx.waker().clone());
                }
                Poll::Pending
            }
        }
    }
}

impl fmt::Debug for Deferred {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deferred")
            .field("settled", &self.settled())
            .finish()
    }
}

impl Resolver {
    /// Settles the deferred value successfully.
    pub fn resolve(&self, value: impl Into<Value>) {
        self.settle(Ok(value.into()));
    }

    /// Settles the deferred value with an error.
    pub fn reject(&self, error: impl Into<Value>) {
        self.settle(Err(error.into()));
    }

    fn settle(&self, result: Result<Value, Value>) {
        let wakers = {
            let mut state = self.state.borrow_mut();
            if matches!(*state, State::Settled(_)) {
                return;
            }
            match mem::replace(&mut *state, State::Settled(result)) {
                State::Pending(wakers) => wakers,
                State::Settled(_) => Vec::new(),
            }
        };

        for waker in wakers {
            waker.wake();
        }
    }
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver").finish_non_exhaustive()
    }
}
