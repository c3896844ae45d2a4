//! The blocking bridge: turn "eventually" into "now" without starving the scheduler.
//!
//! [`block_until`] is a plain loop. It checks a predicate, and while the predicate is false it
//! hands the scheduler one [`tick`](Scheduler::tick) so pending work (timers, spawned tasks,
//! continuations) gets to run. The work it is usually waiting for is one of those tasks writing
//! a [`Completion`].
//!
//! The bridge keeps no state of its own. Nested calls (a waiter invoked from a task that some
//! outer waiter is pumping) each own their own predicate and completion, so they compose.

use std::{cell::RefCell, fmt, rc::Rc, time::Duration};

/// A cooperative scheduler that can be driven one step at a time.
pub trait Scheduler {
    /// Runs at most one unit of pending work, returning `true` if any work was done.
    fn tick(&self) -> bool;

    /// Called after a tick that did no work, to avoid spinning the CPU.
    ///
    /// Implementations may return early, e.g. when a timer is due sooner than `max`.
    fn park(&self, max: Duration) {
        std::thread::sleep(max);
    }
}

/// Drives the current thread's [`waitfor_async`] executor.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalScheduler;

impl Scheduler for LocalScheduler {
    fn tick(&self) -> bool {
        waitfor_async::tick()
    }

    fn park(&self, max: Duration) {
        waitfor_async::park(max);
    }
}

/// Runs `scheduler` until `done` returns `true`.
///
/// `done` is evaluated exactly once per iteration, before each tick, so predicates with side
/// effects (such as resuming a generator) advance one step per scheduler turn.
pub fn block_until(
    scheduler: &dyn Scheduler,
    idle_backoff: Duration,
    mut done: impl FnMut() -> bool,
) {
    let mut iterations: u64 = 0;
    log::trace!("entering blocking bridge");

    while !done() {
        iterations += 1;
        if !scheduler.tick() {
            scheduler.park(idle_backoff);
        }
    }

    log::trace!("leaving blocking bridge after {iterations} iterations");
}

/// A one-shot completion signal: a "done" flag fused with the slot holding the result.
///
/// Clones share the same slot. The first [`complete`](Completion::complete) wins; later ones are
/// ignored.
pub struct Completion<T> {
    slot: Rc<RefCell<Option<T>>>,
}

impl<T> Completion<T> {
    /// Creates a pending completion.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slot: Rc::new(RefCell::new(None)),
        }
    }

    /// Stores `value` and marks the completion done, unless it already was.
    pub fn complete(&self, value: T) {
        let mut slot = self.slot.borrow_mut();
        if slot.is_none() {
            *slot = Some(value);
        }
    }

    /// Whether a value has been stored.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.slot.borrow().is_some()
    }

    /// Removes the stored value.
    #[must_use]
    pub fn take(&self) -> Option<T> {
        self.slot.borrow_mut().take()
    }
}

impl<T> Clone for Completion<T> {
    fn clone(&self) -> Self {
        Self {
            slot: self.slot.clone(),
        }
    }
}

impl<T> Default for Completion<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Completion<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completion")
            .field("done", &self.is_done())
            .finish()
    }
}

#[cfg(test)]
mod test {
    use std::cell::Cell;

    use super::*;

    /// Finishes a completion after a fixed number of ticks.
    struct CountdownScheduler {
        remaining: Cell<u32>,
        ticks: Cell<u32>,
        parks: Cell<u32>,
        completion: Completion<&'static str>,
    }

    impl Scheduler for CountdownScheduler {
        fn tick(&self) -> bool {
            self.ticks.set(self.ticks.get() + 1);
            match self.remaining.get() {
                0 => false,
                1 => {
                    self.remaining.set(0);
                    self.completion.complete("finished");
                    true
                }
                n => {
                    self.remaining.set(n - 1);
                    true
                }
            }
        }

        fn park(&self, _: Duration) {
            self.parks.set(self.parks.get() + 1);
        }
    }

    #[test]
    fn ticks_until_done() {
        let completion = Completion::new();
        let scheduler = CountdownScheduler {
            remaining: Cell::new(3),
            ticks: Cell::new(0),
            parks: Cell::new(0),
            completion: completion.clone(),
        };

        let mut checks = 0;
        block_until(&scheduler, Duration::ZERO, || {
            checks += 1;
            completion.is_done()
        });

        assert_eq!(scheduler.ticks.get(), 3);
        assert_eq!(scheduler.parks.get(), 0);
        assert_eq!(checks, 4);
        assert_eq!(completion.take(), Some("finished"));
    }

    #[test]
    fn parks_when_idle() {
        let scheduler = CountdownScheduler {
            remaining: Cell::new(0),
            ticks: Cell::new(0),
            parks: Cell::new(0),
            completion: Completion::new(),
        };

        let mut checks = 0;
        block_until(&scheduler, Duration::ZERO, || {
            checks += 1;
            checks > 2
        });

        assert_eq!(scheduler.ticks.get(), 2);
        assert_eq!(scheduler.parks.get(), 2);
    }

    #[test]
    fn returns_without_ticking_when_already_done() {
        let scheduler = CountdownScheduler {
            remaining: Cell::new(5),
            ticks: Cell::new(0),
            parks: Cell::new(0),
            completion: Completion::new(),
        };

        block_until(&scheduler, Duration::ZERO, || true);
        assert_eq!(scheduler.ticks.get(), 0);
    }

    #[test]
    fn first_completion_wins() {
        let completion = Completion::new();
        completion.complete(1);
        completion.clone().complete(2);
        assert!(completion.is_done());
        assert_eq!(completion.take(), Some(1));
        assert!(!completion.is_done());
    }

    #[test]
    fn nested_bridges_use_independent_completions() {
        let outer = Completion::new();
        let inner = Completion::new();

        waitfor_async::spawn({
            let outer = outer.clone();
            let inner = inner.clone();
            async move {
                waitfor_async::spawn({
                    let inner = inner.clone();
                    async move { inner.complete("inner") }
                })
                .detach();

                block_until(&LocalScheduler, Duration::from_millis(1), || inner.is_done());
                outer.complete(inner.take());
            }
        })
        .detach();

        block_until(&LocalScheduler, Duration::from_millis(1), || outer.is_done());
        assert_eq!(outer.take(), Some(Some("inner")));
    }
}
