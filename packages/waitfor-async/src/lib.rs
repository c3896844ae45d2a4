//! Tiny single-threaded async runtime for `waitfor`.
//!
//! Every thread gets its own executor. It can spawn `!Send` tasks and block on futures, and it
//! exposes the single-step primitives ([`tick`] and [`park`]) that a synchronous caller uses to
//! keep pending work moving while it waits on something. A small reactor drives the timers in
//! [`time`].

mod executor;
mod reactor;

pub mod task;
pub mod time;

use std::{future::Future, time::Duration};

use executor::EXECUTOR;
pub use task::{spawn, yield_now};

/// Blocks the current thread until a return value can be extracted from the provided future.
///
/// Other spawned tasks keep running while the future is pending. Does not poll all futures to
/// completion.
pub fn block_on<F: Future + 'static>(future: F) -> F::Output {
    let task = spawn(future);
    EXECUTOR.with(|ex| ex.block_on(task))
}

/// Runs at most one unit of pending work on the current thread's executor.
///
/// Expired timers are woken first, then the oldest queued task (if any) is polled once. Returns
/// `true` if a task was polled.
pub fn tick() -> bool {
    let ran = EXECUTOR.with(|ex| ex.tick());
    log::trace!("executor tick (ran task: {ran})");
    ran
}

/// Sleeps the current thread until the next timer is due or `max` has elapsed, whichever comes
/// first.
///
/// Returns immediately if a task is already queued.
pub fn park(max: Duration) {
    EXECUTOR.with(|ex| ex.park(max));
}

/// Number of tasks currently queued to run on this thread.
#[must_use]
pub fn pending_tasks() -> usize {
    EXECUTOR.with(|ex| ex.pending())
}

#[cfg(test)]
mod test {
    use std::{
        cell::{Cell, RefCell},
        rc::Rc,
        time::Instant,
    };

    use super::*;
    use crate::time::sleep;

    #[test]
    fn tick_reports_work() {
        assert!(!tick());

        let ran = Rc::new(Cell::new(false));
        spawn({
            let ran = ran.clone();
            async move { ran.set(true) }
        })
        .detach();

        assert_eq!(pending_tasks(), 1);
        assert!(tick());
        assert!(ran.get());
        assert!(!tick());
    }

    #[test]
    fn block_on_runs_other_tasks() {
        let log = Rc::new(RefCell::new(Vec::new()));

        spawn({
            let log = log.clone();
            async move {
                sleep(Duration::from_millis(5)).await;
                log.borrow_mut().push("background");
            }
        })
        .detach();

        let output = block_on({
            let log = log.clone();
            async move {
                sleep(Duration::from_millis(20)).await;
                log.borrow_mut().push("main");
                42
            }
        });

        assert_eq!(output, 42);
        assert_eq!(*log.borrow(), ["background", "main"]);
    }

    #[test]
    fn sleep_waits_for_deadline() {
        let start = Instant::now();
        block_on(sleep(Duration::from_millis(30)));
        assert!(start.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn yield_now_lets_queued_tasks_run() {
        let order = Rc::new(RefCell::new(Vec::new()));

        let first = spawn({
            let order = order.clone();
            async move {
                order.borrow_mut().push(1);
                yield_now().await;
                order.borrow_mut().push(3);
            }
        });
        spawn({
            let order = order.clone();
            async move { order.borrow_mut().push(2) }
        })
        .detach();

        block_on(first);
        assert_eq!(*order.borrow(), [1, 2, 3]);
    }

    #[test]
    fn park_returns_early_when_work_is_queued() {
        spawn(async {}).detach();

        let start = Instant::now();
        park(Duration::from_secs(5));
        assert!(start.elapsed() < Duration::from_secs(1));
        while tick() {}
    }

    #[test]
    fn tick_is_reentrant() {
        let inner_ran = Rc::new(Cell::new(false));

        spawn({
            let inner_ran = inner_ran.clone();
            async move {
                spawn({
                    let inner_ran = inner_ran.clone();
                    async move { inner_ran.set(true) }
                })
                .detach();
                // drive the executor from inside a running task
                while !inner_ran.get() {
                    tick();
                }
            }
        })
        .detach();

        while tick() {}
        assert!(inner_ran.get());
    }

    #[test]
    fn joins_with_futures_util() {
        let (a, b) = block_on(futures_util::future::join(
            async {
                sleep(Duration::from_millis(5)).await;
                1
            },
            async { 2 },
        ));
        assert_eq!((a, b), (1, 2));
    }
}
