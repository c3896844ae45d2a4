use std::{
    cell::RefCell,
    collections::VecDeque,
    future::Future,
    pin::Pin,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    task::{Context, Poll},
    time::{Duration, Instant},
};

use async_task::Runnable;
use waker_fn::waker_fn;

use super::reactor::Reactor;
use crate::task::Task;

thread_local! {
    pub(crate) static EXECUTOR: Executor = const { Executor::new() };
}

/// How long `block_on` sleeps when neither its own task nor the queue has work.
const BLOCK_ON_IDLE: Duration = Duration::from_millis(10);

pub(crate) struct Executor {
    queue: RefCell<VecDeque<Runnable>>,
    reactor: RefCell<Reactor>,
}

impl Executor {
    pub const fn new() -> Self {
        Self {
            queue: RefCell::new(VecDeque::new()),
            reactor: RefCell::new(Reactor::new()),
        }
    }

    pub fn spawn<T: 'static>(&self, future: impl Future<Output = T> + 'static) -> Task<T> {
        // The schedule function goes through the thread local so it only ever touches the queue
        // of the thread the task was spawned on. `spawn_local` enforces that the task itself
        // never leaves it.
        let (runnable, task) = async_task::spawn_local(future, |runnable| {
            EXECUTOR.with(|ex| ex.queue.borrow_mut().push_back(runnable));
        });

        runnable.schedule();

        task
    }

    /// Run the provided closure with the reactor.
    pub(crate) fn with_reactor<R>(&self, f: impl FnOnce(&mut Reactor) -> R) -> R {
        f(&mut self.reactor.borrow_mut())
    }

    pub(crate) fn tick(&self) -> bool {
        let expired = self.reactor.borrow_mut().tick();
        for waker in expired {
            waker.wake();
        }

        let runnable = {
            let mut queue = self.queue.borrow_mut();
            queue.pop_front()
        };

        match runnable {
            Some(runnable) => {
                runnable.run();
                true
            }
            None => false,
        }
    }

    /// Sleeps the thread until the next timer is due, but never longer than `max`.
    pub(crate) fn park(&self, max: Duration) {
        if !self.queue.borrow().is_empty() {
            return;
        }

        let timeout = match self.reactor.borrow().sleepers.next_deadline() {
            Some(deadline) => deadline.saturating_duration_since(Instant::now()).min(max),
            None => max,
        };

        if !timeout.is_zero() {
            std::thread::sleep(timeout);
        }
    }

    pub(crate) fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    pub fn block_on<R>(&self, mut task: Task<R>) -> R {
        let woken = Arc::new(AtomicBool::new(true));

        let waker = waker_fn({
            let woken = woken.clone();
            move || woken.store(true, Ordering::Relaxed)
        });
        let mut cx = Context::from_waker(&waker);

        loop {
            if woken.swap(false, Ordering::Relaxed) {
                if let Poll::Ready(output) = Pin::new(&mut task).poll(&mut cx) {
                    return output;
                }
                self.tick();
                // there might be another future to poll, so we continue without sleeping
                continue;
            }

            if !self.tick() {
                self.park(BLOCK_ON_IDLE);
            }
        }
    }
}
