//! Asynchronous tasks.

use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

/// A spawned task.
///
/// A [`Task`] can be awaited to retrieve the output of its future.
///
/// Dropping a [`Task`] cancels it, which means its future won't be polled again. To drop the
/// [`Task`] handle without canceling it, use [`detach()`][`Task::detach()`] instead. To cancel a
/// task gracefully and wait until it is fully destroyed, use the [`cancel()`][Task::cancel()]
/// method.
///
/// # Examples
///
/// ```
/// use waitfor_async::{block_on, spawn};
///
/// let task = spawn(async { 1 + 2 });
/// assert_eq!(block_on(task), 3);
/// ```
pub type Task<T> = async_task::Task<T>;

/// A spawned task with a fallible response.
pub type FallibleTask<T> = async_task::FallibleTask<T>;

use crate::executor::EXECUTOR;

/// Spawns a new async task on the current thread's executor.
///
/// The task only makes progress while something drives the executor, such as [`crate::tick`],
/// [`crate::block_on`] or a blocking waiter.
pub fn spawn<T: 'static>(future: impl Future<Output = T> + 'static) -> Task<T> {
    EXECUTOR.with(|ex| ex.spawn(future))
}

/// Yields once to the executor, letting other queued tasks run before resuming.
pub const fn yield_now() -> YieldNow {
    YieldNow { yielded: false }
}

/// Future returned by [`yield_now`].
#[derive(Debug)]
#[must_use = "futures do nothing unless you `.await` or poll them"]
pub struct YieldNow {
    yielded: bool,
}

impl Future for YieldNow {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if self.yielded {
            return Poll::Ready(());
        }

        self.yielded = true;
        cx.waker().wake_by_ref();
        Poll::Pending
    }
}
