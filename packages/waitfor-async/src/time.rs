//! Timers driven by the executor's reactor.
//!
//! A [`Sleep`] registers its deadline with the current thread's reactor the first time it is
//! polled. Every [`tick`](crate::tick) wakes the sleepers whose deadline has passed, and
//! [`park`](crate::park) never sleeps the thread past the earliest deadline.

use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
    time::{Duration, Instant},
};

use crate::executor::EXECUTOR;

/// A timer future that completes once its deadline has passed.
///
/// Created by [`sleep`] and [`sleep_until`].
#[derive(Debug)]
#[must_use = "futures do nothing unless you `.await` or poll them"]
pub struct Sleep {
    deadline: Instant,
    registered: bool,
}

impl Sleep {
    /// The instant this future completes at.
    #[must_use]
    pub const fn deadline(&self) -> Instant {
        self.deadline
    }
}

impl Future for Sleep {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if Instant::now() >= self.deadline {
            return Poll::Ready(());
        } else if !self.registered {
            let deadline = self.deadline;
            EXECUTOR.with(|ex| {
                ex.with_reactor(|reactor| {
                    reactor.sleepers.push(cx.waker().clone(), deadline);
                });
            });

            self.registered = true;
        }

        Poll::Pending
    }
}

/// A timer that completes `duration` from now.
///
/// Durations too large to add to the current instant saturate to a deadline decades away, so
/// the timer simply never fires.
///
/// # Examples
///
/// ```
/// use std::time::{Duration, Instant};
///
/// use waitfor_async::{block_on, time::sleep};
///
/// let start = Instant::now();
/// block_on(sleep(Duration::from_millis(20)));
/// assert!(start.elapsed() >= Duration::from_millis(20));
/// ```
pub fn sleep(duration: Duration) -> Sleep {
    let now = Instant::now();
    sleep_until(now.checked_add(duration).unwrap_or_else(|| far_future(now)))
}

fn far_future(now: Instant) -> Instant {
    now + Duration::from_secs(60 * 60 * 24 * 365 * 30)
}

/// A timer that completes at `deadline`.
///
/// A deadline in the past completes on the first poll without touching the reactor.
pub const fn sleep_until(deadline: Instant) -> Sleep {
    Sleep {
        deadline,
        registered: false,
    }
}
