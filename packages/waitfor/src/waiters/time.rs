use std::time::{Duration, Instant, SystemTime};

use waitfor_async::time::sleep;

use super::Args;
use crate::{
    bridge::Completion,
    error::Result,
    registry::{Registry, Waiter},
    value::Value,
};

/// `time(seconds)`: waits until `seconds` (fractional, non-negative) have elapsed.
///
/// Elapsed time is checked by a repeating timer firing every
/// [`poll_interval`](crate::WaitConfig::poll_interval), so the wait may overshoot by up to one
/// interval but never returns early.
#[derive(Debug, Clone, Copy, Default)]
pub struct Time;

impl Time {
    /// The registered name.
    pub const NAME: &'static str = "time";

    /// Starts the timer task and returns the completion it signals.
    fn start(registry: &Registry, args: Vec<Value>) -> Result<Completion<()>> {
        let seconds = Args::new(Self::NAME, args).take("seconds", |value| match value {
            Value::Number(seconds) if seconds.is_finite() && seconds >= 0.0 => Ok(seconds),
            other => Err(other),
        })?;

        let start = Instant::now();
        let duration = Duration::try_from_secs_f64(seconds).unwrap_or(Duration::MAX);
        let interval = registry.config().poll_interval;
        let done = Completion::new();

        waitfor_async::spawn({
            let done = done.clone();
            async move {
                while start.elapsed() < duration {
                    sleep(interval).await;
                }
                done.complete(());
            }
        })
        .detach();

        Ok(done)
    }
}

impl Waiter for Time {
    fn wait(&self, registry: &Registry, args: Vec<Value>) -> Result {
        let done = Self::start(registry, args)?;
        registry.wait_for(&done);
        Ok(Value::Null)
    }

    fn name(&self) -> Option<&str> {
        Some(Self::NAME)
    }
}

/// `date(when)`: waits until the wall clock reaches `when`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Date;

impl Date {
    /// The registered name.
    pub const NAME: &'static str = "date";
}

impl Waiter for Date {
    fn wait(&self, registry: &Registry, args: Vec<Value>) -> Result {
        let target = Args::new(Self::NAME, args).take("date", |value| match value {
            Value::Date(date) => Ok(date),
            other => Err(other),
        })?;

        registry.block_until(|| SystemTime::now() >= target);
        Ok(Value::Null)
    }

    fn name(&self) -> Option<&str> {
        Some(Self::NAME)
    }
}
