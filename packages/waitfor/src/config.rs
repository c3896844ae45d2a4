use std::time::Duration;

/// Tuning knobs for a [`Registry`](crate::Registry).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitConfig {
    /// Resolution of the repeating timer used by the `time` waiter.
    pub poll_interval: Duration,
    /// Longest the bridge sleeps after a scheduler tick that found no work.
    pub idle_backoff: Duration,
}

impl WaitConfig {
    /// The default timer resolution of 25ms.
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(25);
    /// The default idle backoff of 1ms.
    pub const DEFAULT_IDLE_BACKOFF: Duration = Duration::from_millis(1);

    /// Creates the default configuration.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            poll_interval: Self::DEFAULT_POLL_INTERVAL,
            idle_backoff: Self::DEFAULT_IDLE_BACKOFF,
        }
    }

    /// Sets [`poll_interval`](Self::poll_interval).
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Sets [`idle_backoff`](Self::idle_backoff).
    #[must_use]
    pub const fn with_idle_backoff(mut self, idle_backoff: Duration) -> Self {
        self.idle_backoff = idle_backoff;
        self
    }
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self::new()
    }
}
