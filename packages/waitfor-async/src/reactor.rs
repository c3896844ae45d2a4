use std::{collections::BTreeMap, task::Waker, time::Instant};

/// Timers waiting on a deadline, ordered by deadline then registration order.
pub struct Sleepers {
    sleepers: BTreeMap<(Instant, u64), Waker>,
    next_id: u64,
}

impl Sleepers {
    pub fn push(&mut self, waker: Waker, deadline: Instant) {
        self.sleepers.insert((deadline, self.next_id), waker);
        self.next_id = self.next_id.wrapping_add(1);
    }

    /// Removes every sleeper whose deadline is at or before `now`.
    pub fn pop_expired(&mut self, now: Instant) -> Vec<Waker> {
        let mut expired = Vec::new();
        while let Some(entry) = self.sleepers.first_entry() {
            if entry.key().0 > now {
                break;
            }
            expired.push(entry.remove());
        }
        expired
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.sleepers.first_key_value().map(|((deadline, _), _)| *deadline)
    }

    #[cfg(test)]
    pub fn count(&self) -> usize {
        self.sleepers.len()
    }
}

pub struct Reactor {
    pub(crate) sleepers: Sleepers,
}

impl Reactor {
    pub const fn new() -> Self {
        Self {
            sleepers: Sleepers {
                sleepers: BTreeMap::new(),
                next_id: 0,
            },
        }
    }

    /// Collects the wakers of every timer that has fired.
    ///
    /// The wakers are returned rather than woken here so the caller can release its borrow of the
    /// reactor first.
    pub fn tick(&mut self) -> Vec<Waker> {
        self.sleepers.pop_expired(Instant::now())
    }
}
