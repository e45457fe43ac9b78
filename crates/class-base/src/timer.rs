//! Cancellable one-shot timers owned by a single host.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::time::Duration;

use crate::Result;

pub type TimerTask<H> = Box<dyn FnOnce(&mut H) -> Result<()>>;

/// Handle of a scheduled timer. Ids grow monotonically per queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

/// Timers ordered by `(deadline, id)`, so equal deadlines fire in
/// scheduling order.
pub struct TimerQueue<H> {
    next_id: u64,
    queue: BTreeMap<(Duration, TimerId), TimerTask<H>>,
    deadlines: HashMap<TimerId, Duration>,
}

impl<H> TimerQueue<H> {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            queue: BTreeMap::new(),
            deadlines: HashMap::new(),
        }
    }

    pub fn schedule(&mut self, deadline: Duration, task: TimerTask<H>) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        self.queue.insert((deadline, id), task);
        self.deadlines.insert(id, deadline);
        id
    }

    /// Drop a pending timer. Returns `false` if it already fired or was
    /// cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        match self.deadlines.remove(&id) {
            Some(deadline) => self.queue.remove(&(deadline, id)).is_some(),
            None => false,
        }
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.deadlines.contains_key(&id)
    }

    pub fn deadline(&self, id: TimerId) -> Option<Duration> {
        self.deadlines.get(&id).copied()
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.queue.keys().next().map(|(deadline, _)| *deadline)
    }

    /// Id the next scheduled timer will receive. Timers created from now on
    /// compare greater than or equal to it.
    pub fn watermark(&self) -> TimerId {
        TimerId(self.next_id)
    }

    /// Remove and return the earliest timer due at `now` that was scheduled
    /// before `watermark`.
    pub fn pop_due(&mut self, now: Duration, watermark: TimerId) -> Option<(TimerId, TimerTask<H>)> {
        let key = self
            .queue
            .keys()
            .take_while(|(deadline, _)| *deadline <= now)
            .find(|(_, id)| *id < watermark)
            .copied()?;
        let task = self.queue.remove(&key)?;
        self.deadlines.remove(&key.1);
        Some((key.1, task))
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
        self.deadlines.clear();
    }
}

impl<H> Default for TimerQueue<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> fmt::Debug for TimerQueue<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerQueue")
            .field("pending", &self.queue.len())
            .field("next_deadline", &self.next_deadline())
            .finish()
    }
}
