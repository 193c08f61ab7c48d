use crate::config::{NotifyPolicy, QueueConfig, ShutdownPolicy, timeout_from_millis};
use crate::ring::Ring;
use crate::stats::QueueStats;
use crate::{QueueError, Slot};
use std::sync::{Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// Everything guarded by the queue lock.
struct State {
    ring: Ring,
    running: bool,
    /// Bumped on each running-to-stopped transition under
    /// `ShutdownPolicy::WakeWaiters`; a waiter that sees it change gives up.
    stop_epoch: u64,
    stats: QueueStats,
}

/// Fixed-capacity circular queue shared by producers and consumers.
///
/// One mutex guards the ring, the running flag and the counters. Consumers
/// wait on a single not-empty condition variable that producers signal after
/// releasing the lock. The queue is `Sync`; share it by reference or `Arc`.
pub struct CircularQueue {
    state: Mutex<State>,
    not_empty: Condvar,
    capacity: usize,
    notify: NotifyPolicy,
    shutdown: ShutdownPolicy,
}

impl CircularQueue {
    /// Allocates the ring and the synchronization primitives.
    ///
    /// Either every resource is acquired or none is: a failed allocation
    /// returns an error and drops whatever was built so far.
    pub fn new(config: QueueConfig) -> Result<Self, QueueError> {
        config.validate()?;
        let ring = Ring::try_new(config.capacity)?;

        debug!(
            capacity = config.capacity,
            running = config.start_running,
            notify = ?config.notify,
            shutdown = ?config.shutdown,
            "queue created"
        );

        Ok(Self {
            state: Mutex::new(State {
                ring,
                running: config.start_running,
                stop_epoch: 0,
                stats: QueueStats::default(),
            }),
            not_empty: Condvar::new(),
            capacity: config.capacity,
            notify: config.notify,
            shutdown: config.shutdown,
        })
    }

    /// Usable slots; fixed at creation.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, QueueError> {
        self.state.lock().map_err(|_| QueueError::Poisoned)
    }

    /// Reports whether the queue holds no values.
    ///
    /// The answer can be stale as soon as the lock is released; callers
    /// polling on it must tolerate a concurrent append or fetch in between.
    pub fn is_empty(&self) -> Result<bool, QueueError> {
        Ok(self.lock()?.ring.is_empty())
    }

    /// Number of values currently buffered.
    pub fn len(&self) -> Result<usize, QueueError> {
        Ok(self.lock()?.ring.len())
    }

    /// Appends `value`, dropping the oldest value if the queue is full.
    ///
    /// Never blocks beyond the critical section and never fails for lack of
    /// room. Wakes a blocked consumer after the lock is released.
    pub fn append(&self, value: Slot) -> Result<(), QueueError> {
        {
            let mut state = self.lock()?;
            if let Some(dropped) = state.ring.push_overwrite(value) {
                state.stats.overwritten += 1;
                trace!(dropped, "queue full, oldest value overwritten");
            }
            state.stats.appended += 1;
            trace!(value, len = state.ring.len(), "value appended");
        }

        match self.notify {
            NotifyPolicy::One => self.not_empty.notify_one(),
            NotifyPolicy::All => self.not_empty.notify_all(),
        }
        Ok(())
    }

    /// Drains up to `out.len()` values into `out`, waiting while the queue
    /// is empty.
    ///
    /// `timeout` bounds the wait; `None` waits until data arrives. The
    /// deadline is taken from the monotonic clock once, on entry, so
    /// spurious wakeups do not extend it. When the deadline passes with the
    /// queue still empty, `out` is zero-filled and `Ok(0)` is returned.
    ///
    /// The batch size is the buffered length at the moment draining starts,
    /// capped by `out.len()`; values appended afterwards stay queued.
    pub fn fetch(&self, out: &mut [Slot], timeout: Option<Duration>) -> Result<usize, QueueError> {
        // A deadline past the clock's range is as good as none.
        let deadline = timeout.and_then(|t| Instant::now().checked_add(t));

        let interruptible = self.shutdown == ShutdownPolicy::WakeWaiters;
        let mut state = self.lock()?;
        let epoch = state.stop_epoch;

        while state.ring.is_empty() {
            if interruptible && (!state.running || state.stop_epoch != epoch) {
                debug!("fetch interrupted by shutdown");
                return Ok(Self::give_up(state, out));
            }

            state = match deadline {
                None => self
                    .not_empty
                    .wait(state)
                    .map_err(|_| QueueError::Poisoned)?,
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        debug!(?timeout, "fetch timed out");
                        return Ok(Self::give_up(state, out));
                    }
                    let (guard, _) = self
                        .not_empty
                        .wait_timeout(state, deadline - now)
                        .map_err(|_| QueueError::Poisoned)?;
                    guard
                }
            };
        }

        let n = state.ring.drain_into(out);
        state.stats.fetched += n as u64;
        trace!(n, left = state.ring.len(), "values fetched");
        Ok(n)
    }

    /// Same as [`fetch`](Self::fetch), with a signed millisecond timeout
    /// where any negative value waits indefinitely.
    pub fn fetch_ms(&self, out: &mut [Slot], timeout_ms: i64) -> Result<usize, QueueError> {
        self.fetch(out, timeout_from_millis(timeout_ms))
    }

    fn give_up(mut state: MutexGuard<'_, State>, out: &mut [Slot]) -> usize {
        state.stats.timeouts += 1;
        drop(state);
        out.fill(0);
        0
    }

    /// Discards every buffered value and resets both indices to zero.
    ///
    /// No consumer is woken and the running flag is left alone.
    pub fn clear_all(&self) -> Result<(), QueueError> {
        let mut state = self.lock()?;
        let discarded = state.ring.clear();
        state.stats.cleared += discarded as u64;
        debug!(discarded, "queue cleared");
        Ok(())
    }

    /// Sets the cooperative running flag.
    ///
    /// Under `ShutdownPolicy::Cooperative` this is a plain guarded store.
    /// Under `ShutdownPolicy::WakeWaiters`, clearing a set flag also wakes
    /// every blocked consumer and makes its fetch return an empty batch;
    /// while the flag stays cleared, fetch on an empty queue does not wait.
    pub fn set_running(&self, running: bool) -> Result<(), QueueError> {
        let mut state = self.lock()?;
        let stopping = state.running && !running;
        state.running = running;

        if stopping && self.shutdown == ShutdownPolicy::WakeWaiters {
            state.stop_epoch = state.stop_epoch.wrapping_add(1);
            drop(state);
            debug!("running flag cleared, waking consumers");
            self.not_empty.notify_all();
        }
        Ok(())
    }

    pub fn running(&self) -> Result<bool, QueueError> {
        Ok(self.lock()?.running)
    }

    pub fn stats(&self) -> Result<QueueStats, QueueError> {
        Ok(self.lock()?.stats)
    }
}

impl Drop for CircularQueue {
    fn drop(&mut self) {
        if let Ok(state) = self.state.get_mut() {
            debug!(
                capacity = self.capacity,
                pending = state.ring.len(),
                appended = state.stats.appended,
                overwritten = state.stats.overwritten,
                "queue released"
            );
        }
    }
}
