use crate::QueueError;
use std::time::Duration;

/// Which consumers an append wakes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotifyPolicy {
    /// Wake at most one blocked consumer per append.
    ///
    /// With several consumers parked on an empty queue, the others stay
    /// parked until later appends arrive.
    #[default]
    One,

    /// Wake every blocked consumer on each append.
    ///
    /// Consumers that lose the race for the data re-check the queue and go
    /// back to waiting with their original deadline.
    All,
}

/// How clearing the running flag interacts with blocked consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShutdownPolicy {
    /// The flag is advisory only. A blocked fetch returns once its deadline
    /// passes or data arrives; clearing the flag does not wake it.
    #[default]
    Cooperative,

    /// A running-to-stopped transition wakes every blocked consumer, and each
    /// fetch that was waiting at that moment returns an empty batch with a
    /// zero-filled output, exactly as if its deadline had passed. While the
    /// flag is cleared, a fetch that finds the queue empty returns the same
    /// way without waiting.
    WakeWaiters,
}

/// Parameters for constructing a queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueConfig {
    pub capacity: usize,
    pub start_running: bool,
    pub notify: NotifyPolicy,
    pub shutdown: ShutdownPolicy,
}

impl QueueConfig {
    /// Configuration with the given capacity, running flag set, wake-one
    /// notification and cooperative shutdown.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            start_running: true,
            notify: NotifyPolicy::One,
            shutdown: ShutdownPolicy::Cooperative,
        }
    }

    pub fn start_running(mut self, running: bool) -> Self {
        self.start_running = running;
        self
    }

    pub fn notify(mut self, notify: NotifyPolicy) -> Self {
        self.notify = notify;
        self
    }

    pub fn shutdown(mut self, shutdown: ShutdownPolicy) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// Checks the capacity without allocating.
    pub fn validate(&self) -> Result<(), QueueError> {
        if self.capacity == 0 || self.capacity.checked_add(1).is_none() {
            return Err(QueueError::InvalidCapacity(self.capacity));
        }
        Ok(())
    }
}

/// Converts a signed millisecond timeout into a wait bound.
///
/// Negative values mean "wait indefinitely" and map to `None`; zero means a
/// single check without waiting.
pub fn timeout_from_millis(timeout_ms: i64) -> Option<Duration> {
    u64::try_from(timeout_ms).ok().map(Duration::from_millis)
}
