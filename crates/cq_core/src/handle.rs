use crate::config::QueueConfig;
use crate::queue::CircularQueue;
use crate::stats::QueueStats;
use crate::{QueueError, Slot};
use std::time::Duration;
use tracing::debug;

/// Owning handle with an explicit release.
///
/// Wraps a [`CircularQueue`] so that the create/release lifecycle is visible
/// to callers. After [`release`](Self::release) every operation fails with
/// [`QueueError::Released`] and touches nothing; releasing again is a no-op.
/// Dropping an unreleased handle releases it.
///
/// Operations take `&self`, so the handle can be shared across threads by
/// reference or inside an `Arc`. `release` takes `&mut self`, which the
/// borrow checker only grants once every producer and consumer borrow has
/// ended.
pub struct QueueHandle {
    inner: Option<CircularQueue>,
}

impl QueueHandle {
    /// Creates a queue with `capacity` usable slots and default policies.
    pub fn create(capacity: usize) -> Result<Self, QueueError> {
        Self::with_config(QueueConfig::new(capacity))
    }

    /// Creates a queue from a full configuration.
    ///
    /// # Errors
    ///
    /// `InvalidCapacity` for a zero or overflowing capacity, `Allocation` if
    /// the slots cannot be reserved.
    pub fn with_config(config: QueueConfig) -> Result<Self, QueueError> {
        Ok(Self {
            inner: Some(CircularQueue::new(config)?),
        })
    }

    /// Tears down the queue and its synchronization primitives.
    pub fn release(&mut self) {
        match self.inner.take() {
            Some(queue) => drop(queue),
            None => debug!("release on an already released handle ignored"),
        }
    }

    /// True once [`release`](Self::release) has run.
    pub fn is_released(&self) -> bool {
        self.inner.is_none()
    }

    fn queue(&self) -> Result<&CircularQueue, QueueError> {
        self.inner.as_ref().ok_or(QueueError::Released)
    }

    /// Usable slots, fixed at creation.
    ///
    /// # Errors
    ///
    /// `Released` after release.
    pub fn capacity(&self) -> Result<usize, QueueError> {
        Ok(self.queue()?.capacity())
    }

    /// Reports whether the queue holds no values. Advisory only.
    ///
    /// # Errors
    ///
    /// `Released` after release, `Poisoned` if the lock is poisoned.
    pub fn is_empty(&self) -> Result<bool, QueueError> {
        self.queue()?.is_empty()
    }

    /// Number of values currently buffered.
    ///
    /// # Errors
    ///
    /// `Released` after release, `Poisoned` if the lock is poisoned.
    pub fn len(&self) -> Result<usize, QueueError> {
        self.queue()?.len()
    }

    /// Appends `value`, overwriting the oldest value when full.
    ///
    /// # Errors
    ///
    /// `Released` after release, `Poisoned` if the lock is poisoned. A full
    /// queue is not an error.
    pub fn append(&self, value: Slot) -> Result<(), QueueError> {
        self.queue()?.append(value)
    }

    /// Drains up to `out.len()` values, waiting at most `timeout` for the
    /// first one (`None` waits indefinitely). See [`CircularQueue::fetch`].
    ///
    /// # Errors
    ///
    /// `Released` after release, leaving `out` untouched; `Poisoned` if the
    /// lock is poisoned. A timeout is `Ok(0)`.
    pub fn fetch(&self, out: &mut [Slot], timeout: Option<Duration>) -> Result<usize, QueueError> {
        self.queue()?.fetch(out, timeout)
    }

    /// [`fetch`](Self::fetch) with a millisecond timeout; negative waits
    /// indefinitely.
    ///
    /// # Errors
    ///
    /// Same as [`fetch`](Self::fetch).
    pub fn fetch_ms(&self, out: &mut [Slot], timeout_ms: i64) -> Result<usize, QueueError> {
        self.queue()?.fetch_ms(out, timeout_ms)
    }

    /// Discards every buffered value without waking consumers.
    ///
    /// # Errors
    ///
    /// `Released` after release, `Poisoned` if the lock is poisoned.
    pub fn clear_all(&self) -> Result<(), QueueError> {
        self.queue()?.clear_all()
    }

    /// Sets the running flag; see [`ShutdownPolicy`](crate::ShutdownPolicy)
    /// for its effect on blocked consumers.
    ///
    /// # Errors
    ///
    /// `Released` after release, `Poisoned` if the lock is poisoned.
    pub fn set_running(&self, running: bool) -> Result<(), QueueError> {
        self.queue()?.set_running(running)
    }

    /// Reads the running flag.
    ///
    /// # Errors
    ///
    /// `Released` after release, `Poisoned` if the lock is poisoned.
    pub fn running(&self) -> Result<bool, QueueError> {
        self.queue()?.running()
    }

    /// Snapshot of the traffic counters.
    ///
    /// # Errors
    ///
    /// `Released` after release, `Poisoned` if the lock is poisoned.
    pub fn stats(&self) -> Result<QueueStats, QueueError> {
        self.queue()?.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cq_common::status;

    #[test]
    fn create_rejects_zero_capacity() {
        assert!(matches!(
            QueueHandle::create(0),
            Err(QueueError::InvalidCapacity(0))
        ));
    }

    #[test]
    fn operations_after_release_fail_without_effect() {
        let mut handle = QueueHandle::create(3).unwrap();
        handle.append(1).unwrap();
        handle.release();
        assert!(handle.is_released());

        assert_eq!(handle.append(2), Err(QueueError::Released));
        assert_eq!(handle.is_empty(), Err(QueueError::Released));
        assert_eq!(handle.clear_all(), Err(QueueError::Released));
        assert_eq!(handle.set_running(true), Err(QueueError::Released));
        assert_eq!(handle.running(), Err(QueueError::Released));

        let mut out = [5; 2];
        let err = handle.fetch_ms(&mut out, -1).unwrap_err();
        assert_eq!(err.status(), status::INVALID_HANDLE);
        assert_eq!(out, [5; 2]);
    }

    #[test]
    fn release_twice_is_noop() {
        let mut handle = QueueHandle::create(1).unwrap();
        handle.release();
        handle.release();
        assert!(handle.is_released());
    }

    #[test]
    fn shared_by_scoped_threads_then_released() {
        let mut handle = QueueHandle::create(8).unwrap();
        std::thread::scope(|s| {
            s.spawn(|| {
                for v in 0..4 {
                    handle.append(v).unwrap();
                }
            });
        });

        let mut out = [0; 8];
        assert_eq!(handle.fetch_ms(&mut out, 0).unwrap(), 4);
        assert_eq!(&out[..4], &[0, 1, 2, 3]);
        handle.release();
        assert_eq!(handle.capacity(), Err(QueueError::Released));
    }
}
