//! Thread-safe fixed-capacity circular queue of 32-bit integers.
//!
//! This crate provides a ring buffer with one reserved sentinel slot, wrapped
//! in a mutex and a not-empty condition variable so that any number of
//! producers and consumers can share it without an external lock. Producers
//! never block: a full queue drops its oldest value to admit the new one.
//! Consumers drain batches and may wait for data with an optional deadline
//! measured on the monotonic clock.

/// Queue construction parameters and wake-up policies.
///
/// Collects the capacity, the initial state of the running flag, and the
/// notification and shutdown policies applied by the synchronized queue.
/// Also hosts the conversion from the signed-millisecond timeout convention
/// to an optional `Duration`.
pub mod config;

/// Explicit-lifecycle handle around a synchronized queue.
///
/// Models the create/release contract: every operation on a released handle
/// fails with `QueueError::Released` instead of touching freed state, and
/// releasing twice is a no-op. Release requires exclusive access, so it can
/// never race with a producer or consumer still holding a borrow.
pub mod handle;

/// Synchronized circular queue built on a mutex and a condition variable.
///
/// Implements the overwrite-oldest append, the blocking batch fetch with a
/// monotonic deadline, the emptiness query, clearing and the cooperative
/// running flag. All state lives behind a single lock.
pub mod queue;

/// Sentinel-slot ring buffer arithmetic without synchronization.
///
/// Stores `capacity + 1` slots and two indices, so that `head == tail` means
/// empty and `tail + 1 == head` (modulo the slot count) means full. Used by
/// the synchronized queue under its lock.
pub mod ring;

/// Counters describing the traffic a queue has seen.
pub mod stats;

pub use config::{NotifyPolicy, QueueConfig, ShutdownPolicy};
pub use handle::QueueHandle;
pub use queue::CircularQueue;
pub use stats::QueueStats;

/// Value stored in each queue slot.
pub type Slot = i32;

/// Error types returned by queue operations.
///
/// A timed-out fetch is not an error; it reports a zero count. Every variant
/// maps onto a negative integer status through [`QueueError::status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum QueueError {
    /// The handle was released and no longer owns a queue.
    #[error("queue handle has been released")]
    Released,

    /// The capacity is zero, or adding the sentinel slot would overflow.
    #[error("invalid queue capacity {0}")]
    InvalidCapacity(usize),

    /// Storage for the ring could not be reserved.
    ///
    /// Nothing acquired during the failed creation attempt outlives the
    /// error.
    #[error("failed to allocate {0} queue slots")]
    Allocation(usize),

    /// The queue lock was poisoned by a thread that panicked while holding it.
    ///
    /// Surfaces from any lock acquisition, including the re-acquisition at
    /// the end of a condition wait.
    #[error("queue lock poisoned")]
    Poisoned,
}

impl QueueError {
    /// Returns the negative integer status code for this error.
    pub fn status(&self) -> i32 {
        use cq_common::status;
        match self {
            QueueError::Released => status::INVALID_HANDLE,
            QueueError::InvalidCapacity(_) => status::INVALID_CAPACITY,
            QueueError::Allocation(_) => status::ALLOCATION_FAILED,
            QueueError::Poisoned => status::WAIT_FAILED,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cq_common::status;

    #[test]
    fn statuses_are_negative_and_distinct() {
        let codes = [
            QueueError::Released.status(),
            QueueError::InvalidCapacity(0).status(),
            QueueError::Allocation(1).status(),
            QueueError::Poisoned.status(),
        ];
        for (i, a) in codes.iter().enumerate() {
            assert!(*a < status::OK);
            for b in &codes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
