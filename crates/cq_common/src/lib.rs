//! Common definitions and constants shared across the circular queue workspace.
//!
//! This module provides the integer status codes that mirror the queue's
//! sentinel-return contract, and the default tuning values used by the host
//! driver and its producer/consumer loops.

#![no_std]

/// Integer status codes reported by queue operations.
///
/// Callers that speak the integer contract (zero on success, negative on
/// failure) obtain these values from `QueueError::status`. Counts returned by
/// a successful fetch are never negative, so any negative value is an error.
pub mod status {
    /// The operation completed successfully.
    pub const OK: i32 = 0;

    /// The handle has already been released.
    ///
    /// Returned by every operation invoked after `release`. No queue state
    /// is touched when this code is produced.
    pub const INVALID_HANDLE: i32 = -1;

    /// A wait on the not-empty condition failed for a reason other than
    /// the deadline expiring.
    ///
    /// In practice this means another thread panicked while holding the
    /// queue lock. The lock is released before the code is returned.
    pub const WAIT_FAILED: i32 = -2;

    /// Storage for the ring could not be allocated during creation.
    pub const ALLOCATION_FAILED: i32 = -3;

    /// The requested capacity is zero or too large to hold the sentinel slot.
    pub const INVALID_CAPACITY: i32 = -4;
}

/// Default values for the producer/consumer driver.
///
/// These match the behaviour of the reference generator/handler pair: a
/// ten-slot queue, ten-value fetch batches and a 30 ms idle back-off.
pub mod defaults {
    /// Usable slots in the demo queue.
    pub const CAPACITY: usize = 10;

    /// Maximum number of values a consumer drains per fetch.
    pub const BATCH: usize = 10;

    /// Sleep applied by a polling consumer that finds the queue empty.
    pub const POLL_INTERVAL_MS: u64 = 30;

    /// Fetch timeout used by the blocking consumer loop.
    ///
    /// Bounds the shutdown latency of a consumer parked on an empty queue,
    /// since the running flag alone does not wake it.
    pub const FETCH_TIMEOUT_MS: i64 = 100;

    /// Generated values wrap at this modulus.
    pub const VALUE_MODULUS: i32 = 255;

    /// Target append rate of the demo generator, in values per second.
    pub const GENERATOR_FREQ: u64 = 1_000;
}
