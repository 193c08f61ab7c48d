/// Snapshot of queue traffic counters.
///
/// Counters are updated under the queue lock, so a snapshot is internally
/// consistent: `appended == fetched + overwritten + cleared + len` for the
/// length observed in the same critical section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueStats {
    /// Values written by append.
    pub appended: u64,
    /// Values handed out by fetch.
    pub fetched: u64,
    /// Values dropped because the queue was full when a new one arrived.
    pub overwritten: u64,
    /// Values discarded by clear.
    pub cleared: u64,
    /// Fetch calls that gave up with an empty batch, on a passed deadline
    /// or a shutdown wake-up.
    pub timeouts: u64,
}

impl QueueStats {
    /// Values appended but neither fetched nor discarded.
    ///
    /// Saturates at zero if the counters disagree, for example when they
    /// were assembled by hand rather than read from a queue.
    pub fn pending(&self) -> u64 {
        self.appended
            .saturating_sub(self.fetched)
            .saturating_sub(self.overwritten)
            .saturating_sub(self.cleared)
    }
}
