//! Wait-time statistics for queue consumers.
//!
//! Collects how long each fetch call spent inside the queue, blocked time
//! included, and reports minimum, maximum, average and a bucketed
//! distribution. Used by the demo and bench drivers to show how often
//! consumers park on an empty queue.

use std::time::Duration;

const BUCKETS: usize = 20;

/// Tracks fetch latency with minimal overhead.
///
/// Accumulates measurements and keeps a fixed histogram; the last bucket
/// collects everything at or above its lower bound.
pub struct LatencyStats {
    pub min: u64,
    pub max: u64,
    pub sum: u64,
    pub count: u64,
    pub bucket_width_ns: u64,
    pub buckets: [u64; BUCKETS],
}

impl Default for LatencyStats {
    fn default() -> Self {
        Self::new(10_000)
    }
}

impl LatencyStats {
    /// Creates an empty tracker whose histogram buckets are
    /// `bucket_width_ns` nanoseconds wide.
    pub fn new(bucket_width_ns: u64) -> Self {
        Self {
            min: u64::MAX,
            max: 0,
            sum: 0,
            count: 0,
            bucket_width_ns: bucket_width_ns.max(1),
            buckets: [0; BUCKETS],
        }
    }

    pub fn update(&mut self, elapsed: Duration) {
        let nanos = u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX);
        self.min = self.min.min(nanos);
        self.max = self.max.max(nanos);
        self.sum = self.sum.saturating_add(nanos);
        self.count += 1;

        let idx = (nanos / self.bucket_width_ns).min(BUCKETS as u64 - 1) as usize;
        self.buckets[idx] += 1;
    }

    /// Average latency in nanoseconds, or 0.0 with no measurements.
    pub fn avg(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum as f64 / self.count as f64
        }
    }

    pub fn print_report(&self, title: &str) {
        println!("\n{}", title);
        println!("Count: {}", self.count);
        if self.count == 0 {
            return;
        }

        let avg_ns = self.avg();
        if avg_ns < 1000.0 {
            println!("Min:   {:.2} ns", self.min as f64);
            println!("Avg:   {:.2} ns", avg_ns);
            println!("Max:   {:.2} ns", self.max as f64);
        } else {
            println!("Min:   {:.2} us", self.min as f64 / 1000.0);
            println!("Avg:   {:.2} us", avg_ns / 1000.0);
            println!("Max:   {:.2} us", self.max as f64 / 1000.0);
        }

        let width_us = self.bucket_width_ns as f64 / 1000.0;
        println!("Distribution ({}us buckets):", width_us);
        for (i, &count) in self.buckets.iter().enumerate() {
            if count > 0 {
                let open_end = if i == BUCKETS - 1 { "+" } else { "" };
                let lower = i as f64 * width_us;
                let upper = (i + 1) as f64 * width_us;
                println!("[{:6.0}-{:6.0}{} us]: {}", lower, upper, open_end, count);
            }
        }
    }
}
