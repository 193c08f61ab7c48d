use crate::stats::LatencyStats;
use anyhow::{Result, anyhow, bail, ensure};
use bitvec::prelude::*;
use cq_core::{QueueError, QueueHandle, QueueStats};
use rayon::prelude::*;
use std::thread;
use std::time::Instant;

pub struct BenchOptions {
    pub capacity: usize,
    pub producers: usize,
    pub per_producer: usize,
    pub batch: usize,
}

/// What the draining consumer observed.
struct Drained {
    seen: BitVec<u64, Lsb0>,
    duplicates: u64,
    latency: LatencyStats,
}

/// Hammers one queue with parallel producers and a single consumer, then
/// checks that nothing was delivered twice and every appended value is
/// accounted for.
pub fn run_bench(opts: BenchOptions) -> Result<()> {
    let total = opts
        .producers
        .checked_mul(opts.per_producer)
        .filter(|&t| i32::try_from(t).is_ok())
        .ok_or_else(|| anyhow!("producers * per_producer must fit in an i32 value"))?;
    ensure!(total > 0, "nothing to append");

    println!(
        "Queue capacity {}, {} producers x {} values, batch {}",
        opts.capacity, opts.producers, opts.per_producer, opts.batch
    );
    println!("Starting Benchmark (Parallel Producers - Rayon)...");

    let mut queue = QueueHandle::create(opts.capacity)?;
    let start_bench = Instant::now();

    let drained = thread::scope(|s| -> Result<Drained> {
        let consumer = s.spawn(|| drain(&queue, total, opts.batch.max(1)));

        let produced = (0..opts.producers)
            .into_par_iter()
            .try_for_each(|p| {
                let base = p * opts.per_producer;
                (base..base + opts.per_producer).try_for_each(|v| queue.append(v as i32))
            });

        // Stop the consumer even if a producer failed.
        queue.set_running(false)?;
        let drained = consumer
            .join()
            .map_err(|_| anyhow!("consumer thread panicked"))??;
        produced?;
        Ok(drained)
    })?;

    let duration = start_bench.elapsed();
    let stats = queue.stats()?;
    let left = queue.len()? as u64;
    queue.release();

    let unique = drained.seen.count_ones() as u64;
    let seconds = duration.as_secs_f64();

    println!("Results");
    println!("Time: {:.4} s", seconds);
    println!("Throughput: {:.2} appends/s", stats.appended as f64 / seconds);
    println!(
        "Fetched: {} | Overwritten: {} | Unique: {} | Duplicates: {}",
        stats.fetched, stats.overwritten, unique, drained.duplicates
    );
    drained.latency.print_report("Fetch Latency (time inside fetch)");

    verify(&stats, total as u64, unique, drained.duplicates, left)
}

fn drain(queue: &QueueHandle, total: usize, batch: usize) -> Result<Drained, QueueError> {
    let mut seen = BitVec::<u64, Lsb0>::repeat(false, total);
    let mut duplicates = 0;
    let mut latency = LatencyStats::new(1_000);
    let mut values = vec![0; batch];

    while queue.running()? || !queue.is_empty()? {
        let start = Instant::now();
        let n = queue.fetch_ms(&mut values, 10)?;
        latency.update(start.elapsed());

        for &v in &values[..n] {
            // Values come from 0..total; anything else would be corruption
            // and is counted with the duplicates.
            let fresh = match usize::try_from(v).ok().filter(|&i| i < total) {
                Some(i) => !seen.replace(i, true),
                None => false,
            };
            if !fresh {
                duplicates += 1;
            }
        }
    }

    Ok(Drained {
        seen,
        duplicates,
        latency,
    })
}

/// Checks the drained values against the queue counters.
///
/// `left` is the number of values still buffered once the consumer stopped.
fn verify(stats: &QueueStats, total: u64, unique: u64, duplicates: u64, left: u64) -> Result<()> {
    if duplicates > 0 {
        bail!("{} values delivered twice or corrupted", duplicates);
    }
    if stats.appended != total {
        bail!("appended {} of {} values", stats.appended, total);
    }
    if stats.fetched != unique {
        bail!("fetched {} values but saw {} distinct", stats.fetched, unique);
    }
    let accounted = stats.fetched + stats.overwritten + stats.cleared + left;
    if accounted != stats.appended {
        bail!(
            "appended {} values but accounted for {} ({} still queued): {:?}",
            stats.appended,
            accounted,
            left,
            stats
        );
    }
    println!("Verified: every value delivered at most once.");
    Ok(())
}
