//! Generator/handler demonstration.
//!
//! One thread appends a wrapping counter at a fixed rate while another
//! drains it in batches, either blocking in fetch with a timeout or polling
//! the emptiness query and sleeping. Both loops stop when the queue's
//! running flag is cleared.

use crate::stats::LatencyStats;
use anyhow::{Result, anyhow};
use cq_common::defaults;
use cq_core::{QueueConfig, QueueError, QueueHandle, ShutdownPolicy};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// How the handler thread waits for data.
#[derive(Clone, Copy, Debug)]
pub enum HandlerMode {
    /// Block inside fetch for at most this many milliseconds.
    Blocking { timeout_ms: i64 },
    /// Check `is_empty`, sleep when empty, then fetch without waiting.
    Polling { interval: Duration },
}

pub struct DemoOptions {
    pub capacity: usize,
    pub batch: usize,
    pub freq: u64,
    pub duration_secs: u64,
    pub mode: HandlerMode,
}

pub fn run_demo(opts: DemoOptions) -> Result<()> {
    println!("CIRCULAR QUEUE DEMO");
    println!("Capacity: {}", opts.capacity);
    println!("Batch: {}", opts.batch);
    println!("Target Freq: {} Hz", opts.freq);
    println!("Duration: {} s", opts.duration_secs);
    println!("Handler: {:?}", opts.mode);
    println!("-------------------------------");

    // An unbounded fetch would never notice the running flag on its own.
    let shutdown = match opts.mode {
        HandlerMode::Blocking { timeout_ms } if timeout_ms < 0 => ShutdownPolicy::WakeWaiters,
        _ => ShutdownPolicy::Cooperative,
    };
    let config = QueueConfig::new(opts.capacity).shutdown(shutdown);
    let queue = Arc::new(QueueHandle::with_config(config)?);

    let q_gen = queue.clone();
    let freq = opts.freq.max(1);
    let generator = thread::Builder::new()
        .name("generator".into())
        .spawn(move || generate(&q_gen, freq))?;

    let q_handle = queue.clone();
    let (batch, mode) = (opts.batch.max(1), opts.mode);
    let handler = thread::Builder::new()
        .name("handler".into())
        .spawn(move || handle(&q_handle, batch, mode))?;

    let start_time = Instant::now();
    let mut last_fetched = 0;

    while start_time.elapsed().as_secs() < opts.duration_secs {
        thread::sleep(Duration::from_secs(1));
        let stats = queue.stats()?;
        let tput = stats.fetched - last_fetched;
        last_fetched = stats.fetched;

        println!(
            "T={:2}s | Gen: {:8} | Fetched: {:8} ({:6}/s) | Overwritten: {:6} | Pending: {:3}",
            start_time.elapsed().as_secs(),
            stats.appended,
            stats.fetched,
            tput,
            stats.overwritten,
            stats.pending(),
        );
    }

    queue.set_running(false)?;
    generator
        .join()
        .map_err(|_| anyhow!("generator thread panicked"))??;
    let latency = handler
        .join()
        .map_err(|_| anyhow!("handler thread panicked"))??;

    latency.print_report("Fetch Latency (time inside fetch)");

    let mut queue =
        Arc::try_unwrap(queue).map_err(|_| anyhow!("queue still shared after shutdown"))?;
    let stats = queue.stats()?;
    println!(
        "Appended: {} | Fetched: {} | Overwritten: {} | Timeouts: {}",
        stats.appended, stats.fetched, stats.overwritten, stats.timeouts
    );
    queue.release();

    println!("Done.");
    Ok(())
}

/// Appends `1, 2, ..., 254, 0, 1, ...` until the running flag is cleared.
fn generate(queue: &QueueHandle, freq: u64) -> Result<(), QueueError> {
    let interval = Duration::from_micros(1_000_000 / freq);
    let mut value = 1;

    while queue.running()? {
        let start = Instant::now();
        queue.append(value)?;
        value = (value + 1) % defaults::VALUE_MODULUS;

        let spent = start.elapsed();
        if spent < interval {
            thread::sleep(interval - spent);
        }
    }
    info!("generator stopped");
    Ok(())
}

fn handle(queue: &QueueHandle, batch: usize, mode: HandlerMode) -> Result<LatencyStats, QueueError> {
    let mut latency = LatencyStats::new(100_000);
    let mut values = vec![0; batch];

    while queue.running()? {
        let start = Instant::now();
        let n = match mode {
            HandlerMode::Blocking { timeout_ms } => queue.fetch_ms(&mut values, timeout_ms)?,
            HandlerMode::Polling { interval } => {
                if queue.is_empty()? {
                    thread::sleep(interval);
                    debug!("queue empty, polling again");
                    continue;
                }
                queue.fetch_ms(&mut values, 0)?
            }
        };
        latency.update(start.elapsed());

        if n > 0 {
            debug!(n, values = ?&values[..n], "batch fetched");
        }
    }
    info!("handler stopped");
    Ok(latency)
}
