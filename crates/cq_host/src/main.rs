mod bench;
mod demo;
mod logging;
mod script;
mod stats;

use anyhow::Result;
use clap::{Parser, Subcommand};
use cq_common::defaults;
use std::time::Duration;

#[derive(Parser)]
#[command(about = "Drive a thread-safe circular queue")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a generator thread and a handler thread against one queue.
    Demo {
        #[arg(short, long, default_value_t = defaults::CAPACITY)]
        capacity: usize,
        #[arg(short, long, default_value_t = defaults::BATCH)]
        batch: usize,
        #[arg(short, long, default_value_t = defaults::GENERATOR_FREQ)]
        freq: u64,
        #[arg(short, long, default_value_t = 10)]
        duration: u64,
        /// Fetch timeout in milliseconds; negative waits indefinitely.
        #[arg(short, long, default_value_t = defaults::FETCH_TIMEOUT_MS, allow_hyphen_values = true)]
        timeout: i64,
        /// Poll `is_empty` and sleep instead of blocking in fetch.
        #[arg(long)]
        poll: bool,
    },
    /// Stress one queue with parallel producers and verify delivery.
    Bench {
        #[arg(short, long, default_value_t = 1024)]
        capacity: usize,
        #[arg(short, long, default_value_t = 4)]
        producers: usize,
        #[arg(short, long, default_value_t = 250_000)]
        values: usize,
        #[arg(short, long, default_value_t = 64)]
        batch: usize,
    },
    /// Replay a scenario script.
    Script { path: String },
}

fn main() -> Result<()> {
    logging::init_tracing();

    let cli = Cli::parse();
    match cli.command {
        Commands::Demo {
            capacity,
            batch,
            freq,
            duration,
            timeout,
            poll,
        } => {
            let mode = if poll {
                demo::HandlerMode::Polling {
                    interval: Duration::from_millis(defaults::POLL_INTERVAL_MS),
                }
            } else {
                demo::HandlerMode::Blocking { timeout_ms: timeout }
            };
            demo::run_demo(demo::DemoOptions {
                capacity,
                batch,
                freq,
                duration_secs: duration,
                mode,
            })?;
        }
        Commands::Bench {
            capacity,
            producers,
            values,
            batch,
        } => {
            bench::run_bench(bench::BenchOptions {
                capacity,
                producers,
                per_producer: values,
                batch,
            })?;
        }
        Commands::Script { path } => {
            script::run_script(&path)?;
        }
    }
    Ok(())
}
