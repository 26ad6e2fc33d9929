use std::io;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};

use cpu_stress::config::{self, Opts};
use cpu_stress::progress::{self, ProgressView, RawTerminal};
use cpu_stress::{host, Mode, PoolConfig, WorkerPool};

fn main() -> Result<()> {
    let opts = Opts::parse();
    config::init_logging()?;

    if opts.workers == 0 {
        warn!("--workers 0: nothing to stress, exiting");
        return Ok(());
    }

    let cpu = host::cpu_summary();
    info!(
        "Stressing {} with {} workers ({} logical CPUs)",
        cpu.brand, opts.workers, cpu.logical_cpus
    );

    let pool = WorkerPool::start(PoolConfig::new(opts.workers, Mode::Cancellable))?;
    let stop = pool
        .stop_signal()
        .context("Cancellable pool has no stop signal")?;

    let stop_clone = stop.clone();
    ctrlc::set_handler(move || {
        stop_clone.cancel();
    })
    .context("Error setting Ctrl-C handler")?;

    let mut view = ProgressView::new(opts.workers, progress::terminal_columns());
    {
        let _raw = RawTerminal::enter()?;
        progress::run(
            &mut view,
            &stop,
            progress::TICK,
            &mut io::stdout().lock(),
            progress::terminal_event,
        )
        .context("Terminal UI failed")?;
    }

    pool.cancel();
    pool.wait();
    info!("CPU stress test completed.");
    Ok(())
}
