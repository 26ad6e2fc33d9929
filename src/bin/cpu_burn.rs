//! Unconditional variant: workers never check for a stop. Kill the process
//! to end it.

use anyhow::Result;
use clap::Parser;
use log::{info, warn};

use cpu_stress::config::{self, Opts};
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
        "Burning {} with {} workers ({} logical CPUs). To stop, use: kill {}",
        cpu.brand,
        opts.workers,
        cpu.logical_cpus,
        std::process::id()
    );

    let pool = WorkerPool::start(PoolConfig::new(opts.workers, Mode::Unconditional))?;
    pool.wait();
    Ok(())
}
