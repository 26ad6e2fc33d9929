use std::hint::black_box;
use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use log::{debug, info, warn};

use crate::stop_signal::{StopSignal, StopWatcher};

pub const DEFAULT_FIB_N: u32 = 35;

const WAIT_POLL: Duration = Duration::from_millis(5);

/// Iterative Fibonacci. Wraps instead of overflowing past `fib(93)`.
pub fn fibonacci(n: u32) -> u64 {
    if n <= 1 {
        return n as u64;
    }
    let (mut prev, mut curr) = (0u64, 1u64);
    for _ in 2..=n {
        let next = prev.wrapping_add(curr);
        prev = curr;
        curr = next;
    }
    curr
}

/// One unit of busy work. Workers only check for a stop between units.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Workload {
    pub fib_n: u32,
}

impl Default for Workload {
    fn default() -> Self {
        Self { fib_n: DEFAULT_FIB_N }
    }
}

impl Workload {
    pub fn new(fib_n: u32) -> Self {
        Self { fib_n }
    }

    pub fn run_once(&self) -> u64 {
        black_box(fibonacci(black_box(self.fib_n)))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Never checks for a stop; runs until the process is killed.
    Unconditional,
    /// Checks the stop signal before every work unit.
    Cancellable,
}

#[derive(Clone, Copy, Debug)]
pub struct PoolConfig {
    pub workers: usize,
    pub workload: Workload,
    pub mode: Mode,
}

impl PoolConfig {
    pub fn new(workers: usize, mode: Mode) -> Self {
        Self {
            workers,
            workload: Workload::default(),
            mode,
        }
    }

    pub fn with_workload(mut self, workload: Workload) -> Self {
        self.workload = workload;
        self
    }
}

/// Held by a running worker; dropping it deregisters the worker.
struct Registration {
    live: Arc<AtomicUsize>,
}

impl Registration {
    fn enter(live: &Arc<AtomicUsize>) -> Self {
        live.fetch_add(1, Ordering::SeqCst);
        Self {
            live: Arc::clone(live),
        }
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

fn busy_loop(workload: Workload, stop: Option<StopWatcher>, live: Arc<AtomicUsize>) {
    let _registration = Registration::enter(&live);

    match stop {
        Some(stop) => {
            while !stop.is_cancelled() {
                workload.run_once();
            }
        }
        None => loop {
            workload.run_once();
        },
    }
}

/// Owns the worker threads, the stop signal (when cancellable) and the
/// live-worker counter.
///
/// Cancellation is cooperative: a worker in the middle of a work unit
/// finishes it before it sees the stop, so stop latency is one unit.
pub struct WorkerPool {
    config: PoolConfig,
    stop: Option<StopSignal>,
    live: Arc<AtomicUsize>,
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    pub fn start(config: PoolConfig) -> Result<Self> {
        let stop = match config.mode {
            Mode::Cancellable => Some(StopSignal::new()),
            Mode::Unconditional => None,
        };

        let mut pool = Self {
            config,
            stop,
            live: Arc::new(AtomicUsize::new(0)),
            handles: Vec::with_capacity(config.workers),
        };

        if config.workers == 0 {
            warn!("Worker pool started with 0 workers; nothing to run");
            return Ok(pool);
        }

        for id in 0..config.workers {
            let watcher = pool.stop.as_ref().map(StopSignal::watcher);
            let live = Arc::clone(&pool.live);
            let workload = config.workload;

            let handle = thread::Builder::new()
                .name(format!("cpu-stress-{}", id))
                .spawn(move || busy_loop(workload, watcher, live))
                .with_context(|| format!("Failed to spawn worker {}", id))?;
            pool.handles.push(handle);
        }

        info!(
            "Started {} {} workers (fib({}) per unit)",
            config.workers,
            match config.mode {
                Mode::Cancellable => "cancellable",
                Mode::Unconditional => "unconditional",
            },
            config.workload.fib_n
        );
        Ok(pool)
    }

    pub fn worker_count(&self) -> usize {
        self.config.workers
    }

    pub fn mode(&self) -> Mode {
        self.config.mode
    }

    /// Workers currently between registration and exit.
    pub fn live_workers(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    /// Handle for outside callers (key handlers, timers) to stop the pool.
    pub fn stop_signal(&self) -> Option<StopSignal> {
        self.stop.clone()
    }

    pub fn cancel(&self) {
        match &self.stop {
            Some(stop) => {
                if stop.cancel() {
                    info!("Stopping {} workers", self.config.workers);
                }
            }
            None => debug!("Cancel ignored: pool runs unconditionally"),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handles.iter().all(|h| h.is_finished())
    }

    /// Block until every worker has exited. In unconditional mode this only
    /// returns if the workers are torn down with the process.
    pub fn wait(mut self) {
        for handle in self.handles.drain(..) {
            if handle.join().is_err() {
                warn!("A worker thread panicked");
            }
        }
        debug!("All workers exited");
    }

    /// Wait at most `timeout` for all workers to exit. Returns `true` if
    /// they did.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            if self.is_finished() {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            thread::sleep(WAIT_POLL.min(deadline - now));
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        // Unconditional workers are left to die with the process.
        if let Some(stop) = &self.stop {
            stop.cancel();
        }
    }
}
