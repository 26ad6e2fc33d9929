pub mod config;
pub mod cpu_stress;
pub mod host;
pub mod progress;
pub mod stop_signal;

pub use cpu_stress::{Mode, PoolConfig, WorkerPool, Workload};
pub use stop_signal::{StopSignal, StopWatcher};
