// Kept in its own test binary: the worker below is never stopped and spins
// until this binary exits, so it must not share CPUs with timing tests.

use std::thread;
use std::time::{Duration, Instant};

use cpu_stress::{Mode, PoolConfig, WorkerPool, Workload};

#[test]
fn unconditional_pool_keeps_running() {
    let pool = WorkerPool::start(
        PoolConfig::new(1, Mode::Unconditional).with_workload(Workload::new(1)),
    )
    .unwrap();
    assert!(pool.stop_signal().is_none());

    let deadline = Instant::now() + Duration::from_secs(5);
    while pool.live_workers() < 1 && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(1));
    }
    assert_eq!(pool.live_workers(), 1);

    pool.cancel();
    assert!(!pool.wait_timeout(Duration::from_millis(200)));
    assert_eq!(pool.live_workers(), 1);
    assert!(!pool.is_finished());
}
