// Worker pool lifecycle: fan-out, cancellation and the completion barrier.

use std::thread;
use std::time::{Duration, Instant};

use cpu_stress::{Mode, PoolConfig, WorkerPool, Workload};

// Generous bound for slow CI machines; one work unit takes nanoseconds.
const SETTLE: Duration = Duration::from_secs(5);

fn wait_for_live(pool: &WorkerPool, want: usize) -> bool {
    let deadline = Instant::now() + SETTLE;
    while Instant::now() < deadline {
        if pool.live_workers() == want {
            return true;
        }
        thread::sleep(Duration::from_millis(1));
    }
    false
}

#[test]
fn four_workers_register_then_deregister_on_cancel() {
    let pool = WorkerPool::start(PoolConfig::new(4, Mode::Cancellable)).unwrap();
    assert_eq!(pool.worker_count(), 4);
    assert!(wait_for_live(&pool, 4));
    assert!(!pool.is_finished());

    pool.cancel();
    assert!(pool.wait_timeout(SETTLE));
    assert_eq!(pool.live_workers(), 0);
    pool.wait();
}

#[test]
fn every_size_reaches_full_fan_out() {
    for n in 1..=3 {
        let pool = WorkerPool::start(PoolConfig::new(n, Mode::Cancellable)).unwrap();
        assert!(wait_for_live(&pool, n), "expected {} live workers", n);
        assert!(pool.live_workers() <= n);
        pool.cancel();
        pool.wait();
    }
}

#[test]
fn repeated_cancel_is_harmless() {
    let pool = WorkerPool::start(PoolConfig::new(2, Mode::Cancellable)).unwrap();
    let stop = pool.stop_signal().unwrap();
    assert!(wait_for_live(&pool, 2));

    pool.cancel();
    pool.cancel();
    stop.cancel();
    assert!(pool.wait_timeout(SETTLE));
    pool.cancel();
    pool.wait();
}

#[test]
fn concurrent_cancel_from_outside() {
    let pool = WorkerPool::start(PoolConfig::new(3, Mode::Cancellable)).unwrap();
    let cancellers: Vec<_> = (0..4)
        .map(|_| {
            let stop = pool.stop_signal().unwrap();
            thread::spawn(move || {
                stop.cancel();
            })
        })
        .collect();
    for c in cancellers {
        c.join().unwrap();
    }

    assert!(pool.wait_timeout(SETTLE));
    assert_eq!(pool.live_workers(), 0);
    pool.wait();
}

#[test]
fn wait_returns_promptly_after_cancel() {
    let pool = WorkerPool::start(
        PoolConfig::new(2, Mode::Cancellable).with_workload(Workload::new(90)),
    )
    .unwrap();
    assert!(wait_for_live(&pool, 2));

    let started = Instant::now();
    pool.cancel();
    pool.wait();
    assert!(started.elapsed() < SETTLE);
}

#[test]
fn zero_workers_returns_immediately() {
    for mode in [Mode::Cancellable, Mode::Unconditional] {
        let pool = WorkerPool::start(PoolConfig::new(0, mode)).unwrap();
        assert_eq!(pool.live_workers(), 0);
        assert!(pool.is_finished());
        assert!(pool.wait_timeout(Duration::ZERO));
        pool.wait();
    }
}

#[test]
fn default_worker_count_matches_host() {
    use clap::Parser;
    use cpu_stress::config::Opts;

    let opts = Opts::try_parse_from(["cpu-stress"]).unwrap();
    assert_eq!(opts.workers, num_cpus::get());
    assert_eq!(PoolConfig::new(opts.workers, Mode::Cancellable).workers, num_cpus::get());
}
