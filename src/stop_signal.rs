use std::sync::{Arc, atomic::{AtomicBool, Ordering}};

/// One-way stop flag shared between the pool and whoever may ask it to stop.
///
/// Clones share the same flag, so any holder can cancel. Workers only get a
/// [`StopWatcher`], which can observe but not trigger.
#[derive(Clone, Debug, Default)]
pub struct StopSignal {
    cancelled: Arc<AtomicBool>,
}

/// Read-only view of a [`StopSignal`].
#[derive(Clone, Debug)]
pub struct StopWatcher {
    cancelled: Arc<AtomicBool>,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip the flag to cancelled. Returns `true` only for the call that
    /// actually made the transition; later calls are no-ops.
    pub fn cancel(&self) -> bool {
        !self.cancelled.swap(true, Ordering::SeqCst)
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub fn watcher(&self) -> StopWatcher {
        StopWatcher {
            cancelled: Arc::clone(&self.cancelled),
        }
    }
}

impl StopWatcher {
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
