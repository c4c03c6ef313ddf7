//! Tick-synchronized deferred-work queue.
//!
//! Background threads cannot touch host state directly; they enqueue work
//! here and the tick pump runs it on the next frame pulse. This is the only
//! cross-context entry point in the core.

use crate::registry::{channels, EventRegistry};
use crossbeam::channel::{unbounded, Receiver, Sender};
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, error, warn};

/// A unit of deferred work. Runs exactly once, on the tick thread.
pub type FrameTask = Box<dyn FnOnce() + Send + 'static>;

/// Cloneable enqueue-side handle, safe to use from any thread.
#[derive(Clone)]
pub struct SchedulerHandle {
    tx: Sender<FrameTask>,
}

impl SchedulerHandle {
    /// Queues `task` for the next frame drain. Tasks run in enqueue order.
    pub fn enqueue<F>(&self, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        if self.tx.send(Box::new(task)).is_err() {
            warn!("frame task dropped: scheduler no longer exists");
        }
    }
}

/// FIFO task queue drained once per tick pulse, strictly before the `frame`
/// event is dispatched.
pub struct FrameScheduler {
    tx: Sender<FrameTask>,
    rx: Receiver<FrameTask>,
}

impl Default for FrameScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameScheduler {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle {
            tx: self.tx.clone(),
        }
    }

    /// Runs one tick pulse: drains the tasks queued so far, then dispatches
    /// the `frame` event.
    ///
    /// The queue is snapshotted before anything executes, so a task (or a
    /// frame handler) that enqueues more work sees it run on the *next*
    /// pulse, never recursively within this one. A panicking task is caught
    /// and logged; the rest of the snapshot still runs.
    pub fn run_frame(&self, registry: &EventRegistry) {
        let pending: Vec<FrameTask> = self.rx.try_iter().collect();
        if !pending.is_empty() {
            debug!(tasks = pending.len(), "draining frame tasks");
        }
        for (position, task) in pending.into_iter().enumerate() {
            if panic::catch_unwind(AssertUnwindSafe(task)).is_err() {
                error!(position, "frame task panicked; continuing with remaining tasks");
            }
        }
        registry.dispatch(channels::FRAME, Vec::new());
    }
}
