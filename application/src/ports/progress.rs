//! Progress notification port
//!
//! Defines the interface for observing the worker scheduler.

use duet_domain::{DialogueReport, ServerId, WorkerSummary};

/// Callback for scheduler events
///
/// Implementations live in the presentation layer and may be called from
/// every worker task at once.
pub trait SchedulerProgress: Send + Sync {
    /// Called once when a worker enters its loop
    fn on_worker_started(&self, _worker_id: usize, _server_id: &ServerId, _topic: &str) {}

    /// Called after every dialogue with the worker's consecutive failure count
    fn on_dialogue_finished(&self, worker_id: usize, report: &DialogueReport, retries: u32);

    /// Called when a worker gives up after reaching its retry ceiling
    fn on_worker_abandoned(&self, worker_id: usize, retries: u32);

    /// Called when a worker leaves its loop for any reason
    fn on_worker_stopped(&self, _summary: &WorkerSummary) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl SchedulerProgress for NoProgress {
    fn on_dialogue_finished(&self, _worker_id: usize, _report: &DialogueReport, _retries: u32) {}
    fn on_worker_abandoned(&self, _worker_id: usize, _retries: u32) {}
}
