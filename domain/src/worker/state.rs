//! Per-worker mutable state and the summary left behind when a worker ends.

use crate::dialogue::entities::{ChatSetting, DialogueReport};
use crate::dialogue::value_objects::ServerId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a worker left its loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerExit {
    /// The shared stop signal was observed
    Stopped,
    /// The retry ceiling was reached
    Abandoned,
}

impl fmt::Display for WorkerExit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerExit::Stopped => f.write_str("stopped"),
            WorkerExit::Abandoned => f.write_str("abandoned"),
        }
    }
}

/// Counters owned by one worker for the lifetime of its task.
///
/// `retries` counts consecutive failed dialogues and is reset by any success.
#[derive(Debug, Clone)]
pub struct WorkerState {
    worker_id: usize,
    server_id: ServerId,
    setting: ChatSetting,
    retries: u32,
    running: bool,
    dialogues_succeeded: usize,
    dialogues_failed: usize,
    pairs_generated: usize,
}

impl WorkerState {
    pub fn new(worker_id: usize, server_id: ServerId, setting: ChatSetting) -> Self {
        Self {
            worker_id,
            server_id,
            setting,
            retries: 0,
            running: true,
            dialogues_succeeded: 0,
            dialogues_failed: 0,
            pairs_generated: 0,
        }
    }

    pub fn worker_id(&self) -> usize {
        self.worker_id
    }

    pub fn server_id(&self) -> &ServerId {
        &self.server_id
    }

    pub fn setting(&self) -> &ChatSetting {
        &self.setting
    }

    pub fn current_topic(&self) -> &str {
        &self.setting.topic
    }

    pub fn retries(&self) -> u32 {
        self.retries
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Fold a dialogue report into the counters.
    ///
    /// Returns whether the report counted as a success.
    pub fn record(&mut self, report: &DialogueReport) -> bool {
        self.pairs_generated += report.pairs_generated;
        if report.is_success() {
            self.retries = 0;
            self.dialogues_succeeded += 1;
            true
        } else {
            self.retries = self.retries.saturating_add(1);
            self.dialogues_failed += 1;
            false
        }
    }

    /// True once consecutive failures reached `ceiling`
    pub fn is_exhausted(&self, ceiling: u32) -> bool {
        self.retries >= ceiling
    }

    /// Replace the topic for the next dialogue; instructions stay the same
    pub fn rotate_topic(&mut self, topic: impl Into<String>) {
        self.setting = self.setting.with_topic(topic);
    }

    /// Mark the worker as finished and produce its summary
    pub fn finish(&mut self, exit: WorkerExit) -> WorkerSummary {
        self.running = false;
        WorkerSummary {
            worker_id: self.worker_id,
            server_id: self.server_id.clone(),
            dialogues_succeeded: self.dialogues_succeeded,
            dialogues_failed: self.dialogues_failed,
            pairs_generated: self.pairs_generated,
            exit,
        }
    }
}

/// What a worker accomplished before it exited
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerSummary {
    pub worker_id: usize,
    pub server_id: ServerId,
    pub dialogues_succeeded: usize,
    pub dialogues_failed: usize,
    pub pairs_generated: usize,
    pub exit: WorkerExit,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialogue::entities::DialoguePhase;

    fn state() -> WorkerState {
        WorkerState::new(0, ServerId::for_worker(0), ChatSetting::new("life", "hi"))
    }

    #[test]
    fn test_failures_accumulate_and_success_resets() {
        let mut state = state();
        let failed = DialogueReport::aborted(DialoguePhase::Init, "down");

        assert!(!state.record(&failed));
        assert!(!state.record(&failed));
        assert_eq!(state.retries(), 2);

        assert!(state.record(&DialogueReport::completed(3)));
        assert_eq!(state.retries(), 0);
    }

    #[test]
    fn test_exhaustion_at_ceiling() {
        let mut state = state();
        let failed = DialogueReport::stopped_early(0, "down");
        for _ in 0..4 {
            state.record(&failed);
        }
        assert!(!state.is_exhausted(5));
        state.record(&failed);
        assert!(state.is_exhausted(5));
    }

    #[test]
    fn test_rotate_topic_keeps_instructions() {
        let mut state = state();
        state.rotate_topic("Music");
        assert_eq!(state.current_topic(), "Music");
        assert_eq!(state.setting().initial_message, "hi");
    }

    #[test]
    fn test_finish_summarizes_counters() {
        let mut state = state();
        state.record(&DialogueReport::completed(2));
        state.record(&DialogueReport::stopped_early(1, "timeout"));
        state.record(&DialogueReport::aborted(DialoguePhase::Seed, "down"));

        let summary = state.finish(WorkerExit::Stopped);
        assert!(!state.is_running());
        assert_eq!(summary.dialogues_succeeded, 2);
        assert_eq!(summary.dialogues_failed, 1);
        assert_eq!(summary.pairs_generated, 3);
        assert_eq!(summary.exit, WorkerExit::Stopped);
    }
}
