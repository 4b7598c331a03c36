//! Run Workers use case
//!
//! Keeps N dialogue loops running concurrently until the shared cancellation
//! token fires or a worker gives up. Each worker is sequential: one dialogue
//! at a time, then a pause, then the next dialogue on a fresh topic.

use crate::config::SchedulerParams;
use crate::ports::dialogue_runner::{DialogueRequest, DialogueRunner};
use crate::ports::progress::{NoProgress, SchedulerProgress};
use duet_domain::prompt::catalog;
use duet_domain::{ChatSetting, Endpoint, ServerId, WorkerExit, WorkerState, WorkerSummary};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Fixed assignment of one worker: its endpoints, opening setting and round limit
#[derive(Debug, Clone)]
pub struct WorkerAssignment {
    pub worker_id: usize,
    pub server_id: ServerId,
    pub first_endpoint: Endpoint,
    /// Second participant; the first endpoint is reused when absent
    pub second_endpoint: Option<Endpoint>,
    pub setting: ChatSetting,
    pub max_prompt: usize,
}

impl WorkerAssignment {
    pub fn new(
        worker_id: usize,
        first_endpoint: Endpoint,
        setting: ChatSetting,
        max_prompt: usize,
    ) -> Self {
        Self {
            worker_id,
            server_id: ServerId::for_worker(worker_id),
            first_endpoint,
            second_endpoint: None,
            setting,
            max_prompt,
        }
    }

    pub fn with_second_endpoint(mut self, endpoint: Endpoint) -> Self {
        self.second_endpoint = Some(endpoint);
        self
    }

    /// Trigger request for the worker's current setting
    fn request(&self, setting: &ChatSetting) -> DialogueRequest {
        let mut request = DialogueRequest::new(self.first_endpoint.clone(), setting, self.max_prompt)
            .with_server_id(self.server_id.clone());
        if let Some(second) = &self.second_endpoint {
            request = request.with_second_participant(second.clone());
        }
        request
    }
}

/// Use case for running many dialogue workers until shutdown
pub struct RunWorkersUseCase {
    runner: Arc<dyn DialogueRunner>,
    params: SchedulerParams,
    progress: Arc<dyn SchedulerProgress>,
    cancellation: CancellationToken,
}

impl RunWorkersUseCase {
    pub fn new(runner: Arc<dyn DialogueRunner>, cancellation: CancellationToken) -> Self {
        Self {
            runner,
            params: SchedulerParams::default(),
            progress: Arc::new(NoProgress),
            cancellation,
        }
    }

    pub fn with_params(mut self, params: SchedulerParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_progress(mut self, progress: Arc<dyn SchedulerProgress>) -> Self {
        self.progress = progress;
        self
    }

    /// Run every assignment until it stops or is abandoned.
    ///
    /// Returns one summary per worker, ordered by worker id.
    pub async fn execute(&self, assignments: Vec<WorkerAssignment>) -> Vec<WorkerSummary> {
        info!(
            "Starting {} workers (retry ceiling {})",
            assignments.len(),
            self.params.retry_ceiling()
        );

        let mut join_set = JoinSet::new();
        for assignment in assignments {
            let worker = Worker {
                assignment,
                runner: Arc::clone(&self.runner),
                params: self.params.clone(),
                progress: Arc::clone(&self.progress),
                cancellation: self.cancellation.clone(),
            };
            join_set.spawn(worker.run());
        }

        let mut summaries = Vec::new();
        while let Some(result) = join_set.join_next().await {
            match result {
                Ok(summary) => summaries.push(summary),
                Err(e) => warn!("Worker task join error: {}", e),
            }
        }

        summaries.sort_by_key(|summary| summary.worker_id);
        info!("All workers finished");
        summaries
    }
}

/// One worker task. Owns its state; shares only the runner and the token.
struct Worker {
    assignment: WorkerAssignment,
    runner: Arc<dyn DialogueRunner>,
    params: SchedulerParams,
    progress: Arc<dyn SchedulerProgress>,
    cancellation: CancellationToken,
}

impl Worker {
    async fn run(self) -> WorkerSummary {
        let worker_id = self.assignment.worker_id;
        let mut state = WorkerState::new(
            worker_id,
            self.assignment.server_id.clone(),
            self.assignment.setting.clone(),
        );
        self.progress
            .on_worker_started(worker_id, state.server_id(), state.current_topic());

        let exit = loop {
            if self.cancellation.is_cancelled() {
                break WorkerExit::Stopped;
            }

            let request = self.assignment.request(state.setting());
            let report = self.runner.run(request).await;
            let succeeded = state.record(&report);
            self.progress
                .on_dialogue_finished(worker_id, &report, state.retries());

            let next_topic = catalog::next_subject(state.current_topic(), &mut rand::thread_rng());
            state.rotate_topic(next_topic);

            let pause = if succeeded {
                self.success_delay()
            } else if state.is_exhausted(self.params.retry_ceiling()) {
                warn!(
                    "Worker {} ({}) abandoned after {} consecutive failures",
                    worker_id,
                    state.server_id(),
                    state.retries()
                );
                self.progress.on_worker_abandoned(worker_id, state.retries());
                break WorkerExit::Abandoned;
            } else {
                self.failure_delay(state.retries())
            };

            debug!("Worker {} pausing for {:?}", worker_id, pause);
            tokio::select! {
                biased;
                _ = self.cancellation.cancelled() => break WorkerExit::Stopped,
                _ = tokio::time::sleep(pause) => {}
            }
        };

        info!("Stopping worker {} ({}): {}", worker_id, state.server_id(), exit);
        let summary = state.finish(exit);
        self.progress.on_worker_stopped(&summary);
        summary
    }

    fn success_delay(&self) -> Duration {
        self.params
            .success_pacing()
            .jittered_delay(0, &mut rand::thread_rng())
    }

    /// Backoff after the `retries`-th consecutive failure (1-indexed)
    fn failure_delay(&self, retries: u32) -> Duration {
        self.params
            .failure_backoff
            .jittered_delay(retries.saturating_sub(1), &mut rand::thread_rng())
    }
}
