//! Console progress reporting for the worker pool

use colored::Colorize;
use duet_application::ports::progress::SchedulerProgress;
use duet_domain::{DialogueReport, ServerId, WorkerSummary};

/// Prints one line per scheduler event.
///
/// Lines from different workers interleave; each line names its worker.
pub struct ConsoleProgress;

impl ConsoleProgress {
    fn started_line(worker_id: usize, server_id: &ServerId, topic: &str) -> String {
        format!(
            "{} worker {} ({}) starting on '{}'",
            "->".cyan(),
            worker_id,
            server_id,
            topic
        )
    }

    fn dialogue_line(worker_id: usize, report: &DialogueReport, retries: u32) -> String {
        if report.is_success() {
            format!(
                "  {} worker {}: {} pairs ({})",
                "v".green(),
                worker_id,
                report.pairs_generated,
                report.outcome.as_str()
            )
        } else {
            format!(
                "  {} worker {}: {} (failure {} in a row)",
                "x".red(),
                worker_id,
                report.message,
                retries
            )
        }
    }

    fn abandoned_line(worker_id: usize, retries: u32) -> String {
        format!(
            "  {} worker {} abandoned after {} consecutive failures",
            "!".red().bold(),
            worker_id,
            retries
        )
    }
}

impl SchedulerProgress for ConsoleProgress {
    fn on_worker_started(&self, worker_id: usize, server_id: &ServerId, topic: &str) {
        println!("{}", Self::started_line(worker_id, server_id, topic));
    }

    fn on_dialogue_finished(&self, worker_id: usize, report: &DialogueReport, retries: u32) {
        println!("{}", Self::dialogue_line(worker_id, report, retries));
    }

    fn on_worker_abandoned(&self, worker_id: usize, retries: u32) {
        println!("{}", Self::abandoned_line(worker_id, retries));
    }

    fn on_worker_stopped(&self, summary: &WorkerSummary) {
        println!(
            "{} worker {} {}",
            "<-".dimmed(),
            summary.worker_id,
            summary.exit.to_string().dimmed()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use duet_domain::DialoguePhase;

    #[test]
    fn test_success_line_shows_pairs() {
        let line = ConsoleProgress::dialogue_line(2, &DialogueReport::completed(5), 0);
        assert!(line.contains("worker 2: 5 pairs (completed)"));
    }

    #[test]
    fn test_partial_success_counts_as_success() {
        let report = DialogueReport::stopped_early(3, "timeout");
        let line = ConsoleProgress::dialogue_line(0, &report, 0);
        assert!(line.contains("3 pairs (stopped_early)"));
    }

    #[test]
    fn test_failure_line_shows_message_and_retries() {
        let report = DialogueReport::aborted(DialoguePhase::Init, "connection refused");
        let line = ConsoleProgress::dialogue_line(1, &report, 3);
        assert!(line.contains("connection refused"));
        assert!(line.contains("failure 3 in a row"));
    }

    #[test]
    fn test_started_and_abandoned_lines() {
        let started = ConsoleProgress::started_line(4, &ServerId::for_worker(4), "Music");
        assert!(started.contains("worker 4 (server_4) starting on 'Music'"));

        let abandoned = ConsoleProgress::abandoned_line(4, 5);
        assert!(abandoned.contains("after 5 consecutive failures"));
    }
}
