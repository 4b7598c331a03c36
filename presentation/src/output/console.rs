//! Console output formatter for worker summaries

use colored::Colorize;
use duet_domain::{WorkerExit, WorkerSummary};

/// Formats the end-of-run summaries for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format one line per worker followed by totals
    pub fn format(summaries: &[WorkerSummary]) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Worker Summary"));
        output.push('\n');

        if summaries.is_empty() {
            output.push_str(&format!("{}\n", "No workers ran.".dimmed()));
        }

        for summary in summaries {
            let exit = match summary.exit {
                WorkerExit::Stopped => summary.exit.to_string().green(),
                WorkerExit::Abandoned => summary.exit.to_string().red(),
            };
            output.push_str(&format!(
                "{:>4}  {:<12} {:>5} ok {:>5} failed {:>7} pairs  {}\n",
                summary.worker_id,
                summary.server_id.as_str(),
                summary.dialogues_succeeded,
                summary.dialogues_failed,
                summary.pairs_generated,
                exit
            ));
        }

        let totals = Totals::of(summaries);
        output.push_str(&format!(
            "\n{} {} dialogues succeeded, {} failed, {} pairs collected",
            "Total:".cyan().bold(),
            totals.succeeded,
            totals.failed,
            totals.pairs
        ));
        if totals.abandoned > 0 {
            output.push_str(&format!(
                " ({})",
                format!("{} workers abandoned", totals.abandoned).red()
            ));
        }
        output.push('\n');

        output.push_str(&Self::footer());
        output
    }

    /// Format as JSON
    pub fn format_json(summaries: &[WorkerSummary]) -> String {
        serde_json::to_string_pretty(summaries).unwrap_or_else(|_| "[]".to_string())
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn footer() -> String {
        format!("{}\n", "=".repeat(60).cyan())
    }
}

#[derive(Default)]
struct Totals {
    succeeded: usize,
    failed: usize,
    pairs: usize,
    abandoned: usize,
}

impl Totals {
    fn of(summaries: &[WorkerSummary]) -> Self {
        summaries.iter().fold(Self::default(), |mut totals, s| {
            totals.succeeded += s.dialogues_succeeded;
            totals.failed += s.dialogues_failed;
            totals.pairs += s.pairs_generated;
            if s.exit == WorkerExit::Abandoned {
                totals.abandoned += 1;
            }
            totals
        })
    }
}
