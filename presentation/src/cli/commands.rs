//! CLI command definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for the final worker summaries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Text,
    /// JSON array of summaries
    Json,
}

/// CLI arguments for duet
#[derive(Parser, Debug)]
#[command(name = "duet")]
#[command(author, version, about = "Pairs chat backends into dialogues and collects the exchanges")]
#[command(long_about = r#"
duet keeps N workers running two-party dialogues between remote chat backends.

Each dialogue opens a session on both participants, seeds participant A with
the opening instructions and topic, then forwards every reply to the other
side for a fixed number of rounds. Every completed round is stored as one
exchange pair.

Subcommands:
  run     Start the worker pool (default when no subcommand is given)
  serve   Start the trigger server that runs one dialogue per request

Configuration files are loaded from (in priority order):
1. DUET_* environment   e.g. DUET_SCHEDULER__WORKERS=4
2. --config <path>      Explicit config file
3. ./duet.toml          Project-level config
4. ~/.config/duet/config.toml   Global config

Example:
  duet run -n 4 --max-prompt 3
  duet run --in-process --base-port 8080 --second-base-port 9080
  duet serve --bind 0.0.0.0:8000
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress progress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long, global = true)]
    pub show_config: bool,

    /// Also write logs to daily-rotated files in this directory
    #[arg(long, value_name = "DIR", global = true)]
    pub log_dir: Option<PathBuf>,
}

impl Cli {
    /// The chosen subcommand; `run` with its defaults when none was given
    pub fn command(&self) -> Command {
        self.command
            .clone()
            .unwrap_or_else(|| Command::Run(RunArgs::default()))
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run the dialogue worker pool until interrupted
    Run(RunArgs),
    /// Serve the dialogue trigger endpoint
    Serve(ServeArgs),
}

/// Flags for `duet run`; unset values come from configuration
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct RunArgs {
    /// Number of concurrent workers
    #[arg(short = 'n', long = "workers", value_name = "N")]
    pub workers: Option<usize>,

    /// Trigger server base URL
    #[arg(
        long = "flask-server",
        alias = "flask_server",
        visible_alias = "trigger-url",
        value_name = "URL"
    )]
    pub trigger_url: Option<String>,

    /// Exchange rounds per dialogue
    #[arg(long = "max-prompt", alias = "max_prompt", value_name = "K")]
    pub max_prompt: Option<usize>,

    /// Scheme and host of the chat backends
    #[arg(long, value_name = "URL")]
    pub host: Option<String>,

    /// Port of worker 0's first participant; worker i uses base + i
    #[arg(long, value_name = "PORT")]
    pub base_port: Option<u16>,

    /// Port of worker 0's second participant; defaults to reusing the first
    #[arg(long, value_name = "PORT")]
    pub second_base_port: Option<u16>,

    /// Drive dialogues from this process instead of a trigger server
    #[arg(long)]
    pub in_process: bool,

    /// Summary output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

/// Flags for `duet serve`
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(long, value_name = "ADDR")]
    pub bind: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_defaults_to_run() {
        let cli = Cli::try_parse_from(["duet"]).unwrap();
        assert_eq!(cli.command(), Command::Run(RunArgs::default()));
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_run_flags() {
        let cli = Cli::try_parse_from([
            "duet",
            "run",
            "-n",
            "4",
            "--max-prompt",
            "3",
            "--flask-server",
            "http://trigger:8000",
            "--in-process",
            "-o",
            "json",
        ])
        .unwrap();

        let Command::Run(args) = cli.command() else {
            panic!("expected run");
        };
        assert_eq!(args.workers, Some(4));
        assert_eq!(args.max_prompt, Some(3));
        assert_eq!(args.trigger_url.as_deref(), Some("http://trigger:8000"));
        assert!(args.in_process);
        assert_eq!(args.output, OutputFormat::Json);
        assert!(args.base_port.is_none());
    }

    #[test]
    fn test_underscore_aliases() {
        let cli = Cli::try_parse_from([
            "duet",
            "run",
            "--flask_server",
            "http://x:1",
            "--max_prompt",
            "7",
        ])
        .unwrap();
        let Command::Run(args) = cli.command() else {
            panic!("expected run");
        };
        assert_eq!(args.trigger_url.as_deref(), Some("http://x:1"));
        assert_eq!(args.max_prompt, Some(7));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["duet", "serve", "--bind", "0.0.0.0:9000", "-vv", "--no-config"])
                .unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(cli.no_config);
        assert_eq!(
            cli.command(),
            Command::Serve(ServeArgs {
                bind: Some("0.0.0.0:9000".to_string())
            })
        );
    }

    #[test]
    fn test_show_config_without_subcommand() {
        let cli = Cli::try_parse_from(["duet", "--show-config"]).unwrap();
        assert!(cli.show_config);
        assert!(cli.command.is_none());
    }
}
