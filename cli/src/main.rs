//! CLI entrypoint for duet
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result};
use clap::Parser;
use duet_application::{
    ConversationStore, DialogueRunner, LocalDialogueRunner, NoConversationStore, NoProgress,
    RunWorkersUseCase, SchedulerProgress, WorkerAssignment,
};
use duet_domain::DomainError;
use duet_domain::prompt::catalog;
use duet_infrastructure::{
    ConfigLoader, FileConfig, HttpChatBackendFactory, RunnerMode, TriggerDialogueRunner,
};
use duet_presentation::{
    Cli, Command, ConsoleFormatter, ConsoleProgress, OutputFormat, RunArgs,
};
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Held until exit so buffered file logs are flushed
    let _log_guard = init_logging(cli.verbose, cli.log_dir.as_deref())?;

    let mut config = if cli.no_config {
        ConfigLoader::load_without_files()?
    } else {
        ConfigLoader::load(cli.config.as_ref())?
    };

    let command = cli.command();
    apply_overrides(&mut config, &command);

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_deref());
        println!();
        println!("Effective configuration:");
        println!("{}", toml::to_string_pretty(&config)?);
        return Ok(());
    }

    for warning in config.ensure_valid()? {
        warn!("{}", warning);
    }

    info!("Starting duet");

    // === Shutdown ===
    let shutdown = CancellationToken::new();
    let token = shutdown.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        info!("Shutdown requested; letting in-flight dialogues finish");
        token.cancel();
    });

    match command {
        Command::Run(args) => run(&config, &args, cli.quiet, shutdown).await,
        Command::Serve(_) => serve(&config, shutdown).await,
    }
}

/// Console logging filtered by `-v` (or `RUST_LOG`), plus an optional daily log file
fn init_logging(verbose: u8, log_dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let console = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    let (file, guard) = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("creating log directory {}", dir.display()))?;
            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, "duet.log"));
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file)
        .init();

    Ok(guard)
}

/// Command-line flags win over every config source
fn apply_overrides(config: &mut FileConfig, command: &Command) {
    match command {
        Command::Run(args) => {
            let scheduler = &mut config.scheduler;
            if let Some(workers) = args.workers {
                scheduler.workers = workers;
            }
            if let Some(url) = &args.trigger_url {
                scheduler.trigger_url = url.clone();
            }
            if let Some(host) = &args.host {
                scheduler.host = host.clone();
            }
            if let Some(port) = args.base_port {
                scheduler.base_port = port;
            }
            if args.second_base_port.is_some() {
                scheduler.second_base_port = args.second_base_port;
            }
            if args.in_process {
                scheduler.mode = RunnerMode::InProcess.as_str().to_string();
            }
            if let Some(max_prompt) = args.max_prompt {
                config.dialogue.max_prompt = max_prompt;
            }
        }
        Command::Serve(args) => {
            if let Some(bind) = &args.bind {
                config.server.bind = bind.clone();
            }
        }
    }
}

async fn run(
    config: &FileConfig,
    args: &RunArgs,
    quiet: bool,
    shutdown: CancellationToken,
) -> Result<()> {
    let scheduler = &config.scheduler;
    let (mode, _) = scheduler.parse_mode();

    // === Dependency Injection ===
    let runner: Arc<dyn DialogueRunner> = match mode {
        RunnerMode::Trigger => {
            let trigger = scheduler.trigger_endpoint()?;
            info!("Delegating dialogues to trigger server {}", trigger);
            Arc::new(
                TriggerDialogueRunner::new(trigger, config.trigger_timeout())?
                    .with_policy(config.client.backoff_policy()),
            )
        }
        RunnerMode::InProcess => Arc::new(local_runner(config, open_store(config)?)?),
    };

    let assignments = assignments(config)?;

    let progress: Arc<dyn SchedulerProgress> = if quiet {
        Arc::new(NoProgress)
    } else {
        Arc::new(ConsoleProgress)
    };

    if !quiet {
        println!();
        println!(
            "duet: {} workers, {} rounds per dialogue, mode {}",
            scheduler.workers, config.dialogue.max_prompt, mode
        );
        println!("Press Ctrl+C to stop after the current dialogues.");
        println!();
    }

    let summaries = RunWorkersUseCase::new(runner, shutdown)
        .with_params(scheduler.to_params())
        .with_progress(progress)
        .execute(assignments)
        .await;

    let output = match args.output {
        OutputFormat::Text => ConsoleFormatter::format(&summaries),
        OutputFormat::Json => ConsoleFormatter::format_json(&summaries),
    };
    println!("{}", output);

    Ok(())
}

/// One assignment per worker, each starting on a random setting
fn assignments(config: &FileConfig) -> Result<Vec<WorkerAssignment>, DomainError> {
    let scheduler = &config.scheduler;
    let mut rng = rand::thread_rng();
    (0..scheduler.workers)
        .map(|worker_id| {
            let (first, second) = scheduler.worker_endpoints(worker_id)?;
            let setting = catalog::random_chat_setting(&mut rng);
            let assignment =
                WorkerAssignment::new(worker_id, first, setting, config.dialogue.max_prompt);
            Ok(match second {
                Some(endpoint) => assignment.with_second_endpoint(endpoint),
                None => assignment,
            })
        })
        .collect()
}

async fn serve(config: &FileConfig, shutdown: CancellationToken) -> Result<()> {
    let bind = config.server.bind.as_str();
    let listener = TcpListener::bind(bind)
        .await
        .with_context(|| format!("binding trigger server to {}", bind))?;

    let store = open_store(config)?;
    let runner = Arc::new(local_runner(config, store)?);
    duet_presentation::server::serve(listener, runner, shutdown).await?;

    info!("Trigger server stopped");
    Ok(())
}

fn local_runner(
    config: &FileConfig,
    store: Arc<dyn ConversationStore>,
) -> Result<LocalDialogueRunner> {
    let factory = HttpChatBackendFactory::new(config.client.request_timeout())?
        .with_policy(config.client.backoff_policy())
        .with_teardown_path(config.client.teardown_path.clone());

    Ok(LocalDialogueRunner::new(Arc::new(factory))
        .with_store(store)
        .with_end_sessions(config.dialogue.end_sessions))
}

fn open_store(config: &FileConfig) -> Result<Arc<dyn ConversationStore>> {
    let log = config
        .storage
        .open_log()
        .context("opening conversation log")?;
    match log {
        Some(store) => {
            info!("Appending exchange pairs to {}", store.path().display());
            Ok(Arc::new(store))
        }
        None => {
            warn!("storage.conversation_log is not set; exchange pairs are discarded");
            Ok(Arc::new(NoConversationStore))
        }
    }
}

/// Resolves on Ctrl+C or, on Unix, SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
