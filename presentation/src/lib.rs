//! Presentation layer for duet
//!
//! This crate contains CLI definitions, the trigger HTTP server,
//! output formatters, and progress reporters.

pub mod cli;
pub mod output;
pub mod progress;
pub mod server;

// Re-export commonly used types
pub use cli::commands::{Cli, Command, OutputFormat, RunArgs, ServeArgs};
pub use output::console::ConsoleFormatter;
pub use progress::reporter::ConsoleProgress;
