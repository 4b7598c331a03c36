//! Application-level configuration.
//!
//! This module provides configuration types that control how use cases behave:
//!
//! - [`DialogueParams`] - round limit and session teardown for one dialogue
//! - [`SchedulerParams`] - pacing, backoff and retry ceiling for workers

pub mod dialogue_params;
pub mod scheduler_params;

pub use dialogue_params::DialogueParams;
pub use scheduler_params::SchedulerParams;
