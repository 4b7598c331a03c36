//! Retry policy shared by remote calls and worker scheduling.

pub mod backoff;
