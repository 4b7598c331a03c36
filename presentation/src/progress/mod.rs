//! Progress reporting for the worker pool

pub mod reporter;
