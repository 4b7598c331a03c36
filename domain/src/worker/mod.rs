//! Worker bookkeeping for the continuous scheduler.

pub mod state;
