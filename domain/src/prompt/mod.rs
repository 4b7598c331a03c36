//! Prompt domain
//!
//! Catalogs and templates for the prompts a dialogue sends. Everything here is
//! pure: the same inputs always give the same prompt.

pub mod catalog;
mod template;

pub use template::{PromptTemplate, TOPIC_TOKEN};
