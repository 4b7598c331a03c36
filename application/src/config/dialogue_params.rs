//! Dialogue parameters: per-dialogue loop control.

use serde::{Deserialize, Serialize};

/// Controls how far a single dialogue runs and how it cleans up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueParams {
    /// Number of exchange rounds after the seed prompts.
    pub max_prompt: usize,
    /// Ask both backends to release their sessions once the dialogue ends.
    pub end_sessions: bool,
}

impl Default for DialogueParams {
    fn default() -> Self {
        Self {
            max_prompt: 5,
            end_sessions: false,
        }
    }
}

impl DialogueParams {
    // ==================== Builder Methods ====================

    pub fn with_max_prompt(mut self, max_prompt: usize) -> Self {
        self.max_prompt = max_prompt;
        self
    }

    pub fn with_end_sessions(mut self, end_sessions: bool) -> Self {
        self.end_sessions = end_sessions;
        self
    }
}
