//! Dialogue configuration from TOML (`[dialogue]` section)

use duet_application::DialogueParams;
use serde::{Deserialize, Serialize};

/// Raw dialogue configuration from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileDialogueConfig {
    /// Exchange rounds per dialogue
    pub max_prompt: usize,
    /// Release both sessions once a dialogue ends
    pub end_sessions: bool,
}

impl Default for FileDialogueConfig {
    fn default() -> Self {
        let params = DialogueParams::default();
        Self {
            max_prompt: params.max_prompt,
            end_sessions: params.end_sessions,
        }
    }
}

impl FileDialogueConfig {
    pub fn to_params(&self) -> DialogueParams {
        DialogueParams::default()
            .with_max_prompt(self.max_prompt)
            .with_end_sessions(self.end_sessions)
    }
}
