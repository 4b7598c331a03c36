//! Prompt templates for the dialogue flow

use super::catalog::FOLLOW_UP_TEMPLATES;
use crate::dialogue::entities::ChatSetting;

/// Placeholder substituted by [`PromptTemplate::follow_up`]
pub const TOPIC_TOKEN: &str = "{topic}";

/// Templates for generating prompts at each stage of a dialogue
pub struct PromptTemplate;

impl PromptTemplate {
    /// Opening prompt sent to participant A
    pub fn seed_prompt(setting: &ChatSetting) -> String {
        format!("{} topic: {}", setting.initial_message, setting.topic)
    }

    /// Cue sent to participant B so that it produces the first line
    pub fn opening_cue() -> &'static str {
        "You start the conversation"
    }

    /// Substitute every topic token in `template`
    pub fn follow_up(template: &str, topic: &str) -> String {
        template.replace(TOPIC_TOKEN, topic)
    }

    /// Follow-up used in place of a blank reply during round `round`.
    ///
    /// Templates rotate with the round number so consecutive blanks do not
    /// repeat the same line.
    pub fn follow_up_for_round(round: usize, topic: &str) -> String {
        let template = FOLLOW_UP_TEMPLATES[round % FOLLOW_UP_TEMPLATES.len()];
        Self::follow_up(template, topic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_prompt_format() {
        let setting = ChatSetting::new("travel", "Keep it short.");
        assert_eq!(
            PromptTemplate::seed_prompt(&setting),
            "Keep it short. topic: travel"
        );
    }

    #[test]
    fn test_follow_up_replaces_every_token() {
        let prompt = PromptTemplate::follow_up("{topic}? Really, {topic}!", "chess");
        assert_eq!(prompt, "chess? Really, chess!");
    }

    #[test]
    fn test_follow_up_without_token_is_unchanged() {
        let template = "I'm curious what you mean by that. Can you explain more?";
        assert_eq!(PromptTemplate::follow_up(template, "music"), template);
    }

    #[test]
    fn test_follow_up_is_deterministic() {
        let first = PromptTemplate::follow_up_for_round(3, "books");
        let second = PromptTemplate::follow_up_for_round(3, "books");
        assert_eq!(first, second);
        assert!(!first.contains(TOPIC_TOKEN));
    }

    #[test]
    fn test_follow_up_rotates_by_round() {
        let len = FOLLOW_UP_TEMPLATES.len();
        assert_eq!(
            PromptTemplate::follow_up_for_round(1, "art"),
            PromptTemplate::follow_up_for_round(1 + len, "art")
        );
        assert_ne!(
            PromptTemplate::follow_up_for_round(0, "art"),
            PromptTemplate::follow_up_for_round(1, "art")
        );
    }
}
