//! Fixed catalogs of topics, opening instructions and follow-up templates.
//!
//! Selection helpers take the random source as an argument so callers decide
//! between thread-local randomness and a seeded generator.

use crate::dialogue::entities::ChatSetting;
use rand::Rng;
use rand::seq::SliceRandom;

/// Subjects a worker rotates through between dialogues
pub const SUBJECTS: &[&str] = &[
    "Technology",
    "Science",
    "Health",
    "Education",
    "Business",
    "Entertainment",
    "Sports",
    "Politics",
    "Environment",
    "History",
    "Travel",
    "Food",
    "Music",
    "Books",
    "Movies",
    "Fashion",
    "Hobbies",
    "Relationships",
    "Fitness",
    "Culture",
    "Games",
    "Cartoons",
    "Toys",
    "Friends",
    "School",
    "Holidays",
];

/// Canned follow-up lines; `{topic}` is substituted at use
pub const FOLLOW_UP_TEMPLATES: &[&str] = &[
    "That's interesting. What do you think about {topic}?",
    "I've been wondering about {topic} lately. Any thoughts?",
    "Do you ever think about {topic}?",
    "I'm curious what you mean by that. Can you explain more?",
    "That reminds me of {topic}. Have you had any experiences with that?",
    "I agree. What about {topic}?",
    "How do you feel about {topic}?",
    "I've never thought about it that way. What else do you think about {topic}?",
];

/// Casual topics mixed into randomly generated follow-ups
pub const FOLLOW_UP_TOPICS: &[&str] = &[
    "traveling",
    "cooking",
    "movies",
    "books",
    "music",
    "sports",
    "technology",
    "art",
    "history",
    "science",
    "nature",
    "games",
];

const INSTRUCTION_PREFIX: &str = "Respond to the following statement without using the word \
'Exactly!', or 'Absolutely!' or 'Definitely!' because it doesn't sound human at the beginning:";

const INSTRUCTION_SUFFIX: &str = " Avoid repeating 'Absolutely!'. You can also try to change topic \
if you are starting to just agree with the statement. I don't want a loop of conversation just \
saying 'I agree!' or any statement like that.";

const PRETEND_BASIC: &str = "Let's pretend to have a basic conversation, also don't say that you \
are an AI, and don't repeat yourself, please respond with short paragraphs and limit to a basic \
vocabulary and grammar, I will do the same. I repeat respond with short paragraph.";

const MINIMAL_VOCABULARY: &str = "Let's pretend to have a basic conversation with minimal \
vocabulary, I also want you to limit your response to short paragraphs, I will do the same. \
I repeat respond with short paragraph.";

const SIMPLE_BRIEF: &str = "Let's have a simple conversation using limited vocabulary. Please \
keep your responses brief, and I'll do the same.";

/// (topic, instruction body) pairs behind [`chat_settings`]
const SETTING_ENTRIES: &[(&str, &str)] = &[
    ("life", PRETEND_BASIC),
    ("work", MINIMAL_VOCABULARY),
    ("travel", SIMPLE_BRIEF),
    ("school", SIMPLE_BRIEF),
    ("food", SIMPLE_BRIEF),
    ("technology", SIMPLE_BRIEF),
    ("Games", SIMPLE_BRIEF),
    ("Entertainment", SIMPLE_BRIEF),
    ("Books", SIMPLE_BRIEF),
    ("Music", SIMPLE_BRIEF),
    ("Movies", SIMPLE_BRIEF),
];

fn build_setting(topic: &str, body: &str) -> ChatSetting {
    ChatSetting::new(
        topic,
        format!("{}{}{}", INSTRUCTION_PREFIX, body, INSTRUCTION_SUFFIX),
    )
}

/// The full catalog of opening settings
pub fn chat_settings() -> Vec<ChatSetting> {
    SETTING_ENTRIES
        .iter()
        .map(|(topic, body)| build_setting(topic, body))
        .collect()
}

/// Pick one opening setting at random
pub fn random_chat_setting<R: Rng + ?Sized>(rng: &mut R) -> ChatSetting {
    let (topic, body) = SETTING_ENTRIES
        .choose(rng)
        .copied()
        .unwrap_or(SETTING_ENTRIES[0]);
    build_setting(topic, body)
}

/// Pick any subject from [`SUBJECTS`]
pub fn random_subject<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    SUBJECTS.choose(rng).copied().unwrap_or(SUBJECTS[0])
}

/// Pick a subject different from `current`.
///
/// Falls back to any subject only when the catalog has nothing else to offer.
pub fn next_subject<R: Rng + ?Sized>(current: &str, rng: &mut R) -> &'static str {
    let candidates: Vec<&'static str> = SUBJECTS
        .iter()
        .copied()
        .filter(|subject| *subject != current)
        .collect();
    candidates
        .choose(rng)
        .copied()
        .unwrap_or_else(|| random_subject(rng))
}

/// Whether `topic` belongs to the subject catalog
pub fn is_known_subject(topic: &str) -> bool {
    SUBJECTS.contains(&topic)
}

/// A follow-up built from a random template and a random casual topic
pub fn random_follow_up<R: Rng + ?Sized>(rng: &mut R) -> String {
    let template = FOLLOW_UP_TEMPLATES
        .choose(rng)
        .copied()
        .unwrap_or(FOLLOW_UP_TEMPLATES[0]);
    let topic = FOLLOW_UP_TOPICS
        .choose(rng)
        .copied()
        .unwrap_or(FOLLOW_UP_TOPICS[0]);
    super::template::PromptTemplate::follow_up(template, topic)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_chat_settings_are_well_formed() {
        let settings = chat_settings();
        assert_eq!(settings.len(), SETTING_ENTRIES.len());
        for setting in &settings {
            assert!(!setting.topic.is_empty());
            assert!(setting.initial_message.starts_with("Respond to the following statement"));
        }
    }

    #[test]
    fn test_random_chat_setting_is_from_catalog() {
        let mut rng = StdRng::seed_from_u64(42);
        let catalog = chat_settings();
        for _ in 0..20 {
            let setting = random_chat_setting(&mut rng);
            assert!(catalog.contains(&setting));
        }
    }

    #[test]
    fn test_next_subject_always_changes() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut current = "Music";
        for _ in 0..100 {
            let next = next_subject(current, &mut rng);
            assert_ne!(next, current);
            assert!(is_known_subject(next));
            current = next;
        }
    }

    #[test]
    fn test_next_subject_from_unknown_topic() {
        let mut rng = StdRng::seed_from_u64(9);
        assert!(is_known_subject(next_subject("life", &mut rng)));
    }

    #[test]
    fn test_random_follow_up_has_no_placeholder() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..20 {
            let prompt = random_follow_up(&mut rng);
            assert!(!prompt.contains("{topic}"));
            assert!(!prompt.is_empty());
        }
    }
}
