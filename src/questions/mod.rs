//! Practice question bank
//!
//! Questions are drawn per difficulty level; the builtin bank cycles through
//! its lists so repeated draws rotate deterministically.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

/// Learner difficulty level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Beginner,
    Intermediate,
    Advanced,
}

/// One speaking prompt. Immutable once drawn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub text: String,
    pub level: Level,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_answer: Option<String>,
}

/// Question source.
pub trait QuestionBank: Send + Sync {
    /// Draw the next question for a level.
    fn next_question(&self, level: Level) -> Question;

    /// Levels this bank can serve, easiest first.
    fn levels(&self) -> &[Level];
}

const LEVELS: &[Level] = &[Level::Beginner, Level::Intermediate, Level::Advanced];

// (text, category, optional sample answer)
const BEGINNER: &[(&str, &str, Option<&str>)] = &[
    (
        "What is your name and where are you from?",
        "introductions",
        Some("My name is Ana and I am from Mexico."),
    ),
    (
        "What do you usually eat for breakfast?",
        "daily life",
        Some("I usually eat bread and eggs, and I drink coffee."),
    ),
    ("Can you describe your family?", "family", None),
    (
        "What do you like to do on weekends?",
        "hobbies",
        Some("On weekends I like to watch movies and go to the park."),
    ),
    ("What is your favorite food and why?", "food", None),
    ("Describe your home. What rooms does it have?", "daily life", None),
    ("What is the weather like today?", "daily life", None),
    ("Do you have any pets? Tell me about them.", "daily life", None),
];

const INTERMEDIATE: &[(&str, &str, Option<&str>)] = &[
    (
        "Tell me about a hobby you enjoy and how you got started with it.",
        "hobbies",
        Some("I enjoy reading because it helps me relax. I started when I was a child."),
    ),
    ("Describe your typical workday or school day.", "work", None),
    (
        "What was the best trip you have ever taken?",
        "travel",
        None,
    ),
    (
        "If you could learn any new skill, what would it be and why?",
        "opinion",
        None,
    ),
    ("Describe a person who has influenced your life.", "people", None),
    (
        "What do you think your city will look like in ten years?",
        "opinion",
        None,
    ),
    ("Tell me about a tradition in your country.", "culture", None),
];

const ADVANCED: &[(&str, &str, Option<&str>)] = &[
    (
        "Do you think technology brings people closer together or pushes them apart? Explain your view.",
        "opinion",
        None,
    ),
    (
        "Describe a difficult decision you had to make and how you approached it.",
        "reflection",
        None,
    ),
    (
        "How has your country changed in your lifetime, and do you think the changes are for the better?",
        "society",
        None,
    ),
    (
        "If you were given the chance to change one thing about your education, what would it be?",
        "opinion",
        None,
    ),
    (
        "What role should art play in public life? Support your opinion with examples.",
        "culture",
        None,
    ),
];

/// Built-in bank with per-level cycling cursors.
pub struct BuiltinBank {
    cursors: Mutex<HashMap<Level, usize>>,
}

impl BuiltinBank {
    pub fn new() -> Self {
        Self {
            cursors: Mutex::new(HashMap::new()),
        }
    }

    fn list(level: Level) -> &'static [(&'static str, &'static str, Option<&'static str>)] {
        match level {
            Level::Beginner => BEGINNER,
            Level::Intermediate => INTERMEDIATE,
            Level::Advanced => ADVANCED,
        }
    }

    fn cursors(&self) -> MutexGuard<'_, HashMap<Level, usize>> {
        match self.cursors.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Default for BuiltinBank {
    fn default() -> Self {
        Self::new()
    }
}

impl QuestionBank for BuiltinBank {
    fn next_question(&self, level: Level) -> Question {
        let list = Self::list(level);
        let index = {
            let mut cursors = self.cursors();
            let cursor = cursors.entry(level).or_insert(0);
            let index = *cursor % list.len();
            *cursor += 1;
            index
        };

        let (text, category, sample) = list[index];
        Question {
            text: text.to_string(),
            level,
            category: category.to_string(),
            sample_answer: sample.map(str::to_string),
        }
    }

    fn levels(&self) -> &[Level] {
        LEVELS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycles_through_level_list() {
        let bank = BuiltinBank::new();
        let first = bank.next_question(Level::Beginner);
        let second = bank.next_question(Level::Beginner);
        assert_ne!(first.text, second.text);

        // A full cycle returns to the first question.
        for _ in 0..BEGINNER.len() - 2 {
            bank.next_question(Level::Beginner);
        }
        let again = bank.next_question(Level::Beginner);
        assert_eq!(first.text, again.text);
    }

    #[test]
    fn levels_are_ordered_easiest_first() {
        let bank = BuiltinBank::new();
        assert_eq!(
            bank.levels(),
            &[Level::Beginner, Level::Intermediate, Level::Advanced]
        );
    }

    #[test]
    fn cursors_are_independent_per_level() {
        let bank = BuiltinBank::new();
        bank.next_question(Level::Beginner);
        let advanced = bank.next_question(Level::Advanced);
        assert_eq!(advanced.level, Level::Advanced);
        assert_eq!(advanced.text, ADVANCED[0].0);
    }
}
