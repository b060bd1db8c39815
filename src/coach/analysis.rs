use super::lexicon;

/// Lexical breakdown of one transcript.
///
/// Everything downstream (scoring, topic selection, suggestions) reads from
/// this struct, so the transcript is tokenized exactly once per turn.
#[derive(Debug, Clone, Default)]
pub struct LexicalAnalysis {
    /// Lowercased word tokens in transcript order.
    pub words: Vec<String>,
    pub word_count: usize,
    pub unique_words: usize,
    /// Words longer than 6 characters.
    pub long_words: usize,
    /// Non-empty segments split on `.`, `!`, `?`.
    pub sentence_count: usize,
    pub connective_count: usize,
    pub has_question: bool,
    pub has_interest: bool,
    pub has_positive: bool,
    pub has_negative: bool,
    pub has_family: bool,
    pub has_work: bool,
    pub has_food: bool,
    pub has_greeting: bool,
    /// Matched interest keywords, first occurrence order, deduped.
    pub interests: Vec<String>,
}

impl LexicalAnalysis {
    pub fn of(transcript: &str) -> Self {
        let lowered = transcript.to_lowercase();

        let words: Vec<String> = lowered
            .split(|c: char| !c.is_alphanumeric() && c != '\'')
            .filter(|w| !w.is_empty())
            .map(|w| w.trim_matches('\'').to_string())
            .filter(|w| !w.is_empty())
            .collect();

        let word_count = words.len();

        let mut seen = std::collections::HashSet::new();
        let mut unique_words = 0;
        for w in &words {
            if seen.insert(w.as_str()) {
                unique_words += 1;
            }
        }

        let long_words = words.iter().filter(|w| w.chars().count() > 6).count();
        let connective_count = words.iter().filter(|w| lexicon::is_connective(w)).count();

        let sentence_count = transcript
            .split(['.', '!', '?'])
            .filter(|s| !s.trim().is_empty())
            .count();

        let mut interests = Vec::new();
        for w in &words {
            if lexicon::is_interest(w) && !interests.contains(w) {
                interests.push(w.clone());
            }
        }

        let contains_any = |set: &[&str]| words.iter().any(|w| set.contains(&w.as_str()));

        Self {
            has_question: transcript.contains('?'),
            has_interest: !interests.is_empty(),
            has_positive: contains_any(lexicon::POSITIVE_WORDS),
            has_negative: contains_any(lexicon::NEGATIVE_WORDS),
            has_family: contains_any(lexicon::FAMILY_WORDS),
            has_work: contains_any(lexicon::WORK_WORDS),
            has_food: contains_any(lexicon::FOOD_WORDS),
            has_greeting: contains_any(lexicon::GREETING_WORDS),
            words,
            word_count,
            unique_words,
            long_words,
            sentence_count,
            connective_count,
            interests,
        }
    }

    /// Ratio of unique words to total words; 1.0 for empty input so the
    /// vocabulary-variety suggestion never fires on short answers.
    pub fn variety_ratio(&self) -> f32 {
        if self.word_count == 0 {
            1.0
        } else {
            self.unique_words as f32 / self.word_count as f32
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizes_and_counts() {
        let a = LexicalAnalysis::of("I really enjoy reading books because they help me relax");
        assert_eq!(a.word_count, 10);
        assert_eq!(a.unique_words, 10);
        assert!(a.has_interest);
        assert!(a.has_positive);
        assert_eq!(a.connective_count, 1);
        assert_eq!(a.interests, vec!["reading".to_string(), "books".to_string()]);
    }

    #[test]
    fn sentences_split_on_terminators() {
        let a = LexicalAnalysis::of("I like tea. Do you? Great!");
        assert_eq!(a.sentence_count, 3);
        assert!(a.has_question);
    }

    #[test]
    fn empty_input_is_all_zero() {
        let a = LexicalAnalysis::of("   ");
        assert_eq!(a.word_count, 0);
        assert_eq!(a.sentence_count, 0);
        assert!(!a.has_interest);
        assert!((a.variety_ratio() - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn long_words_counted() {
        // "wonderful" (9) and "photography" (11) exceed six characters.
        let a = LexicalAnalysis::of("wonderful photography is fun");
        assert_eq!(a.long_words, 2);
    }

    #[test]
    fn apostrophes_stay_inside_tokens() {
        let a = LexicalAnalysis::of("I'm happy");
        assert_eq!(a.words, vec!["i'm".to_string(), "happy".to_string()]);
    }
}
