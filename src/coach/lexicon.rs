//! Fixed keyword sets driving lexical analysis and topic detection.
//!
//! All matching is done on lowercased word tokens, so every entry here is
//! lowercase.

/// Hobby/interest vocabulary. The order matters: the first matched entry
/// decides the interest sub-branch.
pub const INTEREST_WORDS: &[&str] = &[
    "music", "guitar", "piano", "singing", "reading", "books", "book",
    "cooking", "baking", "sports", "soccer", "football", "basketball",
    "running", "swimming", "movies", "films", "travel", "traveling", "games",
    "gaming", "art", "painting", "drawing", "photography", "dancing",
];

pub const POSITIVE_WORDS: &[&str] = &[
    "love", "like", "enjoy", "happy", "great", "good", "wonderful", "amazing",
    "fantastic", "excited", "favorite", "fun", "nice", "beautiful",
];

pub const NEGATIVE_WORDS: &[&str] = &[
    "hate", "dislike", "sad", "bad", "terrible", "tired", "boring",
    "difficult", "hard", "stressed", "angry", "worried",
];

pub const FAMILY_WORDS: &[&str] = &[
    "family", "mother", "father", "mom", "dad", "sister", "brother",
    "parents", "wife", "husband", "son", "daughter", "children", "kids",
    "grandmother", "grandfather",
];

pub const WORK_WORDS: &[&str] = &[
    "work", "job", "office", "company", "business", "boss", "colleague",
    "career", "student", "study", "school", "university", "teacher",
];

pub const FOOD_WORDS: &[&str] = &[
    "eat", "food", "pizza", "rice", "noodles", "breakfast", "lunch", "dinner",
    "cook", "restaurant", "delicious", "coffee", "tea", "fruit",
];

pub const GREETING_WORDS: &[&str] = &["hello", "hi", "hey", "morning", "afternoon", "evening"];

/// Connectives that mark a more advanced sentence structure.
pub const CONNECTIVE_WORDS: &[&str] = &[
    "because", "although", "however", "therefore", "moreover", "furthermore",
    "consequently", "meanwhile", "nevertheless",
];

/// Words never treated as a self-reported name even when they follow
/// "I'm" / "I am".
pub const NAME_STOPWORDS: &[&str] = &[
    "from", "a", "an", "the", "so", "very", "really", "not", "just", "going",
    "doing", "feeling", "fine", "good", "great", "happy", "sad", "tired",
    "okay", "ok", "here", "sorry", "sure",
];

pub fn is_interest(word: &str) -> bool {
    INTEREST_WORDS.contains(&word)
}

pub fn is_connective(word: &str) -> bool {
    CONNECTIVE_WORDS.contains(&word)
}
