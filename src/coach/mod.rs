//! Heuristic coaching engine
//!
//! This module turns one transcribed answer into structured feedback:
//! - lexical analysis over fixed keyword sets
//! - profile fact extraction (name, country, interests)
//! - tiered scoring clamped to [20, 100]
//! - an ordered topic-rule table with per-attempt phrase rotation
//!
//! Everything here is pure and synchronous; the orchestrator owns the async
//! edges.

pub mod analysis;
pub mod generator;
pub mod history;
pub mod lexicon;
pub mod profile;
pub mod rules;
pub mod score;

pub use analysis::LexicalAnalysis;
pub use generator::{
    FeedbackResponse, FluencyFeedback, GrammarFeedback, Mood, ResponseGenerator,
    VocabularyFeedback,
};
pub use history::{Turn, TurnHistory, DEFAULT_HISTORY_CAPACITY};
pub use profile::{ProfileExtractor, UserProfile};
pub use rules::{ScoreTier, TopicBranch};
