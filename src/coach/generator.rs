use anyhow::{Context, Result};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::warn;

use crate::questions::Question;

use super::analysis::LexicalAnalysis;
use super::history::TurnHistory;
use super::profile::{ProfileExtractor, UserProfile};
use super::rules::{self, RuleContext, ScoreTier, TopicBranch};
use super::score;

/// Narration prosody tag derived from score tier and sentiment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    Enthusiastic,
    Encouraging,
    Supportive,
    Gentle,
}

#[derive(Debug, Clone, Serialize)]
pub struct GrammarFeedback {
    pub score: u8,
    pub issues: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VocabularyFeedback {
    pub score: u8,
    pub unique_words: usize,
    pub advanced_words: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct FluencyFeedback {
    pub score: u8,
    pub word_count: usize,
}

/// Structured coaching feedback for one answer. Immutable once produced.
#[derive(Debug, Clone, Serialize)]
pub struct FeedbackResponse {
    pub message: String,
    pub score: u8,
    pub suggestions: Vec<String>,
    pub mood: Mood,
    pub follow_up_question: String,
    pub confidence: f32,
    pub branch: TopicBranch,
    pub grammar: GrammarFeedback,
    pub vocabulary: VocabularyFeedback,
    pub fluency: FluencyFeedback,
}

/// Heuristic feedback engine. Deterministic given the same inputs; the only
/// randomness is the optional seeded score perturbation.
pub struct ResponseGenerator {
    extractor: ProfileExtractor,
    perturbation: Option<SmallRng>,
}

impl ResponseGenerator {
    pub fn new(perturbation_seed: Option<u64>) -> Result<Self> {
        Ok(Self {
            extractor: ProfileExtractor::new().context("building profile extractor")?,
            perturbation: perturbation_seed.map(SmallRng::seed_from_u64),
        })
    }

    /// Produce feedback for one answer. Never fails: internal errors degrade
    /// to a generic low-confidence response instead of propagating.
    pub fn generate(
        &mut self,
        question: &Question,
        transcript: &str,
        attempt: u32,
        profile: &mut UserProfile,
        history: &TurnHistory,
    ) -> FeedbackResponse {
        profile.conversation_count = profile.conversation_count.saturating_add(1);

        let trimmed = transcript.trim();
        if trimmed.chars().count() < 3 {
            return empty_input_response(question);
        }

        match self.compose(trimmed, attempt, profile, history) {
            Ok(feedback) => feedback,
            Err(e) => {
                warn!("feedback composition failed, using fallback: {:#}", e);
                fallback_response(question)
            }
        }
    }

    fn compose(
        &mut self,
        trimmed: &str,
        attempt: u32,
        profile: &mut UserProfile,
        history: &TurnHistory,
    ) -> Result<FeedbackResponse> {
        let lowered = trimmed.to_lowercase();
        let analysis = LexicalAnalysis::of(trimmed);
        let extraction = self.extractor.absorb(&lowered, &analysis, profile);

        let mut raw = score::raw_score(&analysis, extraction.personal_info(), !history.is_empty());
        if let Some(rng) = &mut self.perturbation {
            raw += rng.gen_range(-10..=10);
        }
        let final_score = score::clamp(raw);

        let ctx = RuleContext {
            text: &lowered,
            analysis: &analysis,
            profile,
        };

        let rule = rules::select_rule(&ctx);
        let mut message = match (rule.branch, &profile.country) {
            (TopicBranch::KnownLocation, Some(country)) => {
                rules::location_reply(country, attempt, rule.variants)
            }
            _ => rules::rotate(rule.variants, attempt).to_string(),
        };

        let tier = ScoreTier::of(final_score);
        if let Some(phrase) = rules::encouragement(tier, attempt) {
            message.push(' ');
            message.push_str(phrase);
        }

        let follow_up_question = rules::follow_up(&ctx, attempt);
        let suggestions = rules::suggestions(&analysis);

        let mood = match tier {
            ScoreTier::Excellent => Mood::Enthusiastic,
            ScoreTier::Good => Mood::Encouraging,
            _ if analysis.has_negative => Mood::Gentle,
            _ => Mood::Supportive,
        };

        let grammar = grammar_feedback(trimmed, final_score);
        let vocabulary = VocabularyFeedback {
            score: (final_score as u16 + 5).min(100) as u8,
            unique_words: analysis.unique_words,
            advanced_words: analysis.long_words,
        };
        let fluency = FluencyFeedback {
            score: final_score,
            word_count: analysis.word_count,
        };

        Ok(FeedbackResponse {
            message,
            score: final_score,
            suggestions,
            mood,
            follow_up_question,
            confidence: confidence_of(final_score),
            branch: rule.branch,
            grammar,
            vocabulary,
            fluency,
        })
    }
}

fn grammar_feedback(trimmed: &str, final_score: u8) -> GrammarFeedback {
    let mut issues = Vec::new();

    if trimmed
        .chars()
        .next()
        .map(|c| c.is_alphabetic() && c.is_lowercase())
        .unwrap_or(false)
    {
        issues.push("Start your sentences with a capital letter.".to_string());
    }

    // "me" in subject position: a sentence that opens with it.
    let me_as_subject = trimmed
        .split(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .any(|s| {
            let first = s
                .split_whitespace()
                .next()
                .map(str::to_lowercase)
                .unwrap_or_default();
            first == "me"
        });
    if me_as_subject {
        issues.push("Use 'I' instead of 'me' as the subject of a sentence.".to_string());
    }

    GrammarFeedback {
        score: (final_score as u16 + 10).min(100) as u8,
        issues,
    }
}

fn confidence_of(score: u8) -> f32 {
    0.5 + score as f32 / 200.0
}

/// Fixed response for transcripts too short to analyze. Skips lexical
/// analysis, scoring, and rule selection entirely.
fn empty_input_response(question: &Question) -> FeedbackResponse {
    let score = score::EMPTY_INPUT_SCORE;
    FeedbackResponse {
        message: "I didn't quite catch that. Take a breath and try answering again - \
                  even a short sentence is great practice!"
            .to_string(),
        score,
        suggestions: vec!["Try speaking for a few seconds so I can hear you clearly.".to_string()],
        mood: Mood::Gentle,
        follow_up_question: question.text.clone(),
        confidence: confidence_of(score),
        branch: TopicBranch::Fallback,
        grammar: GrammarFeedback {
            score: (score as u16 + 10).min(100) as u8,
            issues: Vec::new(),
        },
        vocabulary: VocabularyFeedback {
            score: (score as u16 + 5).min(100) as u8,
            unique_words: 0,
            advanced_words: 0,
        },
        fluency: FluencyFeedback { score, word_count: 0 },
    }
}

/// Degraded response when composition fails internally. Same shape as the
/// empty-input response with a generic encouragement.
fn fallback_response(question: &Question) -> FeedbackResponse {
    let mut response = empty_input_response(question);
    response.message =
        "Thanks for your answer! Keep practicing - every attempt makes you stronger.".to_string();
    response
}
