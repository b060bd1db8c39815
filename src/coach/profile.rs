use anyhow::{Context, Result};
use regex::Regex;
use serde::Serialize;

use super::analysis::LexicalAnalysis;
use super::lexicon;

/// Facts accumulated from the learner's speech over one conversation.
///
/// Name and country are first-write-wins: a later extraction never overwrites
/// an earlier one. Interests keep insertion order and are deduped. The
/// profile survives question changes and `clear_session`; only a brand-new
/// session starts from scratch.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UserProfile {
    pub name: Option<String>,
    pub country: Option<String>,
    pub interests: Vec<String>,
    pub conversation_count: u32,
}

impl UserProfile {
    pub fn note_interest(&mut self, interest: &str) {
        if !self.interests.iter().any(|i| i == interest) {
            self.interests.push(interest.to_string());
        }
    }
}

/// What one transcript revealed, whether or not it was written to the
/// profile (first-write-wins may have discarded it).
#[derive(Debug, Clone, Copy, Default)]
pub struct Extraction {
    pub name_mentioned: bool,
    pub country_mentioned: bool,
    pub interest_mentioned: bool,
}

impl Extraction {
    pub fn personal_info(&self) -> bool {
        self.name_mentioned || self.country_mentioned
    }
}

/// Pattern-based fact extractor. Regexes are compiled once per generator
/// instance rather than held in module-level statics.
pub struct ProfileExtractor {
    name_direct: Regex,
    name_casual: Regex,
    country: Regex,
}

impl ProfileExtractor {
    pub fn new() -> Result<Self> {
        Ok(Self {
            name_direct: Regex::new(r"my name is (\p{L}+)")
                .context("name pattern failed to compile")?,
            name_casual: Regex::new(r"\bi(?:'m| am) (\p{L}+)")
                .context("casual name pattern failed to compile")?,
            country: Regex::new(r"\bfrom (\p{L}+)")
                .context("country pattern failed to compile")?,
        })
    }

    /// Scan one lowercased transcript and merge what it reveals into the
    /// profile. Returns flags for scoring regardless of whether the profile
    /// already held the facts.
    pub fn absorb(
        &self,
        text: &str,
        analysis: &LexicalAnalysis,
        profile: &mut UserProfile,
    ) -> Extraction {
        let mut seen = Extraction::default();

        if let Some(cap) = self.country.captures(text).and_then(|c| c.get(1)) {
            seen.country_mentioned = true;
            if profile.country.is_none() {
                profile.country = Some(title_case(cap.as_str()));
            }
        }

        let name = self
            .name_direct
            .captures(text)
            .and_then(|c| c.get(1))
            .or_else(|| {
                self.name_casual
                    .captures(text)
                    .and_then(|c| c.get(1))
                    .filter(|m| !lexicon::NAME_STOPWORDS.contains(&m.as_str()))
            });
        if let Some(m) = name {
            seen.name_mentioned = true;
            if profile.name.is_none() {
                profile.name = Some(title_case(m.as_str()));
            }
        }

        for interest in &analysis.interests {
            seen.interest_mentioned = true;
            profile.note_interest(interest);
        }

        seen
    }
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
