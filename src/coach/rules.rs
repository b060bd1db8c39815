use serde::Serialize;

use super::analysis::LexicalAnalysis;
use super::profile::UserProfile;

/// Which topic rule produced the direct answer. Serialized into the feedback
/// so the UI (and tests) can see which branch fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TopicBranch {
    AskedOrigin,
    AskedName,
    AskedFeeling,
    KnownLocation,
    InterestMusic,
    InterestReading,
    InterestCooking,
    InterestSport,
    InterestGeneric,
    Family,
    Work,
    Food,
    Greeting,
    Positive,
    Negative,
    Fallback,
}

/// Everything a rule predicate may look at.
pub struct RuleContext<'a> {
    /// Lowercased transcript.
    pub text: &'a str,
    pub analysis: &'a LexicalAnalysis,
    pub profile: &'a UserProfile,
}

/// One tagged predicate/phrasing-variants pair. Rules are evaluated in
/// table order; the first match wins.
pub struct TopicRule {
    pub branch: TopicBranch,
    matches: fn(&RuleContext) -> bool,
    pub variants: &'static [&'static str],
}

/// Pick a phrasing variant by attempt number so consecutive attempts on the
/// same branch never repeat the exact same line.
pub fn rotate<'a>(variants: &[&'a str], attempt: u32) -> &'a str {
    if variants.is_empty() {
        return "";
    }
    variants[attempt as usize % variants.len()]
}

fn has_any_interest(ctx: &RuleContext, kinds: &[&str]) -> bool {
    ctx.analysis
        .interests
        .iter()
        .any(|i| kinds.contains(&i.as_str()))
}

/// The ordered rule table. Priority order is load-bearing: earlier rows mask
/// later ones.
pub const TOPIC_RULES: &[TopicRule] = &[
    TopicRule {
        branch: TopicBranch::AskedOrigin,
        matches: |ctx: &RuleContext| ctx.analysis.has_question && ctx.text.contains("where are you from"),
        variants: &[
            "I live in the cloud, so I get to practice English with people from everywhere!",
            "I'm from the internet, which means I'm always close by when you want to talk.",
        ],
    },
    TopicRule {
        branch: TopicBranch::AskedName,
        matches: |ctx: &RuleContext| {
            ctx.analysis.has_question
                && (ctx.text.contains("your name") || ctx.text.contains("who are you"))
        },
        variants: &[
            "I'm your English practice partner - you can just call me Coach.",
            "People call me Coach. I'm here to help you speak with confidence.",
        ],
    },
    TopicRule {
        branch: TopicBranch::AskedFeeling,
        matches: |ctx: &RuleContext| {
            ctx.analysis.has_question
                && (ctx.text.contains("how are you") || ctx.text.contains("how do you feel"))
        },
        variants: &[
            "I'm doing great, thanks for asking! Talking with you is the best part of my day.",
            "Wonderful, thank you! I always enjoy our conversations.",
        ],
    },
    TopicRule {
        branch: TopicBranch::KnownLocation,
        matches: |ctx: &RuleContext| ctx.profile.country.is_some(),
        variants: &[
            "It's lovely that you're from {country}! I'd really like to hear more about life there.",
            "{country} sounds like a wonderful place. What do you like most about it?",
            "Thanks for telling me about {country}. Every place has its own story!",
        ],
    },
    TopicRule {
        branch: TopicBranch::InterestMusic,
        matches: |ctx: &RuleContext| has_any_interest(ctx, &["music", "guitar", "piano", "singing"]),
        variants: &[
            "Music is such a great topic! It connects people across every language.",
            "I love that you're into music. Talking about songs is a fun way to practice.",
        ],
    },
    TopicRule {
        branch: TopicBranch::InterestReading,
        matches: |ctx: &RuleContext| has_any_interest(ctx, &["reading", "books", "book"]),
        variants: &[
            "Reading is wonderful! Books are one of the best ways to grow your English too.",
            "A fellow reader! Stories give us so much to talk about.",
        ],
    },
    TopicRule {
        branch: TopicBranch::InterestCooking,
        matches: |ctx: &RuleContext| has_any_interest(ctx, &["cooking", "baking"]),
        variants: &[
            "Cooking is a delicious hobby! I'd love to hear about your favorite dish.",
            "Someone who cooks always has good stories. What do you make most often?",
        ],
    },
    TopicRule {
        branch: TopicBranch::InterestSport,
        matches: |ctx: &RuleContext| {
            has_any_interest(
                ctx,
                &["sports", "soccer", "football", "basketball", "running", "swimming"],
            )
        },
        variants: &[
            "Sports keep life exciting! Playing and watching both give you lots to say.",
            "Great, a sports fan! There's always a match worth talking about.",
        ],
    },
    TopicRule {
        branch: TopicBranch::InterestGeneric,
        matches: |ctx: &RuleContext| ctx.analysis.has_interest,
        variants: &[
            "That sounds like a really enjoyable hobby!",
            "It's great that you have something you love doing.",
        ],
    },
    TopicRule {
        branch: TopicBranch::Family,
        matches: |ctx: &RuleContext| ctx.analysis.has_family,
        variants: &[
            "Family is so important. Thank you for sharing that with me.",
            "It's lovely to hear about your family!",
        ],
    },
    TopicRule {
        branch: TopicBranch::Work,
        matches: |ctx: &RuleContext| ctx.analysis.has_work,
        variants: &[
            "Work and study keep us busy! It's a big part of everyday conversation.",
            "Thanks for telling me about your work. That's useful vocabulary to practice.",
        ],
    },
    TopicRule {
        branch: TopicBranch::Food,
        matches: |ctx: &RuleContext| ctx.analysis.has_food,
        variants: &[
            "Food is one of my favorite subjects! Everyone has a dish they love.",
            "Now I'm curious about your favorite meal!",
        ],
    },
    TopicRule {
        branch: TopicBranch::Greeting,
        matches: |ctx: &RuleContext| ctx.analysis.has_greeting,
        variants: &[
            "Hello to you too! It's great to hear your voice.",
            "Hi there! I'm glad you're here to practice today.",
        ],
    },
    TopicRule {
        branch: TopicBranch::Positive,
        matches: |ctx: &RuleContext| ctx.analysis.has_positive,
        variants: &[
            "I can hear the enthusiasm in your answer - that's wonderful!",
            "Your positive energy comes through clearly!",
        ],
    },
    TopicRule {
        branch: TopicBranch::Negative,
        matches: |ctx: &RuleContext| ctx.analysis.has_negative,
        variants: &[
            "Thank you for sharing something difficult. Talking about it is good practice too.",
            "I hear you - not every day is easy. I'm glad you said it in English!",
        ],
    },
    TopicRule {
        branch: TopicBranch::Fallback,
        matches: |_: &RuleContext| true,
        variants: &[
            "Thanks for sharing that with me!",
            "That's interesting - tell me more next time!",
            "Good answer! Every sentence you speak is progress.",
        ],
    },
];

/// First matching rule in priority order. The fallback row matches
/// everything, so this always returns a rule.
pub fn select_rule(ctx: &RuleContext) -> &'static TopicRule {
    TOPIC_RULES
        .iter()
        .find(|rule| (rule.matches)(ctx))
        .unwrap_or(&TOPIC_RULES[TOPIC_RULES.len() - 1])
}

/// Country-specific direct answers for the `KnownLocation` branch. Countries
/// outside the table fall back to the branch's generic variants.
const COUNTRY_REPLIES: &[(&str, &str)] = &[
    ("japan", "Japan is fascinating - the mix of tradition and technology is amazing!"),
    ("brazil", "Brazil! Home of carnival and wonderful music. No wonder you're so expressive!"),
    ("india", "India has such rich culture and so many languages. English will fit right in!"),
    ("france", "France! The food, the art, the history - there's so much to talk about."),
    ("mexico", "Mexico has amazing food and warm people. I'd love to hear more!"),
    ("korea", "Korea is so dynamic - music, food, technology. Great conversation material!"),
    ("germany", "Germany! Precision and great bread. What part are you from?"),
    ("china", "China has thousands of years of history to draw stories from!"),
];

/// Direct answer for a learner with a known country.
pub fn location_reply(country: &str, attempt: u32, variants: &[&str]) -> String {
    let key = country.to_lowercase();
    if let Some((_, reply)) = COUNTRY_REPLIES.iter().find(|(c, _)| *c == key) {
        (*reply).to_string()
    } else {
        rotate(variants, attempt).replace("{country}", country)
    }
}

// ============================================================================
// Follow-up questions
// ============================================================================

const LOCATION_FOLLOW_UPS: &[&str] = &[
    "What is your favorite place in {country}?",
    "What should I try first if I ever visit {country}?",
];

const INTEREST_FOLLOW_UPS: &[&str] = &[
    "How did you first get into {interest}?",
    "How often do you make time for {interest}?",
];

const FAMILY_FOLLOW_UPS: &[&str] = &[
    "What do you enjoy doing together with your family?",
    "Who in your family do you talk to the most?",
];

const WORK_FOLLOW_UPS: &[&str] = &[
    "What does a typical day at work look like for you?",
    "What is the best part of your job or studies?",
];

const GENERIC_FOLLOW_UPS: &[&str] = &[
    "What did you do last weekend?",
    "What are you looking forward to this week?",
    "Can you describe your favorite place in your city?",
    "What is something new you learned recently?",
];

/// Pick exactly one follow-up question by priority:
/// known location > detected interest > family > work > generic pool.
pub fn follow_up(ctx: &RuleContext, attempt: u32) -> String {
    if let Some(country) = &ctx.profile.country {
        return rotate(LOCATION_FOLLOW_UPS, attempt).replace("{country}", country);
    }
    if let Some(interest) = ctx.analysis.interests.first() {
        return rotate(INTEREST_FOLLOW_UPS, attempt).replace("{interest}", interest);
    }
    if ctx.analysis.has_family {
        return rotate(FAMILY_FOLLOW_UPS, attempt).to_string();
    }
    if ctx.analysis.has_work {
        return rotate(WORK_FOLLOW_UPS, attempt).to_string();
    }
    rotate(GENERIC_FOLLOW_UPS, attempt).to_string()
}

// ============================================================================
// Encouragement
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreTier {
    Excellent,
    Good,
    Average,
    NeedsWork,
}

impl ScoreTier {
    pub fn of(score: u8) -> Self {
        match score {
            85..=u8::MAX => Self::Excellent,
            70..=84 => Self::Good,
            55..=69 => Self::Average,
            _ => Self::NeedsWork,
        }
    }
}

const EXCELLENT_PHRASES: &[&str] = &[
    "Your English sounded fantastic just now!",
    "That was a superb answer - fluent and clear!",
];

const GOOD_PHRASES: &[&str] = &[
    "You expressed that really well!",
    "Nice work - your sentences are getting stronger!",
];

/// Personalized encouragement appended only to good-or-better answers
/// (score >= 70), rotated like the topic variants.
pub fn encouragement(tier: ScoreTier, attempt: u32) -> Option<&'static str> {
    match tier {
        ScoreTier::Excellent => Some(rotate(EXCELLENT_PHRASES, attempt)),
        ScoreTier::Good => Some(rotate(GOOD_PHRASES, attempt)),
        _ => None,
    }
}

// ============================================================================
// Suggestions
// ============================================================================

/// Deterministic improvement suggestions, at most three, in rule order.
pub fn suggestions(analysis: &LexicalAnalysis) -> Vec<String> {
    let mut out = Vec::new();
    let n = analysis.word_count;

    if n < 5 {
        out.push("Try to speak a little longer - aim for a full sentence or two.".to_string());
    }
    if out.len() < 3 && n < 10 {
        out.push("Add more detail: where, when, and why make answers richer.".to_string());
    }
    if out.len() < 3 && analysis.variety_ratio() < 0.7 {
        out.push("Try to vary your vocabulary instead of repeating the same words.".to_string());
    }
    if out.len() < 3 && analysis.connective_count == 0 && n > 8 {
        out.push(
            "Use connecting words like 'because' or 'however' to link your ideas.".to_string(),
        );
    }
    if out.len() < 3 && !analysis.has_positive && !analysis.has_negative && n > 5 {
        out.push("Express how you feel about the topic - emotion makes answers engaging.".to_string());
    }
    if out.is_empty() {
        out.push("Keep it up - your answer covered everything it needed!".to_string());
    }

    out.truncate(3);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx<'a>(
        text: &'a str,
        analysis: &'a LexicalAnalysis,
        profile: &'a UserProfile,
    ) -> RuleContext<'a> {
        RuleContext { text, analysis, profile }
    }

    #[test]
    fn rotation_cycles_variants() {
        let variants = &["a", "b", "c"];
        assert_eq!(rotate(variants, 0), "a");
        assert_eq!(rotate(variants, 1), "b");
        assert_eq!(rotate(variants, 2), "c");
        assert_eq!(rotate(variants, 3), "a");
    }

    #[test]
    fn priority_asked_origin_beats_interest() {
        let text = "where are you from? i like music";
        let analysis = LexicalAnalysis::of(text);
        let profile = UserProfile::default();
        let rule = select_rule(&ctx(text, &analysis, &profile));
        assert_eq!(rule.branch, TopicBranch::AskedOrigin);
    }

    #[test]
    fn known_location_beats_family() {
        let text = "my sister visits often";
        let analysis = LexicalAnalysis::of(text);
        let profile = UserProfile {
            country: Some("Japan".to_string()),
            ..Default::default()
        };
        let rule = select_rule(&ctx(text, &analysis, &profile));
        assert_eq!(rule.branch, TopicBranch::KnownLocation);
    }

    #[test]
    fn fallback_always_matches() {
        let text = "zzz qqq";
        let analysis = LexicalAnalysis::of(text);
        let profile = UserProfile::default();
        let rule = select_rule(&ctx(text, &analysis, &profile));
        assert_eq!(rule.branch, TopicBranch::Fallback);
    }

    #[test]
    fn location_reply_uses_table_then_generic() {
        let variants = &["{country} sounds great"];
        let reply = location_reply("Japan", 0, variants);
        assert!(reply.contains("Japan"));
        let generic = location_reply("Atlantis", 0, variants);
        assert_eq!(generic, "Atlantis sounds great");
    }

    #[test]
    fn follow_up_priority_location_over_interest() {
        let text = "i enjoy music";
        let analysis = LexicalAnalysis::of(text);
        let profile = UserProfile {
            country: Some("Brazil".to_string()),
            ..Default::default()
        };
        let q = follow_up(&ctx(text, &analysis, &profile), 0);
        assert!(q.contains("Brazil"));
    }

    #[test]
    fn suggestions_capped_at_three() {
        // Short, repetitive, neutral: trips several rules at once.
        let analysis = LexicalAnalysis::of("cat cat cat cat cat cat cat cat cat");
        let s = suggestions(&analysis);
        assert!(s.len() <= 3);
        assert!(!s.is_empty());
    }

    #[test]
    fn suggestions_filler_when_nothing_fires() {
        let analysis = LexicalAnalysis::of(
            "I really enjoy visiting beautiful mountains because hiking there always \
             makes me happy and calm every single weekend",
        );
        let s = suggestions(&analysis);
        assert_eq!(s.len(), 1);
        assert!(s[0].contains("Keep it up"));
    }

    #[test]
    fn score_tiers() {
        assert_eq!(ScoreTier::of(90), ScoreTier::Excellent);
        assert_eq!(ScoreTier::of(85), ScoreTier::Excellent);
        assert_eq!(ScoreTier::of(70), ScoreTier::Good);
        assert_eq!(ScoreTier::of(60), ScoreTier::Average);
        assert_eq!(ScoreTier::of(40), ScoreTier::NeedsWork);
    }
}
