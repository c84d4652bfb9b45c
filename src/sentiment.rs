//! Lexicon-based sentiment classifier for user messages.
//!
//! Two layers, checked in order:
//!
//! 1. **Fixed phrases** such as "fed up" or "don't understand" map straight to
//!    a label.
//! 2. **Word counts** over five curated lexicons. The label with the most hits
//!    wins; ties go to the more urgent state
//!    (frustrated > anxious > confused > negative > positive).
//!
//! Classification is total: anything unrecognized is `Neutral`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SentimentLabel {
    Positive,
    Negative,
    Anxious,
    Confused,
    Frustrated,
    Neutral,
}

impl SentimentLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Negative => "negative",
            SentimentLabel::Anxious => "anxious",
            SentimentLabel::Confused => "confused",
            SentimentLabel::Frustrated => "frustrated",
            SentimentLabel::Neutral => "neutral",
        }
    }

    pub fn from_str(s: &str) -> Option<SentimentLabel> {
        match s.trim().to_lowercase().as_str() {
            "positive" => Some(SentimentLabel::Positive),
            "negative" => Some(SentimentLabel::Negative),
            "anxious" => Some(SentimentLabel::Anxious),
            "confused" => Some(SentimentLabel::Confused),
            "frustrated" => Some(SentimentLabel::Frustrated),
            "neutral" => Some(SentimentLabel::Neutral),
            _ => None,
        }
    }
}

// ============ Lexicons ============

const POSITIVE_WORDS: &[&str] = &[
    "thank", "thanks", "appreciate", "good", "great", "excellent", "wonderful", "happy",
    "helpful", "nice", "love", "like", "fantastic", "awesome", "brilliant", "perfect",
    "amazing", "outstanding", "superb", "marvelous", "delighted", "pleased", "satisfied",
];

const NEGATIVE_WORDS: &[&str] = &[
    "bad", "terrible", "awful", "hate", "dislike", "poor", "wrong", "horrible", "annoying",
    "disappointed", "upset", "sad", "angry", "frustrating", "useless", "worst", "pathetic",
    "disgusting", "dreadful", "appalling", "miserable",
];

const ANXIOUS_WORDS: &[&str] = &[
    "worried", "nervous", "anxious", "concerned", "afraid", "scared", "fear", "worry",
    "paranoid", "uneasy", "stressed", "panic", "danger", "threat", "unsafe", "terrified",
    "frightened", "alarmed", "distressed", "troubled", "apprehensive",
];

const CONFUSED_WORDS: &[&str] = &[
    "confused", "unclear", "explain", "complicated", "lost", "unsure", "perplexed", "puzzled",
    "bewildered", "confusing", "baffled", "mystified", "uncertain", "vague", "ambiguous",
];

const FRUSTRATED_WORDS: &[&str] = &[
    "frustrated", "annoyed", "irritated", "stupid", "broken", "buggy", "infuriating",
    "exasperated", "aggravated", "impatient", "ridiculous",
];

/// Multi-word phrases that decide the label on their own.
const PHRASE_OVERRIDES: &[(&str, SentimentLabel)] = &[
    ("don't understand", SentimentLabel::Confused),
    ("i'm confused", SentimentLabel::Confused),
    ("fed up", SentimentLabel::Frustrated),
    ("tired of", SentimentLabel::Frustrated),
    ("sick of", SentimentLabel::Frustrated),
    ("doesn't work", SentimentLabel::Frustrated),
    ("not working", SentimentLabel::Frustrated),
];

/// Tie-break order, most urgent first.
const TIE_PRIORITY: [SentimentLabel; 5] = [
    SentimentLabel::Frustrated,
    SentimentLabel::Anxious,
    SentimentLabel::Confused,
    SentimentLabel::Negative,
    SentimentLabel::Positive,
];

static WORD_SPLIT: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"\W+").ok());

fn tokenize(lower: &str) -> Vec<&str> {
    match WORD_SPLIT.as_ref() {
        Some(re) => re.split(lower).filter(|w| !w.is_empty()).collect(),
        None => lower.split_whitespace().collect(),
    }
}

fn lexicon_for(label: SentimentLabel) -> &'static [&'static str] {
    match label {
        SentimentLabel::Positive => POSITIVE_WORDS,
        SentimentLabel::Negative => NEGATIVE_WORDS,
        SentimentLabel::Anxious => ANXIOUS_WORDS,
        SentimentLabel::Confused => CONFUSED_WORDS,
        SentimentLabel::Frustrated => FRUSTRATED_WORDS,
        SentimentLabel::Neutral => &[],
    }
}

/// Per-label hit counts for a message, in `TIE_PRIORITY` order.
fn count_hits(tokens: &[&str]) -> [(SentimentLabel, usize); 5] {
    TIE_PRIORITY.map(|label| {
        let lexicon = lexicon_for(label);
        let hits = tokens.iter().filter(|t| lexicon.contains(*t)).count();
        (label, hits)
    })
}

// ============ Classification ============

/// Classify a line of user text.
pub fn classify(text: &str) -> SentimentLabel {
    let lower = text.trim().to_lowercase();
    if lower.is_empty() {
        return SentimentLabel::Neutral;
    }

    for (phrase, label) in PHRASE_OVERRIDES {
        if lower.contains(phrase) {
            return *label;
        }
    }

    let tokens = tokenize(&lower);
    let counts = count_hits(&tokens);
    let max = counts.iter().map(|(_, n)| *n).max().unwrap_or(0);
    if max == 0 {
        return SentimentLabel::Neutral;
    }

    // counts is already in priority order, so the first maximal entry wins ties
    counts
        .iter()
        .find(|(_, n)| *n == max)
        .map(|(label, _)| *label)
        .unwrap_or(SentimentLabel::Neutral)
}

/// Share of sentiment-bearing tokens, scaled by 2 and capped at 1.
pub fn confidence(text: &str) -> f64 {
    let lower = text.trim().to_lowercase();
    let tokens = tokenize(&lower);
    if tokens.is_empty() {
        return 0.0;
    }

    let bearing = tokens
        .iter()
        .filter(|t| TIE_PRIORITY.iter().any(|label| lexicon_for(*label).contains(*t)))
        .count();

    (bearing as f64 / tokens.len() as f64 * 2.0).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_sentiment_words_is_neutral() {
        assert_eq!(classify("the sky is blue"), SentimentLabel::Neutral);
        assert_eq!(classify(""), SentimentLabel::Neutral);
        assert_eq!(classify("   "), SentimentLabel::Neutral);
    }

    #[test]
    fn tie_goes_to_more_urgent_label() {
        assert_eq!(classify("I am so frustrated and anxious"), SentimentLabel::Frustrated);
        assert_eq!(classify("worried, but thanks, thanks so much"), SentimentLabel::Positive);
        assert_eq!(classify("confused and sad"), SentimentLabel::Confused);
    }

    #[test]
    fn phrase_overrides_beat_word_counts() {
        assert_eq!(classify("Great, great, it's not working"), SentimentLabel::Frustrated);
        assert_eq!(classify("I'm confused about VPNs"), SentimentLabel::Confused);
        assert_eq!(classify("I don't understand firewalls"), SentimentLabel::Confused);
    }

    #[test]
    fn punctuation_does_not_glue_words() {
        assert_eq!(classify("thanks!great!!"), SentimentLabel::Positive);
        assert_eq!(classify("scared...nervous"), SentimentLabel::Anxious);
    }

    #[test]
    fn label_round_trips_through_str() {
        for label in TIE_PRIORITY {
            assert_eq!(SentimentLabel::from_str(label.as_str()), Some(label));
        }
        assert_eq!(SentimentLabel::from_str("Neutral"), Some(SentimentLabel::Neutral));
        assert_eq!(SentimentLabel::from_str("meh"), None);
    }

    #[test]
    fn confidence_is_scaled_and_capped() {
        assert_eq!(confidence(""), 0.0);
        assert_eq!(confidence("the sky is blue"), 0.0);
        // 1 of 4 tokens -> 0.25 * 2
        assert!((confidence("this is really great") - 0.5).abs() < 1e-9);
        assert_eq!(confidence("great awesome"), 1.0);
    }
}
