use std::collections::HashSet;

use super::{tokens, Sentiment};

const POSITIVE: &[&str] = &[
    "awesome",
    "best",
    "clear",
    "easy",
    "enjoyed",
    "excellent",
    "fun",
    "good",
    "great",
    "helpful",
    "interesting",
    "like",
    "love",
    "nice",
    "perfect",
    "thanks",
    "understood",
    "useful",
    "감사",
    "재미있",
    "재밌",
    "좋",
    "최고",
    "쉬웠",
    "유익",
    "이해가 잘",
    "훌륭",
];

const NEGATIVE: &[&str] = &[
    "awful",
    "bad",
    "boring",
    "confused",
    "confusing",
    "difficult",
    "hard",
    "hate",
    "lost",
    "poor",
    "slow",
    "terrible",
    "unclear",
    "useless",
    "worst",
    "모르겠",
    "별로",
    "싫",
    "어려",
    "어렵",
    "지루",
    "헷갈",
    "힘들",
];

/// Positive and negative word sets.
///
/// Entries are lowercased. ASCII single words match whole tokens; anything
/// else (Hangul stems, multi-word phrases) matches as a substring.
#[derive(Debug, Clone)]
pub struct Lexicon {
    positive: Vec<String>,
    negative: Vec<String>,
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::new(POSITIVE.iter().copied(), NEGATIVE.iter().copied())
    }
}

impl Lexicon {
    pub fn new<P, N>(positive: P, negative: N) -> Self
    where
        P: IntoIterator,
        P::Item: AsRef<str>,
        N: IntoIterator,
        N::Item: AsRef<str>,
    {
        Self {
            positive: normalize(positive),
            negative: normalize(negative),
        }
    }

    /// Built-in sets, with either side replaced when given.
    pub fn with_overrides(positive: Option<&[String]>, negative: Option<&[String]>) -> Self {
        let mut lexicon = Self::default();
        if let Some(words) = positive {
            lexicon.positive = normalize(words);
        }
        if let Some(words) = negative {
            lexicon.negative = normalize(words);
        }
        lexicon
    }

    /// `None` when neither set matches.
    pub fn lookup(&self, text: &str) -> Option<Sentiment> {
        let lowered = text.to_lowercase();
        let words: HashSet<&str> = tokens(&lowered).collect();
        let hit = |entry: &String| {
            if entry.is_ascii() && !entry.contains(' ') {
                words.contains(entry.as_str())
            } else {
                lowered.contains(entry.as_str())
            }
        };

        if self.positive.iter().any(hit) {
            Some(Sentiment::Positive)
        } else if self.negative.iter().any(hit) {
            Some(Sentiment::Negative)
        } else {
            None
        }
    }
}

fn normalize<I>(words: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    words
        .into_iter()
        .map(|w| w.as_ref().trim().to_lowercase())
        .filter(|w| !w.is_empty())
        .collect()
}
