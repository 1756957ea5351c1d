//! Sentiment tagging for feedback cards.
//!
//! - [`Lexicon`]: fixed positive/negative word sets, positive checked first
//! - [`polarity`]: valence-averaging score in [-1, 1], used as a fallback
//! - [`Classifier`]: combines the two according to a [`Strategy`]
//!
//! Results are display-only and never persisted, so classification must be
//! deterministic for a given text.

mod lexicon;
mod polarity;

pub use lexicon::Lexicon;
pub use polarity::polarity;

use serde::Serialize;
use std::str::FromStr;

/// Default distance from zero a polarity score must exceed to count.
pub const DEFAULT_THRESHOLD: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    /// Lexicon only; no match is neutral.
    Lexicon,
    /// Polarity score only.
    Polarity,
    /// Lexicon first, polarity score when no lexicon word matches.
    #[default]
    LexiconThenPolarity,
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "lexicon" => Ok(Strategy::Lexicon),
            "polarity" => Ok(Strategy::Polarity),
            "lexicon_then_polarity" | "lexicon-then-polarity" => Ok(Strategy::LexiconThenPolarity),
            other => Err(format!("unknown sentiment strategy '{other}'")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Classifier {
    strategy: Strategy,
    lexicon: Lexicon,
    threshold: f64,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(Strategy::default(), Lexicon::default(), DEFAULT_THRESHOLD)
    }
}

impl Classifier {
    pub fn new(strategy: Strategy, lexicon: Lexicon, threshold: f64) -> Self {
        Self {
            strategy,
            lexicon,
            threshold,
        }
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn classify(&self, text: &str) -> Sentiment {
        match self.strategy {
            Strategy::Lexicon => self.lexicon.lookup(text).unwrap_or(Sentiment::Neutral),
            Strategy::Polarity => self.from_score(polarity(text)),
            Strategy::LexiconThenPolarity => self
                .lexicon
                .lookup(text)
                .unwrap_or_else(|| self.from_score(polarity(text))),
        }
    }

    fn from_score(&self, score: f64) -> Sentiment {
        if score > self.threshold {
            Sentiment::Positive
        } else if score < -self.threshold {
            Sentiment::Negative
        } else {
            Sentiment::Neutral
        }
    }
}

/// Lowercased word tokens. Apostrophes stay inside words so `don't` survives.
fn tokens(lowered: &str) -> impl Iterator<Item = &str> {
    lowered
        .split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .map(|t| t.trim_matches('\''))
        .filter(|t| !t.is_empty())
}
