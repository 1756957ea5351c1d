use super::tokens;

/// Word valence in [-1, 1]. Hangul entries are stems matched by prefix.
const VALENCE: &[(&str, f64)] = &[
    ("amazing", 0.6),
    ("awesome", 1.0),
    ("bad", -0.7),
    ("best", 1.0),
    ("boring", -1.0),
    ("brilliant", 0.9),
    ("clear", 0.1),
    ("complicated", -0.5),
    ("cool", 0.35),
    ("dull", -0.3),
    ("engaging", 0.4),
    ("enjoy", 0.4),
    ("enjoyed", 0.5),
    ("excellent", 1.0),
    ("fantastic", 0.4),
    ("fun", 0.3),
    ("glad", 0.5),
    ("good", 0.7),
    ("great", 0.8),
    ("happy", 0.8),
    ("hard", -0.3),
    ("helpful", 0.5),
    ("informative", 0.5),
    ("interesting", 0.5),
    ("love", 0.5),
    ("messy", -0.4),
    ("nice", 0.6),
    ("perfect", 1.0),
    ("poor", -0.4),
    ("rushed", -0.4),
    ("sad", -0.5),
    ("terrible", -1.0),
    ("useful", 0.3),
    ("weak", -0.4),
    ("well", 0.2),
    ("wonderful", 1.0),
    ("worst", -1.0),
    ("wrong", -0.5),
    ("감사", 0.6),
    ("나빴", -0.7),
    ("대박", 0.8),
    ("멋", 0.6),
    ("별로", -0.5),
    ("복잡", -0.5),
    ("어려", -0.5),
    ("어렵", -0.5),
    ("재미없", -0.6),
    ("재미있", 0.5),
    ("좋", 0.7),
    ("지루", -0.6),
    ("최고", 1.0),
    ("훌륭", 0.9),
];

const NEGATORS: &[&str] = &["never", "no", "nor", "not", "neither", "안", "못"];

const INTENSIFIERS: &[&str] = &[
    "extremely", "really", "so", "too", "very", "완전", "정말", "진짜", "너무",
];

const INTENSIFIER_SCALE: f64 = 1.3;
const NEGATION_SCALE: f64 = -0.5;

/// Average valence of the scored words in `text`, clamped to [-1, 1].
///
/// A negator flips and halves the next scored word; each intensifier before
/// it multiplies that word's valence by 1.3. Text without scored words is 0.
pub fn polarity(text: &str) -> f64 {
    let lowered = text.to_lowercase();

    let mut total = 0.0;
    let mut scored = 0usize;
    let mut negate = false;
    let mut boost = 1.0;

    for token in tokens(&lowered) {
        if is_negator(token) {
            negate = true;
            continue;
        }
        if INTENSIFIERS.contains(&token) {
            boost *= INTENSIFIER_SCALE;
            continue;
        }
        if let Some(valence) = valence(token) {
            let mut score = (valence * boost).clamp(-1.0, 1.0);
            if negate {
                score *= NEGATION_SCALE;
            }
            total += score;
            scored += 1;
        }
        negate = false;
        boost = 1.0;
    }

    if scored == 0 {
        0.0
    } else {
        (total / scored as f64).clamp(-1.0, 1.0)
    }
}

fn is_negator(token: &str) -> bool {
    NEGATORS.contains(&token) || token.ends_with("n't")
}

fn valence(token: &str) -> Option<f64> {
    VALENCE.iter().find_map(|&(word, score)| {
        let hit = if word.is_ascii() {
            token == word
        } else {
            token.starts_with(word)
        };
        hit.then_some(score)
    })
}
