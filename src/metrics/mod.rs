//! Scoring primitives shared by every evaluation mode.
//!
//! All metrics work on naive whitespace tokens. Punctuation stays attached to
//! the word it touches, so "time." and "time" are different tokens.

mod edit;
mod ngram;
mod stats;
mod style;

pub use edit::{change_ratio, overcorrection};
pub use ngram::gleu;
pub use stats::{mean, median, percentile};
pub use style::{
    Lexicons, compression_ratio, formality_score, informality_score, is_bloated,
    meaning_preserved,
};

pub fn tokenize(text: &str) -> Vec<&str> {
    text.split_whitespace().collect()
}

pub fn tokenize_lower(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|token| token.to_lowercase())
        .collect()
}

/// Trimmed, lowercased, whitespace-collapsed form used for equality checks.
pub fn normalize_for_match(text: &str) -> String {
    tokenize_lower(text).join(" ")
}
