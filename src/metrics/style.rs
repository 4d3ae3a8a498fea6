use serde::{Deserialize, Serialize};

use super::tokenize;

const CONTRACTIONS: &[&str] = &[
    "don't", "doesn't", "didn't", "won't", "wouldn't", "can't", "couldn't", "shouldn't", "isn't",
    "aren't", "wasn't", "weren't", "I'm", "I've", "I'll", "I'd", "we're", "we've", "we'll", "we'd",
    "you're", "you've", "you'll", "you'd", "they're", "they've", "they'll", "they'd", "it's",
    "that's", "there's", "here's", "what's", "who's", "let's", "he's", "she's", "hasn't",
    "haven't",
];

const CASUAL_MARKERS: &[&str] = &[
    "hey", "hi", "just", "pretty", "kinda", "gonna", "wanna", "gotta", "yeah", "yep", "nope",
    "cool", "awesome", "great", "nice", "btw", "fyi", "tbh", "imo", "lol", "haha", "!", "so ",
    "basically",
];

const SLANG: &[&str] = &[
    "hey", "yeah", "yep", "nope", "gonna", "wanna", "gotta", "kinda", "tbh", "imo", "lol", "haha",
    "lmao", "ngl", "idk", "prob", "def", "pls", "u ", "ur ", "tmrw", "asap", "thx", "btw", "fyi",
    "rn", "like ", "basically", "totally", "super ", "awesome", "cool", "tons of", "big time",
    "crushed", "broke", "stuff",
];

const FORMAL_MARKERS: &[&str] = &[
    "please", "regarding", "pursuant", "appreciate", "ensure", "accordingly", "furthermore",
    "however", "therefore", "consequently", "demonstrate", "implement", "facilitate",
    "assessment", "initiative", "comprehensive", "subsequently", "preliminary", "approximately",
];

const TRAILING_PUNCTUATION: &[char] = &['.', ',', '!', '?', ';', ':'];
const SHORT_SENTENCE_WORDS: f64 = 12.0;

/// Word lists behind the style heuristics.
///
/// The defaults are part of the metric definition; substitute them only to
/// exercise the scorers with fixtures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Lexicons {
    pub contractions: Vec<String>,
    pub casual_markers: Vec<String>,
    pub slang: Vec<String>,
    pub formal_markers: Vec<String>,
}

impl Default for Lexicons {
    fn default() -> Self {
        Self {
            contractions: to_owned_list(CONTRACTIONS),
            casual_markers: to_owned_list(CASUAL_MARKERS),
            slang: to_owned_list(SLANG),
            formal_markers: to_owned_list(FORMAL_MARKERS),
        }
    }
}

impl Lexicons {
    fn contraction_count(&self, lowered_words: &[String]) -> usize {
        lowered_words
            .iter()
            .map(|word| word.trim_end_matches(TRAILING_PUNCTUATION))
            .filter(|word| {
                self.contractions
                    .iter()
                    .any(|contraction| contraction.to_lowercase() == *word)
            })
            .count()
    }
}

fn to_owned_list(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| (*value).to_string()).collect()
}

/// Number of lexicon entries present anywhere in the text, as substrings.
fn substring_hits(lowered_text: &str, entries: &[String]) -> usize {
    entries
        .iter()
        .filter(|entry| lowered_text.contains(entry.to_lowercase().as_str()))
        .count()
}

/// Sentences split on runs of `.`, `!` and `?`, trimmed, empties dropped.
fn sentences(text: &str) -> Vec<&str> {
    text.split(['.', '!', '?'])
        .map(str::trim)
        .filter(|sentence| !sentence.is_empty())
        .collect()
}

pub fn compression_ratio(source: &str, output: &str) -> f64 {
    let source_words = tokenize(source).len();
    if source_words == 0 {
        return 1.0;
    }
    tokenize(output).len() as f64 / source_words as f64
}

pub fn is_bloated(source: &str, output: &str) -> bool {
    tokenize(output).len() > tokenize(source).len()
}

pub fn informality_score(text: &str, lexicons: &Lexicons) -> f64 {
    let lowered = text.to_lowercase();
    let words = lowered
        .split_whitespace()
        .map(ToOwned::to_owned)
        .collect::<Vec<String>>();
    if words.is_empty() {
        return 0.0;
    }

    let mut score = 0.0_f64;

    let contraction_share = lexicons.contraction_count(&words) as f64 / words.len() as f64;
    score += (contraction_share * 5.0).min(0.4);

    let marker_hits = substring_hits(&lowered, &lexicons.casual_markers);
    score += (marker_hits as f64 / 10.0).min(0.3);

    if text.contains('!') {
        score += 0.1;
    }

    let sentences = sentences(text);
    if !sentences.is_empty() {
        let words_per_sentence = sentences
            .iter()
            .map(|sentence| tokenize(sentence).len())
            .sum::<usize>() as f64
            / sentences.len() as f64;
        if words_per_sentence < SHORT_SENTENCE_WORDS {
            score += 0.1;
        }
    }

    if text.contains('\u{2014}') || text.contains("...") || text.contains(" - ") {
        score += 0.1;
    }

    score.min(1.0)
}

pub fn formality_score(text: &str, lexicons: &Lexicons) -> f64 {
    let lowered = text.to_lowercase();
    let words = lowered
        .split_whitespace()
        .map(ToOwned::to_owned)
        .collect::<Vec<String>>();
    if words.is_empty() {
        return 0.0;
    }

    let mut score = 0.5_f64;

    let slang_hits = substring_hits(&lowered, &lexicons.slang);
    score -= (slang_hits as f64 * 0.1).min(0.4);

    let formal_hits = substring_hits(&lowered, &lexicons.formal_markers);
    score += (formal_hits as f64 * 0.08).min(0.3);

    let sentences = sentences(text);
    if !sentences.is_empty() {
        let capitalized = sentences
            .iter()
            .filter(|sentence| {
                sentence
                    .chars()
                    .next()
                    .map(char::is_uppercase)
                    .unwrap_or(false)
            })
            .count();
        score += capitalized as f64 / sentences.len() as f64 * 0.15;
    }

    if lexicons.contraction_count(&words) == 0 && words.len() > 5 {
        score += 0.1;
    }

    if text.contains('!') {
        score -= 0.05;
    }

    score.clamp(0.0, 1.0)
}

/// Share of key terms found (case-insensitive substring) in the output.
pub fn meaning_preserved<S: AsRef<str>>(output: &str, key_terms: &[S]) -> f64 {
    if key_terms.is_empty() {
        return 1.0;
    }

    let lowered = output.to_lowercase();
    let found = key_terms
        .iter()
        .filter(|term| lowered.contains(term.as_ref().to_lowercase().as_str()))
        .count();
    found as f64 / key_terms.len() as f64
}
