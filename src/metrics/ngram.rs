use std::collections::HashMap;
use std::hash::Hash;

use super::tokenize_lower;

pub const GLEU_MAX_ORDER: usize = 4;

/// Contiguous windows of length `n`. Empty when `n` is zero or longer than the input.
pub fn ngrams<T>(tokens: &[T], n: usize) -> Vec<&[T]> {
    if n == 0 || n > tokens.len() {
        return Vec::new();
    }
    tokens.windows(n).collect()
}

/// Multiset of n-grams of a single order.
#[derive(Debug, Clone)]
pub struct NgramCounts<'a, T> {
    counts: HashMap<&'a [T], usize>,
    total: usize,
}

impl<'a, T: Eq + Hash> NgramCounts<'a, T> {
    pub fn build(tokens: &'a [T], n: usize) -> Self {
        let mut counts = HashMap::<&'a [T], usize>::new();
        let mut total = 0usize;
        for gram in ngrams(tokens, n) {
            *counts.entry(gram).or_insert(0) += 1;
            total += 1;
        }
        Self { counts, total }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn count(&self, gram: &[T]) -> usize {
        self.counts.get(gram).copied().unwrap_or(0)
    }

    /// Sum over shared n-grams of the smaller multiplicity.
    pub fn clipped_matches(&self, other: &NgramCounts<'_, T>) -> usize {
        self.counts
            .iter()
            .map(|(gram, count)| (*count).min(other.count(gram)))
            .sum()
    }
}

/// Precision-only GLEU for one reference.
///
/// The source tokens are accepted for signature parity with literature GLEU but do
/// not contribute: there is no penalty for n-grams shared with the source and
/// absent from the reference. Any order with zero precision zeroes the score.
pub fn sentence_gleu<T: Eq + Hash>(
    _source: &[T],
    output: &[T],
    reference: &[T],
    max_n: usize,
) -> f64 {
    if output.is_empty() || reference.is_empty() {
        return 0.0;
    }

    let top_order = max_n.min(output.len());
    let mut precisions = Vec::<f64>::with_capacity(top_order);
    for n in 1..=top_order {
        let output_counts = NgramCounts::build(output, n);
        let reference_counts = NgramCounts::build(reference, n);
        let total = output_counts.total();
        if total == 0 {
            precisions.push(0.0);
        } else {
            precisions.push(output_counts.clipped_matches(&reference_counts) as f64 / total as f64);
        }
    }

    // Covers the all-zero case too; ln(0) never reaches the mean.
    if precisions.iter().any(|precision| *precision == 0.0) {
        return 0.0;
    }

    let mean_log =
        precisions.iter().map(|precision| precision.ln()).sum::<f64>() / precisions.len() as f64;

    let brevity_penalty = if output.len() < reference.len() {
        (1.0 - reference.len() as f64 / output.len().max(1) as f64).exp()
    } else {
        1.0
    };

    brevity_penalty * mean_log.exp()
}

/// Case-folded GLEU against the best-matching reference.
pub fn gleu<S: AsRef<str>>(source: &str, output: &str, references: &[S]) -> f64 {
    let source_tokens = tokenize_lower(source);
    let output_tokens = tokenize_lower(output);

    references
        .iter()
        .map(|reference| {
            let reference_tokens = tokenize_lower(reference.as_ref());
            sentence_gleu(
                &source_tokens,
                &output_tokens,
                &reference_tokens,
                GLEU_MAX_ORDER,
            )
        })
        .fold(0.0_f64, f64::max)
}
