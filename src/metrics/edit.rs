use super::{tokenize, tokenize_lower};

/// Word-level Levenshtein distance with case-insensitive token equality.
pub fn word_edit_distance<A: AsRef<str>, B: AsRef<str>>(left: &[A], right: &[B]) -> usize {
    let left = left
        .iter()
        .map(|token| token.as_ref().to_lowercase())
        .collect::<Vec<String>>();
    let right = right
        .iter()
        .map(|token| token.as_ref().to_lowercase())
        .collect::<Vec<String>>();

    // Two rolling rows of the DP table.
    let mut previous = (0..=right.len()).collect::<Vec<usize>>();
    let mut current = vec![0usize; right.len() + 1];

    for (i, left_token) in left.iter().enumerate() {
        current[0] = i + 1;
        for (j, right_token) in right.iter().enumerate() {
            current[j + 1] = if left_token == right_token {
                previous[j]
            } else {
                1 + previous[j].min(previous[j + 1]).min(current[j])
            };
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[right.len()]
}

pub fn change_ratio(source: &str, output: &str) -> f64 {
    let source_tokens = tokenize(source);
    let output_tokens = tokenize(output);
    if source_tokens.is_empty() {
        return 0.0;
    }

    let edits = word_edit_distance(&source_tokens, &output_tokens);
    edits as f64 / source_tokens.len().max(output_tokens.len()) as f64
}

/// Fraction of output tokens that differ from the source at the same position
/// and are not backed by any reference at that position.
///
/// Positions are compared index by index with no alignment, so an insertion
/// early in the sentence marks every later token as changed.
pub fn overcorrection<S: AsRef<str>>(source: &str, output: &str, references: &[S]) -> f64 {
    let source_tokens = tokenize_lower(source);
    let output_tokens = tokenize_lower(output);
    if output_tokens.is_empty() {
        return 0.0;
    }

    let reference_tokens = references
        .iter()
        .map(|reference| tokenize_lower(reference.as_ref()))
        .collect::<Vec<Vec<String>>>();

    let unnecessary = output_tokens
        .iter()
        .enumerate()
        .filter(|(index, token)| source_tokens.get(*index) != Some(*token))
        .filter(|(index, token)| {
            !reference_tokens
                .iter()
                .any(|reference| reference.get(*index) == Some(*token))
        })
        .count();

    unnecessary as f64 / output_tokens.len() as f64
}
