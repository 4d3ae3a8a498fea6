use std::time::Duration;

use tracing::{debug, warn};

use crate::clean::{ReasoningOnly, clean_checked};
use crate::client::ChatModel;
use crate::metrics::{
    Lexicons, change_ratio, compression_ratio, formality_score, gleu, informality_score,
    is_bloated, meaning_preserved, normalize_for_match, overcorrection,
};
use crate::mode::{EvalMode, PrimarySignal};
use crate::model::{PromptVariant, Sample, SampleResult, SampleScores};

pub const DEFAULT_DEGENERATE_RETRIES: usize = 2;

/// Runs one (variant, sample) pair against the model and scores the result.
pub struct SampleRunner<'a, M: ChatModel + ?Sized> {
    pub model: &'a M,
    pub mode: EvalMode,
    pub lexicons: &'a Lexicons,
    pub degenerate_retries: usize,
}

enum Generation {
    Output { text: String, latency: Duration, attempts: usize },
    Failed { error: String, latency: Option<Duration>, attempts: usize },
}

impl<'a, M: ChatModel + ?Sized> SampleRunner<'a, M> {
    pub fn run(&self, index: usize, variant: &PromptVariant, sample: &Sample) -> SampleResult {
        match self.generate(variant, sample) {
            Generation::Output {
                text,
                latency,
                attempts,
            } => {
                let scores = score_output(self.mode, self.lexicons, sample, &text);
                SampleResult {
                    index,
                    source: sample.source.clone(),
                    output: Some(text),
                    references: sample.references.clone(),
                    scores: Some(scores),
                    latency_secs: Some(latency.as_secs_f64()),
                    attempts,
                    error: None,
                }
            }
            Generation::Failed {
                error,
                latency,
                attempts,
            } => {
                warn!(variant = %variant.name, sample = index, error = %error, "sample failed");
                SampleResult {
                    index,
                    source: sample.source.clone(),
                    output: None,
                    references: sample.references.clone(),
                    scores: None,
                    latency_secs: latency.map(|value| value.as_secs_f64()),
                    attempts,
                    error: Some(error),
                }
            }
        }
    }

    fn generate(&self, variant: &PromptVariant, sample: &Sample) -> Generation {
        let mut total_latency = Duration::ZERO;
        let max_attempts = 1 + self.degenerate_retries;

        for attempt in 1..=max_attempts {
            let completion =
                match self
                    .model
                    .complete(&sample.source, &variant.instructions, variant.temperature)
                {
                    Ok(completion) => completion,
                    // Transport failures are never retried here.
                    Err(err) => {
                        debug!(
                            variant = %variant.name,
                            attempt,
                            connectivity = err.is_connectivity(),
                            "model call failed"
                        );
                        return Generation::Failed {
                            error: err.to_string(),
                            latency: (attempt > 1).then_some(total_latency),
                            attempts: attempt,
                        };
                    }
                };
            total_latency += completion.latency;

            match clean_checked(&completion.text) {
                Ok(text) => {
                    return Generation::Output {
                        text,
                        latency: total_latency,
                        attempts: attempt,
                    };
                }
                Err(ReasoningOnly) => {
                    debug!(
                        variant = %variant.name,
                        attempt,
                        max_attempts,
                        "response held only reasoning content"
                    );
                }
            }
        }

        Generation::Failed {
            error: format!("response held only reasoning content after {max_attempts} attempts"),
            latency: Some(total_latency),
            attempts: max_attempts,
        }
    }
}

/// Every metric the mode measures for one cleaned output.
pub fn score_output(
    mode: EvalMode,
    lexicons: &Lexicons,
    sample: &Sample,
    output: &str,
) -> SampleScores {
    let profile = mode.profile();
    let source = sample.source.as_str();
    let references = sample.references.as_slice();

    let folded_output = output.trim().to_lowercase();
    let exact_match = references
        .iter()
        .any(|reference| reference.trim().to_lowercase() == folded_output);

    let stability_pass = if profile.tracks_stability {
        let folded_source = normalize_for_match(source);
        references
            .iter()
            .any(|reference| normalize_for_match(reference) == folded_source)
            .then(|| normalize_for_match(output) == folded_source)
    } else {
        None
    };

    SampleScores {
        gleu: gleu(source, output, references),
        exact_match,
        changed: output.trim() != source.trim(),
        change_ratio: change_ratio(source, output),
        overcorrection: overcorrection(source, output, references),
        meaning_preserved: meaning_preserved(output, &sample.preserve),
        compression_ratio: profile
            .tracks_compression
            .then(|| compression_ratio(source, output)),
        bloated: profile
            .tracks_compression
            .then(|| is_bloated(source, output)),
        informality: (profile.primary == PrimarySignal::Informality)
            .then(|| informality_score(output, lexicons)),
        formality: (profile.primary == PrimarySignal::Formality)
            .then(|| formality_score(output, lexicons)),
        stability_pass,
    }
}
