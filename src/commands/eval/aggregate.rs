use tracing::info;

use super::runner::SampleRunner;
use crate::client::ChatModel;
use crate::metrics::{mean, median, percentile};
use crate::mode::{EvalMode, PrimarySignal, RankingKey};
use crate::model::{
    PromptVariant, Sample, SampleResult, SampleScores, VariantMetrics, VariantReport,
};
use crate::util::sha256_text;

const PROGRESS_EVERY: usize = 10;

/// Runs every sample for one variant, in order, and reduces the results.
pub fn evaluate_variant<M: ChatModel + ?Sized>(
    runner: &SampleRunner<'_, M>,
    variant: &PromptVariant,
    samples: &[Sample],
) -> VariantReport {
    info!(
        variant = %variant.name,
        mode = runner.mode.as_str(),
        temperature = variant.temperature,
        samples = samples.len(),
        "evaluating variant"
    );

    let mut details = Vec::<SampleResult>::with_capacity(samples.len());
    for (index, sample) in samples.iter().enumerate() {
        if index == 0 || (index + 1) % PROGRESS_EVERY == 0 {
            info!(
                variant = %variant.name,
                progress = index + 1,
                total = samples.len(),
                "processing"
            );
        }
        details.push(runner.run(index, variant, sample));
    }

    let metrics = summarize(runner.mode, variant, &details);
    info!(
        variant = %variant.name,
        mean_gleu = metrics.mean_gleu,
        composite = metrics.composite,
        errors = metrics.errors,
        "variant evaluated"
    );

    VariantReport { metrics, details }
}

/// Reduces per-sample results to aggregate metrics. Rates use the evaluated
/// count, so failed calls never count as misses.
pub fn summarize(
    mode: EvalMode,
    variant: &PromptVariant,
    details: &[SampleResult],
) -> VariantMetrics {
    let profile = mode.profile();
    let scored = details
        .iter()
        .filter_map(|detail| detail.scores.as_ref())
        .collect::<Vec<_>>();
    let total_samples = details.len();
    let errors = details.iter().filter(|detail| detail.is_error()).count();
    let evaluated = total_samples - errors;

    let rate = |hits: usize| {
        if evaluated == 0 {
            0.0
        } else {
            hits as f64 / evaluated as f64
        }
    };

    let gleu_scores = collect_scores(&scored, |scores| Some(scores.gleu));
    let latencies = details
        .iter()
        .filter(|detail| !detail.is_error())
        .filter_map(|detail| detail.latency_secs)
        .collect::<Vec<f64>>();

    let stability_results = scored
        .iter()
        .filter_map(|scores| scores.stability_pass)
        .collect::<Vec<bool>>();
    let stability = if profile.tracks_stability && !stability_results.is_empty() {
        let passes = stability_results.iter().filter(|pass| **pass).count();
        Some(passes as f64 / stability_results.len() as f64)
    } else {
        None
    };

    let mut metrics = VariantMetrics {
        variant: variant.name.clone(),
        mode,
        temperature: variant.temperature,
        instructions_sha256: sha256_text(&variant.instructions),
        total_samples,
        errors,
        evaluated,
        mean_gleu: mean(&gleu_scores).unwrap_or(0.0),
        median_gleu: median(&gleu_scores).unwrap_or(0.0),
        exact_match_rate: rate(scored.iter().filter(|scores| scores.exact_match).count()),
        change_rate: rate(scored.iter().filter(|scores| scores.changed).count()),
        mean_change_ratio: mean_of(&scored, |scores| Some(scores.change_ratio)),
        mean_overcorrection: mean_of(&scored, |scores| Some(scores.overcorrection)),
        mean_meaning: mean_of(&scored, |scores| Some(scores.meaning_preserved)),
        mean_latency_secs: mean(&latencies).unwrap_or(0.0),
        p95_latency_secs: percentile(&latencies, 0.95).unwrap_or(0.0),
        mean_compression: profile
            .tracks_compression
            .then(|| mean_of(&scored, |scores| scores.compression_ratio)),
        bloat_rate: profile.tracks_compression.then(|| {
            rate(
                scored
                    .iter()
                    .filter(|scores| scores.bloated == Some(true))
                    .count(),
            )
        }),
        mean_informality: (profile.primary == PrimarySignal::Informality)
            .then(|| mean_of(&scored, |scores| scores.informality)),
        mean_formality: (profile.primary == PrimarySignal::Formality)
            .then(|| mean_of(&scored, |scores| scores.formality)),
        stability,
        stability_samples: stability_results.len(),
        composite: 0.0,
    };
    metrics.composite = profile.composite(&metrics);
    metrics
}

fn collect_scores(
    scored: &[&SampleScores],
    extract: impl Fn(&SampleScores) -> Option<f64>,
) -> Vec<f64> {
    scored.iter().filter_map(|scores| extract(*scores)).collect()
}

fn mean_of(scored: &[&SampleScores], extract: impl Fn(&SampleScores) -> Option<f64>) -> f64 {
    mean(&collect_scores(scored, extract)).unwrap_or(0.0)
}

/// Best variant first. The sort is stable: equal scores keep table order.
pub fn rank_variants(mode: EvalMode, mut reports: Vec<VariantReport>) -> Vec<VariantReport> {
    let profile = mode.profile();
    reports.sort_by(|left, right| {
        profile
            .ranking_score(&right.metrics)
            .total_cmp(&profile.ranking_score(&left.metrics))
    });
    reports
}

pub fn ranking_label(mode: EvalMode) -> &'static str {
    match mode.profile().ranking {
        RankingKey::MeanGleu => "mean_gleu",
        RankingKey::Composite => "composite",
    }
}
