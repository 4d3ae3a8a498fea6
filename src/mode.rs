use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::model::VariantMetrics;

const GLEU_WEIGHT: f64 = 0.3;
const MEANING_WEIGHT: f64 = 0.3;
const PRIMARY_WEIGHT: f64 = 0.3;
const SECONDARY_WEIGHT: f64 = 0.1;
const MISSING_STABILITY: f64 = 0.5;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum EvalMode {
    Grammar,
    Concise,
    Casual,
    Professional,
}

/// Style heuristic that drives a mode's composite score.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PrimarySignal {
    Conservatism,
    Compression,
    Informality,
    Formality,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum RankingKey {
    MeanGleu,
    Composite,
}

/// What a mode measures and how its variants are compared.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ModeProfile {
    pub primary: PrimarySignal,
    pub tracks_compression: bool,
    pub tracks_stability: bool,
    pub ranking: RankingKey,
}

impl EvalMode {
    pub const ALL: [EvalMode; 4] = [
        EvalMode::Grammar,
        EvalMode::Concise,
        EvalMode::Casual,
        EvalMode::Professional,
    ];

    pub const STYLES: [EvalMode; 3] = [EvalMode::Concise, EvalMode::Casual, EvalMode::Professional];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Grammar => "grammar",
            Self::Concise => "concise",
            Self::Casual => "casual",
            Self::Professional => "professional",
        }
    }

    pub fn profile(self) -> ModeProfile {
        match self {
            Self::Grammar => ModeProfile {
                primary: PrimarySignal::Conservatism,
                tracks_compression: false,
                tracks_stability: false,
                ranking: RankingKey::MeanGleu,
            },
            Self::Concise => ModeProfile {
                primary: PrimarySignal::Compression,
                tracks_compression: true,
                tracks_stability: false,
                ranking: RankingKey::Composite,
            },
            Self::Casual => ModeProfile {
                primary: PrimarySignal::Informality,
                tracks_compression: false,
                tracks_stability: true,
                ranking: RankingKey::Composite,
            },
            Self::Professional => ModeProfile {
                primary: PrimarySignal::Formality,
                tracks_compression: false,
                tracks_stability: true,
                ranking: RankingKey::Composite,
            },
        }
    }
}

impl ModeProfile {
    /// Weighted blend of aggregate signals; every term lies in [0, 1] and the
    /// weights sum to 1.
    pub fn composite(&self, metrics: &VariantMetrics) -> f64 {
        let (primary, secondary) = match self.primary {
            PrimarySignal::Conservatism => (
                1.0 - metrics.mean_overcorrection,
                metrics.exact_match_rate,
            ),
            PrimarySignal::Compression => (
                1.0 - metrics.mean_compression.unwrap_or(1.0),
                1.0 - metrics.bloat_rate.unwrap_or(0.0),
            ),
            PrimarySignal::Informality => (
                metrics.mean_informality.unwrap_or(0.0),
                metrics.stability.unwrap_or(MISSING_STABILITY),
            ),
            PrimarySignal::Formality => (
                metrics.mean_formality.unwrap_or(0.0),
                metrics.stability.unwrap_or(MISSING_STABILITY),
            ),
        };

        GLEU_WEIGHT * unit(metrics.mean_gleu)
            + MEANING_WEIGHT * unit(metrics.mean_meaning)
            + PRIMARY_WEIGHT * unit(primary)
            + SECONDARY_WEIGHT * unit(secondary)
    }

    pub fn ranking_score(&self, metrics: &VariantMetrics) -> f64 {
        match self.ranking {
            RankingKey::MeanGleu => metrics.mean_gleu,
            RankingKey::Composite => metrics.composite,
        }
    }
}

fn unit(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(mode: EvalMode) -> VariantMetrics {
        VariantMetrics {
            variant: "v".to_string(),
            mode,
            temperature: 0.0,
            instructions_sha256: String::new(),
            total_samples: 1,
            errors: 0,
            evaluated: 1,
            mean_gleu: 0.0,
            median_gleu: 0.0,
            exact_match_rate: 0.0,
            change_rate: 0.0,
            mean_change_ratio: 0.0,
            mean_overcorrection: 0.0,
            mean_meaning: 0.0,
            mean_latency_secs: 0.0,
            p95_latency_secs: 0.0,
            mean_compression: None,
            bloat_rate: None,
            mean_informality: None,
            mean_formality: None,
            stability: None,
            stability_samples: 0,
            composite: 0.0,
        }
    }

    #[test]
    fn weights_sum_to_one() {
        let total = GLEU_WEIGHT + MEANING_WEIGHT + PRIMARY_WEIGHT + SECONDARY_WEIGHT;
        assert!((total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn perfect_metrics_reach_composite_of_one() {
        let mut casual = metrics(EvalMode::Casual);
        casual.mean_gleu = 1.0;
        casual.mean_meaning = 1.0;
        casual.mean_informality = Some(1.0);
        casual.stability = Some(1.0);
        assert!((EvalMode::Casual.profile().composite(&casual) - 1.0).abs() < 1e-12);

        let mut concise = metrics(EvalMode::Concise);
        concise.mean_gleu = 1.0;
        concise.mean_meaning = 1.0;
        concise.mean_compression = Some(0.0);
        concise.bloat_rate = Some(0.0);
        assert!((EvalMode::Concise.profile().composite(&concise) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn composite_clamps_out_of_range_terms() {
        let mut concise = metrics(EvalMode::Concise);
        // A bloated output has a compression ratio above one.
        concise.mean_compression = Some(2.5);
        concise.bloat_rate = Some(1.0);
        concise.mean_meaning = 1.0;
        let score = EvalMode::Concise.profile().composite(&concise);
        assert!((score - MEANING_WEIGHT).abs() < 1e-12);

        for mode in EvalMode::ALL {
            let mut extreme = metrics(mode);
            extreme.mean_gleu = 3.0;
            extreme.mean_meaning = -1.0;
            extreme.mean_overcorrection = -2.0;
            extreme.mean_informality = Some(4.0);
            extreme.mean_formality = Some(-4.0);
            let score = mode.profile().composite(&extreme);
            assert!((0.0..=1.0).contains(&score), "{mode:?} scored {score}");
        }
    }

    #[test]
    fn missing_stability_counts_as_half() {
        let professional = metrics(EvalMode::Professional);
        let score = EvalMode::Professional.profile().composite(&professional);
        assert!((score - SECONDARY_WEIGHT * MISSING_STABILITY).abs() < 1e-12);
    }

    #[test]
    fn grammar_ranks_by_mean_gleu() {
        let mut grammar = metrics(EvalMode::Grammar);
        grammar.mean_gleu = 0.7;
        grammar.composite = 0.1;
        assert_eq!(EvalMode::Grammar.profile().ranking_score(&grammar), 0.7);

        let mut casual = metrics(EvalMode::Casual);
        casual.mean_gleu = 0.7;
        casual.composite = 0.1;
        assert_eq!(EvalMode::Casual.profile().ranking_score(&casual), 0.1);
    }

    #[test]
    fn only_style_modes_track_stability() {
        assert!(!EvalMode::Grammar.profile().tracks_stability);
        assert!(!EvalMode::Concise.profile().tracks_stability);
        assert!(EvalMode::Casual.profile().tracks_stability);
        assert!(EvalMode::Professional.profile().tracks_stability);
        assert!(EvalMode::Concise.profile().tracks_compression);
    }
}
