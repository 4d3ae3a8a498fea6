use serde::{Deserialize, Serialize};

use crate::mode::EvalMode;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub source: String,
    pub references: Vec<String>,
    #[serde(default)]
    pub preserve: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptVariant {
    pub name: String,
    #[serde(alias = "system_prompt")]
    pub instructions: String,
    pub temperature: f64,
}

/// Scores for one successfully cleaned output. Mode-specific fields are
/// `None` when the mode does not measure them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleScores {
    pub gleu: f64,
    pub exact_match: bool,
    pub changed: bool,
    pub change_ratio: f64,
    pub overcorrection: f64,
    pub meaning_preserved: f64,
    pub compression_ratio: Option<f64>,
    pub bloated: Option<bool>,
    pub informality: Option<f64>,
    pub formality: Option<f64>,
    /// Set only when a reference equals the source; true when the output left it unchanged.
    pub stability_pass: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleResult {
    pub index: usize,
    pub source: String,
    pub output: Option<String>,
    pub references: Vec<String>,
    pub scores: Option<SampleScores>,
    pub latency_secs: Option<f64>,
    pub attempts: usize,
    pub error: Option<String>,
}

impl SampleResult {
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantMetrics {
    pub variant: String,
    pub mode: EvalMode,
    pub temperature: f64,
    pub instructions_sha256: String,
    pub total_samples: usize,
    pub errors: usize,
    pub evaluated: usize,
    pub mean_gleu: f64,
    pub median_gleu: f64,
    pub exact_match_rate: f64,
    pub change_rate: f64,
    pub mean_change_ratio: f64,
    pub mean_overcorrection: f64,
    pub mean_meaning: f64,
    pub mean_latency_secs: f64,
    pub p95_latency_secs: f64,
    pub mean_compression: Option<f64>,
    pub bloat_rate: Option<f64>,
    pub mean_informality: Option<f64>,
    pub mean_formality: Option<f64>,
    pub stability: Option<f64>,
    pub stability_samples: usize,
    pub composite: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct VariantReport {
    pub metrics: VariantMetrics,
    pub details: Vec<SampleResult>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModeReport {
    pub mode: EvalMode,
    pub sample_count: usize,
    pub ranked_by: String,
    /// Best first.
    pub variants: Vec<VariantReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EvalReport {
    pub report_version: u32,
    pub run_id: String,
    pub generated_at: String,
    pub endpoint: String,
    pub model: String,
    pub modes: Vec<ModeReport>,
}
