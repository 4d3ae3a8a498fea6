//! Sample and prompt-variant tables.
//!
//! Built-in tables ship with the binary; `--samples-path` / `--variants-path`
//! substitute JSON files with the same shape.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result, bail};

use crate::mode::EvalMode;
use crate::model::{PromptVariant, Sample};
use crate::util::read_json;

fn builtin_samples_json(mode: EvalMode) -> &'static str {
    match mode {
        EvalMode::Grammar => include_str!("../data/samples/grammar.json"),
        EvalMode::Concise => include_str!("../data/samples/concise.json"),
        EvalMode::Casual => include_str!("../data/samples/casual.json"),
        EvalMode::Professional => include_str!("../data/samples/professional.json"),
    }
}

fn builtin_variants_json(mode: EvalMode) -> &'static str {
    match mode {
        EvalMode::Grammar => include_str!("../data/variants/grammar.json"),
        EvalMode::Concise => include_str!("../data/variants/concise.json"),
        EvalMode::Casual => include_str!("../data/variants/casual.json"),
        EvalMode::Professional => include_str!("../data/variants/professional.json"),
    }
}

pub fn builtin_samples(mode: EvalMode) -> Result<Vec<Sample>> {
    serde_json::from_str(builtin_samples_json(mode))
        .with_context(|| format!("failed to parse built-in {} samples", mode.as_str()))
}

pub fn builtin_variants(mode: EvalMode) -> Result<Vec<PromptVariant>> {
    serde_json::from_str(builtin_variants_json(mode))
        .with_context(|| format!("failed to parse built-in {} variants", mode.as_str()))
}

pub fn load_samples(mode: EvalMode, path: Option<&Path>) -> Result<Vec<Sample>> {
    let samples = match path {
        Some(path) => read_json::<Vec<Sample>>(path)?,
        None => builtin_samples(mode)?,
    };
    validate_samples(&samples)?;
    Ok(samples)
}

pub fn load_variants(mode: EvalMode, path: Option<&Path>) -> Result<Vec<PromptVariant>> {
    let variants = match path {
        Some(path) => read_json::<Vec<PromptVariant>>(path)?,
        None => builtin_variants(mode)?,
    };
    validate_variants(&variants)?;
    Ok(variants)
}

pub fn validate_samples(samples: &[Sample]) -> Result<()> {
    for (index, sample) in samples.iter().enumerate() {
        if sample.references.is_empty() {
            bail!("sample {index} has no references");
        }
    }
    Ok(())
}

pub fn validate_variants(variants: &[PromptVariant]) -> Result<()> {
    let mut seen = HashSet::<&str>::new();
    for variant in variants {
        let name = variant.name.trim();
        if name.is_empty() {
            bail!("prompt variant with empty name");
        }
        if !seen.insert(name) {
            bail!("duplicate prompt variant name: {name}");
        }
        if !(0.0..=1.0).contains(&variant.temperature) {
            bail!(
                "variant {name} has temperature {} outside [0, 1]",
                variant.temperature
            );
        }
    }
    Ok(())
}

pub fn select_variant(
    variants: Vec<PromptVariant>,
    name: Option<&str>,
) -> Result<Vec<PromptVariant>> {
    let Some(name) = name else {
        return Ok(variants);
    };

    let available = variants
        .iter()
        .map(|variant| variant.name.clone())
        .collect::<Vec<String>>();
    let selected = variants
        .into_iter()
        .filter(|variant| variant.name == name)
        .collect::<Vec<PromptVariant>>();
    if selected.is_empty() {
        bail!(
            "unknown variant '{name}'; available: {}",
            available.join(", ")
        );
    }
    Ok(selected)
}

/// Keeps at most `limit` samples, evenly spaced across the table so a short run
/// still covers every section of it.
pub fn evenly_spaced(samples: Vec<Sample>, limit: Option<usize>) -> Vec<Sample> {
    let Some(limit) = limit else {
        return samples;
    };
    if limit == 0 || limit >= samples.len() {
        return samples;
    }

    let step = samples.len() as f64 / limit as f64;
    let indices = (0..limit)
        .map(|i| (i as f64 * step) as usize)
        .collect::<HashSet<usize>>();
    samples
        .into_iter()
        .enumerate()
        .filter(|(index, _)| indices.contains(index))
        .map(|(_, sample)| sample)
        .collect()
}
