use std::collections::HashSet;
use std::io::{self, Write};

use anyhow::Result;

use crate::mode::EvalMode;
use crate::model::{ModeReport, VariantMetrics};
use crate::util::preview;

const PREVIEW_CHARS: usize = 100;

pub fn write_mode_summary(out: &mut impl Write, report: &ModeReport) -> Result<()> {
    writeln!(out)?;
    writeln!(
        out,
        "== {} mode: {} variant(s), {} sample(s), ranked by {} ==",
        report.mode.as_str(),
        report.variants.len(),
        report.sample_count,
        report.ranked_by
    )?;
    writeln!(out, "{}", table_header(report.mode))?;
    for variant in &report.variants {
        writeln!(out, "{}", table_row(&variant.metrics))?;
    }

    if let Some(best) = report.variants.first() {
        writeln!(
            out,
            "Best: {} ({}={:.4})",
            best.metrics.variant,
            report.ranked_by,
            report.mode.profile().ranking_score(&best.metrics)
        )?;
    }
    Ok(())
}

fn table_header(mode: EvalMode) -> String {
    let signal = match mode {
        EvalMode::Grammar => format!("{:>8} {:>8} {:>9}", "exact", "changed", "overcorr"),
        EvalMode::Concise => format!("{:>8} {:>8} {:>9}", "meaning", "compress", "bloat"),
        EvalMode::Casual => format!("{:>8} {:>8} {:>9}", "meaning", "informal", "stable"),
        EvalMode::Professional => format!("{:>8} {:>8} {:>9}", "meaning", "formal", "stable"),
    };
    format!(
        "{:<32} {:>9} {:>7} {signal} {:>8} {:>8} {:>6}",
        "variant", "composite", "gleu", "latency", "p95", "errors"
    )
}

fn table_row(metrics: &VariantMetrics) -> String {
    let signal = match metrics.mode {
        EvalMode::Grammar => format!(
            "{:>8} {:>8} {:>9.4}",
            format_percent(Some(metrics.exact_match_rate)),
            format_percent(Some(metrics.change_rate)),
            metrics.mean_overcorrection
        ),
        EvalMode::Concise => format!(
            "{:>8} {:>8} {:>9}",
            format_percent(Some(metrics.mean_meaning)),
            format!("{:.2}x", metrics.mean_compression.unwrap_or(1.0)),
            format_percent(metrics.bloat_rate)
        ),
        EvalMode::Casual => format!(
            "{:>8} {:>8.4} {:>9}",
            format_percent(Some(metrics.mean_meaning)),
            metrics.mean_informality.unwrap_or(0.0),
            format_percent(metrics.stability)
        ),
        EvalMode::Professional => format!(
            "{:>8} {:>8.4} {:>9}",
            format_percent(Some(metrics.mean_meaning)),
            metrics.mean_formality.unwrap_or(0.0),
            format_percent(metrics.stability)
        ),
    };
    format!(
        "{:<32} {:>9.4} {:>7.4} {signal} {:>7.2}s {:>7.2}s {:>6}",
        metrics.variant,
        metrics.composite,
        metrics.mean_gleu,
        metrics.mean_latency_secs,
        metrics.p95_latency_secs,
        metrics.errors
    )
}

pub fn format_percent(value: Option<f64>) -> String {
    match value {
        Some(value) => format!("{:.1}%", value * 100.0),
        None => "n/a".to_string(),
    }
}

/// Samples where the variants disagree, first variant's order.
pub fn write_sample_comparisons(
    out: &mut impl Write,
    report: &ModeReport,
    limit: usize,
) -> Result<()> {
    let Some(first) = report.variants.first() else {
        return Ok(());
    };
    if report.variants.len() < 2 {
        return Ok(());
    }

    writeln!(out)?;
    writeln!(out, "-- sample comparisons ({}) --", report.mode.as_str())?;
    let mut shown = 0usize;
    for (position, detail) in first.details.iter().enumerate() {
        if shown >= limit {
            break;
        }
        if detail.is_error() {
            continue;
        }

        let outputs = report
            .variants
            .iter()
            .filter_map(|variant| variant.details.get(position))
            .filter_map(|detail| detail.output.as_deref())
            .collect::<HashSet<&str>>();
        if outputs.len() < 2 {
            continue;
        }

        writeln!(out, "[{}] source:    {}", detail.index, detail.source)?;
        if let Some(reference) = detail.references.first() {
            writeln!(out, "\treference: {reference}")?;
        }
        for variant in &report.variants {
            let Some(other) = variant.details.get(position) else {
                continue;
            };
            if let (Some(output), Some(scores)) = (&other.output, &other.scores) {
                writeln!(
                    out,
                    "\t{}: {}  (gleu={:.3})",
                    variant.metrics.variant, output, scores.gleu
                )?;
            }
        }
        shown += 1;
    }
    Ok(())
}

/// Every sample of the top-ranked variant.
pub fn write_best_variant_details(out: &mut impl Write, report: &ModeReport) -> Result<()> {
    let Some(best) = report.variants.first() else {
        return Ok(());
    };

    writeln!(out)?;
    writeln!(
        out,
        "-- all samples for {} ({}) --",
        best.metrics.variant,
        report.mode.as_str()
    )?;
    for detail in &best.details {
        if let Some(error) = &detail.error {
            writeln!(out, "[{}] error: {error}", detail.index)?;
            continue;
        }
        writeln!(out, "[{}]", detail.index)?;
        writeln!(out, "\tsource: {}", preview(&detail.source, PREVIEW_CHARS))?;
        writeln!(
            out,
            "\toutput: {}",
            preview(detail.output.as_deref().unwrap_or_default(), PREVIEW_CHARS)
        )?;
        if let Some(reference) = detail.references.first() {
            writeln!(out, "\tref[0]: {}", preview(reference, PREVIEW_CHARS))?;
        }
        if let Some(scores) = &detail.scores {
            writeln!(
                out,
                "\tgleu={:.4} meaning={} changed={} exact={} overcorrection={:.4}",
                scores.gleu,
                format_percent(Some(scores.meaning_preserved)),
                scores.changed,
                scores.exact_match,
                scores.overcorrection
            )?;
        }
    }
    Ok(())
}

pub fn write_winners(out: &mut impl Write, reports: &[ModeReport]) -> Result<()> {
    if reports.is_empty() {
        return Ok(());
    }

    writeln!(out)?;
    writeln!(out, "== winners ==")?;
    for report in reports {
        let Some(best) = report.variants.first() else {
            continue;
        };
        let metrics = &best.metrics;
        writeln!(
            out,
            "{:<14} {:<32} composite={:.4} gleu={:.4} meaning={}",
            report.mode.as_str(),
            metrics.variant,
            metrics.composite,
            metrics.mean_gleu,
            format_percent(Some(metrics.mean_meaning))
        )?;
    }
    Ok(())
}

pub fn print_reports(reports: &[ModeReport], show_all: bool) -> Result<()> {
    let mut output = io::BufWriter::new(io::stdout().lock());
    for report in reports {
        write_mode_summary(&mut output, report)?;
        if report.mode == EvalMode::Grammar {
            write_sample_comparisons(&mut output, report, 5)?;
        }
        if show_all {
            write_best_variant_details(&mut output, report)?;
        }
    }
    write_winners(&mut output, reports)?;
    output.flush()?;
    Ok(())
}
