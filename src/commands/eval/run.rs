use anyhow::{Result, bail};
use chrono::Utc;
use tracing::info;

use super::aggregate::{evaluate_variant, rank_variants, ranking_label};
use super::report::print_reports;
use super::runner::SampleRunner;
use crate::cli::EvalArgs;
use crate::client::{ChatModel, HttpChatModel};
use crate::commands::{load_lexicons, ping};
use crate::dataset::{evenly_spaced, load_samples, load_variants, select_variant};
use crate::metrics::Lexicons;
use crate::mode::EvalMode;
use crate::model::{EvalReport, ModeReport, PromptVariant, Sample, VariantReport};
use crate::util::{now_utc_string, utc_compact_string, write_json_pretty};

const REPORT_VERSION: u32 = 1;

pub(super) struct ModePlan {
    pub(super) mode: EvalMode,
    pub(super) samples: Vec<Sample>,
    pub(super) variants: Vec<PromptVariant>,
}

pub fn run(args: EvalArgs) -> Result<()> {
    let modes = args.mode.modes();
    if modes.len() > 1 && (args.samples_path.is_some() || args.variants_path.is_some()) {
        bail!("--samples-path and --variants-path require a single --mode");
    }

    let lexicons = load_lexicons(args.lexicon_path.as_deref())?;
    let plans = build_plans(&args, &modes)?;

    let model = HttpChatModel::new(&args.endpoint.client_config())?;
    if args.skip_ping {
        info!(endpoint = %model.endpoint(), "skipping connectivity check");
    } else {
        ping::smoke_test(&model)?;
    }

    let run_id = format!("eval-{}", utc_compact_string(Utc::now()));
    info!(run_id = %run_id, modes = plans.len(), "evaluation started");

    let reports = plans
        .iter()
        .map(|plan| {
            evaluate_mode(
                &model,
                plan.mode,
                &plan.samples,
                &plan.variants,
                &lexicons,
                args.degenerate_retries,
            )
        })
        .collect::<Vec<ModeReport>>();

    print_reports(&reports, args.show_all)?;

    if let Some(path) = &args.output {
        let report = EvalReport {
            report_version: REPORT_VERSION,
            run_id: run_id.clone(),
            generated_at: now_utc_string(),
            endpoint: model.endpoint().to_string(),
            model: args.endpoint.model.clone(),
            modes: reports,
        };
        write_json_pretty(path, &report)?;
        info!(path = %path.display(), "wrote evaluation report");
    }

    info!(run_id = %run_id, "evaluation completed");
    Ok(())
}

/// Loads and validates every table before the first model call. With
/// `--variant`, modes that do not define it are skipped.
pub(super) fn build_plans(args: &EvalArgs, modes: &[EvalMode]) -> Result<Vec<ModePlan>> {
    let mut plans = Vec::<ModePlan>::with_capacity(modes.len());
    let mut skipped = Vec::<String>::new();
    for mode in modes {
        let variants = load_variants(*mode, args.variants_path.as_deref())?;
        if let Some(name) = args.variant.as_deref()
            && !variants.iter().any(|variant| variant.name == name)
        {
            skipped.extend(variants.into_iter().map(|variant| variant.name));
            continue;
        }
        let variants = select_variant(variants, args.variant.as_deref())?;

        let samples = evenly_spaced(
            load_samples(*mode, args.samples_path.as_deref())?,
            args.samples,
        );
        info!(
            mode = mode.as_str(),
            variants = variants.len(),
            samples = samples.len(),
            "loaded tables"
        );
        plans.push(ModePlan {
            mode: *mode,
            samples,
            variants,
        });
    }

    if plans.is_empty() {
        match args.variant.as_deref() {
            Some(name) => bail!(
                "unknown variant '{name}' for the selected mode(s); available: {}",
                skipped.join(", ")
            ),
            None => bail!("no prompt variants to evaluate"),
        }
    }
    Ok(plans)
}

/// Evaluates every variant of one mode, one after another, and ranks them.
pub fn evaluate_mode<M: ChatModel + ?Sized>(
    model: &M,
    mode: EvalMode,
    samples: &[Sample],
    variants: &[PromptVariant],
    lexicons: &Lexicons,
    degenerate_retries: usize,
) -> ModeReport {
    let runner = SampleRunner {
        model,
        mode,
        lexicons,
        degenerate_retries,
    };

    let reports = variants
        .iter()
        .map(|variant| evaluate_variant(&runner, variant, samples))
        .collect::<Vec<VariantReport>>();

    ModeReport {
        mode,
        sample_count: samples.len(),
        ranked_by: ranking_label(mode).to_string(),
        variants: rank_variants(mode, reports),
    }
}
