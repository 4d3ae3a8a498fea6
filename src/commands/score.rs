use std::io::{self, Write};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::cli::ScoreArgs;
use crate::commands::eval::score_output;
use crate::commands::load_lexicons;
use crate::mode::EvalMode;
use crate::model::{Sample, SampleScores};

#[derive(Debug, Serialize)]
struct ScoreResponse {
    mode: EvalMode,
    source: String,
    output: String,
    references: Vec<String>,
    scores: SampleScores,
}

pub fn run(args: ScoreArgs) -> Result<()> {
    let lexicons = load_lexicons(args.lexicon_path.as_deref())?;
    let sample = Sample {
        source: args.source,
        references: args.references,
        preserve: args.preserve,
    };
    let scores = score_output(args.mode, &lexicons, &sample, &args.output);

    let mut output = io::BufWriter::new(io::stdout().lock());
    if args.json {
        let response = ScoreResponse {
            mode: args.mode,
            source: sample.source,
            output: args.output,
            references: sample.references,
            scores,
        };
        serde_json::to_writer_pretty(&mut output, &response)
            .context("failed to serialize score json output")?;
        writeln!(output)?;
    } else {
        writeln!(output, "mode:           {}", args.mode.as_str())?;
        writeln!(output, "gleu:           {:.4}", scores.gleu)?;
        writeln!(output, "exact_match:    {}", scores.exact_match)?;
        writeln!(output, "changed:        {}", scores.changed)?;
        writeln!(output, "change_ratio:   {:.4}", scores.change_ratio)?;
        writeln!(output, "overcorrection: {:.4}", scores.overcorrection)?;
        writeln!(output, "meaning:        {:.4}", scores.meaning_preserved)?;
        if let Some(value) = scores.compression_ratio {
            writeln!(output, "compression:    {value:.4}")?;
        }
        if let Some(value) = scores.bloated {
            writeln!(output, "bloated:        {value}")?;
        }
        if let Some(value) = scores.informality {
            writeln!(output, "informality:    {value:.4}")?;
        }
        if let Some(value) = scores.formality {
            writeln!(output, "formality:      {value:.4}")?;
        }
        if let Some(value) = scores.stability_pass {
            writeln!(output, "stability_pass: {value}")?;
        }
    }
    output.flush()?;
    Ok(())
}
