use std::io::{self, Write};

use anyhow::Result;
use tracing::{info, warn};

use crate::clean::clean_checked;
use crate::cli::ProbeArgs;
use crate::client::{ChatModel, HttpChatModel};
use crate::dataset::{load_variants, select_variant};
use crate::model::PromptVariant;

#[derive(Debug, Clone, PartialEq)]
pub struct ProbeOutcome {
    pub variant: String,
    pub output: Result<String, String>,
    pub latency_secs: Option<f64>,
}

pub fn run(args: ProbeArgs) -> Result<()> {
    let variants = select_variant(
        load_variants(args.mode, args.variants_path.as_deref())?,
        args.variant.as_deref(),
    )?;
    let model = HttpChatModel::new(&args.endpoint.client_config())?;
    info!(
        mode = args.mode.as_str(),
        variants = variants.len(),
        endpoint = %model.endpoint(),
        "probing variants"
    );

    let outcomes = probe_variants(&model, &variants, &args.text);

    let mut output = io::BufWriter::new(io::stdout().lock());
    writeln!(output, "Input: {}", args.text)?;
    for outcome in &outcomes {
        match &outcome.output {
            Ok(text) => {
                let changed = text.trim() != args.text.trim();
                writeln!(
                    output,
                    "{:<32} -> {}  ({:.2}s, {})",
                    outcome.variant,
                    text,
                    outcome.latency_secs.unwrap_or_default(),
                    if changed { "changed" } else { "unchanged" }
                )?;
            }
            Err(error) => writeln!(output, "{:<32} -> ERROR: {error}", outcome.variant)?,
        }
    }
    output.flush()?;
    Ok(())
}

pub fn probe_variants<M: ChatModel + ?Sized>(
    model: &M,
    variants: &[PromptVariant],
    text: &str,
) -> Vec<ProbeOutcome> {
    variants
        .iter()
        .map(|variant| {
            match model.complete(text, &variant.instructions, variant.temperature) {
                Ok(completion) => ProbeOutcome {
                    variant: variant.name.clone(),
                    output: clean_checked(&completion.text).map_err(|_| {
                        "response held only reasoning content".to_string()
                    }),
                    latency_secs: Some(completion.latency.as_secs_f64()),
                },
                Err(err) => {
                    warn!(variant = %variant.name, error = %err, "probe failed");
                    ProbeOutcome {
                        variant: variant.name.clone(),
                        output: Err(err.to_string()),
                        latency_secs: None,
                    }
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::client::{CompletionError, RawCompletion};

    struct ByInstructions;

    impl ChatModel for ByInstructions {
        fn complete(
            &self,
            user_text: &str,
            instructions: &str,
            _temperature: f64,
        ) -> Result<RawCompletion, CompletionError> {
            let text = match instructions {
                "think" => "<think>only reasoning</think>".to_string(),
                "fail" => return Err(CompletionError::Timeout { timeout_secs: 60 }),
                _ => format!("\"{}\"", user_text.to_uppercase()),
            };
            Ok(RawCompletion {
                text,
                latency: Duration::from_millis(500),
            })
        }
    }

    fn variant(name: &str, instructions: &str) -> PromptVariant {
        PromptVariant {
            name: name.to_string(),
            instructions: instructions.to_string(),
            temperature: 0.0,
        }
    }

    #[test]
    fn probe_keeps_variant_order_and_isolates_failures() {
        let variants = vec![
            variant("shout", "shout"),
            variant("thinker", "think"),
            variant("slow", "fail"),
        ];

        let outcomes = probe_variants(&ByInstructions, &variants, "hi there");

        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes[0].variant, "shout");
        assert_eq!(outcomes[0].output, Ok("HI THERE".to_string()));
        assert_eq!(outcomes[0].latency_secs, Some(0.5));
        assert!(outcomes[1].output.is_err());
        assert!(
            outcomes[2]
                .output
                .as_ref()
                .is_err_and(|error| error.contains("timed out"))
        );
        assert_eq!(outcomes[2].latency_secs, None);
    }
}
