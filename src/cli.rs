use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::client::{
    DEFAULT_BASE_URL, DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS, HttpClientConfig,
};
use crate::commands::eval::DEFAULT_DEGENERATE_RETRIES;
use crate::mode::EvalMode;

#[derive(Parser, Debug)]
#[command(
    name = "prompteval",
    version,
    about = "Score rewriting prompt variants against reference rewrites"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run prompt variants over a sample table and rank them.
    Eval(EvalArgs),
    /// Send one text through every variant of a mode.
    Probe(ProbeArgs),
    /// Score a source/output/references triple without calling a model.
    Score(ScoreArgs),
    /// Check that the model endpoint answers.
    Ping(PingArgs),
}

#[derive(Args, Debug, Clone)]
pub struct EndpointArgs {
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    #[arg(long, default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Per-call timeout in seconds; must be at least 1.
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    #[arg(long, default_value_t = DEFAULT_MAX_TOKENS)]
    pub max_tokens: u32,
}

impl EndpointArgs {
    pub fn client_config(&self) -> HttpClientConfig {
        HttpClientConfig {
            base_url: self.base_url.clone(),
            model: self.model.clone(),
            timeout_secs: self.timeout_secs,
            max_tokens: self.max_tokens,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum ModeSelection {
    Grammar,
    Concise,
    Casual,
    Professional,
    Styles,
    All,
}

impl ModeSelection {
    pub fn modes(self) -> Vec<EvalMode> {
        match self {
            Self::Grammar => vec![EvalMode::Grammar],
            Self::Concise => vec![EvalMode::Concise],
            Self::Casual => vec![EvalMode::Casual],
            Self::Professional => vec![EvalMode::Professional],
            Self::Styles => EvalMode::STYLES.to_vec(),
            Self::All => EvalMode::ALL.to_vec(),
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct EvalArgs {
    #[command(flatten)]
    pub endpoint: EndpointArgs,

    #[arg(long, value_enum, default_value_t = ModeSelection::Grammar)]
    pub mode: ModeSelection,

    /// Cap on samples per mode, picked evenly across the table.
    #[arg(long)]
    pub samples: Option<usize>,

    /// Evaluate only this variant; modes that do not define it are skipped.
    #[arg(long)]
    pub variant: Option<String>,

    /// JSON sample table; only valid with a single mode.
    #[arg(long)]
    pub samples_path: Option<PathBuf>,

    /// JSON variant table; only valid with a single mode.
    #[arg(long)]
    pub variants_path: Option<PathBuf>,

    #[arg(long)]
    pub lexicon_path: Option<PathBuf>,

    #[arg(long, default_value_t = DEFAULT_DEGENERATE_RETRIES)]
    pub degenerate_retries: usize,

    #[arg(long)]
    pub output: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub show_all: bool,

    #[arg(long, default_value_t = false)]
    pub skip_ping: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ProbeArgs {
    #[command(flatten)]
    pub endpoint: EndpointArgs,

    pub text: String,

    #[arg(long, value_enum, default_value_t = EvalMode::Grammar)]
    pub mode: EvalMode,

    #[arg(long)]
    pub variant: Option<String>,

    #[arg(long)]
    pub variants_path: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct ScoreArgs {
    #[arg(long)]
    pub source: String,

    #[arg(long)]
    pub output: String,

    #[arg(long = "reference", required = true)]
    pub references: Vec<String>,

    #[arg(long = "preserve")]
    pub preserve: Vec<String>,

    #[arg(long, value_enum, default_value_t = EvalMode::Grammar)]
    pub mode: EvalMode,

    #[arg(long)]
    pub lexicon_path: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct PingArgs {
    #[command(flatten)]
    pub endpoint: EndpointArgs,
}
