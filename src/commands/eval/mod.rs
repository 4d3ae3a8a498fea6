mod aggregate;
mod report;
mod run;
mod runner;

pub use run::run;
pub use runner::{DEFAULT_DEGENERATE_RETRIES, score_output};
