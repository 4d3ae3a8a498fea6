use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;

use crate::cli::PingArgs;
use crate::client::{ChatModel, HttpChatModel};

const PING_TEXT: &str = "Hello world";
const PING_INSTRUCTIONS: &str = "Respond with exactly: Hello world";

pub fn run(args: PingArgs) -> Result<()> {
    let model = HttpChatModel::new(&args.endpoint.client_config())?;
    smoke_test(&model)?;
    Ok(())
}

/// One deterministic call before a run; any failure aborts.
pub fn smoke_test<M: ChatModel + ?Sized>(model: &M) -> Result<Duration> {
    let completion = model
        .complete(PING_TEXT, PING_INSTRUCTIONS, 0.0)
        .context("model endpoint connectivity check failed")?;
    info!(
        latency_secs = completion.latency.as_secs_f64(),
        response = %completion.text,
        "model endpoint responding"
    );
    Ok(completion.latency)
}
