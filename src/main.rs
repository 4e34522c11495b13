use std::{process::ExitCode, sync::Arc};

use clap::Parser;
use uuid::Uuid;

use countdown::{
    adapters::{clock::SystemClock, inbound::cli::CliAdapter},
    cli::{Cli, Commands},
};

mod tracing_setup;

use tracing_setup::ConsoleFormat;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let run_id = matches!(cli.command, Commands::Run(_)).then(new_run_id);
    let format = ConsoleFormat::from_flags(cli.verbose, cli.log_json, cli.pretty);
    // Held until main returns so the file log is flushed.
    let _guard = tracing_setup::init(format, run_id.as_deref());
    if let Some(id) = &run_id {
        tracing::debug!(run_id = %id, "run log attached");
    }

    let adapter = CliAdapter::new(Arc::new(SystemClock::new()));
    match adapter.execute(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("Command failed: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn new_run_id() -> String {
    Uuid::new_v4().to_string()
}
