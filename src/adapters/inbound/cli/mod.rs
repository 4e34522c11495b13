//! CLI inbound adapter that translates parsed commands into countdown runs.

use std::{
    io::{self, IsTerminal},
    path::PathBuf,
    sync::Arc,
};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{info, warn};

pub use crate::cli::*;

use crate::{
    adapters::outbound::{
        clock::FixedClock,
        display::{RenderMode, SlotBoard, TerminalDisplay},
    },
    application::{CountdownUpdater, StopReason, Ticker, TickerOptions},
    config::{CountdownConfig, CountdownSettings},
    core::{Snapshot, Target, ports::Clock},
    paths,
};

/// JSON shape printed by `once --json`.
#[derive(Debug, Serialize)]
pub struct SnapshotExport {
    pub title: Option<String>,
    pub target: String,
    #[serde(flatten)]
    pub snapshot: Snapshot,
}

/// CLI adapter owning the clock that live commands sample.
pub struct CliAdapter {
    clock: Arc<dyn Clock>,
}

impl CliAdapter {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    pub async fn execute(&self, command: Commands) -> Result<()> {
        match command {
            Commands::Run(args) => self.run_command(args).await,
            Commands::Once(args) => self.once_command(args),
        }
    }

    async fn run_command(&self, args: RunArgs) -> Result<()> {
        let settings = load_settings(&args.source, args.tick_ms)?;
        let mode = if args.lines || !io::stdout().is_terminal() {
            RenderMode::Lines
        } else {
            RenderMode::Inline
        };
        let display = Arc::new(TerminalDisplay::stdout(settings.title.clone(), mode));
        let updater = CountdownUpdater::new(settings.target, self.clock.clone(), display);
        let ticker = Ticker::new(
            updater,
            TickerOptions {
                interval: settings.tick_interval,
                max_ticks: args.ticks,
                exit_on_expiry: args.exit_on_expiry,
            },
        );

        let report = ticker.run(shutdown_signal()).await;
        match report.stop {
            StopReason::Expired => info!(target_instant = %settings.target, "Target reached"),
            StopReason::TickLimit | StopReason::Shutdown => info!(
                invocations = report.invocations,
                failures = report.failures,
                "Countdown stopped"
            ),
        }
        Ok(())
    }

    fn once_command(&self, args: OnceArgs) -> Result<()> {
        let settings = load_settings(&args.source, None)?;
        let clock: Arc<dyn Clock> = match &args.at {
            Some(raw) => {
                let at = Target::parse(raw).with_context(|| format!("Invalid --at value '{raw}'"))?;
                Arc::new(FixedClock::new(at.as_millis()))
            }
            None => self.clock.clone(),
        };

        if args.json {
            let updater =
                CountdownUpdater::new(settings.target, clock, Arc::new(SlotBoard::standard()));
            let snapshot = updater.update()?;
            let export = SnapshotExport {
                title: settings.title,
                target: settings.target.to_string(),
                snapshot,
            };
            println!("{}", serde_json::to_string_pretty(&export)?);
        } else {
            let display = Arc::new(TerminalDisplay::stdout(settings.title, RenderMode::Lines));
            CountdownUpdater::new(settings.target, clock, display).update()?;
        }
        Ok(())
    }
}

fn load_settings(source: &TargetArgs, tick_ms: Option<u64>) -> Result<CountdownSettings> {
    let config = match config_path(source) {
        Some(path) => CountdownConfig::from_path(&path)?,
        None => CountdownConfig::default(),
    };
    config.resolve(source.target.as_deref(), tick_ms)
}

fn config_path(source: &TargetArgs) -> Option<PathBuf> {
    source.config.clone().or_else(|| {
        let fallback = paths::default_config_path();
        fallback.is_file().then_some(fallback)
    })
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "Unable to listen for Ctrl-C; run until a stop condition is met");
        std::future::pending::<()>().await;
    }
}
