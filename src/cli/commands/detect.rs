//! Detect command - probe which editors are running.
//!
//! Attaches a logging event sink for the duration of the probe, so
//! `--verbose` shows detection transitions as they happen.

use anyhow::Result;
use colored::Colorize;
use std::sync::Arc;

use crate::capture::Engine;
use crate::config::Config;
use crate::detect::EventSink;
use crate::ide::IdeKind;

use super::target_ides;

/// Arguments for the detect command.
#[derive(clap::Args)]
pub struct Args {
    /// Editor to probe (vscode or cursor); both when omitted
    #[arg(long)]
    pub ide: Option<String>,
}

/// Event sink that forwards detection transitions to the log.
struct LogSink;

impl EventSink for LogSink {
    fn editor_detected(&self, ide: IdeKind) {
        tracing::debug!(ide = %ide, "editor detected");
    }

    fn editor_missing(&self, ide: IdeKind) {
        tracing::debug!(ide = %ide, "editor missing");
    }
}

/// Executes the detect command.
pub async fn run(args: Args) -> Result<()> {
    let engine = Engine::new(Config::default());
    engine.detector().start(Arc::new(LogSink));

    for ide in target_ides(args.ide.as_deref())? {
        if engine.detector().is_running(ide).await {
            println!("{}  {}", ide.to_string().bold(), "running".green());
        } else {
            println!("{}  {}", ide.to_string().bold(), "not running".dimmed());
        }
    }

    engine.detector().stop();
    Ok(())
}
