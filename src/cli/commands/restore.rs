//! Restore command - relaunch an editor from a stored session.
//!
//! Reads an `IdeSession` JSON file (as written by `flowstate capture
//! --output`), refreshes the context document, and relaunches the editor
//! against the captured workspaces. Unreachable targets are reported as
//! warnings; the command only errors when the session file itself is
//! unreadable.

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

use crate::capture::Engine;
use crate::config::Config;
use crate::restore::Restorer;
use crate::session::IdeSession;

use super::analyzer_for;

/// Arguments for the restore command.
#[derive(clap::Args)]
pub struct Args {
    /// Session file to restore (JSON, from 'flowstate capture --output')
    pub session: PathBuf,

    /// Fresh workspace analysis JSON; regenerates the context document
    /// instead of appending a restore note
    #[arg(long)]
    pub analysis: Option<PathBuf>,
}

/// Executes the restore command.
pub async fn run(args: Args) -> Result<()> {
    let raw = std::fs::read_to_string(&args.session)
        .with_context(|| format!("Failed to read {}", args.session.display()))?;
    let session: IdeSession =
        serde_json::from_str(&raw).context("Session file is not a valid IdeSession")?;

    let analyzer = analyzer_for(args.analysis);
    let engine = Engine::new(Config::default());
    let restorer = Restorer::new(engine.config(), engine.writer());

    let report = restorer
        .restore(&session, analyzer.as_ref(), &CancellationToken::new())
        .await?;

    for launched in &report.launched {
        println!(
            "{}",
            format!("Launched {} against {}", session.ide, launched.display()).green()
        );
    }
    for skipped in &report.skipped {
        println!(
            "{}",
            format!("Skipped {}: {}", skipped.path.display(), skipped.reason).yellow()
        );
    }

    if !report.any_launched() {
        println!("{}", "No targets launched".dimmed());
    }

    Ok(())
}
