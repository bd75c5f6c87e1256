//! Capture command - snapshot sessions from running editors.
//!
//! Runs one capture cycle per targeted editor and prints or writes the
//! resulting sessions. Editors that are not running, or are running
//! without a resolvable workspace, are reported as notices, not errors.

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

use crate::capture::{CaptureOutcome, Engine};
use crate::cli::format::OutputFormat;
use crate::config::Config;
use crate::session::IdeSession;

use super::{analyzer_for, target_ides};

/// Arguments for the capture command.
#[derive(clap::Args)]
pub struct Args {
    /// Editor to capture (vscode or cursor); both when omitted
    #[arg(long)]
    pub ide: Option<String>,

    /// Pre-computed workspace analysis JSON to render into the context
    /// document
    #[arg(long)]
    pub analysis: Option<PathBuf>,

    /// Write captured sessions to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t)]
    pub format: OutputFormat,
}

/// Executes the capture command.
pub async fn run(args: Args) -> Result<()> {
    let ides = target_ides(args.ide.as_deref())?;
    let analyzer = analyzer_for(args.analysis);
    let engine = Engine::new(Config::default());
    let cancel = CancellationToken::new();

    let mut sessions: Vec<IdeSession> = Vec::new();
    for ide in ides {
        match engine.capture(ide, analyzer.as_ref(), &cancel).await? {
            CaptureOutcome::NotRunning => {
                println!("{}", format!("{ide}: not running").dimmed());
            }
            CaptureOutcome::NoWorkspace => {
                println!("{}", format!("{ide}: running, no active workspace").yellow());
            }
            CaptureOutcome::Session(session) => {
                println!(
                    "{}",
                    format!(
                        "{ide}: captured {} workspace(s), {} open file(s)",
                        session.workspace_paths.len(),
                        session.open_files.len()
                    )
                    .green()
                );
                sessions.push(session);
            }
        }
    }

    if sessions.is_empty() {
        println!("{}", "No sessions captured".dimmed());
        return Ok(());
    }

    match args.format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&sessions)?;
            match &args.output {
                Some(path) => {
                    std::fs::write(path, &json)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    println!("Wrote {} session(s) to {}", sessions.len(), path.display());
                }
                None => println!("{json}"),
            }
        }
        OutputFormat::Text => {
            for session in &sessions {
                print_session(session);
            }
            if let Some(path) = &args.output {
                let json = serde_json::to_string_pretty(&sessions)?;
                std::fs::write(path, &json)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                println!("Wrote {} session(s) to {}", sessions.len(), path.display());
            }
        }
    }

    Ok(())
}

fn print_session(session: &IdeSession) {
    println!();
    println!("{} {}", session.ide.to_string().bold().cyan(), session.id);
    for workspace in &session.workspace_paths {
        println!("  workspace  {}", workspace.display());
    }
    for file in &session.open_files {
        println!("  open       {}", file.path.display());
    }
    if !session.recent_workspaces.is_empty() {
        println!("  recent     {} workspace(s)", session.recent_workspaces.len());
    }
    if let Some(context) = &session.context_file {
        println!("  context    {}", context.path.display().to_string().green());
    }
}
