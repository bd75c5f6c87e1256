use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod analyzer;
mod capture;
mod cli;
mod config;
mod context;
mod detect;
mod error;
mod ide;
mod restore;
mod session;
mod workspace;

use cli::commands;

/// The main CLI command line interface.
#[derive(Parser)]
#[command(name = "flowstate")]
#[command(version)]
#[command(about = "Capture and restore your working context across editor sessions")]
#[command(long_about = "FlowState detects running editors, captures which workspace and\n\
    files you were working in, and writes a continuation document to the\n\
    workspace root. A captured session can later be restored: the editor\n\
    is relaunched against the same workspace with the continuation\n\
    document alongside it.")]
#[command(after_help = "EXAMPLES:\n    \
    flowstate capture                         Capture all running editors\n    \
    flowstate capture --ide cursor            Capture Cursor only\n    \
    flowstate capture -o session.json         Save the session for later\n    \
    flowstate restore session.json            Relaunch from a saved session\n    \
    flowstate detect                          Show which editors are running\n\n\
    For more information about a command, run 'flowstate <command> --help'.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available CLI subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Capture sessions from running editors
    #[command(long_about = "Runs one capture cycle per editor: detects the process, resolves\n\
        the active workspace from the editor's storage, and writes the\n\
        context document when an analysis is supplied. Editors that are\n\
        not running produce a notice, not an error.")]
    Capture(commands::capture::Args),

    /// Restore an editor from a previously captured session
    #[command(long_about = "Reads a session JSON file, refreshes the workspace's context\n\
        document, and relaunches the editor against each captured\n\
        workspace. Targets that no longer exist are skipped with a\n\
        warning.")]
    Restore(commands::restore::Args),

    /// Show which editors are currently running
    Detect(commands::detect::Args),

    /// Generate shell completion scripts
    Completions(commands::completions::Args),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "flowstate=debug"
    } else {
        "flowstate=info"
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();

    match cli.command {
        Commands::Capture(args) => commands::capture::run(args).await,
        Commands::Restore(args) => commands::restore::run(args).await,
        Commands::Detect(args) => commands::detect::run(args).await,
        Commands::Completions(args) => {
            commands::completions::generate_completions(&mut Cli::command(), args.shell);
            Ok(())
        }
    }
}
