//! Completions command - generate shell completion scripts.
//!
//! Generates shell completion scripts for various shells that can be
//! installed to enable tab-completion of FlowState commands and options.

use clap::Command;
use clap_complete::{generate, Shell};
use std::io;

/// Arguments for the completions command.
#[derive(clap::Args)]
#[command(after_help = "EXAMPLES:\n    \
    flowstate completions bash > ~/.local/share/bash-completion/completions/flowstate\n    \
    flowstate completions zsh > ~/.zfunc/_flowstate\n    \
    flowstate completions fish > ~/.config/fish/completions/flowstate.fish")]
pub struct Args {
    /// Shell to generate completions for
    #[arg(value_name = "SHELL")]
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Generates completions using a provided clap Command.
///
/// This should be called from main.rs which has access to the Cli struct.
pub fn generate_completions(cmd: &mut Command, shell: Shell) {
    generate(shell, cmd, "flowstate", &mut io::stdout());
}
