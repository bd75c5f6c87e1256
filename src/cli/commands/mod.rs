//! CLI commands for FlowState.
//!
//! Each submodule implements a single CLI command with its argument
//! parsing and execution logic.

/// Capture sessions from running editors.
pub mod capture;

/// Generate shell completion scripts.
pub mod completions;

/// Probe which editors are running.
pub mod detect;

/// Restore a previously captured session.
pub mod restore;

use crate::analyzer::{JsonFileAnalyzer, NullAnalyzer, WorkspaceAnalyzer};
use crate::ide::IdeKind;
use std::path::PathBuf;

/// Resolves the editors a command targets: the named one, or all known
/// editors when unspecified. An unrecognized name is an error rather
/// than a silent no-op.
pub(crate) fn target_ides(name: Option<&str>) -> anyhow::Result<Vec<IdeKind>> {
    match name {
        None => Ok(IdeKind::KNOWN.to_vec()),
        Some(name) => match IdeKind::parse(name) {
            IdeKind::Unknown => anyhow::bail!("unknown editor '{name}' (expected vscode or cursor)"),
            ide => Ok(vec![ide]),
        },
    }
}

/// Builds the analyzer shim for an optional `--analysis <file>` flag.
pub(crate) fn analyzer_for(analysis: Option<PathBuf>) -> Box<dyn WorkspaceAnalyzer> {
    match analysis {
        Some(path) => Box::new(JsonFileAnalyzer::new(path)),
        None => Box::new(NullAnalyzer),
    }
}
