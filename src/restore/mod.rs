//! Session restoration.
//!
//! A restore takes a previously captured [`IdeSession`] and relaunches
//! the editor against its workspaces. The context document is regenerated
//! or amended first so it can be opened alongside the workspace. Launches
//! are fire-and-forget: only the launch attempt is observed, never the
//! editor's later readiness.
//!
//! Nothing here fails a restore as a whole. An unreachable workspace path
//! or a fully exhausted alias-plus-fallback chain is recorded per target
//! in the [`RestoreReport`]; the reachable targets still launch.

use std::ffi::OsString;
use std::path::Path;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

use crate::analyzer::WorkspaceAnalyzer;
use crate::config::Config;
use crate::context::{context_path, ContextWriter};
use crate::error::{Error, Result};
use crate::ide::IdeKind;
use crate::session::{IdeSession, RestoreReport, SkippedTarget};

/// Relaunches editors from captured sessions.
pub struct Restorer<'a> {
    config: &'a Config,
    writer: &'a ContextWriter,
}

impl<'a> Restorer<'a> {
    /// The writer must be the one shared with capture so document writes
    /// for a workspace stay serialized.
    pub fn new(config: &'a Config, writer: &'a ContextWriter) -> Self {
        Self { config, writer }
    }

    /// Restores a session: refreshes context documents, then launches the
    /// editor against each workspace path in capture order, falling back
    /// to the first open file when the session has no workspaces.
    pub async fn restore(
        &self,
        session: &IdeSession,
        analyzer: &dyn WorkspaceAnalyzer,
        cancel: &CancellationToken,
    ) -> Result<RestoreReport> {
        let mut report = RestoreReport::default();

        for workspace in &session.workspace_paths {
            if cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }

            if !workspace.exists() {
                tracing::warn!(workspace = %workspace.display(), "workspace no longer exists, skipped");
                report.skipped.push(SkippedTarget {
                    path: workspace.clone(),
                    reason: "path no longer exists".to_string(),
                });
                continue;
            }

            self.refresh_document(session.ide, workspace, analyzer).await;

            let mut args: Vec<OsString> = vec![workspace.as_os_str().to_os_string()];
            let doc = context_path(workspace);
            if doc.exists() {
                // Open the continuation document alongside the workspace.
                args.push(doc.into_os_string());
            }

            match launch(session.ide, workspace, &args) {
                Ok(()) => report.launched.push(workspace.clone()),
                Err(e) => {
                    tracing::warn!(error = %e, "launch failed");
                    report.skipped.push(SkippedTarget {
                        path: workspace.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        // Single-file fallback when the session carried no workspaces.
        if session.workspace_paths.is_empty() {
            if let Some(open) = session.open_files.first() {
                if cancel.is_cancelled() {
                    return Err(Error::Cancelled);
                }
                if open.path.exists() {
                    match launch(session.ide, &open.path, &[open.path.clone().into()]) {
                        Ok(()) => report.launched.push(open.path.clone()),
                        Err(e) => report.skipped.push(SkippedTarget {
                            path: open.path.clone(),
                            reason: e.to_string(),
                        }),
                    }
                } else {
                    tracing::warn!(file = %open.path.display(), "open file no longer exists, skipped");
                    report.skipped.push(SkippedTarget {
                        path: open.path.clone(),
                        reason: "path no longer exists".to_string(),
                    });
                }
            }
        }

        Ok(report)
    }

    /// Regenerates or amends the workspace's context document. Failures
    /// are logged and do not block the launch.
    async fn refresh_document(
        &self,
        ide: IdeKind,
        workspace: &Path,
        analyzer: &dyn WorkspaceAnalyzer,
    ) {
        let analysis = match analyzer.analyze(workspace, ide) {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(workspace = %workspace.display(), error = %e, "analysis failed on restore");
                None
            }
        };

        if let Err(e) = self
            .writer
            .restore_document(workspace, ide, analysis.as_ref(), self.config)
            .await
        {
            tracing::warn!(error = %e, "context document not refreshed on restore");
        }
    }
}

/// Attempts to launch the editor with the given arguments: first via its
/// short alias, then down the platform's absolute install paths.
///
/// The spawn is fire-and-forget; a successful spawn is a successful
/// launch. Returns [`Error::Launch`] once the chain is exhausted.
fn launch(ide: IdeKind, target: &Path, args: &[OsString]) -> Result<()> {
    let fail = |reason: String| Error::Launch {
        ide: ide.display_name(),
        target: target.to_path_buf(),
        reason,
    };

    let Some(alias) = ide.launch_alias() else {
        return Err(fail("no launch alias".to_string()));
    };

    match spawn_detached(Path::new(alias), args) {
        Ok(()) => return Ok(()),
        Err(e) => {
            tracing::debug!(alias, error = %e, "alias launch failed, trying install paths");
        }
    }

    for binary in ide.fallback_binaries() {
        if spawn_detached(&binary, args).is_ok() {
            return Ok(());
        }
    }

    Err(fail(format!("alias '{alias}' and all install paths failed")))
}

fn spawn_detached(program: &Path, args: &[OsString]) -> std::io::Result<()> {
    Command::new(program)
        .args(args)
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .spawn()
        .map(|_child| ())
}
