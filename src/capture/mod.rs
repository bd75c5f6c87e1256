//! The capture engine.
//!
//! One capture cycle walks a short pipeline: detect the editor process,
//! resolve the active workspace from its storage, feed the workspace to
//! the external analyzer, and render or preserve the context document.
//! The terminal states mirror that pipeline: `NotRunning` when detection
//! gates the cycle off, `NoWorkspace` when resolution finds nothing, and
//! `Session` once a non-empty [`IdeSession`] is ready. A failed analysis
//! or document write never moves the cycle backward; the session is
//! returned regardless.
//!
//! Cycles for different editors are independent and may run concurrently;
//! within one cycle the steps are sequential because each consumes the
//! previous step's output.

use std::path::Path;
use tokio_util::sync::CancellationToken;

use crate::analyzer::WorkspaceAnalyzer;
use crate::config::Config;
use crate::context::ContextWriter;
use crate::detect::Detector;
use crate::error::Result;
use crate::ide::IdeKind;
use crate::session::IdeSession;
use crate::workspace::Resolver;

/// Terminal state of one capture cycle.
#[derive(Debug)]
pub enum CaptureOutcome {
    /// The editor process is not running; nothing was captured.
    NotRunning,
    /// The editor is running but no workspace could be resolved. Reported
    /// as "no session", not an error.
    NoWorkspace,
    /// A session was captured.
    Session(IdeSession),
}

/// Owns the pieces shared across capture and restore cycles: config, the
/// process detector, and the per-workspace context writer.
pub struct Engine {
    config: Config,
    detector: Detector,
    writer: ContextWriter,
}

impl Engine {
    pub fn new(config: Config) -> Self {
        let detector = Detector::new(&config);
        Self {
            config,
            detector,
            writer: ContextWriter::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The detector, exposed so callers can attach an event sink.
    pub fn detector(&self) -> &Detector {
        &self.detector
    }

    /// The shared context writer. Restores must go through the same
    /// writer so document writes for a workspace stay serialized.
    pub fn writer(&self) -> &ContextWriter {
        &self.writer
    }

    /// Runs one capture cycle for an editor against its default storage
    /// location.
    pub async fn capture(
        &self,
        ide: IdeKind,
        analyzer: &dyn WorkspaceAnalyzer,
        cancel: &CancellationToken,
    ) -> Result<CaptureOutcome> {
        if !self.detector.is_running(ide).await {
            tracing::info!(ide = %ide, "editor not running");
            return Ok(CaptureOutcome::NotRunning);
        }

        let Some(user_dir) = ide.user_storage_dir() else {
            return Ok(CaptureOutcome::NoWorkspace);
        };
        self.capture_workspace(ide, &user_dir, analyzer, cancel).await
    }

    /// The post-detection pipeline: resolve, analyze, document, assemble.
    ///
    /// Takes the storage directory explicitly so the pipeline can run
    /// against any storage tree.
    pub async fn capture_workspace(
        &self,
        ide: IdeKind,
        user_dir: &Path,
        analyzer: &dyn WorkspaceAnalyzer,
        cancel: &CancellationToken,
    ) -> Result<CaptureOutcome> {
        let resolution = Resolver::new(&self.config).resolve(user_dir, cancel)?;

        let mut session = IdeSession::new(ide);
        session.recent_workspaces = resolution.recent_workspaces;
        session.open_files = resolution.open_files;

        if let Some(workspace) = resolution.workspace_path {
            // Analysis is external; a failure degrades document handling
            // to passthrough.
            let analysis = match analyzer.analyze(&workspace, ide) {
                Ok(result) => result,
                Err(e) => {
                    let err = crate::error::Error::Analysis(e.to_string());
                    tracing::warn!(workspace = %workspace.display(), error = %err, "degrading to passthrough");
                    None
                }
            };

            match self
                .writer
                .capture_document(&workspace, ide, analysis.as_ref(), &self.config)
                .await
            {
                Ok(context_file) => session.context_file = context_file,
                Err(e) => {
                    // Document generation never fails the capture.
                    tracing::warn!(error = %e, "context document not written");
                }
            }

            session.push_workspace(workspace);
        }

        if session.is_empty() {
            tracing::info!(ide = %ide, "no workspace detected");
            return Ok(CaptureOutcome::NoWorkspace);
        }

        Ok(CaptureOutcome::Session(session))
    }
}
