//! The consumed workspace-analyzer interface.
//!
//! Analysis (git state, AI vs manual edit attribution, TODO mining) is
//! produced outside this core; the capture engine only consumes the
//! structured [`AnalysisResult`]. An analyzer may fail or return nothing,
//! and the engine degrades per the context-document rules either way.

use std::path::{Path, PathBuf};

use crate::ide::IdeKind;
use crate::session::AnalysisResult;

/// Produces an analysis of a workspace, or nothing when there is nothing
/// to report.
pub trait WorkspaceAnalyzer: Send + Sync {
    fn analyze(&self, workspace: &Path, ide: IdeKind) -> anyhow::Result<Option<AnalysisResult>>;
}

/// Analyzer that never reports anything. Captures with this analyzer
/// preserve existing context documents byte-identically.
pub struct NullAnalyzer;

impl WorkspaceAnalyzer for NullAnalyzer {
    fn analyze(&self, _workspace: &Path, _ide: IdeKind) -> anyhow::Result<Option<AnalysisResult>> {
        Ok(None)
    }
}

/// Analyzer shim that reads a pre-computed analysis from a JSON file.
///
/// This is how the CLI feeds an externally produced analysis into a
/// capture or restore cycle.
pub struct JsonFileAnalyzer {
    path: PathBuf,
}

impl JsonFileAnalyzer {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl WorkspaceAnalyzer for JsonFileAnalyzer {
    fn analyze(&self, _workspace: &Path, _ide: IdeKind) -> anyhow::Result<Option<AnalysisResult>> {
        let raw = std::fs::read_to_string(&self.path)?;
        let analysis: AnalysisResult = serde_json::from_str(&raw)?;
        Ok(Some(analysis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_null_analyzer_reports_nothing() {
        let result = NullAnalyzer
            .analyze(Path::new("/tmp"), IdeKind::VsCode)
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_json_file_analyzer_reads_analysis() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("analysis.json");
        fs::write(&file, r#"{"gitBranch": "main", "recommendations": ["run tests"]}"#).unwrap();

        let analyzer = JsonFileAnalyzer::new(file);
        let result = analyzer.analyze(Path::new("/tmp"), IdeKind::Cursor).unwrap();
        let analysis = result.unwrap();
        assert_eq!(analysis.git_branch.as_deref(), Some("main"));
        assert_eq!(analysis.recommendations, vec!["run tests".to_string()]);
    }

    #[test]
    fn test_json_file_analyzer_errors_on_missing_file() {
        let analyzer = JsonFileAnalyzer::new(PathBuf::from("/no/such/analysis.json"));
        assert!(analyzer.analyze(Path::new("/tmp"), IdeKind::VsCode).is_err());
    }
}
