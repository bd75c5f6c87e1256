//! Context document generation.
//!
//! The context document is the human-readable continuation file written to
//! `<workspaceRoot>/.flowstate_context.md`. With a fresh analysis the
//! document is fully regenerated in a fixed section order; without one the
//! existing document is preserved byte-identically on capture (manual user
//! edits survive) or gets an appended `Restored:` note on restore.
//!
//! Writes go through [`ContextWriter`], which serializes writers per
//! workspace path and writes atomically (temp file + rename), so a capture
//! and a restore racing on the same workspace can never interleave partial
//! content. A write failure never fails the enclosing cycle; callers get
//! the error to log and move on.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::ide::IdeKind;
use crate::session::{AnalysisResult, ContextFile};

/// File name of the context document at each workspace root.
pub const CONTEXT_FILE_NAME: &str = ".flowstate_context.md";

/// Path of the context document for a workspace.
pub fn context_path(workspace: &Path) -> PathBuf {
    workspace.join(CONTEXT_FILE_NAME)
}

/// Serializes context-document writes per workspace path.
#[derive(Default)]
pub struct ContextWriter {
    locks: Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl ContextWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Produces or preserves the context document during a capture.
    ///
    /// - With an analysis: regenerate and persist the document.
    /// - Without one, prior document present: pass its content through
    ///   byte-identical, no write.
    /// - Without one, no prior document: produce nothing.
    pub async fn capture_document(
        &self,
        workspace: &Path,
        ide: IdeKind,
        analysis: Option<&AnalysisResult>,
        config: &Config,
    ) -> Result<Option<ContextFile>> {
        let lock = self.lock_for(workspace).await;
        let _guard = lock.lock().await;
        let path = context_path(workspace);

        match analysis {
            Some(analysis) => {
                let content = render(workspace, ide, analysis, Utc::now(), None, config);
                write_atomic(&path, &content)?;
                Ok(Some(ContextFile { path, content }))
            }
            None => Ok(read_existing(&path)),
        }
    }

    /// Produces or amends the context document during a restore.
    ///
    /// With a fresh analysis the document is regenerated with a restore
    /// timestamp in the header; otherwise a short `Restored:` note is
    /// appended to the existing content.
    pub async fn restore_document(
        &self,
        workspace: &Path,
        ide: IdeKind,
        analysis: Option<&AnalysisResult>,
        config: &Config,
    ) -> Result<Option<ContextFile>> {
        let lock = self.lock_for(workspace).await;
        let _guard = lock.lock().await;
        let path = context_path(workspace);
        let now = Utc::now();

        match analysis {
            Some(analysis) => {
                let content = render(workspace, ide, analysis, now, Some(now), config);
                write_atomic(&path, &content)?;
                Ok(Some(ContextFile { path, content }))
            }
            None => match read_existing(&path) {
                Some(existing) => {
                    let content = format!(
                        "{}\n---\nRestored: {}\n",
                        existing.content.trim_end_matches('\n'),
                        format_timestamp(now)
                    );
                    write_atomic(&path, &content)?;
                    Ok(Some(ContextFile { path, content }))
                }
                None => Ok(None),
            },
        }
    }

    async fn lock_for(&self, workspace: &Path) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks
            .entry(workspace.to_path_buf())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

fn read_existing(path: &Path) -> Option<ContextFile> {
    let content = std::fs::read_to_string(path).ok()?;
    Some(ContextFile {
        path: path.to_path_buf(),
        content,
    })
}

/// Writes the document through a sibling temp file and a rename, so a
/// reader never observes partial content.
fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let tmp = path.with_extension("md.tmp");
    let write = || -> std::io::Result<()> {
        std::fs::write(&tmp, content)?;
        std::fs::rename(&tmp, path)
    };
    write().map_err(|source| {
        let _ = std::fs::remove_file(&tmp);
        Error::DocumentWrite {
            path: path.to_path_buf(),
            source,
        }
    })
}

fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M UTC").to_string()
}

fn basename(path: &str) -> &str {
    Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(path)
}

fn count_noun(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("{n} {noun}")
    } else {
        format!("{n} {noun}s")
    }
}

fn format_elapsed(minutes: i64) -> String {
    if minutes < 60 {
        count_noun(minutes.max(0) as usize, "minute")
    } else {
        format!("{}h {}m", minutes / 60, minutes % 60)
    }
}

/// Renders the full context document for a workspace.
///
/// Section order is fixed: header, Quick Start, File Changes (AI-assisted
/// then manual, each only when non-empty), Recent Activity, Outstanding
/// TODOs, Recommendations, the analyzer's verbatim continuation prompt,
/// and the attribution footer.
pub fn render(
    workspace: &Path,
    ide: IdeKind,
    analysis: &AnalysisResult,
    generated_at: DateTime<Utc>,
    restored_at: Option<DateTime<Utc>>,
    config: &Config,
) -> String {
    let mut doc = String::new();

    doc.push_str("# FlowState Context\n\n");
    doc.push_str(&format!("**Workspace:** {}\n", workspace.display()));
    doc.push_str(&format!("**Editor:** {}\n", ide.display_name()));
    doc.push_str(&format!("**Generated:** {}\n", format_timestamp(generated_at)));
    if let Some(restored) = restored_at {
        doc.push_str(&format!("**Restored:** {}\n", format_timestamp(restored)));
    }
    if let Some(branch) = &analysis.git_branch {
        doc.push_str(&format!("**Branch:** {branch}\n"));
    }
    if let Some(minutes) = analysis.minutes_since_last_edit {
        doc.push_str(&format!(
            "**Time since last work:** {}\n",
            format_elapsed(minutes)
        ));
    }

    doc.push_str("\n## Quick Start\n\n");
    if let Some(focus) = &analysis.last_edited_file {
        doc.push_str(&format!("- Pick up in `{}`\n", basename(focus)));
    }
    let modified = analysis.modified_files.len();
    let untracked = analysis.untracked_files.len();
    if modified + untracked > 0 {
        doc.push_str(&format!(
            "- Uncommitted changes: {modified} modified, {untracked} untracked\n"
        ));
    }
    if let Some(top) = top_priority_todo(analysis) {
        doc.push_str(&format!(
            "- Top TODO: {} {} ({}:{})\n",
            top.priority.marker(),
            top.text,
            top.file,
            top.line
        ));
    }

    if !analysis.files_edited_by_ai.is_empty() || !analysis.files_edited_manually.is_empty() {
        doc.push_str("\n## File Changes\n");
        if !analysis.files_edited_by_ai.is_empty() {
            doc.push_str(&format!(
                "\n### AI-Assisted ({})\n\n",
                count_noun(analysis.files_edited_by_ai.len(), "file")
            ));
            for file in &analysis.files_edited_by_ai {
                doc.push_str(&format!("- {}\n", basename(file)));
            }
        }
        if !analysis.files_edited_manually.is_empty() {
            doc.push_str(&format!(
                "\n### Manual Changes ({})\n\n",
                count_noun(analysis.files_edited_manually.len(), "file")
            ));
            for file in &analysis.files_edited_manually {
                doc.push_str(&format!("- {}\n", basename(file)));
            }
        }
    }

    if !analysis.recent_changes.is_empty() {
        doc.push_str("\n## Recent Activity\n\n");
        for summary in analysis.recent_changes.iter().take(config.summary_limit) {
            doc.push_str(&format!("- {summary}\n"));
        }
    }

    if !analysis.todos.is_empty() {
        doc.push_str("\n## Outstanding TODOs\n\n");
        for todo in analysis.todos.iter().take(config.todo_limit) {
            doc.push_str(&format!(
                "- {} {} ({}:{})\n",
                todo.priority.marker(),
                todo.text,
                todo.file,
                todo.line
            ));
        }
    }

    if !analysis.recommendations.is_empty() {
        doc.push_str("\n## Recommendations\n\n");
        for (i, rec) in analysis.recommendations.iter().enumerate() {
            doc.push_str(&format!("{}. {rec}\n", i + 1));
        }
    }

    if let Some(prompt) = &analysis.continuation_prompt {
        doc.push_str(&format!("\n{prompt}\n"));
    }

    doc.push_str("\n---\n_Generated by FlowState_\n");
    doc
}

/// Highest-priority TODO, ties broken by report order.
fn top_priority_todo(analysis: &AnalysisResult) -> Option<&crate::session::TodoItem> {
    use crate::session::TodoPriority;
    let order = |p: TodoPriority| match p {
        TodoPriority::High => 0,
        TodoPriority::Medium => 1,
        TodoPriority::Low => 2,
    };
    analysis.todos.iter().min_by_key(|t| order(t.priority))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{TodoItem, TodoPriority};
    use std::fs;
    use tempfile::tempdir;

    fn analysis_with_ai_files() -> AnalysisResult {
        AnalysisResult {
            files_edited_by_ai: vec!["src/a.ts".to_string(), "src/b.ts".to_string()],
            files_edited_manually: vec![],
            ..Default::default()
        }
    }

    #[test]
    fn test_render_ai_section_and_omits_empty_manual() {
        let config = Config::default();
        let doc = render(
            Path::new("/home/u/project"),
            IdeKind::VsCode,
            &analysis_with_ai_files(),
            Utc::now(),
            None,
            &config,
        );

        assert!(doc.contains("### AI-Assisted (2 files)"));
        assert!(doc.contains("- a.ts"));
        assert!(doc.contains("- b.ts"));
        assert!(!doc.contains("Manual Changes"));
    }

    #[test]
    fn test_render_section_order_is_fixed() {
        let config = Config::default();
        let analysis = AnalysisResult {
            git_branch: Some("main".to_string()),
            recent_changes: vec!["tweaked parser".to_string()],
            todos: vec![TodoItem {
                file: "src/x.rs".to_string(),
                line: 3,
                text: "unify error type".to_string(),
                priority: TodoPriority::High,
            }],
            recommendations: vec!["run the fuzzer".to_string()],
            continuation_prompt: Some("Continue refactoring the parser.".to_string()),
            ..analysis_with_ai_files()
        };
        let doc = render(
            Path::new("/w"),
            IdeKind::Cursor,
            &analysis,
            Utc::now(),
            None,
            &config,
        );

        let positions: Vec<usize> = [
            "# FlowState Context",
            "## Quick Start",
            "## File Changes",
            "## Recent Activity",
            "## Outstanding TODOs",
            "## Recommendations",
            "Continue refactoring the parser.",
            "_Generated by FlowState_",
        ]
        .iter()
        .map(|s| doc.find(s).unwrap_or_else(|| panic!("missing section: {s}")))
        .collect();

        assert!(positions.windows(2).all(|w| w[0] < w[1]), "sections out of order");
    }

    #[test]
    fn test_render_caps_summaries_and_todos() {
        let config = Config::default();
        let analysis = AnalysisResult {
            recent_changes: (0..9).map(|i| format!("change {i}")).collect(),
            todos: (0..9)
                .map(|i| TodoItem {
                    file: "f".to_string(),
                    line: i,
                    text: format!("todo {i}"),
                    priority: TodoPriority::Low,
                })
                .collect(),
            ..Default::default()
        };
        let doc = render(Path::new("/w"), IdeKind::VsCode, &analysis, Utc::now(), None, &config);

        assert!(doc.contains("change 4"));
        assert!(!doc.contains("change 5"));
        assert!(doc.contains("todo 4"));
        assert!(!doc.contains("todo 5"));
    }

    #[test]
    fn test_render_includes_restore_timestamp() {
        let config = Config::default();
        let doc = render(
            Path::new("/w"),
            IdeKind::VsCode,
            &AnalysisResult::default(),
            Utc::now(),
            Some(Utc::now()),
            &config,
        );
        assert!(doc.contains("**Restored:**"));
    }

    #[test]
    fn test_top_priority_todo_prefers_high() {
        let analysis = AnalysisResult {
            todos: vec![
                TodoItem {
                    file: "a".into(),
                    line: 1,
                    text: "low first".into(),
                    priority: TodoPriority::Low,
                },
                TodoItem {
                    file: "b".into(),
                    line: 2,
                    text: "the urgent one".into(),
                    priority: TodoPriority::High,
                },
            ],
            ..Default::default()
        };
        assert_eq!(top_priority_todo(&analysis).unwrap().text, "the urgent one");
    }

    #[tokio::test]
    async fn test_capture_without_analysis_passes_through_byte_identical() {
        let dir = tempdir().unwrap();
        let existing = "# My notes\n\nhand-edited content\n";
        fs::write(context_path(dir.path()), existing).unwrap();

        let writer = ContextWriter::new();
        let config = Config::default();
        let result = writer
            .capture_document(dir.path(), IdeKind::VsCode, None, &config)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(result.content, existing);
        let on_disk = fs::read_to_string(context_path(dir.path())).unwrap();
        assert_eq!(on_disk, existing, "capture must not rewrite the document");
    }

    #[tokio::test]
    async fn test_capture_without_analysis_or_prior_document_yields_none() {
        let dir = tempdir().unwrap();
        let writer = ContextWriter::new();
        let config = Config::default();
        let result = writer
            .capture_document(dir.path(), IdeKind::VsCode, None, &config)
            .await
            .unwrap();
        assert!(result.is_none());
        assert!(!context_path(dir.path()).exists());
    }

    #[tokio::test]
    async fn test_capture_with_analysis_writes_document() {
        let dir = tempdir().unwrap();
        let writer = ContextWriter::new();
        let config = Config::default();
        let analysis = analysis_with_ai_files();

        let result = writer
            .capture_document(dir.path(), IdeKind::Cursor, Some(&analysis), &config)
            .await
            .unwrap()
            .unwrap();

        let on_disk = fs::read_to_string(&result.path).unwrap();
        assert_eq!(on_disk, result.content);
        assert!(on_disk.contains("**Editor:** Cursor"));
    }

    #[tokio::test]
    async fn test_restore_without_analysis_appends_note() {
        let dir = tempdir().unwrap();
        let existing = "# Prior context\n";
        fs::write(context_path(dir.path()), existing).unwrap();

        let writer = ContextWriter::new();
        let config = Config::default();
        let result = writer
            .restore_document(dir.path(), IdeKind::VsCode, None, &config)
            .await
            .unwrap()
            .unwrap();

        assert!(result.content.starts_with("# Prior context"));
        assert!(result.content.contains("Restored: "));
    }

    #[tokio::test]
    async fn test_restore_without_anything_yields_none() {
        let dir = tempdir().unwrap();
        let writer = ContextWriter::new();
        let config = Config::default();
        let result = writer
            .restore_document(dir.path(), IdeKind::VsCode, None, &config)
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_write_failure_is_reported_not_panicked() {
        let writer = ContextWriter::new();
        let config = Config::default();
        let analysis = AnalysisResult::default();
        let result = writer
            .capture_document(
                Path::new("/nonexistent/workspace/root"),
                IdeKind::VsCode,
                Some(&analysis),
                &config,
            )
            .await;
        assert!(matches!(result, Err(Error::DocumentWrite { .. })));
    }

    #[tokio::test]
    async fn test_concurrent_writers_serialize_per_path() {
        let dir = tempdir().unwrap();
        let writer = Arc::new(ContextWriter::new());
        let config = Config::default();
        let analysis = AnalysisResult::default();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let writer = writer.clone();
            let config = config.clone();
            let analysis = analysis.clone();
            let workspace = dir.path().to_path_buf();
            handles.push(tokio::spawn(async move {
                writer
                    .capture_document(&workspace, IdeKind::VsCode, Some(&analysis), &config)
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        // The document is whole, never interleaved.
        let on_disk = fs::read_to_string(context_path(dir.path())).unwrap();
        assert!(on_disk.starts_with("# FlowState Context"));
        assert!(on_disk.ends_with("_Generated by FlowState_\n"));
    }
}
