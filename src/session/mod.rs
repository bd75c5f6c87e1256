//! Core data model for captured editor sessions.
//!
//! An [`IdeSession`] is the value produced by one capture cycle and consumed
//! by a later restore. It records which editor was running, which workspace
//! was active, the files that were open, and the continuation document
//! written to the workspace root. Sessions are plain serde values so the
//! external control plane can persist them however it likes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

use crate::ide::IdeKind;

/// One captured editor session.
///
/// Constructed fresh on every capture. The capture engine only returns a
/// session when `workspace_paths` or `recent_workspaces` is non-empty; an
/// empty session is discarded, never persisted as "active".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdeSession {
    /// Unique identifier for this capture, assigned at capture time.
    pub id: Uuid,

    /// Which editor this session belongs to.
    pub ide: IdeKind,

    /// When the capture completed.
    pub captured_at: DateTime<Utc>,

    /// Workspace roots in insertion order, deduplicated.
    pub workspace_paths: Vec<PathBuf>,

    /// Files that were open in the active workspace and still existed on
    /// disk at capture time.
    pub open_files: Vec<OpenFile>,

    /// Up to ten recently opened workspaces, newest first, deduplicated.
    pub recent_workspaces: Vec<PathBuf>,

    /// The continuation document written to the workspace root, if one
    /// was produced or preserved this cycle.
    pub context_file: Option<ContextFile>,
}

impl IdeSession {
    /// Creates an empty session shell for the given editor.
    pub fn new(ide: IdeKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            ide,
            captured_at: Utc::now(),
            workspace_paths: Vec::new(),
            open_files: Vec::new(),
            recent_workspaces: Vec::new(),
            context_file: None,
        }
    }

    /// A session is empty when it resolved neither a workspace nor any
    /// recent-workspace history. Empty sessions are discarded.
    pub fn is_empty(&self) -> bool {
        self.workspace_paths.is_empty() && self.recent_workspaces.is_empty()
    }

    /// Adds a workspace path, preserving insertion order and skipping
    /// duplicates.
    pub fn push_workspace(&mut self, path: PathBuf) {
        if !self.workspace_paths.contains(&path) {
            self.workspace_paths.push(path);
        }
    }
}

/// A file that was open in the captured workspace.
///
/// Only files that still exist on disk at capture time are recorded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenFile {
    /// Absolute path to the file.
    pub path: PathBuf,

    /// Last known cursor position, when the state store exposed one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<CursorPosition>,

    /// Whether this was the focused editor tab, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

impl OpenFile {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            cursor: None,
            active: None,
        }
    }
}

/// A cursor position inside an open file (1-based line, 0-based column,
/// matching what editors persist).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CursorPosition {
    pub line: u32,
    pub column: u32,
}

/// The continuation document attached to a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextFile {
    /// Where the document lives (`<workspaceRoot>/.flowstate_context.md`).
    pub path: PathBuf,

    /// The document content as persisted.
    pub content: String,
}

/// Result of a workspace analysis, produced by the external analyzer.
///
/// This core only consumes the analysis as an opaque structured value; it
/// never computes git state or mines TODOs itself. Field names follow the
/// analyzer's JSON output, so deserialization is camelCase.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Current git branch, if the workspace is a repository.
    #[serde(default)]
    pub git_branch: Option<String>,

    /// Modified-but-uncommitted files.
    #[serde(default)]
    pub modified_files: Vec<String>,

    /// Untracked files.
    #[serde(default)]
    pub untracked_files: Vec<String>,

    /// The most recently edited file, the suggested place to resume.
    #[serde(default)]
    pub last_edited_file: Option<String>,

    /// Minutes elapsed since the last edit.
    #[serde(default)]
    pub minutes_since_last_edit: Option<i64>,

    /// Files the analyzer attributes to AI-assisted edits.
    #[serde(default)]
    pub files_edited_by_ai: Vec<String>,

    /// Files the analyzer attributes to manual edits.
    #[serde(default)]
    pub files_edited_manually: Vec<String>,

    /// Short summaries of recent changes, newest first.
    #[serde(default)]
    pub recent_changes: Vec<String>,

    /// Outstanding TODO items mined from the workspace.
    #[serde(default)]
    pub todos: Vec<TodoItem>,

    /// Analyzer recommendations for the next session.
    #[serde(default)]
    pub recommendations: Vec<String>,

    /// Pre-rendered continuation prompt, embedded verbatim in the
    /// context document.
    #[serde(default)]
    pub continuation_prompt: Option<String>,
}

/// A TODO item reported by the analyzer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoItem {
    pub file: String,
    pub line: u32,
    pub text: String,
    #[serde(default)]
    pub priority: TodoPriority,
}

/// Priority attached to a TODO item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TodoPriority {
    High,
    #[default]
    Medium,
    Low,
}

impl TodoPriority {
    /// Marker rendered in front of a TODO line in the context document.
    pub fn marker(&self) -> &'static str {
        match self {
            Self::High => "[HIGH]",
            Self::Medium => "[MED]",
            Self::Low => "[LOW]",
        }
    }
}

/// Aggregate outcome of a restore: which targets launched and which were
/// skipped. A restore never fails as a whole; partial outcomes are
/// reported here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RestoreReport {
    /// Workspace or file paths the editor was successfully launched
    /// against, in attempt order.
    pub launched: Vec<PathBuf>,

    /// Targets that could not be launched, with the reason.
    pub skipped: Vec<SkippedTarget>,
}

impl RestoreReport {
    /// True when at least one launch attempt succeeded.
    pub fn any_launched(&self) -> bool {
        !self.launched.is_empty()
    }
}

/// A restore target that was skipped, and why.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedTarget {
    pub path: PathBuf,
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_is_empty() {
        let session = IdeSession::new(IdeKind::VsCode);
        assert!(session.is_empty());
        assert!(session.context_file.is_none());
    }

    #[test]
    fn test_push_workspace_dedups_preserving_order() {
        let mut session = IdeSession::new(IdeKind::Cursor);
        session.push_workspace(PathBuf::from("/a"));
        session.push_workspace(PathBuf::from("/b"));
        session.push_workspace(PathBuf::from("/a"));

        assert_eq!(
            session.workspace_paths,
            vec![PathBuf::from("/a"), PathBuf::from("/b")]
        );
    }

    #[test]
    fn test_session_with_only_recent_workspaces_is_not_empty() {
        let mut session = IdeSession::new(IdeKind::VsCode);
        session.recent_workspaces.push(PathBuf::from("/old/project"));
        assert!(!session.is_empty());
    }

    #[test]
    fn test_analysis_result_parses_camel_case() {
        let json = r#"{
            "gitBranch": "feature/auth",
            "modifiedFiles": ["src/login.ts"],
            "filesEditedByAi": ["a.ts", "b.ts"],
            "minutesSinceLastEdit": 42,
            "todos": [
                {"file": "src/login.ts", "line": 10, "text": "handle expiry", "priority": "high"}
            ],
            "continuationPrompt": "Pick up where you left off."
        }"#;

        let analysis: AnalysisResult = serde_json::from_str(json).unwrap();
        assert_eq!(analysis.git_branch.as_deref(), Some("feature/auth"));
        assert_eq!(analysis.files_edited_by_ai.len(), 2);
        assert_eq!(analysis.minutes_since_last_edit, Some(42));
        assert_eq!(analysis.todos[0].priority, TodoPriority::High);
        assert!(analysis.files_edited_manually.is_empty());
    }

    #[test]
    fn test_analysis_result_tolerates_missing_fields() {
        let analysis: AnalysisResult = serde_json::from_str("{}").unwrap();
        assert!(analysis.git_branch.is_none());
        assert!(analysis.todos.is_empty());
    }

    #[test]
    fn test_todo_priority_markers() {
        assert_eq!(TodoPriority::High.marker(), "[HIGH]");
        assert_eq!(TodoPriority::Medium.marker(), "[MED]");
        assert_eq!(TodoPriority::Low.marker(), "[LOW]");
    }

    #[test]
    fn test_session_round_trips_through_json() {
        let mut session = IdeSession::new(IdeKind::Cursor);
        session.push_workspace(PathBuf::from("/home/u/project"));
        session.open_files.push(OpenFile::new(PathBuf::from("/home/u/project/main.rs")));

        let json = serde_json::to_string(&session).unwrap();
        let back: IdeSession = serde_json::from_str(&json).unwrap();
        assert_eq!(back.workspace_paths, session.workspace_paths);
        assert_eq!(back.id, session.id);
    }
}
