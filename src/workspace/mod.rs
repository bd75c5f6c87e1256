//! Workspace resolution from editor storage.
//!
//! Editors of the VS Code family keep a `User` storage directory with two
//! areas this module reads:
//!
//! - `globalStorage/storage.json` — workspace history under one of two
//!   legacy keys (`openedPathsList.entries`, `openedPathsList.workspaces3`)
//! - `workspaceStorage/<id>/` — one subdirectory per known workspace,
//!   holding a `workspace.json` descriptor (`{"folder": "<uri>"}`) and a
//!   `state.vscdb` state store
//!
//! The resolver scans the per-workspace subdirectories, picks the one
//! workspace that looks currently active, and extracts the files open in
//! it. "Active" is inferred purely from filesystem mtimes as a proxy for
//! editor focus; this is inherently racy (any background process touching
//! the state store produces a false positive) and is a known limitation.
//! The state store itself is vendor-owned and is never parsed
//! structurally, only pattern-scanned for embedded `file://` references.

pub mod uri;

use regex::Regex;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::SystemTime;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::session::OpenFile;
use uri::decode_file_uri;

/// Name of the per-workspace descriptor file.
const DESCRIPTOR_FILE: &str = "workspace.json";

/// Name of the per-workspace state store.
const STATE_STORE_FILE: &str = "state.vscdb";

/// Legacy history keys in `storage.json`, probed in order.
const HISTORY_KEYS: [&str; 2] = ["openedPathsList.entries", "openedPathsList.workspaces3"];

/// A workspace subdirectory considered during selection.
///
/// `active` is true only when the mtime came from the workspace's state
/// store; a directory-level mtime is the weaker signal. `fresh` marks
/// candidates whose mtime falls inside the recency window; stale
/// candidates are kept for fallback selection only.
#[derive(Debug, Clone)]
pub struct WorkspaceCandidate {
    /// Subdirectory name under `workspaceStorage/`.
    pub id: String,
    pub mtime: SystemTime,
    pub active: bool,
    pub fresh: bool,
}

/// Output of one resolution pass over an editor's storage.
#[derive(Debug, Default)]
pub struct Resolution {
    /// The decoded folder path of the selected active workspace, if any.
    pub workspace_path: Option<PathBuf>,

    /// Files open in the selected workspace that still exist on disk.
    pub open_files: Vec<OpenFile>,

    /// Recent workspace history, newest first, deduplicated.
    pub recent_workspaces: Vec<PathBuf>,
}

/// Scans an editor's `User` storage directory and resolves the active
/// workspace, its open files, and the recent-workspace history.
pub struct Resolver<'a> {
    config: &'a Config,
}

impl<'a> Resolver<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Runs one resolution pass.
    ///
    /// Per-candidate failures are skipped; the scan itself only errors on
    /// cancellation. A missing storage tree resolves to an empty
    /// [`Resolution`], not an error.
    pub fn resolve(&self, user_dir: &Path, cancel: &CancellationToken) -> Result<Resolution> {
        let mut resolution = Resolution {
            recent_workspaces: self.recent_workspaces(user_dir),
            ..Default::default()
        };

        let storage_dir = user_dir.join("workspaceStorage");
        let candidates = self.scan_candidates(&storage_dir, cancel)?;
        let Some(selected) = select_candidate(&candidates) else {
            tracing::debug!("no workspace candidate with a derivable mtime");
            return Ok(resolution);
        };

        tracing::debug!(
            id = %selected.id,
            active = selected.active,
            "selected workspace candidate"
        );

        let workspace_dir = storage_dir.join(&selected.id);
        if let Some(folder) = read_descriptor(&workspace_dir) {
            resolution.workspace_path = Some(folder);
        }

        resolution.open_files = extract_open_files(&workspace_dir.join(STATE_STORE_FILE));

        Ok(resolution)
    }

    /// Reads the recent-workspace history from `globalStorage/storage.json`.
    ///
    /// Takes the first non-empty of the two recognized legacy keys,
    /// decodes each URI, drops undecodables, dedups, and caps the list.
    /// Any read or parse failure yields an empty history.
    fn recent_workspaces(&self, user_dir: &Path) -> Vec<PathBuf> {
        let storage_file = user_dir.join("globalStorage").join("storage.json");
        let Ok(raw) = std::fs::read_to_string(&storage_file) else {
            return Vec::new();
        };
        let Ok(root) = serde_json::from_str::<Value>(&raw) else {
            tracing::debug!(path = %storage_file.display(), "unparseable storage.json");
            return Vec::new();
        };

        let mut paths = Vec::new();
        for key in HISTORY_KEYS {
            for entry in history_entries(&root, key) {
                let decoded = decode_file_uri(&entry);
                if decoded.is_empty() {
                    continue;
                }
                let path = PathBuf::from(decoded);
                if !paths.contains(&path) {
                    paths.push(path);
                }
                if paths.len() >= self.config.recent_workspace_limit {
                    return paths;
                }
            }
            if !paths.is_empty() {
                break;
            }
        }
        paths
    }

    /// Builds a candidate for every workspace subdirectory with a
    /// derivable mtime.
    ///
    /// Two-tier heuristic: a state-store mtime inside the recency window
    /// marks the candidate active; a directory mtime inside the window is
    /// the weaker, inactive signal. Candidates outside the window are
    /// retained stale for fallback selection. I/O errors scoped to one
    /// subdirectory skip that subdirectory only.
    fn scan_candidates(
        &self,
        storage_dir: &Path,
        cancel: &CancellationToken,
    ) -> Result<Vec<WorkspaceCandidate>> {
        let entries = match std::fs::read_dir(storage_dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::debug!(path = %storage_dir.display(), error = %e, "no workspace storage");
                return Ok(Vec::new());
            }
        };

        let now = SystemTime::now();
        let mut candidates = Vec::new();

        for entry in entries {
            if cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }

            let entry = match entry {
                Ok(entry) => entry,
                Err(source) => {
                    let err = Error::StorageRead {
                        path: storage_dir.to_path_buf(),
                        source,
                    };
                    tracing::debug!(error = %err, "unreadable storage entry skipped");
                    continue;
                }
            };
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            let Some(id) = path.file_name().and_then(|n| n.to_str()).map(String::from) else {
                continue;
            };

            match candidate_mtime(&path) {
                Some((mtime, from_state_store)) => {
                    let fresh = is_within(now, mtime, self.config.recency_window);
                    candidates.push(WorkspaceCandidate {
                        id,
                        mtime,
                        active: from_state_store && fresh,
                        fresh,
                    });
                }
                None => {
                    tracing::debug!(id = %id, "workspace dir with no derivable mtime, dropped");
                }
            }
        }

        Ok(candidates)
    }
}

/// Returns `(mtime, came_from_state_store)` for a workspace directory, or
/// `None` when neither the state store nor the directory yields an mtime.
fn candidate_mtime(workspace_dir: &Path) -> Option<(SystemTime, bool)> {
    let state_store = workspace_dir.join(STATE_STORE_FILE);
    if let Ok(meta) = std::fs::metadata(&state_store) {
        if let Ok(mtime) = meta.modified() {
            return Some((mtime, true));
        }
    }
    std::fs::metadata(workspace_dir)
        .and_then(|m| m.modified())
        .ok()
        .map(|mtime| (mtime, false))
}

fn is_within(now: SystemTime, mtime: SystemTime, window: std::time::Duration) -> bool {
    match now.duration_since(mtime) {
        Ok(age) => age <= window,
        // mtime ahead of the clock counts as just-touched
        Err(_) => true,
    }
}

/// Picks the workspace to treat as active.
///
/// Fresh candidates are ranked `(active desc, mtime desc, id asc)`; an
/// active candidate always outranks an inactive one regardless of mtime.
/// When no candidate is fresh, falls back to the most recently touched
/// candidate overall (active forced false by construction of the rank).
/// The id tie-break keeps selection deterministic for identical inputs.
pub fn select_candidate(candidates: &[WorkspaceCandidate]) -> Option<&WorkspaceCandidate> {
    let rank = |a: &&WorkspaceCandidate, b: &&WorkspaceCandidate| {
        b.active
            .cmp(&a.active)
            .then(b.mtime.cmp(&a.mtime))
            .then(a.id.cmp(&b.id))
    };

    if let Some(best) = candidates.iter().filter(|c| c.fresh).min_by(|a, b| rank(a, b)) {
        return Some(best);
    }

    candidates
        .iter()
        .min_by(|a, b| b.mtime.cmp(&a.mtime).then(a.id.cmp(&b.id)))
}

/// Reads and decodes the `{"folder": "<uri>"}` descriptor of a workspace
/// subdirectory. Any failure yields `None`.
fn read_descriptor(workspace_dir: &Path) -> Option<PathBuf> {
    let raw = std::fs::read_to_string(workspace_dir.join(DESCRIPTOR_FILE)).ok()?;
    let value: Value = serde_json::from_str(&raw).ok()?;
    let folder = value.get("folder")?.as_str()?;
    let decoded = decode_file_uri(folder);
    if decoded.is_empty() {
        tracing::debug!(folder, "undecodable workspace descriptor URI");
        return None;
    }
    Some(PathBuf::from(decoded))
}

fn file_uri_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // URIs embedded in the state store sit inside JSON string values;
        // stop at quotes, whitespace, and escape characters.
        Regex::new(r#"file:///[^"'\s\\]+"#).expect("valid regex")
    })
}

/// Pattern-extracts open files from a workspace state store.
///
/// The store is read as raw text (it is a binary vendor format; lossy
/// decoding is fine for pattern extraction) and every embedded absolute
/// `file://` reference is decoded. Only files that still exist on disk
/// are kept, deduplicated in extraction order. Any read failure yields an
/// empty list.
fn extract_open_files(state_store: &Path) -> Vec<OpenFile> {
    let Ok(bytes) = std::fs::read(state_store) else {
        return Vec::new();
    };
    let text = String::from_utf8_lossy(&bytes);

    let mut seen = Vec::new();
    let mut files = Vec::new();
    for m in file_uri_pattern().find_iter(&text) {
        let decoded = decode_file_uri(m.as_str());
        if decoded.is_empty() {
            continue;
        }
        let path = PathBuf::from(decoded);
        if seen.contains(&path) {
            continue;
        }
        seen.push(path.clone());
        if path.is_file() {
            files.push(OpenFile::new(path));
        }
    }
    files
}

/// Pulls URI strings out of one history key. `entries` holds objects with
/// a `folderUri` field; `workspaces3` holds bare strings. Anything else
/// is ignored.
fn history_entries(root: &Value, key: &str) -> Vec<String> {
    let Some(items) = root.get(key).and_then(|v| v.as_array()) else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s.clone()),
            Value::Object(obj) => obj
                .get("folderUri")
                .or_else(|| obj.get("workspace"))
                .and_then(|v| v.as_str())
                .map(String::from),
            _ => None,
        })
        .collect()
}
