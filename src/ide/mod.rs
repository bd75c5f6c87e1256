//! Editor capability table.
//!
//! Every supported editor is a variant of [`IdeKind`]; everything that
//! differs between editors (storage layout, process names, launch alias,
//! fallback install paths) is looked up here once instead of being
//! re-branched on a name string at each call site.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// A supported editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IdeKind {
    VsCode,
    Cursor,
    Unknown,
}

impl IdeKind {
    /// The editors a capture cycle will probe by default.
    pub const KNOWN: [IdeKind; 2] = [IdeKind::VsCode, IdeKind::Cursor];

    /// Human-readable editor name, as rendered in context documents.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::VsCode => "VSCode",
            Self::Cursor => "Cursor",
            Self::Unknown => "Unknown",
        }
    }

    /// Process image names to look for during detection, in probe order.
    ///
    /// Windows enumerates by image name (`Code.exe`); unix platforms match
    /// the short process name.
    pub fn process_names(&self) -> &'static [&'static str] {
        #[cfg(target_os = "windows")]
        match self {
            Self::VsCode => &["Code.exe"],
            Self::Cursor => &["Cursor.exe"],
            Self::Unknown => &[],
        }
        #[cfg(not(target_os = "windows"))]
        match self {
            Self::VsCode => &["code", "Code", "Electron"],
            Self::Cursor => &["cursor", "Cursor"],
            Self::Unknown => &[],
        }
    }

    /// Short launch alias used to relaunch the editor (`code`, `cursor`).
    pub fn launch_alias(&self) -> Option<&'static str> {
        match self {
            Self::VsCode => Some("code"),
            Self::Cursor => Some("cursor"),
            Self::Unknown => None,
        }
    }

    /// Well-known absolute install paths tried when the alias is not on
    /// the PATH, in fallback order for the current platform.
    pub fn fallback_binaries(&self) -> Vec<PathBuf> {
        let candidates: &[&str] = match self {
            #[cfg(target_os = "macos")]
            Self::VsCode => &[
                "/Applications/Visual Studio Code.app/Contents/Resources/app/bin/code",
                "/usr/local/bin/code",
            ],
            #[cfg(target_os = "macos")]
            Self::Cursor => &[
                "/Applications/Cursor.app/Contents/Resources/app/bin/cursor",
                "/usr/local/bin/cursor",
            ],
            #[cfg(target_os = "linux")]
            Self::VsCode => &["/usr/bin/code", "/usr/local/bin/code", "/snap/bin/code"],
            #[cfg(target_os = "linux")]
            Self::Cursor => &["/usr/bin/cursor", "/usr/local/bin/cursor"],
            #[cfg(target_os = "windows")]
            Self::VsCode => &[
                "C:\\Program Files\\Microsoft VS Code\\bin\\code.cmd",
                "C:\\Program Files\\Microsoft VS Code\\Code.exe",
            ],
            #[cfg(target_os = "windows")]
            Self::Cursor => &["C:\\Program Files\\Cursor\\Cursor.exe"],
            _ => &[],
        };
        candidates.iter().map(PathBuf::from).collect()
    }

    /// Vendor directory name under the platform config root
    /// (`Code` for VS Code, `Cursor` for Cursor).
    fn vendor_dir(&self) -> Option<&'static str> {
        match self {
            Self::VsCode => Some("Code"),
            Self::Cursor => Some("Cursor"),
            Self::Unknown => None,
        }
    }

    /// Platform-specific path to the editor's `User` storage directory.
    ///
    /// - macOS: `~/Library/Application Support/<Vendor>/User`
    /// - Linux: `~/.config/<Vendor>/User`
    /// - Windows: `%APPDATA%/<Vendor>/User`
    ///
    /// This directory contains `globalStorage/storage.json` (workspace
    /// history) and `workspaceStorage/` (per-workspace state).
    pub fn user_storage_dir(&self) -> Option<PathBuf> {
        let vendor = self.vendor_dir()?;

        #[cfg(target_os = "macos")]
        {
            Some(
                dirs::home_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join("Library/Application Support")
                    .join(vendor)
                    .join("User"),
            )
        }
        #[cfg(not(target_os = "macos"))]
        {
            Some(
                dirs::config_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join(vendor)
                    .join("User"),
            )
        }
    }

    /// Parses a user-supplied editor name (`vscode`, `code`, `cursor`).
    pub fn parse(name: &str) -> IdeKind {
        match name.to_ascii_lowercase().as_str() {
            "vscode" | "vs-code" | "code" => Self::VsCode,
            "cursor" => Self::Cursor,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for IdeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
