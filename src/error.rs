//! Error taxonomy for capture and restore cycles.
//!
//! Failures are localized to the smallest unit that produced them: one
//! workspace candidate, one document write, one launch target. None of
//! these propagate as a fatal error for a whole cycle; callers see them
//! either as skipped units or inside an aggregate report.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Reading a vendor storage file or workspace subdirectory failed.
    /// Scoped to a single candidate; the enclosing scan skips it.
    #[error("failed to read storage at {path}: {source}")]
    StorageRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The external analyzer failed. Document generation degrades to
    /// passthrough or append.
    #[error("workspace analysis failed: {0}")]
    Analysis(String),

    /// Writing the context document failed. The session is still
    /// returned, with a stale or unset context file.
    #[error("failed to write context document at {path}: {source}")]
    DocumentWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Every launch attempt for one target was exhausted. Reported
    /// per-target in the restore report, never as a whole-restore error.
    #[error("failed to launch {ide} for {target}: {reason}")]
    Launch {
        ide: &'static str,
        target: PathBuf,
        reason: String,
    },

    /// The caller cancelled the cycle. On-disk state stays consistent.
    #[error("operation cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_unit() {
        let err = Error::StorageRead {
            path: PathBuf::from("/store/abc"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().contains("/store/abc"));

        let err = Error::Launch {
            ide: "VSCode",
            target: PathBuf::from("/gone"),
            reason: "alias and fallbacks exhausted".to_string(),
        };
        assert!(err.to_string().contains("/gone"));
        assert!(err.to_string().contains("VSCode"));
    }
}
