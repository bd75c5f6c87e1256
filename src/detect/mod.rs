//! Editor process detection.
//!
//! Detection shells out to the platform process-enumeration command
//! (`tasklist` on Windows, `pgrep` elsewhere) and checks for the editor's
//! image name. The command is bounded by a timeout and fails open: any
//! failure of the enumeration (tool missing, permission denied, timeout)
//! is logged and reported as "not running", never raised.
//!
//! Process names come from the [`IdeKind`] capability table, but every
//! name is still passed through a [`Sanitizer`] before it reaches the
//! command line; untrusted names must never hit the enumeration command
//! unescaped.
//!
//! Interested parties can observe detection transitions through an
//! injected [`EventSink`] with an explicit start/stop lifecycle; the
//! detector holds no process-wide globals.

use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::process::Command;

use crate::config::Config;
use crate::ide::IdeKind;

/// Receives detection transitions while the detector is started.
pub trait EventSink: Send + Sync {
    fn editor_detected(&self, ide: IdeKind);
    fn editor_missing(&self, ide: IdeKind);
}

/// Escapes or strips a process name before it is passed to the
/// enumeration command.
pub trait Sanitizer: Send + Sync {
    fn sanitize(&self, name: &str) -> String;
}

/// Keeps only characters that can appear in an editor image name.
/// Everything else (shell metacharacters, whitespace, quotes) is dropped.
pub struct DefaultSanitizer;

impl Sanitizer for DefaultSanitizer {
    fn sanitize(&self, name: &str) -> String {
        name.chars()
            .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
            .collect()
    }
}

/// Checks whether a named editor process is currently running.
pub struct Detector {
    timeout: Duration,
    sanitizer: Arc<dyn Sanitizer>,
    sink: Mutex<Option<Arc<dyn EventSink>>>,
}

impl Detector {
    pub fn new(config: &Config) -> Self {
        Self::with_sanitizer(config, Arc::new(DefaultSanitizer))
    }

    /// Builds a detector with a caller-supplied sanitizer.
    pub fn with_sanitizer(config: &Config, sanitizer: Arc<dyn Sanitizer>) -> Self {
        Self {
            timeout: config.detect_timeout,
            sanitizer,
            sink: Mutex::new(None),
        }
    }

    /// Attaches an event sink. Transitions are delivered until [`stop`].
    ///
    /// [`stop`]: Detector::stop
    pub fn start(&self, sink: Arc<dyn EventSink>) {
        *self.sink.lock().expect("sink lock") = Some(sink);
    }

    /// Detaches the event sink.
    pub fn stop(&self) {
        *self.sink.lock().expect("sink lock") = None;
    }

    /// Returns whether any of the editor's process names is running.
    ///
    /// Never errors: enumeration failures are logged and count as "not
    /// running".
    pub async fn is_running(&self, ide: IdeKind) -> bool {
        let mut running = false;
        for name in ide.process_names() {
            let sanitized = self.sanitizer.sanitize(name);
            if sanitized.is_empty() {
                tracing::warn!(name, "process name sanitized to nothing, skipped");
                continue;
            }
            if probe_process(&sanitized, self.timeout).await {
                running = true;
                break;
            }
        }

        if let Some(sink) = self.sink.lock().expect("sink lock").as_ref() {
            if running {
                sink.editor_detected(ide);
            } else {
                sink.editor_missing(ide);
            }
        }

        tracing::debug!(ide = %ide, running, "process detection");
        running
    }
}

/// Probes for one process name with the platform enumeration command.
#[cfg(target_os = "windows")]
async fn probe_process(name: &str, timeout: Duration) -> bool {
    let filter = format!("IMAGENAME eq {name}");
    match run_enumeration("tasklist", &["/FI", &filter, "/FO", "CSV", "/NH"], timeout).await {
        Some(stdout) => stdout.to_ascii_lowercase().contains(&name.to_ascii_lowercase()),
        None => false,
    }
}

#[cfg(not(target_os = "windows"))]
async fn probe_process(name: &str, timeout: Duration) -> bool {
    match run_enumeration("pgrep", &["-x", name], timeout).await {
        // pgrep prints matching PIDs; no output means no match
        Some(stdout) => !stdout.trim().is_empty(),
        None => false,
    }
}

/// Runs one enumeration command, bounded by `timeout`.
///
/// Returns the command's stdout, or `None` on spawn failure or timeout.
/// A hung enumeration must not wedge the capture.
async fn run_enumeration(program: &str, args: &[&str], timeout: Duration) -> Option<String> {
    let output = tokio::time::timeout(timeout, Command::new(program).args(args).output()).await;

    match output {
        Ok(Ok(out)) => Some(String::from_utf8_lossy(&out.stdout).into_owned()),
        Ok(Err(e)) => {
            tracing::warn!(program, error = %e, "process enumeration failed");
            None
        }
        Err(_) => {
            tracing::warn!(program, timeout_ms = timeout.as_millis() as u64, "process enumeration timed out");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_sanitizer_passes_image_names() {
        let s = DefaultSanitizer;
        assert_eq!(s.sanitize("Code.exe"), "Code.exe");
        assert_eq!(s.sanitize("cursor"), "cursor");
    }

    #[test]
    fn test_sanitizer_strips_shell_metacharacters() {
        let s = DefaultSanitizer;
        assert_eq!(s.sanitize("code; rm -rf /"), "coderm-rf");
        assert_eq!(s.sanitize("$(evil)"), "evil");
        assert_eq!(s.sanitize("a`b'c\"d"), "abcd");
    }

    #[test]
    fn test_sanitizer_can_empty_a_name() {
        let s = DefaultSanitizer;
        assert_eq!(s.sanitize("&&||;;"), "");
    }

    #[tokio::test]
    async fn test_unknown_editor_is_never_running() {
        let config = Config::default();
        let detector = Detector::new(&config);
        assert!(!detector.is_running(IdeKind::Unknown).await);
    }

    #[tokio::test]
    async fn test_missing_enumeration_command_fails_open() {
        let out = run_enumeration(
            "definitely-not-a-real-enumeration-tool",
            &[],
            Duration::from_secs(1),
        )
        .await;
        assert!(out.is_none());
    }

    #[tokio::test]
    async fn test_event_sink_lifecycle() {
        struct Counting {
            missing: AtomicUsize,
        }
        impl EventSink for Counting {
            fn editor_detected(&self, _ide: IdeKind) {}
            fn editor_missing(&self, _ide: IdeKind) {
                self.missing.fetch_add(1, Ordering::SeqCst);
            }
        }

        let config = Config::default();
        let detector = Detector::new(&config);
        let sink = Arc::new(Counting {
            missing: AtomicUsize::new(0),
        });

        detector.start(sink.clone());
        let _ = detector.is_running(IdeKind::Unknown).await;
        assert_eq!(sink.missing.load(Ordering::SeqCst), 1);

        detector.stop();
        let _ = detector.is_running(IdeKind::Unknown).await;
        assert_eq!(sink.missing.load(Ordering::SeqCst), 1, "no events after stop");
    }
}
