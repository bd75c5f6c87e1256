//! Capture configuration.
//!
//! The tunables that were magic constants in earlier iterations live here
//! with documented defaults: the activity recency window, the list caps
//! applied when resolving and rendering, and the process-detection timeout.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tunables for capture and restore cycles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// How recently a workspace's state store (or directory) must have
    /// been modified for the workspace to count as active. Default: 30
    /// minutes.
    #[serde(with = "duration_secs")]
    pub recency_window: Duration,

    /// Maximum number of recent workspaces carried in a session.
    /// Default: 10.
    pub recent_workspace_limit: usize,

    /// Maximum recent-activity summaries rendered in the context
    /// document. Default: 5.
    pub summary_limit: usize,

    /// Maximum TODO items rendered in the context document. Default: 5.
    pub todo_limit: usize,

    /// Upper bound on the process-enumeration command. A hung
    /// enumeration must not wedge the whole capture. Default: 3 seconds.
    #[serde(with = "duration_secs")]
    pub detect_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            recency_window: Duration::from_secs(30 * 60),
            recent_workspace_limit: 10,
            summary_limit: 5,
            todo_limit: 5,
            detect_timeout: Duration::from_secs(3),
        }
    }
}

/// Serializes durations as whole seconds so configs stay hand-editable.
mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_secs(u64::deserialize(d)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.recency_window, Duration::from_secs(1800));
        assert_eq!(config.recent_workspace_limit, 10);
        assert_eq!(config.summary_limit, 5);
        assert_eq!(config.todo_limit, 5);
        assert_eq!(config.detect_timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_round_trips_through_json() {
        let config = Config::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(back.recency_window, config.recency_window);
        assert_eq!(back.detect_timeout, config.detect_timeout);
    }
}
