//! Command-line interface for FlowState.
//!
//! Provides the CLI commands that drive the capture/restore engine:
//! capturing sessions from running editors, restoring stored sessions,
//! and probing editor processes.

/// Individual CLI command implementations.
pub mod commands;

/// Output format selection shared across commands.
pub mod format;
