//! FlowState - working-context capture and restore
//!
//! FlowState restores a developer's working context across sessions:
//! it detects running editors, resolves the currently active workspace
//! from the editor's persisted storage, writes a human-readable
//! continuation document, and later relaunches the editor against the
//! same workspace and files.

pub mod analyzer;
pub mod capture;
pub mod config;
pub mod context;
pub mod detect;
pub mod error;
pub mod ide;
pub mod restore;
pub mod session;
pub mod workspace;
