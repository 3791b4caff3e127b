//! Error types for the rule editor.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::Diagnostic;

/// Reasons a save request is refused before reaching the API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
	/// The last compile failed; the save action is replaced by this diagnostic.
	#[error("cannot save while the rules have a compile error: {0}")]
	DiagnosticPending(Diagnostic),
	/// A save for this session has not completed yet.
	#[error("a save is already in progress")]
	AlreadySubmitting,
}

/// Failure reported by a [`NetworkApi`](crate::persist::NetworkApi).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
	/// The request never produced a response, or the save task panicked.
	#[error("transport error: {0}")]
	Transport(String),
	/// The controller answered with a non-success status.
	#[error("controller returned HTTP {status}: {body}")]
	Status { status: u16, body: String },
}

/// Errors loading [`RulesConfig`](crate::config::RulesConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("I/O error reading {path}: {error}")]
	Io { path: PathBuf, error: std::io::Error },
	#[error("failed to parse config: {0}")]
	Parse(#[from] toml::de::Error),
	#[error("invalid config: {0}")]
	Invalid(String),
}

/// The server network document could not be read.
#[derive(Debug, Error)]
#[error("malformed network document: {0}")]
pub struct SeedError(#[from] pub serde_json::Error);

/// Result type for configuration loading.
pub type Result<T> = std::result::Result<T, ConfigError>;
