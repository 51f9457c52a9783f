//! Domain-specific error types and error handling utilities.
//!
//! This module defines [`JerjerrodError`] which covers every failure mode of
//! status inspection, caching and configuration loading. It uses `thiserror`
//! for ergonomic error definitions and includes constructor helpers for the
//! common failure scenarios.
//!
//! # Public API
//! - [`JerjerrodError`]: Main error enum
//! - [`ParseError`]: VCS command output that did not match the expected grammar
//! - [`ConfigError`]: Invalid config directives or project declarations
//! - [`Result<T>`]: Type alias for `std::result::Result<T, JerjerrodError>`
//!
//! # Error Categories
//! - **Parse failures**: never cached, always surfaced to the caller
//! - **Configuration**: fatal at config-load time
//! - **Subprocess / git2 / IO**: propagated as-is
//!
//! Transient remote failures are *not* errors; they are reported through
//! [`crate::core::info::Outgoing`] sentinels instead.

use std::path::PathBuf;
use thiserror::Error;

/// VCS command output that could not be classified
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unexpected output from '{command}': {line:?}")]
pub struct ParseError {
    pub command: String,
    pub line: String,
}

impl ParseError {
    pub fn new(command: impl Into<String>, line: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            line: line.into(),
        }
    }
}

/// Problems with the user's config file
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid config line {line}: {text}")]
    InvalidLine { line: usize, text: String },

    #[error("Unknown keyword on config line {line}: {keyword}")]
    UnknownKeyword { line: usize, keyword: String },

    #[error("Invalid flag on config line {line}: {flag:?}")]
    InvalidFlag { line: usize, flag: String },

    #[error("Invalid glob on config line {line}: {pattern}")]
    InvalidGlob { line: usize, pattern: String },

    #[error("Bad project path {path}: no .git or .hg directory")]
    BadProjectPath { path: PathBuf },
}

/// Domain-specific error types for jerjerrod
#[derive(Error, Debug)]
pub enum JerjerrodError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Git repository error: {0}")]
    Git(#[from] git2::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid UTF-8 in command output: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("Failed to run '{command}': {source}")]
    CommandSpawnFailed {
        command: String,
        source: std::io::Error,
    },

    #[error("'{command}' failed with {status}: {output}")]
    CommandFailed {
        command: String,
        status: String,
        output: String,
    },

    #[error("No project {0}")]
    ProjectNotFound(String),

    #[error("Could not find cache directory")]
    CacheDirectoryNotFound,

    #[error("Failed to create cache directory '{path}': {source}")]
    CacheDirectoryCreationFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write cache file '{path}': {source}")]
    CacheWriteFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to serialize cache data: {source}")]
    CacheSerializationFailed { source: serde_json::Error },
}

/// Convenience type alias for Results using JerjerrodError
pub type Result<T> = std::result::Result<T, JerjerrodError>;

impl JerjerrodError {
    /// Create an error for a command that could not be started
    pub fn command_spawn_failed(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::CommandSpawnFailed {
            command: command.into(),
            source,
        }
    }

    /// Create an error for a command that exited unsuccessfully
    pub fn command_failed(
        command: impl Into<String>,
        status: std::process::ExitStatus,
        output: &[u8],
    ) -> Self {
        Self::CommandFailed {
            command: command.into(),
            status: status.to_string(),
            output: String::from_utf8_lossy(output).trim().to_string(),
        }
    }

    /// Create a project not found error
    pub fn project_not_found(name_or_path: impl Into<String>) -> Self {
        Self::ProjectNotFound(name_or_path.into())
    }

    /// Create a cache directory creation failed error
    pub fn cache_directory_creation_failed(
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::CacheDirectoryCreationFailed {
            path: path.into(),
            source,
        }
    }

    /// Create a cache write failed error
    pub fn cache_write_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::CacheWriteFailed {
            path: path.into(),
            source,
        }
    }

    /// Create a cache serialization failed error
    pub fn cache_serialization_failed(source: serde_json::Error) -> Self {
        Self::CacheSerializationFailed { source }
    }

    /// Whether this error came from unparseable VCS output
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Self::Parse(_))
    }
}
