//! Error types for k8s-secret-editor.
//!
//! Every error is fatal to the edit session. The four categories map
//! directly onto what went wrong: bad configuration, the external editor,
//! the remote store, or local I/O on the scratch buffer.

use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// Session result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for an edit session.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Editor error: {0}")]
    Editor(#[from] EditorError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Short category name, used for diagnostics.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::Editor(_) => "editor",
            Self::Store(_) => "store",
            Self::Io(_) => "io",
        }
    }
}

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no editor configured (use --editor or set $EDITOR)")]
    NoEditor,

    #[error("could not determine home directory")]
    NoHomeDir,

    #[error("kubeconfig {}: {reason}", path.display())]
    Kubeconfig { path: PathBuf, reason: String },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl ConfigError {
    /// Create a kubeconfig error for the given file.
    pub fn kubeconfig(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Kubeconfig {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Errors resolving, validating, or running the external editor.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error("editor '{}' does not exist", .0.display())]
    NotFound(PathBuf),

    #[error("editor '{}' is a directory, not an executable", .0.display())]
    IsDirectory(PathBuf),

    #[error("editor '{}' is not executable", .0.display())]
    NotExecutable(PathBuf),

    #[error("error checking editor '{}': {source}", path.display())]
    Inspect {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("error starting editor '{}': {source}", path.display())]
    Spawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("editor '{}' exited with {status}", path.display())]
    Exited { path: PathBuf, status: ExitStatus },
}

/// Remote store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{kind} '{name}' not found")]
    NotFound { kind: &'static str, name: String },

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("request timed out after {0} seconds")]
    Timeout(u64),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("decode error: {0}")]
    Decode(String),

    #[error("no {0} found")]
    Empty(String),
}

impl StoreError {
    /// Create a not-found error for a kind of object ("secret", "key", ...).
    pub fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            name: name.into(),
        }
    }

    /// Create an API error.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Create a transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Create a decode error.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }

    /// Check if the object (or key) was missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
