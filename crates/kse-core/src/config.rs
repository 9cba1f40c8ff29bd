//! Runtime configuration.
//!
//! Command-line flags take precedence over the environment, which takes
//! precedence over built-in defaults.

use crate::env::vars;
use crate::error::ConfigError;
use crate::paths;
use std::path::PathBuf;
use std::time::Duration;

/// Default upper bound for each individual call to the remote store.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Values supplied explicitly on the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub editor: Option<PathBuf>,
    pub kubeconfig: Option<PathBuf>,
    pub timeout_secs: Option<u64>,
}

/// Resolved configuration for one invocation.
#[derive(Debug, Clone)]
pub struct Config {
    /// Editor program given on the command line.
    ///
    /// Left unvalidated here. The editor invoker checks it and falls back
    /// to `$EDITOR` when it is absent.
    pub editor: Option<PathBuf>,

    /// Kubeconfig file to load cluster credentials from.
    pub kubeconfig: PathBuf,

    /// Per-call timeout for remote store operations.
    pub request_timeout: Duration,
}

impl Config {
    /// Resolve configuration from overrides and the process environment.
    pub fn resolve(overrides: Overrides) -> Result<Self, ConfigError> {
        let editor = overrides.editor.filter(|p| !p.as_os_str().is_empty());

        let search_list = std::env::var_os(vars::KUBECONFIG).filter(|v| !v.is_empty());
        let kubeconfig = paths::resolve_kubeconfig(
            overrides.kubeconfig.as_deref(),
            search_list.as_deref(),
        )?;

        let timeout_secs = overrides
            .timeout_secs
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "request timeout must be greater than zero".to_string(),
            ));
        }

        tracing::debug!(
            editor = ?editor,
            kubeconfig = %kubeconfig.display(),
            timeout_secs,
            "resolved configuration"
        );

        Ok(Self {
            editor,
            kubeconfig,
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }
}
