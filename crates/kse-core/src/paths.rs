//! Path resolution utilities.

use crate::error::ConfigError;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Get the default kubeconfig path (~/.kube/config).
pub fn default_kubeconfig() -> Result<PathBuf, ConfigError> {
    let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
    Ok(home.join(".kube").join("config"))
}

/// Pick the kubeconfig file to load.
///
/// Order: explicit path, then the first existing entry of the `KUBECONFIG`
/// search list (or its first entry when none exist), then `~/.kube/config`.
pub fn resolve_kubeconfig(
    explicit: Option<&Path>,
    search_list: Option<&OsStr>,
) -> Result<PathBuf, ConfigError> {
    if let Some(path) = explicit {
        return Ok(expand_tilde(path));
    }

    if let Some(list) = search_list {
        let entries: Vec<PathBuf> = std::env::split_paths(list)
            .filter(|p| !p.as_os_str().is_empty())
            .collect();
        if let Some(existing) = entries.iter().find(|p| p.exists()) {
            return Ok(existing.clone());
        }
        if let Some(first) = entries.into_iter().next() {
            return Ok(first);
        }
    }

    default_kubeconfig()
}

/// Expand a leading tilde (~/) in a path.
pub fn expand_tilde(path: &Path) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    path.to_path_buf()
}
