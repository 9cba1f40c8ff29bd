//! Environment variable handling.

use std::env;
use std::path::PathBuf;

/// Get an environment variable as a path, returning None if not set or empty.
pub fn get_path(name: &str) -> Option<PathBuf> {
    env::var_os(name)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

/// Common environment variable names.
pub mod vars {
    /// Path to the user's preferred text editor.
    pub const EDITOR: &str = "EDITOR";

    /// Kubeconfig search list (platform path separator).
    pub const KUBECONFIG: &str = "KUBECONFIG";
}
