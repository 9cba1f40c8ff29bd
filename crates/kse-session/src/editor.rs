//! External text editor invocation.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use kse_core::{ConfigError, EditorError};
use tracing::debug;

/// Something that can open a file for interactive editing.
///
/// `open` blocks until editing is finished.
pub trait Editor {
    fn open(&self, path: &Path) -> Result<(), EditorError>;
}

/// An editor program run as a foreground child process.
///
/// The child inherits the terminal's stdin, stdout and stderr. It has no
/// timeout; it ends when the program exits or the whole process is killed.
#[derive(Debug, Clone)]
pub struct ExternalEditor {
    program: PathBuf,
}

impl ExternalEditor {
    /// Pick the editor program: an explicit path first, then the one from
    /// the environment.
    pub fn resolve(explicit: Option<&Path>, from_env: Option<&Path>) -> kse_core::Result<Self> {
        let program = explicit
            .filter(|p| !p.as_os_str().is_empty())
            .or(from_env.filter(|p| !p.as_os_str().is_empty()))
            .ok_or(ConfigError::NoEditor)?;
        Ok(Self::new(program)?)
    }

    /// Validate `program` as a regular executable file.
    ///
    /// A bare program name (no path separator) is looked up on `$PATH`.
    pub fn new(program: impl Into<PathBuf>) -> Result<Self, EditorError> {
        let program = program.into();
        let program = if is_bare_name(&program) {
            search_path(&program).unwrap_or(program)
        } else {
            program
        };

        let metadata = std::fs::metadata(&program).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                EditorError::NotFound(program.clone())
            } else {
                EditorError::Inspect {
                    path: program.clone(),
                    source: e,
                }
            }
        })?;

        if metadata.is_dir() {
            return Err(EditorError::IsDirectory(program));
        }
        if !is_executable(&metadata) {
            return Err(EditorError::NotExecutable(program));
        }

        Ok(Self { program })
    }

    /// Path of the validated editor program.
    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl Editor for ExternalEditor {
    fn open(&self, path: &Path) -> Result<(), EditorError> {
        debug!(editor = %self.program.display(), file = %path.display(), "launching editor");

        let status = Command::new(&self.program)
            .arg(path)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|e| EditorError::Spawn {
                path: self.program.clone(),
                source: e,
            })?;

        if !status.success() {
            return Err(EditorError::Exited {
                path: self.program.clone(),
                status,
            });
        }
        Ok(())
    }
}

fn is_bare_name(program: &Path) -> bool {
    program.components().count() == 1 && program.parent() == Some(Path::new(""))
}

fn search_path(name: &Path) -> Option<PathBuf> {
    let path_var = std::env::var_os("PATH")?;
    std::env::split_paths(&path_var)
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.is_file())
}

#[cfg(unix)]
fn is_executable(metadata: &std::fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(metadata: &std::fs::Metadata) -> bool {
    metadata.is_file()
}
