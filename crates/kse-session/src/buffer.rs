//! Private scratch file holding secret bytes while they are edited.
//!
//! The file lives in the platform temp directory, is readable and writable
//! by the owner only, and is removed when the buffer is released or dropped.

use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

/// File name prefix for scratch files.
const FILE_PREFIX: &str = "k8s-secret-editor-";

/// A uniquely named, owner-only scratch file.
///
/// Dropping the buffer removes the file on a best-effort basis, so every
/// exit path of the owning scope cleans up. Call [`release`](Self::release)
/// to remove it explicitly and observe any failure.
#[derive(Debug)]
pub struct TransientBuffer {
    file: Option<File>,
    path: PathBuf,
    released: bool,
}

impl TransientBuffer {
    /// Allocate a new scratch file with owner-only permissions.
    ///
    /// If restricting permissions fails the file is removed before the error
    /// is returned.
    pub fn create() -> io::Result<Self> {
        let tmp = tempfile::Builder::new()
            .prefix(FILE_PREFIX)
            .tempfile_in(std::env::temp_dir())?;

        // On error `tmp` is dropped here, which deletes the file.
        restrict_permissions(tmp.path())?;

        let (file, path) = tmp.keep().map_err(|e| e.error)?;
        debug!(path = %path.display(), "created scratch file");

        Ok(Self {
            file: Some(file),
            path,
            released: false,
        })
    }

    /// Append `bytes` at the current write position and flush.
    pub fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        let file = self.file.as_mut().ok_or_else(released_error)?;
        file.write_all(bytes)?;
        file.flush()
    }

    /// Read the full current content from the start of the file.
    ///
    /// The file is reopened by path so that edits made by programs which
    /// save by replacing the file are still seen.
    pub fn read(&self) -> io::Result<Vec<u8>> {
        if self.released {
            return Err(released_error());
        }
        let mut content = Vec::new();
        File::open(&self.path)?.read_to_end(&mut content)?;
        Ok(content)
    }

    /// Path of the backing file, for handing to an external program.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Close the handle and delete the backing file.
    ///
    /// Calling this twice fails on the second call because the file is
    /// already gone.
    pub fn release(&mut self) -> io::Result<()> {
        drop(self.file.take());
        self.released = true;
        fs::remove_file(&self.path)?;
        debug!(path = %self.path.display(), "removed scratch file");
        Ok(())
    }
}

impl Drop for TransientBuffer {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        drop(self.file.take());
        if let Err(e) = fs::remove_file(&self.path) {
            if e.kind() != io::ErrorKind::NotFound {
                warn!(path = %self.path.display(), "failed to remove scratch file: {e}");
            }
        }
    }
}

fn released_error() -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, "scratch buffer already released")
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> io::Result<()> {
    Ok(())
}
