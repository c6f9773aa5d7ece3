use std::fs::{self, File};
use std::path::{Path, PathBuf};

use crate::error::Error;

/// A scoped, single-writer lock backed by the exclusive creation of a sibling file.
///
/// Acquiring a [`ScopedLock`] fails if the lock file already exists, which is
/// how a previous holder (still running, or crashed without cleanup) is
/// detected. The lock file is removed when the guard is dropped, so every
/// exit path - including an early return or a panic unwind - releases it.
#[derive(Debug)]
pub struct ScopedLock {
    path: PathBuf,
    _file: File,
}

impl ScopedLock {
    /// Acquires an exclusive lock at `path`.
    ///
    /// Fails with [`Error::Locked`] if the file already exists, or with
    /// [`Error::IoPath`] on any other I/O failure.
    pub fn acquire(path: impl Into<PathBuf>) -> Result<Self, Error> {
        let path = path.into();
        let file = File::options()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|source| {
                if source.kind() == std::io::ErrorKind::AlreadyExists {
                    Error::Locked { path: path.clone() }
                } else {
                    Error::io_path(path.clone(), "acquiring lock", source)
                }
            })?;
        log::debug!("acquired lock at {}", path.display());
        Ok(Self { path, _file: file })
    }
}

impl Drop for ScopedLock {
    fn drop(&mut self) {
        if let Err(error) = fs::remove_file(&self.path) {
            log::warn!(
                "failed to remove lock file {}: {error}",
                self.path.display()
            );
        } else {
            log::debug!("released lock at {}", self.path.display());
        }
    }
}

/// Atomically replaces the contents of `destination` with `contents`.
///
/// Writes to a sibling temporary file first, then renames it over the
/// destination, so a crash or failure midway through never leaves a
/// partially written file in place.
pub fn atomic_write(destination: &Path, contents: &[u8]) -> Result<(), Error> {
    let temp_path = sibling_temp_path(destination);
    fs::write(&temp_path, contents)
        .map_err(|source| Error::io_path(temp_path.clone(), "writing temporary file", source))?;
    fs::rename(&temp_path, destination).map_err(|source| {
        Error::io_path(destination.to_path_buf(), "renaming temporary file into place", source)
    })
}

fn sibling_temp_path(destination: &Path) -> PathBuf {
    let mut file_name = destination
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    file_name.push(".tmp");
    destination.with_file_name(file_name)
}

/// Resolves `relative` against `root`, rejecting any path that would escape it.
///
/// `relative` must not be absolute and must not contain a `..` component that
/// would walk above `root` once joined.
pub fn resolve_within(root: &Path, relative: &Path) -> Result<PathBuf, Error> {
    if relative.is_absolute() {
        return Err(Error::PathEscape {
            path: relative.to_path_buf(),
            root: root.to_path_buf(),
        });
    }
    let mut resolved = root.to_path_buf();
    for component in relative.components() {
        match component {
            std::path::Component::Normal(part) => resolved.push(part),
            std::path::Component::CurDir => {}
            _ => {
                return Err(Error::PathEscape {
                    path: relative.to_path_buf(),
                    root: root.to_path_buf(),
                })
            }
        }
    }
    if !resolved.starts_with(root) {
        return Err(Error::PathEscape {
            path: relative.to_path_buf(),
            root: root.to_path_buf(),
        });
    }
    Ok(resolved)
}
