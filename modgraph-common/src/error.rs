use std::path::PathBuf;

/// An error shared across modgraph's filesystem-touching crates.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// An I/O operation on a specific path failed.
    #[error("I/O error while {context} at {path:?}:\n{source}")]
    IoPath {
        /// The path the operation targeted.
        path: PathBuf,
        /// What the caller was attempting, e.g. "reading the library header".
        context: &'static str,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A path that was expected to be a directory is not.
    #[error("not a directory: {path:?}")]
    NotADirectory {
        /// The offending path.
        path: PathBuf,
    },

    /// A lock file was already held by another process or scope.
    #[error("already locked: {path:?}")]
    Locked {
        /// The lock file's path.
        path: PathBuf,
    },

    /// A path escaped the destination root it was resolved against.
    #[error("path {path:?} escapes destination root {root:?}")]
    PathEscape {
        /// The offending relative path.
        path: PathBuf,
        /// The destination root it was resolved against.
        root: PathBuf,
    },
}

impl Error {
    /// Builds an [`Error::IoPath`] from a path, a context string, and an I/O error.
    pub fn io_path(path: impl Into<PathBuf>, context: &'static str, source: std::io::Error) -> Self {
        Self::IoPath {
            path: path.into(),
            context,
            source,
        }
    }
}
