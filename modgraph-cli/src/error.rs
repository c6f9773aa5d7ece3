use std::process::ExitCode;

/// The error type surfaced by every `modgraph` command, with an associated exit code.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Command-line arguments were well-formed but semantically invalid.
    #[error("{0}")]
    Usage(String),

    /// Resolving root queries into a module graph failed.
    #[error(transparent)]
    Resolve(#[from] modgraph_resolve::Error),

    /// Partitioning or linking the resolved modules failed.
    #[error(transparent)]
    Link(#[from] modgraph_link::Error),

    /// Building or querying a `Configuration` failed.
    #[error(transparent)]
    Config(#[from] modgraph_config::Error),

    /// A catalog or library operation failed.
    #[error(transparent)]
    Catalog(#[from] modgraph_catalog::Error),

    /// A repository operation failed.
    #[error(transparent)]
    Repo(#[from] modgraph_repo::Error),

    /// A module file failed to parse, or a hash check failed while reading one.
    #[error(transparent)]
    File(#[from] modgraph_file::Error),

    /// A filesystem operation failed.
    #[error(transparent)]
    Io(#[from] modgraph_common::Error),

    /// A raw I/O operation failed, outside the crates that wrap their own `Io` variant.
    #[error("I/O error: {0}")]
    RawIo(#[from] std::io::Error),

    /// A structural check (e.g. repository validation) found inconsistent data.
    #[error("{0}")]
    Inconsistent(String),
}

impl Error {
    /// Maps this error onto the exit codes this binary documents: 1 usage, 2
    /// resolution/linker failure, 3 I/O failure, 4 codec/format failure, 5
    /// hash/signature failure.
    pub fn exit_code(&self) -> ExitCode {
        let code = match self {
            Error::Usage(_) => 1,
            Error::Resolve(_) | Error::Link(_) | Error::Config(_) => 2,
            Error::Io(_) | Error::RawIo(_) => 3,
            Error::File(modgraph_file::Error::HashMismatch { .. }) => 5,
            Error::File(_) | Error::Catalog(_) | Error::Repo(_) | Error::Inconsistent(_) => 4,
        };
        ExitCode::from(code)
    }
}
