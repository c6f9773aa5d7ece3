/// An error that can occur while looking up or persisting module metadata.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A module name did not parse.
    #[error("invalid module name {0:?}: {1}")]
    InvalidModuleName(String, modgraph_types::Error),

    /// A module descriptor's text encoding could not be parsed.
    #[error("invalid module descriptor at line {line}: {message}")]
    InvalidDescriptor {
        /// The 1-based line number of the offending declaration.
        line: usize,
        /// A description of what was wrong with it.
        message: String,
    },

    /// No module matching a query was found anywhere in the catalog chain.
    #[error("module not found: {0}")]
    ModuleNotFound(String),

    /// A filesystem operation on the library failed.
    #[error(transparent)]
    Io(#[from] modgraph_common::Error),
}
