/// An error that can occur while reading, writing, or validating a repository catalog.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The catalog file's magic number or artifact type tag was wrong.
    #[error("not a stream catalog file")]
    NotAStreamCatalog,

    /// The catalog file ended before a length-prefixed field could be fully read.
    #[error("unexpected end of catalog file while reading {0}")]
    UnexpectedEof(&'static str),

    /// A stored module descriptor failed to parse.
    #[error(transparent)]
    Descriptor(#[from] modgraph_catalog::Error),

    /// A filesystem operation failed.
    #[error(transparent)]
    Io(#[from] modgraph_common::Error),
}
