/// Errors raised while building or querying a [`crate::Configuration`].
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Resolving the root queries failed.
    #[error(transparent)]
    Resolve(#[from] modgraph_resolve::Error),
    /// Partitioning or linking the resolved modules failed.
    #[error(transparent)]
    Link(#[from] modgraph_link::Error),
}
