use modgraph_types::{ModuleId, ModuleIdQuery, Name};

/// Errors raised while resolving a set of root dependences into a module graph.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// No candidate satisfying `query` could be found in any consulted catalog.
    #[error("no module satisfies {query}")]
    ModuleNotFound {
        /// The unsatisfiable query.
        query: ModuleIdQuery,
    },
    /// Every candidate for `query` was rejected, either by permits or by a
    /// downstream conflict, and backtracking exhausted all alternatives.
    #[error("cannot resolve {query}: no candidate satisfies every constraint")]
    CannotResolve {
        /// The query that could not be satisfied after exhausting all candidates.
        query: ModuleIdQuery,
    },
    /// A candidate exists but its view does not permit `requestor`.
    #[error("{candidate} does not permit {requestor:?} to require it")]
    Permits {
        /// The module that declined the requestor.
        candidate: ModuleId,
        /// The name of the module that was refused, or `None` for a root query.
        requestor: Option<Name>,
    },
    /// A catalog lookup failed.
    #[error(transparent)]
    Catalog(#[from] modgraph_catalog::Error),
}
