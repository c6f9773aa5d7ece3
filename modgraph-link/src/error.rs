use modgraph_types::{ModuleId, Name};

/// Errors raised while linking contexts together.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Two modules in the same context both define `class`.
    #[error("context {context} has two local definitions of {class}: {first} and {second}")]
    MultipleLocalDefinitions {
        /// The name of the offending context.
        context: String,
        /// The class both modules define.
        class: Name,
        /// The module that was recorded as the definer first.
        first: ModuleId,
        /// The module that conflicted with it.
        second: ModuleId,
    },
    /// Two contexts both claim to supply `package` to a third context, or a
    /// context both defines and imports a package.
    #[error("package {package} has conflicting suppliers {first} and {second}")]
    PackageConflict {
        /// The contested package.
        package: Name,
        /// The name of the first candidate supplying context.
        first: String,
        /// The name of the second candidate supplying context.
        second: String,
    },
}
