//! Error types shared by the identifier, version, and dependence models.

/// An error that can occur while parsing or constructing the core identifier types.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A module or package name did not match the allowed grammar.
    #[error("invalid module name: {0:?}")]
    InvalidName(String),

    /// A version string did not match the allowed grammar.
    #[error("invalid version: {0:?}")]
    InvalidVersion(String),

    /// A module identifier of the form `name[@version]` was malformed.
    #[error("invalid module id: {0:?}")]
    InvalidId(String),

    /// A version query of the form `name[<op>version]` carried an unknown comparison operator.
    #[error("invalid version comparison operator: {0:?}")]
    InvalidComparison(String),

    /// A version requirement string was malformed.
    #[error("invalid version requirement: {0:?}")]
    InvalidVersionRequirement(String),

    /// An unknown dependence modifier keyword was encountered.
    #[error("invalid dependence modifier: {0:?}")]
    InvalidDependenceModifier(String),
}
