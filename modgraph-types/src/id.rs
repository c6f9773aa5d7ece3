use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::error::Error;
use crate::name::Name;
use crate::version::Version;
pub use crate::version::VersionComparison;

/// A module identifier: a name paired with an exact version.
///
/// `ModuleId` implements a total order that sorts first by name and then by
/// version, so catalog listings and resolver candidate lists can be sorted
/// deterministically.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ModuleId {
    name: Name,
    version: Version,
}

impl ModuleId {
    /// Creates a new module id from a name and version.
    pub fn new(name: Name, version: Version) -> Self {
        Self { name, version }
    }

    /// Returns the module's name.
    pub fn name(&self) -> &Name {
        &self.name
    }

    /// Returns the module's version.
    pub fn version(&self) -> &Version {
        &self.version
    }
}

impl FromStr for ModuleId {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let (name, version) = input
            .split_once('@')
            .ok_or_else(|| Error::InvalidId(input.to_string()))?;
        let name =
            Name::from_str(name).map_err(|_| Error::InvalidId(input.to_string()))?;
        let version =
            Version::from_str(version).map_err(|_| Error::InvalidId(input.to_string()))?;
        Ok(Self::new(name, version))
    }
}

impl Display for ModuleId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}

/// A query matching a module name against an optional version constraint.
///
/// When `requirement` is `None`, the query matches any version of the named
/// module (the "any" query described in the module data model).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ModuleIdQuery {
    name: Name,
    requirement: Option<crate::version::VersionRequirement>,
}

impl ModuleIdQuery {
    /// Creates a query that matches any version of `name`.
    pub fn any(name: Name) -> Self {
        Self {
            name,
            requirement: None,
        }
    }

    /// Creates a query constrained by a version requirement.
    pub fn with_requirement(
        name: Name,
        requirement: crate::version::VersionRequirement,
    ) -> Self {
        Self {
            name,
            requirement: Some(requirement),
        }
    }

    /// Returns the queried module name.
    pub fn name(&self) -> &Name {
        &self.name
    }

    /// Returns whether `id` satisfies this query.
    pub fn matches(&self, id: &ModuleId) -> bool {
        if id.name() != &self.name {
            return false;
        }
        match &self.requirement {
            None => true,
            Some(req) => req.is_satisfied_by(id.version()),
        }
    }
}

impl FromStr for ModuleIdQuery {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        if let Some(at) = input.find('@') {
            let name = Name::from_str(&input[..at])
                .map_err(|_| Error::InvalidId(input.to_string()))?;
            let version_part = &input[at + 1..];
            // `@version` with no leading comparison operator means exact equality.
            let req_str = if matches!(
                version_part.as_bytes().first(),
                Some(b'<') | Some(b'>') | Some(b'=')
            ) {
                version_part.to_string()
            } else {
                format!("={version_part}")
            };
            let requirement = crate::version::VersionRequirement::from_str(&req_str)
                .map_err(|_| Error::InvalidId(input.to_string()))?;
            Ok(Self::with_requirement(name, requirement))
        } else {
            let name =
                Name::from_str(input).map_err(|_| Error::InvalidId(input.to_string()))?;
            Ok(Self::any(name))
        }
    }
}

impl Display for ModuleIdQuery {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.requirement {
            None => write!(f, "{}", self.name),
            Some(req) => write!(f, "{}@{}", self.name, req),
        }
    }
}

/// Re-exported so callers constructing queries by hand don't need a second import.
pub use VersionComparison as ComparisonOp;

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn id(s: &str) -> ModuleId {
        ModuleId::from_str(s).unwrap()
    }

    #[test]
    fn id_round_trips_display() {
        let parsed = id("com.example@1.2.3");
        assert_eq!(parsed.to_string(), "com.example@1.2.3");
    }

    #[test]
    fn id_total_order_by_name_then_version() {
        let a = id("a@2.0");
        let b = id("b@1.0");
        assert!(a < b, "names compare first");
        let a1 = id("a@1.0");
        let a2 = id("a@2.0");
        assert!(a1 < a2);
    }

    #[rstest]
    #[case("a", "a@1.0", true)]
    #[case("a", "b@1.0", false)]
    #[case("a@=1.0", "a@1.0", true)]
    #[case("a@=1.0", "a@2.0", false)]
    #[case("a@>=1.0", "a@2.0", true)]
    #[case("a@>=2.0", "a@1.0", false)]
    fn query_matches(#[case] query: &str, #[case] candidate: &str, #[case] expected: bool) {
        let query = ModuleIdQuery::from_str(query).unwrap();
        let candidate = id(candidate);
        assert_eq!(query.matches(&candidate), expected);
    }

    #[test]
    fn rejects_malformed_id() {
        assert!(ModuleId::from_str("noversion").is_err());
        assert!(ModuleId::from_str("@1.0").is_err());
    }
}
