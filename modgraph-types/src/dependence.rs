use std::collections::BTreeSet;
use std::str::FromStr;

use crate::error::Error;
use crate::id::ModuleIdQuery;

/// A modifier attached to a [`Dependence`], controlling visibility or mandatoriness.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, strum::Display, strum::EnumString)]
pub enum DependenceModifier {
    /// The supplier must be placed in the same context as the requestor.
    #[strum(serialize = "local")]
    Local,
    /// The requestor re-exports the supplier's exports to its own consumers.
    #[strum(serialize = "public")]
    Public,
    /// An unsatisfied dependence is not a resolution failure.
    #[strum(serialize = "optional")]
    Optional,
    /// The dependence was synthesized by the module system, not declared by the module.
    #[strum(serialize = "synthetic")]
    Synthetic,
}

/// A requestor's dependence on a module matching a query, with visibility modifiers.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Dependence {
    query: ModuleIdQuery,
    modifiers: BTreeSet<DependenceModifier>,
}

impl Dependence {
    /// Creates a new dependence with the given modifiers.
    pub fn new(
        query: ModuleIdQuery,
        modifiers: impl IntoIterator<Item = DependenceModifier>,
    ) -> Self {
        Self {
            query,
            modifiers: modifiers.into_iter().collect(),
        }
    }

    /// Returns the query identifying the dependence's target.
    pub fn query(&self) -> &ModuleIdQuery {
        &self.query
    }

    /// Returns whether `modifier` is present on this dependence.
    pub fn has(&self, modifier: DependenceModifier) -> bool {
        self.modifiers.contains(&modifier)
    }

    /// Returns whether this is a [`DependenceModifier::Local`] dependence.
    pub fn is_local(&self) -> bool {
        self.has(DependenceModifier::Local)
    }

    /// Returns whether this is a [`DependenceModifier::Public`] dependence.
    pub fn is_public(&self) -> bool {
        self.has(DependenceModifier::Public)
    }

    /// Returns whether this is a [`DependenceModifier::Optional`] dependence.
    pub fn is_optional(&self) -> bool {
        self.has(DependenceModifier::Optional)
    }

    /// Parses a dependence declaration of the form `requires [mod1,mod2,...] query`,
    /// as used by the module descriptor text format.
    pub fn parse_declaration(line: &str) -> Result<Self, Error> {
        let mut parts = line.split_whitespace();
        let mut modifiers = BTreeSet::new();
        let mut query_token = None;
        for token in parts.by_ref() {
            match DependenceModifier::from_str(token) {
                Ok(modifier) => {
                    modifiers.insert(modifier);
                }
                Err(_) => {
                    query_token = Some(token);
                    break;
                }
            }
        }
        let query_token =
            query_token.ok_or_else(|| Error::InvalidId(line.to_string()))?;
        let query = ModuleIdQuery::from_str(query_token)
            .map_err(|_| Error::InvalidId(line.to_string()))?;
        Ok(Self::new(query, modifiers))
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("local optional b", &[DependenceModifier::Local, DependenceModifier::Optional])]
    #[case("public c@1.0", &[DependenceModifier::Public])]
    #[case("d", &[])]
    fn parses_modifiers(#[case] line: &str, #[case] expected: &[DependenceModifier]) {
        let dep = Dependence::parse_declaration(line).unwrap();
        for modifier in expected {
            assert!(dep.has(*modifier));
        }
        assert_eq!(dep.modifiers.len(), expected.len());
    }

    #[test]
    fn rejects_missing_query() {
        assert!(Dependence::parse_declaration("local optional").is_err());
    }
}
