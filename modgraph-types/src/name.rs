use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::error::Error;
use crate::macros::regex_once;

/// A dot-separated module or package name.
///
/// A `Name` consists of one or more identifier segments separated by `.`, where
/// each segment starts with an ASCII letter or underscore and continues with
/// letters, digits, or underscores.
///
/// ## Examples
/// ```
/// use modgraph_types::Name;
/// use std::str::FromStr;
///
/// assert!(Name::from_str("com.example.widget").is_ok());
/// assert!(Name::from_str("1bad").is_err());
/// ```
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Name(String);

impl Name {
    /// Creates a new `Name`, validating it against the allowed grammar.
    pub fn new(name: impl Into<String>) -> Result<Self, Error> {
        let name = name.into();
        if regex_once!(r"^[A-Za-z_][A-Za-z_0-9]*(\.[A-Za-z_][A-Za-z_0-9]*)*$").is_match(&name) {
            Ok(Self(name))
        } else {
            Err(Error::InvalidName(name))
        }
    }

    /// Returns the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the leading package portion of a dotted name, if any segments precede the last.
    pub fn package(&self) -> Option<&str> {
        self.0.rfind('.').map(|idx| &self.0[..idx])
    }
}

impl FromStr for Name {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        Self::new(input)
    }
}

impl Display for Name {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Name {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("a")]
    #[case("com.example.widget")]
    #[case("_leading_underscore")]
    #[case("a.b.c.d.e")]
    fn valid_names(#[case] input: &str) {
        assert!(Name::from_str(input).is_ok());
    }

    #[rstest]
    #[case("")]
    #[case("1bad")]
    #[case("com..example")]
    #[case("com.example.")]
    #[case(".com.example")]
    #[case("has space")]
    fn invalid_names(#[case] input: &str) {
        assert!(Name::from_str(input).is_err());
    }

    #[test]
    fn package_of_dotted_name() {
        let name = Name::new("com.example.widget").unwrap();
        assert_eq!(name.package(), Some("com.example"));
        let top = Name::new("widget").unwrap();
        assert_eq!(top.package(), None);
    }

    proptest! {
        #[test]
        fn round_trips_through_display(segment in "[A-Za-z_][A-Za-z_0-9]{0,8}") {
            let name = Name::from_str(&segment).unwrap();
            prop_assert_eq!(segment, name.to_string());
        }
    }
}
