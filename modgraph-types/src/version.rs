use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::error::Error;
use crate::macros::regex_once;

/// A module version.
///
/// Versions are sequences of dot-separated segments where each segment may be
/// purely numeric or purely alphabetic, optionally followed by a `-` and a
/// free-form pre-release tag. Ordering splits each segment into alternating
/// numeric and non-numeric runs and compares numeric runs numerically,
/// non-numeric runs lexicographically, the same scheme Debian- and
/// Arch-style package versions use.
#[derive(Clone, Debug, Eq)]
pub struct Version {
    raw: String,
    runs: Vec<Run>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
enum Run {
    Numeric(u64),
    Alpha(String),
}

impl Version {
    /// Parses a version string.
    ///
    /// ## Examples
    /// ```
    /// use modgraph_types::Version;
    /// use std::str::FromStr;
    ///
    /// let a = Version::from_str("1.2.3").unwrap();
    /// let b = Version::from_str("1.10.0").unwrap();
    /// assert!(a < b);
    /// ```
    pub fn new(input: impl Into<String>) -> Result<Self, Error> {
        let raw = input.into();
        if !regex_once!(r"^[0-9]+(\.[0-9]+)*(-[A-Za-z_0-9.+-]+)?$").is_match(&raw) {
            return Err(Error::InvalidVersion(raw));
        }
        Ok(Self {
            runs: split_runs(&raw),
            raw,
        })
    }

    /// Returns the version's original textual representation.
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

/// Splits a version string into alternating numeric and non-numeric runs.
fn split_runs(raw: &str) -> Vec<Run> {
    let mut runs = Vec::new();
    let mut chars = raw.chars().peekable();
    let mut current = String::new();
    let mut in_digits = false;
    let mut started = false;

    while let Some(&c) = chars.peek() {
        let is_digit = c.is_ascii_digit();
        if !started {
            started = true;
            in_digits = is_digit;
        } else if is_digit != in_digits {
            push_run(&mut runs, &current, in_digits);
            current.clear();
            in_digits = is_digit;
        }
        current.push(c);
        chars.next();
    }
    if !current.is_empty() {
        push_run(&mut runs, &current, in_digits);
    }
    runs
}

fn push_run(runs: &mut Vec<Run>, text: &str, is_digits: bool) {
    if is_digits {
        // Numeric runs from a validated version string always fit in u64;
        // anything absurd enough to overflow just saturates rather than panics.
        runs.push(Run::Numeric(text.parse().unwrap_or(u64::MAX)));
    } else {
        runs.push(Run::Alpha(text.to_string()));
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let mut left = self.runs.iter();
        let mut right = other.runs.iter();
        loop {
            return match (left.next(), right.next()) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Less,
                (Some(_), None) => Ordering::Greater,
                (Some(a), Some(b)) => match (a, b) {
                    (Run::Numeric(x), Run::Numeric(y)) => match x.cmp(y) {
                        Ordering::Equal => continue,
                        ord => ord,
                    },
                    (Run::Alpha(x), Run::Alpha(y)) => match x.cmp(y) {
                        Ordering::Equal => continue,
                        ord => ord,
                    },
                    // A numeric run always sorts after a non-numeric one at the same
                    // position, so "1.0" (which ends here) sorts after "1.0-rc" (which
                    // continues with an alpha run) once the shared prefix is exhausted.
                    (Run::Numeric(_), Run::Alpha(_)) => Ordering::Greater,
                    (Run::Alpha(_), Run::Numeric(_)) => Ordering::Less,
                },
            };
        }
    }
}

impl std::hash::Hash for Version {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.runs.hash_runs(state);
    }
}

trait HashRuns {
    fn hash_runs<H: std::hash::Hasher>(&self, state: &mut H);
}

impl HashRuns for Vec<Run> {
    fn hash_runs<H: std::hash::Hasher>(&self, state: &mut H) {
        for run in self {
            match run {
                Run::Numeric(n) => {
                    0u8.hash(state);
                    n.hash(state);
                }
                Run::Alpha(s) => {
                    1u8.hash(state);
                    s.hash(state);
                }
            }
        }
    }
}

use std::hash::Hash as _;

impl FromStr for Version {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        Self::new(input)
    }
}

impl Display for Version {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.raw)
    }
}

/// A relational operator used in a [`crate::ModuleIdQuery`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, strum::Display)]
pub enum VersionComparison {
    /// Strictly less than.
    #[strum(serialize = "<")]
    Less,
    /// Less than or equal to.
    #[strum(serialize = "<=")]
    LessOrEqual,
    /// Exactly equal to.
    #[strum(serialize = "=")]
    Equal,
    /// Greater than or equal to.
    #[strum(serialize = ">=")]
    GreaterOrEqual,
    /// Strictly greater than.
    #[strum(serialize = ">")]
    Greater,
}

impl VersionComparison {
    /// Returns whether the given [`Ordering`] of `candidate` relative to `required`
    /// satisfies this comparison.
    pub fn is_compatible_with(self, ordering: Ordering) -> bool {
        match self {
            Self::Less => ordering == Ordering::Less,
            Self::LessOrEqual => ordering != Ordering::Greater,
            Self::Equal => ordering == Ordering::Equal,
            Self::GreaterOrEqual => ordering != Ordering::Less,
            Self::Greater => ordering == Ordering::Greater,
        }
    }

    fn prefix_len(input: &str) -> Option<(Self, usize)> {
        if let Some(rest) = input.strip_prefix("<=") {
            let _ = rest;
            Some((Self::LessOrEqual, 2))
        } else if let Some(rest) = input.strip_prefix(">=") {
            let _ = rest;
            Some((Self::GreaterOrEqual, 2))
        } else if input.starts_with('<') {
            Some((Self::Less, 1))
        } else if input.starts_with('>') {
            Some((Self::Greater, 1))
        } else if input.starts_with('=') {
            Some((Self::Equal, 1))
        } else {
            None
        }
    }
}

/// A version requirement: a comparison operator paired with a [`Version`].
///
/// ## Examples
/// ```
/// use modgraph_types::{Version, VersionRequirement};
/// use std::str::FromStr;
///
/// let req = VersionRequirement::from_str(">=2.0").unwrap();
/// assert!(req.is_satisfied_by(&Version::from_str("2.5").unwrap()));
/// assert!(!req.is_satisfied_by(&Version::from_str("1.9").unwrap()));
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VersionRequirement {
    /// The comparison operator.
    pub comparison: VersionComparison,
    /// The version compared against.
    pub version: Version,
}

impl VersionRequirement {
    /// Creates a new requirement from an explicit comparison and version.
    pub fn new(comparison: VersionComparison, version: Version) -> Self {
        Self {
            comparison,
            version,
        }
    }

    /// Returns whether `candidate` satisfies this requirement.
    pub fn is_satisfied_by(&self, candidate: &Version) -> bool {
        self.comparison
            .is_compatible_with(candidate.cmp(&self.version))
    }
}

impl FromStr for VersionRequirement {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let (comparison, len) = VersionComparison::prefix_len(input)
            .ok_or_else(|| Error::InvalidVersionRequirement(input.to_string()))?;
        let version = Version::new(&input[len..])
            .map_err(|_| Error::InvalidVersionRequirement(input.to_string()))?;
        Ok(Self::new(comparison, version))
    }
}

impl Display for VersionRequirement {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.comparison, self.version)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("1.0.0", "1.0.1", Ordering::Less)]
    #[case("1.2.3", "1.10.0", Ordering::Less)]
    #[case("2.0.0", "1.99.99", Ordering::Greater)]
    #[case("1.0", "1.0", Ordering::Equal)]
    #[case("1.0-alpha", "1.0", Ordering::Greater)]
    #[case("1.0-alpha", "1.0-beta", Ordering::Less)]
    fn version_ordering(#[case] a: &str, #[case] b: &str, #[case] expected: Ordering) {
        let a = Version::from_str(a).unwrap();
        let b = Version::from_str(b).unwrap();
        assert_eq!(a.cmp(&b), expected);
    }

    #[test]
    fn rejects_malformed_version() {
        assert!(Version::from_str("not-a-version!").is_err());
        assert!(Version::from_str("").is_err());
    }

    #[rstest]
    #[case("=1.0.0", "1.0.0", true)]
    #[case("=1.0.0", "1.0.1", false)]
    #[case(">=1.0.0", "2.0.0", true)]
    #[case(">=2.0.0", "1.9.0", false)]
    #[case("<2.0.0", "1.9.0", true)]
    #[case("<=2.0.0", "2.0.0", true)]
    #[case(">2.0.0", "2.0.0", false)]
    fn requirement_matches(#[case] req: &str, #[case] candidate: &str, #[case] expected: bool) {
        let req = VersionRequirement::from_str(req).unwrap();
        let candidate = Version::from_str(candidate).unwrap();
        assert_eq!(req.is_satisfied_by(&candidate), expected);
    }

    proptest! {
        #[test]
        fn ordering_is_total(a in "[0-9]{1,3}(\\.[0-9]{1,3}){0,3}", b in "[0-9]{1,3}(\\.[0-9]{1,3}){0,3}") {
            let va = Version::from_str(&a).unwrap();
            let vb = Version::from_str(&b).unwrap();
            let forward = va.cmp(&vb);
            let backward = vb.cmp(&va);
            prop_assert_eq!(forward, backward.reverse());
        }
    }
}
