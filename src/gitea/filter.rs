use super::{
    error::{Error, Result},
    tag::{parse_version, parse_version_with_segments},
};
use itertools::Itertools;
use semver::Version;
use std::{fmt, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operator {
    Equal,
    NotEqual,
    Greater,
    GreaterOrEqual,
    Less,
    LessOrEqual,
    Pessimistic,
}

impl Operator {
    // longest symbols first so `>=` is not read as `>`
    const SYMBOLS: [(&'static str, Operator); 7] = [
        (">=", Operator::GreaterOrEqual),
        ("<=", Operator::LessOrEqual),
        ("!=", Operator::NotEqual),
        ("~>", Operator::Pessimistic),
        (">", Operator::Greater),
        ("<", Operator::Less),
        ("=", Operator::Equal),
    ];

    fn split(raw: &str) -> (Operator, &str) {
        Self::SYMBOLS
            .iter()
            .find_map(|(symbol, operator)| raw.strip_prefix(symbol).map(|rest| (*operator, rest)))
            .unwrap_or((Operator::Equal, raw))
    }

    fn symbol(&self) -> &'static str {
        Self::SYMBOLS
            .iter()
            .find(|(_, operator)| operator == self)
            .map(|(symbol, _)| *symbol)
            .unwrap_or("=")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Clause {
    operator: Operator,
    version: Version,
    segments: usize,
}

impl Clause {
    fn parse(raw: &str) -> std::result::Result<Clause, String> {
        let (operator, operand) = Operator::split(raw.trim());
        let operand = operand.trim();

        let (version, segments) = parse_version_with_segments(operand)
            .ok_or_else(|| format!("`{}` is not a valid version", operand))?;

        Ok(Clause {
            operator,
            version,
            segments,
        })
    }

    fn check(&self, core: &Version) -> bool {
        let version = &self.version;
        match self.operator {
            Operator::Equal => core == version,
            Operator::NotEqual => core != version,
            Operator::Greater => core > version,
            Operator::GreaterOrEqual => core >= version,
            Operator::Less => core < version,
            Operator::LessOrEqual => core <= version,
            Operator::Pessimistic => {
                if core < version {
                    return false;
                }
                // only the segments before the last written one are pinned
                match self.segments {
                    1 => true,
                    2 => core.major == version.major,
                    _ => core.major == version.major && core.minor == version.minor,
                }
            }
        }
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.operator.symbol(), self.version)
    }
}

/// A conjunction of comparator clauses, e.g. `>= 1.0.0, < 2.0.0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    clauses: Vec<Clause>,
}

impl Constraint {
    /// Parses an optional constraint string; blank input means "no constraint".
    pub fn parse_optional(raw: Option<&str>) -> Result<Option<Constraint>> {
        match raw.map(str::trim) {
            Some(raw) if !raw.is_empty() => raw.parse().map(Some),
            _ => Ok(None),
        }
    }

    pub fn greater_than(version: &Version) -> Constraint {
        Constraint {
            clauses: vec![Clause {
                operator: Operator::Greater,
                version: version.to_owned(),
                segments: 3,
            }],
        }
    }

    pub fn and(mut self, other: Constraint) -> Constraint {
        self.clauses.extend(other.clauses);
        self
    }

    /// Checks the version core only; pre-release and build metadata never take part.
    pub fn check(&self, version: &Version) -> bool {
        let core = Version::new(version.major, version.minor, version.patch);

        self.clauses.iter().all(|clause| clause.check(&core))
    }
}

impl FromStr for Constraint {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Constraint> {
        let clauses = raw
            .split(',')
            .map(Clause::parse)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|reason| Error::InvalidConstraint {
                constraint: raw.to_owned(),
                reason,
            })?;

        Ok(Constraint { clauses })
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.clauses.iter().join(", "))
    }
}

/// Decides whether a release tag passes the constraint and pre-release gate.
///
/// Tags that do not parse as a version never pass.
pub fn matches(tag: &str, constraint: Option<&Constraint>, include_pre_release: bool) -> bool {
    let Some(version) = parse_version(tag) else {
        log::debug!("skipping release with non-semver tag {}", tag);
        return false;
    };

    if !include_pre_release && !version.pre.is_empty() {
        return false;
    }

    constraint.map_or(true, |constraint| constraint.check(&version))
}

/// Immutable query used to list releases of one repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListFilter {
    pub owner: String,
    pub repo: String,
    pub constraint: Option<Constraint>,
    pub include_pre_release: bool,
}

impl ListFilter {
    pub fn new(
        owner: impl Into<String>,
        repo: impl Into<String>,
        constraint: Option<Constraint>,
        include_pre_release: bool,
    ) -> Self {
        ListFilter {
            owner: owner.into(),
            repo: repo.into(),
            constraint,
            include_pre_release,
        }
    }

    pub fn matches(&self, tag: &str) -> bool {
        matches(tag, self.constraint.as_ref(), self.include_pre_release)
    }
}
