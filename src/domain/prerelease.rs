//! Prerelease qualifiers and the rules for numbering them.
//!
//! A qualifier is always `identifier.counter` (for example `dev.3`); the
//! counter is compared numerically, so `dev.10` follows `dev.9`.

use crate::domain::{normalize_tag, SemanticVersion, TagRef};
use crate::error::{GhSemverError, Result};
use std::fmt;
use std::str::FromStr;

/// Identifier used when neither the caller nor the branch supplies one
pub const DEFAULT_PRERELEASE_IDENTIFIER: &str = "dev";

/// Prerelease qualifier: identifier plus counter
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Prerelease {
    pub identifier: String,
    pub number: u64,
}

impl Prerelease {
    pub fn new(identifier: impl Into<String>, number: u64) -> Self {
        Prerelease {
            identifier: identifier.into(),
            number,
        }
    }

    /// First prerelease of a series
    pub fn first(identifier: impl Into<String>) -> Self {
        Prerelease::new(identifier, 1)
    }

    /// Parse `identifier.counter`
    pub fn parse(s: &str) -> Result<Self> {
        s.parse()
    }

    /// Same identifier, counter set to `number`
    pub fn with_number(&self, number: u64) -> Self {
        Prerelease::new(self.identifier.clone(), number)
    }
}

impl FromStr for Prerelease {
    type Err = GhSemverError;

    fn from_str(s: &str) -> Result<Self> {
        let (identifier, number) = s.split_once('.').ok_or_else(|| {
            GhSemverError::version(format!("Prerelease '{}' has no counter", s))
        })?;

        if identifier.is_empty()
            || !identifier
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            return Err(GhSemverError::version(format!(
                "Invalid prerelease identifier: '{}'",
                identifier
            )));
        }

        let number = number.parse::<u64>().map_err(|_| {
            GhSemverError::version(format!("Invalid prerelease counter: '{}'", number))
        })?;

        Ok(Prerelease::new(identifier, number))
    }
}

impl fmt::Display for Prerelease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.identifier, self.number)
    }
}

/// Outcome of comparing a candidate prerelease against published tags
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciliation {
    /// No prerelease of this series exists yet; the candidate stands
    Fresh(SemanticVersion),
    /// A prerelease of this series exists. `bumped` may only be emitted if
    /// qualifying commits landed after `latest`.
    Existing {
        latest: TagRef,
        bumped: SemanticVersion,
    },
}

impl Reconciliation {
    /// Settle the outcome once the release type since `latest` is known.
    ///
    /// `has_new_release` is ignored for `Fresh`.
    pub fn resolve(self, has_new_release: bool) -> Option<SemanticVersion> {
        match self {
            Reconciliation::Fresh(candidate) => Some(candidate),
            Reconciliation::Existing { bumped, .. } if has_new_release => Some(bumped),
            Reconciliation::Existing { .. } => None,
        }
    }
}

/// Compare `candidate` against the tags reachable from the current branch.
///
/// Tags that are not versions, or whose stable triple or prerelease identifier
/// differ from the candidate's, are ignored. Stable candidates are always
/// `Fresh`.
pub fn reconcile(candidate: &SemanticVersion, tags: &[TagRef]) -> Reconciliation {
    let Some(pre) = candidate.prerelease.as_ref() else {
        return Reconciliation::Fresh(candidate.clone());
    };

    let latest = tags
        .iter()
        .filter_map(|tag| {
            let version = SemanticVersion::parse(normalize_tag(&tag.name)).ok()?;
            let existing = version.prerelease.as_ref()?;
            let same_series =
                version.same_triple(candidate) && existing.identifier == pre.identifier;
            same_series.then_some((existing.number, tag))
        })
        .max_by_key(|(number, _)| *number);

    match latest {
        Some((max, latest)) => Reconciliation::Existing {
            latest: latest.clone(),
            bumped: candidate.with_prerelease(pre.with_number(max + 1)),
        },
        None => Reconciliation::Fresh(candidate.clone()),
    }
}
