use crate::domain::{Prerelease, ReleaseType, DEFAULT_PRERELEASE_IDENTIFIER, TAG_PREFIX};
use crate::error::{GhSemverError, Result};
use std::fmt;

/// Semantic version with an optional `identifier.counter` prerelease
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SemanticVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub prerelease: Option<Prerelease>,
}

impl SemanticVersion {
    /// Create a stable version
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        SemanticVersion {
            major,
            minor,
            patch,
            prerelease: None,
        }
    }

    /// Parse `MAJOR.MINOR.PATCH[-identifier.N]`, without a tag prefix.
    ///
    /// Build metadata is accepted and dropped. Prerelease qualifiers that are
    /// not `identifier.N` are rejected.
    pub fn parse(s: &str) -> Result<Self> {
        let parsed = semver::Version::parse(s)
            .map_err(|e| GhSemverError::version(format!("Invalid version '{}': {}", s, e)))?;

        let prerelease = if parsed.pre.is_empty() {
            None
        } else {
            Some(Prerelease::parse(parsed.pre.as_str())?)
        };

        Ok(SemanticVersion {
            major: parsed.major,
            minor: parsed.minor,
            patch: parsed.patch,
            prerelease,
        })
    }

    pub fn is_stable(&self) -> bool {
        self.prerelease.is_none()
    }

    /// The stable triple, qualifier dropped
    pub fn stable(&self) -> Self {
        SemanticVersion::new(self.major, self.minor, self.patch)
    }

    pub fn same_triple(&self, other: &SemanticVersion) -> bool {
        (self.major, self.minor, self.patch) == (other.major, other.minor, other.patch)
    }

    pub fn with_prerelease(&self, prerelease: Prerelease) -> Self {
        SemanticVersion {
            prerelease: Some(prerelease),
            ..self.stable()
        }
    }

    /// Increment the stable triple. `None` leaves the version unchanged.
    pub fn bump(&self, release: ReleaseType) -> Self {
        match release {
            ReleaseType::Major => SemanticVersion::new(self.major + 1, 0, 0),
            ReleaseType::Minor => SemanticVersion::new(self.major, self.minor + 1, 0),
            ReleaseType::Patch => SemanticVersion::new(self.major, self.minor, self.patch + 1),
            ReleaseType::None => self.stable(),
        }
    }

    /// Tag name for this version (`v` + version string)
    pub fn tag_name(&self) -> String {
        format!("{}{}", TAG_PREFIX, self)
    }
}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(pre) = &self.prerelease {
            write!(f, "-{}", pre)?;
        }
        Ok(())
    }
}

/// Compute the next version from a base and a release decision.
///
/// - `None` release type yields `None` (nothing to release).
/// - A missing base counts as `0.0.0`; any prerelease on the base is dropped
///   before bumping.
/// - Off the main branch the bumped triple gets `suffix.1` (`dev.1` when no
///   suffix is given).
pub fn next_version(
    base: Option<&SemanticVersion>,
    release: ReleaseType,
    is_main_branch: bool,
    suffix: Option<&str>,
) -> Option<SemanticVersion> {
    if !release.is_release() {
        return None;
    }

    let base = base
        .map(SemanticVersion::stable)
        .unwrap_or_else(|| SemanticVersion::new(0, 0, 0));
    let next = base.bump(release);

    if is_main_branch {
        return Some(next);
    }

    let identifier = suffix
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_PRERELEASE_IDENTIFIER);
    Some(next.with_prerelease(Prerelease::first(identifier)))
}
