use std::fmt;

/// Release decision derived from commit history.
///
/// Variants are declared in priority order so `Ord` reflects
/// `None < Patch < Minor < Major`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum ReleaseType {
    #[default]
    None,
    Patch,
    Minor,
    Major,
}

impl ReleaseType {
    /// Fold a sequence of signals into the highest-priority one.
    ///
    /// Stops consuming the iterator at the first `Major`.
    pub fn aggregate<I>(signals: I) -> ReleaseType
    where
        I: IntoIterator<Item = ReleaseType>,
    {
        let mut release = ReleaseType::None;
        for signal in signals {
            if signal == ReleaseType::Major {
                return ReleaseType::Major;
            }
            release = release.max(signal);
        }
        release
    }

    /// Whether this decision warrants a new version at all
    pub fn is_release(self) -> bool {
        self != ReleaseType::None
    }
}

impl fmt::Display for ReleaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReleaseType::None => "none",
            ReleaseType::Patch => "patch",
            ReleaseType::Minor => "minor",
            ReleaseType::Major => "major",
        };
        f.write_str(name)
    }
}
