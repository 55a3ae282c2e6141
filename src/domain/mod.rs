//! Domain logic - pure versioning rules independent of where data comes from

pub mod branch;
pub mod commit;
pub mod prerelease;
pub mod release;
pub mod tag;
pub mod version;

pub use branch::BranchContext;
pub use commit::{classify, Commit, ParsedCommit};
pub use prerelease::{reconcile, Prerelease, Reconciliation, DEFAULT_PRERELEASE_IDENTIFIER};
pub use release::ReleaseType;
pub use tag::{normalize_tag, sort_newest_first, tag_for_version, TagPattern, TagRef, TAG_PREFIX};
pub use version::{next_version, SemanticVersion};
