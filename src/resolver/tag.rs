use crate::domain::{TagPattern, TagRef};
use crate::error::Result;
use crate::resolver::Sources;
use crate::source::VersionSource;

/// First tag reachable from `branch` that matches `pattern`, in source order
async fn first_matching<S: VersionSource>(
    source: &S,
    branch: &str,
    pattern: TagPattern,
) -> Result<Option<TagRef>> {
    let tags = source.tags(Some(branch)).await?;
    Ok(pattern.first_match(&tags).cloned())
}

impl<L: VersionSource, R: VersionSource> Sources<L, R> {
    /// Latest version tag reachable from `branch`.
    ///
    /// With `stable_only` only exact `vX.Y.Z` tags qualify. The newest-first
    /// order comes from the source; no versions are compared here.
    pub async fn latest_tag(&self, branch: &str, stable_only: bool) -> Option<TagRef> {
        let pattern = TagPattern::from_stable_only(stable_only);
        self.first_some(
            "latest tag",
            first_matching(&self.local, branch, pattern),
            first_matching(&self.remote, branch, pattern),
        )
        .await
    }

    /// Every tag reachable from `branch`, newest first
    pub async fn reachable_tags(&self, branch: &str) -> Vec<TagRef> {
        self.first_some(
            "reachable tags",
            self.local.tags(Some(branch)),
            self.remote.tags(Some(branch)),
        )
        .await
        .unwrap_or_default()
    }

    /// Commit a tag points at
    pub async fn tag_commit(&self, tag: &str) -> Option<String> {
        self.first_some(
            "tag commit",
            self.local.tag_commit(tag),
            self.remote.tag_commit(tag),
        )
        .await
    }
}
