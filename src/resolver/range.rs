use crate::domain::Commit;
use crate::resolver::Sources;
use crate::source::{settle, VersionSource};
use tracing::debug;

impl<L: VersionSource, R: VersionSource> Sources<L, R> {
    /// Commits in `(base, head]`, or all commits reachable from `head`.
    ///
    /// Local history is only used when `base` is absent or exists locally,
    /// since a shallow clone can be missing the range. An empty local answer
    /// for a non-empty range also goes to the remote source.
    pub async fn commits_between(&self, base: Option<&str>, head: &str) -> Vec<Commit> {
        let base_is_local = match base {
            Some(sha) => self.local.has_commit(sha).await.unwrap_or(false),
            None => true,
        };

        if base_is_local {
            let empty_range = base == Some(head);
            match self.local.commits_between(base, head).await {
                Ok(commits) if !commits.is_empty() || empty_range => {
                    debug!(source = self.local.name(), commits = commits.len(), "commit range");
                    return commits;
                }
                Ok(_) => debug!("local history returned no commits, asking remote"),
                Err(e) => debug!(error = %e, "local history unavailable, asking remote"),
            }
        } else {
            debug!(base = ?base, "base commit not found locally, asking remote");
        }

        settle("commit range", self.remote.name(), self.remote.commits_between(base, head))
            .await
            .unwrap_or_default()
    }
}
